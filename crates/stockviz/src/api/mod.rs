//! Market data providers
//!
//! The rest of the crate only talks to [`PriceProvider`]; the Yahoo client is
//! the production implementation.

pub mod yahoo;

use crate::config::Period;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use yahoo::YahooFinanceClient;

/// One trading interval of a ticker's price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub ticker: String,
}

impl PricePoint {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            date,
            open,
            close,
            ticker: ticker.into(),
        }
    }
}

/// Source of daily price history
///
/// An unknown symbol or an empty window is not an error: implementations
/// return an empty vector and let the caller decide. Transport and decoding
/// failures are errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch the daily history of `symbol` over `period`
    async fn fetch_history(&self, symbol: &str, period: &Period) -> Result<Vec<PricePoint>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}
