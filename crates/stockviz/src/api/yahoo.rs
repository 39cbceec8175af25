//! Yahoo Finance API client

use crate::api::{PricePoint, PriceProvider};
use crate::config::Period;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Bar size requested from Yahoo; the comparison is always day over day
const DAILY_INTERVAL: &str = "1d";

/// Yahoo Finance API client
///
/// Request timeouts are applied by the caller, see
/// [`Assembler::with_timeout`](crate::engine::Assembler::with_timeout).
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient;

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self
    }

    /// Get daily quotes for a symbol over a range such as `"3mo"`
    ///
    /// Unknown or delisted symbols yield an empty history rather than an error.
    pub async fn get_historical_range(&self, symbol: &str, range: &str) -> Result<Vec<PricePoint>> {
        let provider = yahoo::YahooConnector::new().map_err(|e| yahoo_error(symbol, &e))?;

        let response = match provider.get_quote_range(symbol, DAILY_INTERVAL, range).await {
            Ok(response) => response,
            Err(e) if is_missing_data(&e) => {
                debug!(symbol, range, reason = %e, "Yahoo has no data for symbol");
                return Ok(Vec::new());
            }
            Err(e) => return Err(yahoo_error(symbol, &e)),
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) if is_missing_data(&e) => Vec::new(),
            Err(e) => return Err(yahoo_error(symbol, &e)),
        };

        // Daily bars are stamped at the session open; the exchange's own
        // calendar day is the trading date.
        let gmt_offset = response
            .metadata()
            .map(|meta| i64::from(meta.gmtoffset))
            .unwrap_or(0);

        debug!(symbol, range, quotes = quotes.len(), gmt_offset, "Received quotes from Yahoo");

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = trading_date(q.timestamp as i64, gmt_offset)?;
                Some(PricePoint::new(symbol, date, q.open, q.close))
            })
            .collect())
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceClient {
    async fn fetch_history(&self, symbol: &str, period: &Period) -> Result<Vec<PricePoint>> {
        self.get_historical_range(symbol, period.as_str()).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}

/// Whether `err` means Yahoo simply has nothing for the symbol
///
/// Unknown symbols come back as HTTP 404; known symbols with no bars in the
/// range come back without a result block or without quotes.
fn is_missing_data(err: &yahoo::YahooError) -> bool {
    match err {
        yahoo::YahooError::FetchFailed(status) => status.trim_start().starts_with("404"),
        yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => true,
        _ => false,
    }
}

/// Calendar date of a bar in the exchange's local time
fn trading_date(timestamp: i64, gmt_offset_secs: i64) -> Option<NaiveDate> {
    let offset = FixedOffset::east_opt(i32::try_from(gmt_offset_secs).ok()?)?;
    Some(DateTime::from_timestamp(timestamp, 0)?.with_timezone(&offset).date_naive())
}

fn yahoo_error(symbol: &str, err: &yahoo::YahooError) -> StockError {
    StockError::YahooFinanceError {
        symbol: symbol.to_string(),
        reason: err.to_string(),
    }
}
