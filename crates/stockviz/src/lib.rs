//! Stock percentage-change comparison
//!
//! This crate fetches daily price history for a list of tickers and renders a
//! two-panel comparison chart:
//!
//! - Daily percentage change per ticker, with open/close tooltips
//! - Overall percentage change per ticker as a bar chart
//!
//! # Architecture
//!
//! - [`api`]: the [`PriceProvider`](api::PriceProvider) seam and the Yahoo Finance client
//! - [`engine`]: change-record assembly and per-ticker summaries
//! - [`chart`]: the renderer-agnostic figure plus HTML, SVG and table output
//! - [`comparison`]: the pipeline tying them together
//!
//! # Example
//!
//! ```rust,ignore
//! use stockviz::{CompareConfig, OutputFormat, StockComparison};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let comparison = StockComparison::yahoo(CompareConfig::default());
//!     let report = comparison
//!         .render(&["NVDA", "AAPL", "MSFT"], OutputFormat::Html)
//!         .await?;
//!     report.save(std::path::Path::new("comparison.html")).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chart;
pub mod comparison;
pub mod config;
pub mod engine;
pub mod error;

// Re-export main types for convenience
pub use api::{PricePoint, PriceProvider, YahooFinanceClient};
pub use chart::{ChartRenderer, ComparisonChart, HtmlRenderer, OutputFormat, SvgRenderer, summary_table};
pub use comparison::{ComparisonReport, StockComparison};
pub use config::{CompareConfig, DEFAULT_PERIOD, DEFAULT_REQUEST_TIMEOUT, DEFAULT_TICKERS, Period};
pub use engine::{ChangeRecord, CombinedSeries, TickerOutcome, TickerSummary};
pub use error::{Result, StockError};
