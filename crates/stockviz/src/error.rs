//! Error types for fetching and charting operations

use std::time::Duration;
use thiserror::Error;

/// Errors raised while assembling or rendering a comparison
#[derive(Debug, Error)]
pub enum StockError {
    /// Caller supplied unusable input (e.g. an empty ticker list)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error for {symbol}: {reason}")]
    YahooFinanceError {
        symbol: String,
        reason: String,
    },

    /// Provider call did not finish within the configured timeout
    #[error("Request for {symbol} timed out after {timeout:?}")]
    Timeout {
        symbol: String,
        timeout: Duration,
    },

    /// Every requested ticker came back without a usable row
    #[error("No usable data for any of: {}", tickers.join(", "))]
    NoUsableData {
        tickers: Vec<String>,
    },

    /// Chart drawing failed
    #[error("Render error: {0}")]
    RenderError(String),

    /// HTML template failed to load or render
    #[error("Template error: {0}")]
    TemplateError(#[from] minijinja::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Filesystem error while writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for stockviz operations
pub type Result<T> = std::result::Result<T, StockError>;
