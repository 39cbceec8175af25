//! Configuration for comparison runs

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default lookback window handed to the provider
pub const DEFAULT_PERIOD: &str = "3mo";

/// Upper bound on a single provider call unless configured otherwise
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Tickers charted when the caller does not name any
pub const DEFAULT_TICKERS: [&str; 4] = ["NVDA", "AAPL", "MSFT", "U"];

/// Opaque lookback-window specifier (e.g. `"3mo"`, `"1y"`, `"ytd"`)
///
/// The value is passed to the provider untouched; interpretation is the
/// provider's business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period(String);

impl Period {
    pub fn new(range: impl Into<String>) -> Self {
        Self(range.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Period {
    fn from(range: &str) -> Self {
        Self::new(range)
    }
}

impl From<String> for Period {
    fn from(range: String) -> Self {
        Self(range)
    }
}

/// Configuration for a comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Lookback window for every ticker
    pub period: Period,

    /// Upper bound on a single provider call
    pub request_timeout: Duration,

    /// Canvas size in pixels for static (SVG) output
    pub svg_size: (u32, u32),
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            svg_size: (1400, 600),
        }
    }
}

impl CompareConfig {
    /// Create a new configuration builder
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.period.as_str().trim().is_empty() {
            return Err(StockError::ConfigError(
                "period must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.svg_size.0 == 0 || self.svg_size.1 == 0 {
            return Err(StockError::ConfigError(
                "svg_size dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for CompareConfig
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    period: Option<Period>,
    request_timeout: Option<Duration>,
    svg_size: Option<(u32, u32)>,
}

impl CompareConfigBuilder {
    /// Set the lookback period
    pub fn period(mut self, period: impl Into<Period>) -> Self {
        self.period = Some(period.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the SVG canvas size
    pub fn svg_size(mut self, width: u32, height: u32) -> Self {
        self.svg_size = Some((width, height));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<CompareConfig> {
        let defaults = CompareConfig::default();

        let config = CompareConfig {
            period: self.period.unwrap_or(defaults.period),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            svg_size: self.svg_size.unwrap_or(defaults.svg_size),
        };

        config.validate()?;
        Ok(config)
    }
}
