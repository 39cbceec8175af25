//! Two-panel comparison chart
//!
//! [`ComparisonChart`] is the renderer-agnostic description of the figure:
//! a daily percentage change panel on the left and an overall change bar
//! panel on the right. Renderers turn it into a document.

pub mod html;
pub mod svg;
pub mod table;

use crate::engine::{CombinedSeries, TickerSummary};
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use html::HtmlRenderer;
pub use svg::SvgRenderer;
pub use table::summary_table;

pub const CHART_TITLE: &str = "Stock Data Visualization with Overall Summary";

/// Relative widths of the daily and overall panels
pub const COLUMN_WIDTHS: [f64; 2] = [0.7, 0.3];

/// Gap between the two panels, as a fraction of the figure width
pub const PANEL_SPACING: f64 = 0.1;

/// An RGBA colour with 8-bit channels and a fractional alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` notation
    pub fn css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }
}

/// Tooltip context attached to every point of the daily panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub open: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub date: NaiveDate,
    pub pct_change: f64,
    pub tooltip: Tooltip,
}

/// One ticker's daily percentage change series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTrace {
    pub ticker: String,
    pub points: Vec<LinePoint>,
}

impl LineTrace {
    /// Plotly hover template showing date, change, open and close
    pub fn hover_template(&self) -> String {
        format!(
            "<b>Date:</b> %{{x|%Y-%m-%d}}<br>\
             <b>{} % Change:</b> %{{y:.2f}}%<br>\
             <b>Open:</b> %{{customdata[0]:.2f}}<br>\
             <b>Close:</b> %{{customdata[1]:.2f}}<br>\
             <extra></extra>",
            self.ticker
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePanel {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<LineTrace>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ticker: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPanel {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub series_name: String,
    pub color: Rgba,
    /// Tick label rotation in degrees, counter-clockwise negative
    pub tick_angle: i32,
    pub bars: Vec<Bar>,
}

/// The full figure handed to a [`ChartRenderer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonChart {
    pub title: String,
    pub column_widths: [f64; 2],
    /// Merge hover labels of all series at the same x position
    pub unified_hover: bool,
    pub daily: LinePanel,
    pub overall: BarPanel,
    /// Requested tickers that produced no usable data
    pub missing: Vec<String>,
}

impl ComparisonChart {
    /// Lay out the daily and overall panels
    ///
    /// Line traces follow request order; bars follow summary order.
    pub fn build(series: &CombinedSeries, summaries: &[TickerSummary]) -> Self {
        let traces = series
            .loaded_tickers()
            .map(|ticker| LineTrace {
                ticker: ticker.to_string(),
                points: series
                    .for_ticker(ticker)
                    .map(|r| LinePoint {
                        date: r.date,
                        pct_change: r.pct_change,
                        tooltip: Tooltip {
                            open: r.open,
                            close: r.close,
                        },
                    })
                    .collect(),
            })
            .collect();

        let bars = summaries
            .iter()
            .map(|s| Bar {
                ticker: s.ticker.clone(),
                value: s.overall_pct_change,
            })
            .collect();

        Self {
            title: CHART_TITLE.to_string(),
            column_widths: COLUMN_WIDTHS,
            unified_hover: true,
            daily: LinePanel {
                title: "Daily Percentage Change".to_string(),
                x_title: "Date".to_string(),
                y_title: "% Change".to_string(),
                traces,
            },
            overall: BarPanel {
                title: "Overall Percentage Change".to_string(),
                x_title: "Stocks".to_string(),
                y_title: "Percentage Change".to_string(),
                series_name: "Overall % Change".to_string(),
                color: Rgba::new(49, 130, 189, 0.7),
                tick_angle: -45,
                bars,
            },
            missing: series.empty_tickers().map(str::to_string).collect(),
        }
    }

    /// Horizontal paper-space domains of the two panels
    pub fn column_domains(&self) -> [(f64, f64); 2] {
        let [left, right] = self.column_widths;
        let usable = 1.0 - PANEL_SPACING;
        let left_end = usable * left / (left + right);
        [(0.0, left_end), (left_end + PANEL_SPACING, 1.0)]
    }
}

/// Output document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Interactive Plotly page
    #[default]
    Html,
    /// Static vector image
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "svg" => Ok(Self::Svg),
            other => Err(StockError::InvalidInput(format!(
                "Unknown output format: '{other}'. Supported: html, svg"
            ))),
        }
    }
}

/// Turns a [`ComparisonChart`] into a document
pub trait ChartRenderer: Send + Sync {
    fn format(&self) -> OutputFormat;

    fn render(&self, chart: &ComparisonChart) -> Result<String>;
}

/// Renderer for `format`; `svg_size` only applies to static output
pub fn renderer_for(format: OutputFormat, svg_size: (u32, u32)) -> Box<dyn ChartRenderer> {
    match format {
        OutputFormat::Html => Box::new(HtmlRenderer::new()),
        OutputFormat::Svg => Box::new(SvgRenderer::new(svg_size.0, svg_size.1)),
    }
}
