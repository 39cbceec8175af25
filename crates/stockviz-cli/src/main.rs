//! Command-line interface for stockviz
//!
//! # Usage
//!
//! ```bash
//! # Compare the default tickers over the last three months
//! cargo run -p stockviz-cli
//!
//! # Pick tickers and a window, write a static SVG
//! cargo run -p stockviz-cli -- NVDA AMD INTC --period 6mo --format svg -o chips.svg
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use stockviz::{CompareConfig, DEFAULT_PERIOD, OutputFormat, StockComparison, summary_table};
use stockviz_utils::LogFormat;
use tracing::info;

const DEFAULT_FILE_STEM: &str = "stock_comparison";

#[derive(Parser, Debug)]
#[command(name = "stockviz")]
#[command(about = "Compare daily and overall percentage change of stock tickers", long_about = None)]
struct Args {
    /// Ticker symbols to compare, in legend order
    #[arg(default_values = stockviz::DEFAULT_TICKERS)]
    tickers: Vec<String>,

    /// Lookback window passed to the data provider (e.g. 1mo, 3mo, 1y, ytd)
    #[arg(short, long, default_value = DEFAULT_PERIOD)]
    period: String,

    /// Output format: html (interactive) or svg (static)
    #[arg(short, long, default_value = "html")]
    format: OutputFormat,

    /// Output file or directory [default: system temp directory]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// SVG canvas width in pixels
    #[arg(long, default_value_t = 1400)]
    width: u32,

    /// SVG canvas height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Where the chart goes: an explicit file, a file inside an explicit
/// directory, or the temp directory
fn resolve_output(output: Option<&Path>, format: OutputFormat) -> PathBuf {
    let file_name = format!("{DEFAULT_FILE_STEM}.{}", format.extension());
    match output {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path.to_path_buf(),
        None => std::env::temp_dir().join(file_name),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    stockviz_utils::init_tracing_with(args.log_format());

    info!(tickers = ?args.tickers, period = %args.period, format = %args.format, "Starting stockviz");

    let config = CompareConfig::builder()
        .period(args.period.as_str())
        .svg_size(args.width, args.height)
        .build()
        .context("invalid configuration")?;

    let comparison = StockComparison::yahoo(config);
    let report = comparison
        .render(&args.tickers, args.format)
        .await
        .context("failed to build the comparison chart")?;

    let path = resolve_output(args.output.as_deref(), args.format);
    report
        .save(&path)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("{}", summary_table(&report.summaries));
    for ticker in &report.chart.missing {
        println!("No data for {ticker}; left out of the chart");
    }
    println!("Chart written to {}", path.display());

    Ok(())
}
