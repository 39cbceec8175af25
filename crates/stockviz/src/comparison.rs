//! End-to-end comparison pipeline: fetch, summarise, chart

use crate::api::{PriceProvider, YahooFinanceClient};
use crate::chart::{ChartRenderer, ComparisonChart, OutputFormat, renderer_for};
use crate::config::CompareConfig;
use crate::engine::{Assembler, CombinedSeries, TickerSummary, summarize};
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything produced by one comparison run
#[derive(Debug, Clone)]
pub struct ComparisonReport {
    pub series: CombinedSeries,
    pub summaries: Vec<TickerSummary>,
    pub chart: ComparisonChart,
    pub format: OutputFormat,
    /// Rendered document (HTML page or SVG image)
    pub document: String,
}

impl ComparisonReport {
    /// Write the rendered document to `path`
    pub async fn save(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, &self.document).await?;
        info!(path = %path.display(), format = %self.format, "Chart written");
        Ok(())
    }
}

/// Compares a set of tickers over the configured period
pub struct StockComparison {
    assembler: Assembler,
    config: CompareConfig,
}

impl StockComparison {
    pub fn new(provider: Arc<dyn PriceProvider>, config: CompareConfig) -> Self {
        Self {
            assembler: Assembler::new(provider).with_timeout(config.request_timeout),
            config,
        }
    }

    /// Comparison backed by Yahoo Finance
    pub fn yahoo(config: CompareConfig) -> Self {
        Self::new(Arc::new(YahooFinanceClient::new()), config)
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Fetch `tickers` and lay out the chart without rendering it
    #[instrument(skip(self, tickers), fields(period = %self.config.period))]
    pub async fn build_chart<S: AsRef<str> + Sync>(
        &self,
        tickers: &[S],
    ) -> Result<(CombinedSeries, Vec<TickerSummary>, ComparisonChart)> {
        let series = self.assembler.assemble(tickers, &self.config.period).await?;
        let summaries = summarize(&series);
        let chart = ComparisonChart::build(&series, &summaries);
        Ok((series, summaries, chart))
    }

    /// Fetch `tickers` and render the chart with `renderer`
    pub async fn render_with<S: AsRef<str> + Sync>(
        &self,
        tickers: &[S],
        renderer: &dyn ChartRenderer,
    ) -> Result<ComparisonReport> {
        let (series, summaries, chart) = self.build_chart(tickers).await?;
        let document = renderer.render(&chart)?;

        info!(
            tickers = summaries.len(),
            rows = series.len(),
            format = %renderer.format(),
            "Rendered comparison chart"
        );

        Ok(ComparisonReport {
            series,
            summaries,
            chart,
            format: renderer.format(),
            document,
        })
    }

    /// Fetch `tickers` and render the chart as `format`
    pub async fn render<S: AsRef<str> + Sync>(&self, tickers: &[S], format: OutputFormat) -> Result<ComparisonReport> {
        let renderer = renderer_for(format, self.config.svg_size);
        self.render_with(tickers, renderer.as_ref()).await
    }
}
