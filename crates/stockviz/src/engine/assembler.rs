//! Per-ticker percentage change assembly

use crate::api::{PricePoint, PriceProvider};
use crate::config::{DEFAULT_REQUEST_TIMEOUT, Period};
use crate::error::{Result, StockError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A price point with its change against the previous interval's close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub ticker: String,
    pub pct_change: f64,
}

/// What a single requested ticker contributed to the combined series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickerOutcome {
    /// At least one change record survived
    Loaded { ticker: String, records: usize },
    /// The provider had nothing usable for this ticker
    Empty { ticker: String },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Loaded { ticker, .. } | Self::Empty { ticker } => ticker,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }
}

/// Change records for all tickers, in contiguous per-ticker blocks
///
/// Blocks follow request order; rows inside a block are chronological.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinedSeries {
    records: Vec<ChangeRecord>,
    outcomes: Vec<TickerOutcome>,
}

impl CombinedSeries {
    /// Build from per-ticker blocks, in the order given
    pub fn from_blocks(blocks: Vec<(String, Vec<ChangeRecord>)>) -> Self {
        let mut series = Self::default();
        for (ticker, block) in blocks {
            series.push_block(ticker, block);
        }
        series
    }

    fn push_block(&mut self, ticker: String, block: Vec<ChangeRecord>) {
        if block.is_empty() {
            self.outcomes.push(TickerOutcome::Empty { ticker });
        } else {
            self.outcomes.push(TickerOutcome::Loaded {
                ticker,
                records: block.len(),
            });
            self.records.extend(block);
        }
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn outcomes(&self) -> &[TickerOutcome] {
        &self.outcomes
    }

    /// Records belonging to `ticker`, in their stored order
    pub fn for_ticker<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a ChangeRecord> + 'a {
        self.records.iter().filter(move |r| r.ticker == ticker)
    }

    /// Tickers that contributed rows, in request order
    pub fn loaded_tickers(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_empty())
            .map(TickerOutcome::ticker)
    }

    /// Tickers that contributed nothing, in request order
    pub fn empty_tickers(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_empty())
            .map(TickerOutcome::ticker)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Percentage change from `previous` to `current`
pub fn pct_change(previous: f64, current: f64) -> f64 {
    (current - previous) / previous * 100.0
}

/// Derive change records from one ticker's chronological price points
///
/// The first interval has no predecessor and is dropped. Intervals whose
/// change is not a finite number (a zero or missing previous close) are
/// dropped as well.
pub fn pct_changes(points: &[PricePoint]) -> Vec<ChangeRecord> {
    points
        .windows(2)
        .filter_map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let change = pct_change(prev.close, cur.close);
            change.is_finite().then(|| ChangeRecord {
                date: cur.date,
                open: cur.open,
                close: cur.close,
                ticker: cur.ticker.clone(),
                pct_change: change,
            })
        })
        .collect()
}

/// Fetches each ticker and concatenates their change records
pub struct Assembler {
    provider: Arc<dyn PriceProvider>,
    timeout: Duration,
}

impl Assembler {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound every provider call by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch `tickers` one after another and combine their change records
    ///
    /// Tickers that yield nothing are recorded as [`TickerOutcome::Empty`];
    /// if that happens for every ticker the call fails with
    /// [`StockError::NoUsableData`]. Provider errors and calls that outlive
    /// the timeout abort the whole run.
    pub async fn assemble<S: AsRef<str>>(&self, tickers: &[S], period: &Period) -> Result<CombinedSeries> {
        let tickers = dedup_tickers(tickers);
        if tickers.is_empty() {
            return Err(StockError::InvalidInput(
                "at least one ticker is required".to_string(),
            ));
        }

        let mut series = CombinedSeries::default();

        for ticker in &tickers {
            let mut points = self.fetch(ticker, period).await?;
            points.sort_by_key(|p| p.date);
            // Tag with the requested symbol; providers may normalise case.
            for point in &mut points {
                point.ticker.clone_from(ticker);
            }

            let records = pct_changes(&points);
            if records.is_empty() {
                warn!(
                    ticker = %ticker,
                    provider = self.provider.name(),
                    fetched = points.len(),
                    "No usable rows for ticker; it will be left out of the chart"
                );
            } else {
                info!(ticker = %ticker, %period, rows = records.len(), "Fetched ticker history");
            }

            series.push_block(ticker.clone(), records);
        }

        if series.is_empty() {
            return Err(StockError::NoUsableData { tickers });
        }

        debug!(rows = series.len(), tickers = tickers.len(), "Assembled combined series");
        Ok(series)
    }

    async fn fetch(&self, ticker: &str, period: &Period) -> Result<Vec<PricePoint>> {
        tokio::time::timeout(self.timeout, self.provider.fetch_history(ticker, period))
            .await
            .map_err(|_| {
                warn!(ticker, timeout = ?self.timeout, provider = self.provider.name(), "Provider call timed out");
                StockError::Timeout {
                    symbol: ticker.to_string(),
                    timeout: self.timeout,
                }
            })?
    }
}

fn dedup_tickers<S: AsRef<str>>(tickers: &[S]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let ticker: &str = ticker.as_ref();
        if !unique.iter().any(|t| t == ticker) {
            unique.push(ticker.to_string());
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockPriceProvider;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn history(ticker: &str, closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(ticker, day(i as u32 + 1), close - 1.0, close))
            .collect()
    }

    fn provider_with(data: Vec<(&'static str, Vec<f64>)>) -> Arc<dyn PriceProvider> {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch_history().returning(move |symbol, _| {
            Ok(data
                .iter()
                .find(|(t, _)| *t == symbol)
                .map(|(t, closes)| history(t, closes))
                .unwrap_or_default())
        });
        Arc::new(mock)
    }

    #[test]
    fn test_pct_change_formula() {
        assert!((pct_change(100.0, 110.0) - 10.0).abs() < 1e-9);
        assert!((pct_change(110.0, 99.0) - -10.0).abs() < 1e-9);
        assert!((pct_change(3.0, 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_pct_changes_drops_first_interval() {
        for len in 0u32..6 {
            let closes: Vec<f64> = (0..len).map(|i| 50.0 + f64::from(i)).collect();
            let records = pct_changes(&history("AAA", &closes));
            assert_eq!(records.len(), len.saturating_sub(1) as usize);
        }
    }

    #[test]
    fn test_pct_changes_uses_consecutive_closes() {
        let points = history("AAA", &[100.0, 110.0, 99.0]);
        let records = pct_changes(&points);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, day(2));
        assert_eq!(records[0].close, 110.0);
        assert_eq!(records[0].open, 109.0);
        assert!((records[0].pct_change - 10.0).abs() < 1e-9);
        assert!((records[1].pct_change + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_pct_changes_skips_undefined_change() {
        let records = pct_changes(&history("AAA", &[0.0, 10.0, 12.0]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].close, 12.0);
    }

    #[tokio::test]
    async fn test_assemble_keeps_request_order_blocks() {
        let provider = provider_with(vec![
            ("BBB", vec![10.0, 11.0, 12.0]),
            ("AAA", vec![100.0, 90.0]),
        ]);
        let assembler = Assembler::new(provider);

        let series = assembler
            .assemble(&["BBB", "AAA"], &Period::default())
            .await
            .unwrap();

        let tickers: Vec<&str> = series.records().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BBB", "BBB", "AAA"]);
        assert_eq!(series.loaded_tickers().collect::<Vec<_>>(), vec!["BBB", "AAA"]);
    }

    #[tokio::test]
    async fn test_assemble_records_empty_ticker() {
        let provider = provider_with(vec![("AAA", vec![1.0, 2.0])]);
        let assembler = Assembler::new(provider);

        let series = assembler
            .assemble(&["AAA", "ZZZ"], &Period::default())
            .await
            .unwrap();

        assert_eq!(series.len(), 1);
        assert_eq!(
            series.outcomes(),
            &[
                TickerOutcome::Loaded {
                    ticker: "AAA".to_string(),
                    records: 1
                },
                TickerOutcome::Empty {
                    ticker: "ZZZ".to_string()
                },
            ]
        );
        assert_eq!(series.empty_tickers().collect::<Vec<_>>(), vec!["ZZZ"]);
    }

    #[tokio::test]
    async fn test_single_row_history_counts_as_empty() {
        let provider = provider_with(vec![("AAA", vec![5.0, 6.0]), ("ONE", vec![42.0])]);
        let assembler = Assembler::new(provider);

        let series = assembler
            .assemble(&["AAA", "ONE"], &Period::default())
            .await
            .unwrap();
        assert!(series.outcomes()[1].is_empty());
    }

    #[tokio::test]
    async fn test_assemble_all_empty_is_explicit_error() {
        let provider = provider_with(vec![]);
        let assembler = Assembler::new(provider);

        let err = assembler
            .assemble(&["AAA", "BBB"], &Period::default())
            .await
            .unwrap_err();

        match err {
            StockError::NoUsableData { tickers } => assert_eq!(tickers, vec!["AAA", "BBB"]),
            other => panic!("Expected NoUsableData, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_assemble_rejects_empty_request() {
        let assembler = Assembler::new(provider_with(vec![]));
        let empty: [&str; 0] = [];
        let result = assembler.assemble(&empty, &Period::default()).await;
        assert!(matches!(result, Err(StockError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_assemble_fetches_duplicates_once() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch_history()
            .times(1)
            .returning(|symbol, _| Ok(history(symbol, &[1.0, 2.0, 4.0])));
        let assembler = Assembler::new(Arc::new(mock));

        let series = assembler
            .assemble(&["AAA", "AAA"], &Period::default())
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.outcomes().len(), 1);
    }

    #[tokio::test]
    async fn test_assemble_passes_period_through() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch_history()
            .withf(|symbol, period| symbol == "AAA" && period.as_str() == "6mo")
            .times(1)
            .returning(|symbol, _| Ok(history(symbol, &[1.0, 2.0])));
        let assembler = Assembler::new(Arc::new(mock));

        assembler
            .assemble(&["AAA"], &Period::new("6mo"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_assemble_propagates_provider_error() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch_history().returning(|symbol, _| {
            Err(StockError::YahooFinanceError {
                symbol: symbol.to_string(),
                reason: "connection refused".to_string(),
            })
        });
        let assembler = Assembler::new(Arc::new(mock));

        let result = assembler.assemble(&["AAA"], &Period::default()).await;
        assert!(matches!(result, Err(StockError::YahooFinanceError { .. })));
    }

    #[tokio::test]
    async fn test_assemble_sorts_unordered_history() {
        let mut mock = MockPriceProvider::new();
        mock.expect_name().return_const("mock");
        mock.expect_fetch_history().returning(|symbol, _| {
            let mut points = history(symbol, &[100.0, 110.0, 99.0]);
            points.reverse();
            Ok(points)
        });
        let assembler = Assembler::new(Arc::new(mock));

        let series = assembler.assemble(&["AAA"], &Period::default()).await.unwrap();
        let changes: Vec<f64> = series.records().iter().map(|r| r.pct_change).collect();
        assert!((changes[0] - 10.0).abs() < 1e-9);
        assert!((changes[1] + 10.0).abs() < 1e-9);
    }

    /// Answers instantly except for `slow`, which takes `delay`
    struct SlowProvider {
        slow: &'static str,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl PriceProvider for SlowProvider {
        async fn fetch_history(&self, symbol: &str, _period: &Period) -> Result<Vec<PricePoint>> {
            if symbol == self.slow {
                tokio::time::sleep(self.delay).await;
            }
            Ok(history(symbol, &[10.0, 11.0]))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_assemble_times_out_slow_provider() {
        let provider = Arc::new(SlowProvider {
            slow: "SLOW",
            delay: Duration::from_secs(60),
        });
        let assembler = Assembler::new(provider).with_timeout(Duration::from_secs(5));

        let err = assembler
            .assemble(&["FAST", "SLOW"], &Period::default())
            .await
            .unwrap_err();

        match err {
            StockError::Timeout { symbol, timeout } => {
                assert_eq!(symbol, "SLOW");
                assert_eq!(timeout, Duration::from_secs(5));
            }
            other => panic!("Expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_assemble_waits_within_timeout() {
        let provider = Arc::new(SlowProvider {
            slow: "SLOW",
            delay: Duration::from_secs(2),
        });
        let assembler = Assembler::new(provider).with_timeout(Duration::from_secs(5));

        let series = assembler
            .assemble(&["SLOW"], &Period::default())
            .await
            .unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_assemble_blocking() {
        let assembler = Assembler::new(provider_with(vec![("AAA", vec![2.0, 3.0])]));
        let series = tokio_test::block_on(assembler.assemble(&["AAA"], &Period::default())).unwrap();
        assert_eq!(series.for_ticker("AAA").count(), 1);
    }
}
