//! Overall change per ticker

use crate::engine::assembler::{CombinedSeries, pct_change};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First-to-last movement of one ticker over the charted window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub ticker: String,
    pub start_price: f64,
    pub end_price: f64,
    pub overall_pct_change: f64,
}

impl TickerSummary {
    pub fn new(ticker: impl Into<String>, start_price: f64, end_price: f64) -> Self {
        Self {
            ticker: ticker.into(),
            start_price,
            end_price,
            overall_pct_change: pct_change(start_price, end_price),
        }
    }
}

/// Summarise every ticker present in `series`
///
/// Start and end prices are the closes of the first and last change record
/// of each ticker. The very first fetched interval never became a change
/// record, so it does not count as the start price. Results are ordered by
/// ticker symbol.
pub fn summarize(series: &CombinedSeries) -> Vec<TickerSummary> {
    let mut bounds: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for record in series.records() {
        bounds
            .entry(record.ticker.as_str())
            .and_modify(|(_, last)| *last = record.close)
            .or_insert((record.close, record.close));
    }

    bounds
        .into_iter()
        .map(|(ticker, (start, end))| TickerSummary::new(ticker, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assembler::ChangeRecord;
    use chrono::NaiveDate;

    fn block(ticker: &str, closes: &[f64]) -> (String, Vec<ChangeRecord>) {
        let records = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| ChangeRecord {
                date: NaiveDate::from_ymd_opt(2024, 1, i as u32 + 2).unwrap(),
                open: close,
                close,
                ticker: ticker.to_string(),
                pct_change: 0.0,
            })
            .collect();
        (ticker.to_string(), records)
    }

    #[test]
    fn test_summary_uses_surviving_closes() {
        let series = CombinedSeries::from_blocks(vec![block("AAA", &[110.0, 99.0])]);
        let summaries = summarize(&series);

        assert_eq!(summaries.len(), 1);
        let summary = &summaries[0];
        assert_eq!(summary.ticker, "AAA");
        assert_eq!(summary.start_price, 110.0);
        assert_eq!(summary.end_price, 99.0);
        assert!((summary.overall_pct_change + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_is_independent_of_other_tickers() {
        let alone = summarize(&CombinedSeries::from_blocks(vec![block("BBB", &[10.0, 12.0, 15.0])]));
        let mixed = summarize(&CombinedSeries::from_blocks(vec![
            block("CCC", &[1.0, 2.0]),
            block("BBB", &[10.0, 12.0, 15.0]),
            block("AAA", &[7.0]),
        ]));

        let bbb = mixed.iter().find(|s| s.ticker == "BBB").unwrap();
        assert_eq!(bbb, &alone[0]);
        assert!((bbb.overall_pct_change - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_ordered_by_ticker() {
        let series = CombinedSeries::from_blocks(vec![
            block("MSFT", &[1.0, 2.0]),
            block("AAPL", &[1.0, 2.0]),
            block("NVDA", &[1.0, 2.0]),
        ]);
        let order: Vec<String> = summarize(&series).into_iter().map(|s| s.ticker).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[test]
    fn test_single_record_has_zero_change() {
        let summaries = summarize(&CombinedSeries::from_blocks(vec![block("ONE", &[42.0])]));
        assert_eq!(summaries[0].start_price, summaries[0].end_price);
        assert!(summaries[0].overall_pct_change.abs() < 1e-12);
    }

    #[test]
    fn test_empty_blocks_are_skipped() {
        let series = CombinedSeries::from_blocks(vec![block("AAA", &[1.0, 3.0]), block("ZZZ", &[])]);
        let summaries = summarize(&series);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].ticker, "AAA");
    }
}
