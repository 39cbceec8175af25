//! Comparison engine
//!
//! Turns raw provider history into change records and per-ticker summaries.

pub mod assembler;
pub mod summary;

pub use assembler::{Assembler, ChangeRecord, CombinedSeries, TickerOutcome, pct_change, pct_changes};
pub use summary::{TickerSummary, summarize};
