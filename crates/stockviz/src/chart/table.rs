//! Terminal summary table

use crate::engine::TickerSummary;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

/// Render overall change per ticker as a text table
pub fn summary_table(summaries: &[TickerSummary]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ticker", "Start", "End", "Overall %"]);

    for summary in summaries {
        table.add_row(vec![
            Cell::new(&summary.ticker),
            number_cell(format!("{:.2}", summary.start_price)),
            number_cell(format!("{:.2}", summary.end_price)),
            number_cell(format!("{:+.2}%", summary.overall_pct_change)),
        ]);
    }

    table.to_string()
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}
