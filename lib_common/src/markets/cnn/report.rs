//! Plain-text reports shared by the CLI and the MCP server.

use super::fearandgreed::{CompositeIndex, Indicator};
use super::sentiment::ComparisonPeriod;
use crate::utils::misc::utils::title_case;

/// Column where the `[Updated ...]` tag of an indicator line starts.
pub const REPORT_COLUMN: usize = 80;

/// Current score and rating followed by the four reference scores.
pub fn index_summary(index: &CompositeIndex) -> String {
    let mut summary = format!(
        "Fear & Greed Now: {:.1} ({})",
        index.score,
        title_case(&index.rating)
    );
    for period in ComparisonPeriod::ALL {
        summary.push_str(&format!("\n   {}: {:.1}", period.label(), index.previous(period)));
    }
    summary
}

/// `Name: Rating (S.S)` padded to [`REPORT_COLUMN`], then the update time in UTC.
pub fn indicator_report(indicator: &Indicator) -> String {
    let updated = indicator
        .timestamp
        .map(|ts| ts.format("%b %d at %I:%M%p").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let head = format!(
        "{}: {} ({:.1})",
        indicator.name,
        title_case(&indicator.rating),
        indicator.score
    );
    let pad = REPORT_COLUMN.saturating_sub(head.chars().count());
    format!("{}{}[Updated {}]", head, " ".repeat(pad), updated)
}

/// One [`indicator_report`] line per indicator, canonical order.
pub fn indicators_report(index: &CompositeIndex) -> String {
    index
        .indicators
        .iter()
        .map(indicator_report)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary and indicator lines separated by a blank line.
pub fn complete_report(index: &CompositeIndex) -> String {
    format!("{}\n\n{}", index_summary(index), indicators_report(index))
}
