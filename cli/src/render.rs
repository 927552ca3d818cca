//! # Terminal Rendering
//!
//! Pure functions turning a [`CompositeIndex`] into colored terminal text.
//! Nothing here performs I/O, so every view can be checked with colors
//! switched off.

use chrono::{DateTime, Local, TimeZone};
use colored::{Color, ColoredString, Colorize};
use lib_common::markets::cnn::{CompositeIndex, Indicator, SeverityBand, TradingSignal, DISCLAIMER};
use lib_common::utils::misc::utils::title_case;
use std::fmt::Write;

/// Number of cells in the gauge bar.
pub const GAUGE_WIDTH: usize = 56;

const GAUGE_LEFT: &str = "FEAR 0 ";
const GAUGE_RIGHT: &str = " 100 GREED";
const NAME_COLUMN: usize = 28;
const RULE_WIDTH: usize = 66;
const ORANGE: Color = Color::TrueColor { r: 255, g: 135, b: 0 };

/// Terminal color of a severity band.
pub fn band_color(band: SeverityBand) -> Color {
    match band {
        SeverityBand::ExtremeFear => Color::Red,
        SeverityBand::Fear => ORANGE,
        SeverityBand::Neutral => Color::Yellow,
        SeverityBand::Greed => Color::Green,
        SeverityBand::ExtremeGreed => Color::BrightGreen,
    }
}

fn paint(text: &str, score: f64) -> ColoredString {
    text.color(band_color(SeverityBand::from_score(score)))
}

fn emoji(score: f64) -> &'static str {
    SeverityBand::from_score(score).emoji()
}

fn signal_style(signal: TradingSignal) -> (&'static str, Color) {
    match signal {
        TradingSignal::StrongBuy => ("🚀", Color::Green),
        TradingSignal::Buy => ("📈", Color::Green),
        TradingSignal::Hold => ("⏸️", Color::Yellow),
        TradingSignal::Sell => ("📉", ORANGE),
        TradingSignal::StrongSell => ("🛑", Color::Red),
    }
}

fn heading(title: &str) -> String {
    format!("{}\n{}", title.cyan().bold(), "═".repeat(RULE_WIDTH).dimmed())
}

/// Two-line gauge: a pointer line with the rounded score above a
/// `FEAR 0 ███░░░ 100 GREED` bar. Scores outside 0..=100 are pinned to the ends.
pub fn gauge(score: f64) -> String {
    let clamped = score.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * GAUGE_WIDTH as f64) as usize;
    let empty = GAUGE_WIDTH - filled;

    let pointer = format!(
        "{}{}",
        " ".repeat(GAUGE_LEFT.len() + filled),
        paint(&format!("▼ {:.0}", score), score).bold()
    );
    let bar = format!(
        "{}{}{}{}",
        GAUGE_LEFT.red(),
        paint(&"█".repeat(filled), score),
        "░".repeat(empty).dimmed(),
        GAUGE_RIGHT.green()
    );
    format!("{}\n{}", pointer, bar)
}

/// `emoji score - RATING` in the band color.
pub fn score_line(index: &CompositeIndex) -> String {
    format!(
        "{} {} - {}",
        emoji(index.score),
        paint(&format!("{:.1}", index.score), index.score),
        paint(&index.rating.to_uppercase(), index.score)
    )
}

fn headline(index: &CompositeIndex) -> String {
    format!(
        "  {}  {} {}",
        paint(&format!("{:.1}", index.score), index.score).bold(),
        paint(&index.rating.to_uppercase(), index.score).bold(),
        emoji(index.score)
    )
}

/// Period, score and signed change for the four reference points. Gains
/// are green, losses red.
pub fn comparison_table(index: &CompositeIndex) -> String {
    let mut out = format!("{:<16} {:>7} {:>8}\n", "Period".bold(), "Score".bold(), "Change".bold());
    for delta in index.comparisons() {
        let change = format!("{:>8}", delta.signed());
        let change = if delta.change >= 0.0 { change.green() } else { change.red() };
        let _ = writeln!(out, "{:<16} {:>7.1} {}", delta.period.label(), delta.previous, change);
    }
    out
}

/// One row per sub-indicator in canonical order.
pub fn indicator_table(index: &CompositeIndex) -> String {
    let mut out = format!("{}\n", "Individual Indicators".bold());
    let _ = writeln!(out, "{:<NAME_COLUMN$} {:>6}  {:<14}", "Indicator", "Score", "Rating");
    for indicator in index.indicators.iter() {
        let _ = writeln!(
            out,
            "{:<NAME_COLUMN$} {}  {} {}",
            indicator.name,
            paint(&format!("{:>6.1}", indicator.score), indicator.score),
            paint(&format!("{:<14}", title_case(&indicator.rating)), indicator.score),
            emoji(indicator.score)
        );
    }
    out
}

/// Full dashboard: gauge, headline, comparisons and the indicator table.
pub fn dashboard<Tz: TimeZone>(index: &CompositeIndex, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}\n\n{}\n\n{}\n{}\n\n{}\n{}\n{}",
        heading("CNN FEAR & GREED INDEX"),
        gauge(index.score),
        headline(index),
        format!("Updated: {}", now.format("%Y-%m-%d %H:%M")).dimmed(),
        comparison_table(index),
        indicator_table(index),
        DISCLAIMER.dimmed()
    )
}

/// Signal label, recommendation and the score it was derived from.
pub fn signal_panel(index: &CompositeIndex) -> String {
    let signal = index.signal();
    let (icon, color) = signal_style(signal);
    format!(
        "{}\n\n{} {}\n\n{}\n\nScore: {:.1} ({})\n\n{}",
        heading("TRADING SIGNAL"),
        icon,
        signal.label().color(color).bold(),
        signal.recommendation().dimmed(),
        index.score,
        index.rating,
        DISCLAIMER.dimmed()
    )
}

fn indicator_panel(indicator: &Indicator) -> String {
    let updated = indicator
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "N/A".to_string());
    format!(
        "{}\n{}\n\n{}\n\nScore: {}  Rating: {} {}\n{}",
        indicator.name.bold(),
        "─".repeat(RULE_WIDTH).dimmed(),
        gauge(indicator.score),
        paint(&format!("{:.1}", indicator.score), indicator.score),
        paint(&title_case(&indicator.rating), indicator.score),
        emoji(indicator.score),
        format!("Updated: {} UTC", updated).dimmed()
    )
}

/// One gauge panel per sub-indicator.
pub fn indicator_panels(index: &CompositeIndex) -> String {
    index
        .indicators
        .iter()
        .map(indicator_panel)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The last `limit` daily points, newest first.
pub fn history_table(index: &CompositeIndex, limit: usize) -> String {
    let mut out = format!("{}\n", format!("Historical Data (Last {} Days)", limit).bold());
    let _ = writeln!(out, "{:<12} {:>6}  {:<14}", "Date", "Score", "Rating");
    for point in index.recent_history(limit).iter().rev() {
        let _ = writeln!(
            out,
            "{:<12} {}  {} {}",
            point.timestamp.format("%Y-%m-%d").to_string().dimmed(),
            paint(&format!("{:>6.1}", point.score), point.score),
            paint(&format!("{:<14}", title_case(&point.rating)), point.score),
            emoji(point.score)
        );
    }
    out
}

/// Pretty JSON of the series-free summary.
pub fn json_summary(index: &CompositeIndex) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&index.summary())
}

/// One frame of watch mode: gauge, headline and a compact indicator list.
pub fn watch_frame(index: &CompositeIndex, interval_secs: u64, now: &DateTime<Local>) -> String {
    let mut out = format!(
        "{}\n\n{}\n\n{}\n{}\n\n",
        heading("CNN FEAR & GREED INDEX"),
        gauge(index.score),
        headline(index),
        format!("Refreshing every {}s | {}", interval_secs, now.format("%H:%M:%S")).dimmed()
    );
    for indicator in index.indicators.iter() {
        let _ = writeln!(
            out,
            "  {} {} {}",
            emoji(indicator.score),
            paint(&format!("{:5.1}", indicator.score), indicator.score),
            indicator.name
        );
    }
    let _ = write!(out, "\n{}", "Press Ctrl+C to exit".dimmed());
    out
}
