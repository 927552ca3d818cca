//! # Sentiment Metrics
//!
//! Pure functions over a built [`CompositeIndex`]: the trading signal, the
//! presentation severity band, period deltas and fuzzy indicator lookup.
//!
//! The trading signal (20/40/60/80) and the severity band (25/45/55/75) use
//! different boundaries and are kept as separate types. A score of 72.3 is a
//! `Sell` signal but only a `Greed` band.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use super::fearandgreed::{CompositeIndex, DataPoint, Indicator, IndicatorKind, Indicators};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Five-step trading recommendation derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradingSignal {
    /// score < 20
    StrongBuy,
    /// 20 <= score < 40
    Buy,
    /// 40 <= score < 60
    Hold,
    /// 60 <= score < 80
    Sell,
    /// score >= 80
    StrongSell,
}

impl TradingSignal {
    /// Classifies `score`. Each lower boundary belongs to the higher band.
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            TradingSignal::StrongBuy
        } else if score < 40.0 {
            TradingSignal::Buy
        } else if score < 60.0 {
            TradingSignal::Hold
        } else if score < 80.0 {
            TradingSignal::Sell
        } else {
            TradingSignal::StrongSell
        }
    }

    /// Machine code, e.g. `STRONG_BUY`.
    pub fn code(self) -> &'static str {
        match self {
            TradingSignal::StrongBuy => "STRONG_BUY",
            TradingSignal::Buy => "BUY",
            TradingSignal::Hold => "HOLD",
            TradingSignal::Sell => "SELL",
            TradingSignal::StrongSell => "STRONG_SELL",
        }
    }

    /// Display label, e.g. `STRONG BUY`.
    pub fn label(self) -> &'static str {
        match self {
            TradingSignal::StrongBuy => "STRONG BUY",
            TradingSignal::Buy => "BUY",
            TradingSignal::Hold => "HOLD",
            TradingSignal::Sell => "SELL",
            TradingSignal::StrongSell => "STRONG SELL",
        }
    }

    /// One-line recommendation.
    pub fn recommendation(self) -> &'static str {
        match self {
            TradingSignal::StrongBuy => "Extreme fear - potential buying opportunity",
            TradingSignal::Buy => "Fear in market - consider accumulating",
            TradingSignal::Hold => "Neutral sentiment - maintain positions",
            TradingSignal::Sell => "Greed in market - consider taking profits",
            TradingSignal::StrongSell => "Extreme greed - potential market top",
        }
    }

    /// Longer explanation for assistant-facing output.
    pub fn analysis(self) -> &'static str {
        match self {
            TradingSignal::StrongBuy => "Extreme fear in the market. Historically, this represents a potential buying opportunity as markets tend to be oversold.",
            TradingSignal::Buy => "Fear in the market. Consider accumulating positions as sentiment is pessimistic.",
            TradingSignal::Hold => "Neutral sentiment. Market is balanced - maintain current positions.",
            TradingSignal::Sell => "Greed in the market. Consider taking profits as sentiment is optimistic.",
            TradingSignal::StrongSell => "Extreme greed in the market. Historically, this represents a potential market top. Exercise caution.",
        }
    }
}

/// Appended to every piece of advice-like text.
pub const DISCLAIMER: &str = "Disclaimer: This is not financial advice. The Fear & Greed Index is one of many indicators and should not be used as the sole basis for investment decisions.";

/// Five-step presentation band used for colors and emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    /// score < 25
    ExtremeFear,
    /// 25 <= score < 45
    Fear,
    /// 45 <= score < 55
    Neutral,
    /// 55 <= score < 75
    Greed,
    /// score >= 75
    ExtremeGreed,
}

impl SeverityBand {
    /// Every band from lowest to highest.
    pub const ALL: [SeverityBand; 5] = [
        SeverityBand::ExtremeFear,
        SeverityBand::Fear,
        SeverityBand::Neutral,
        SeverityBand::Greed,
        SeverityBand::ExtremeGreed,
    ];

    /// Classifies `score`.
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            SeverityBand::ExtremeFear
        } else if score < 45.0 {
            SeverityBand::Fear
        } else if score < 55.0 {
            SeverityBand::Neutral
        } else if score < 75.0 {
            SeverityBand::Greed
        } else {
            SeverityBand::ExtremeGreed
        }
    }

    /// Lower-case label matching the upstream rating vocabulary.
    pub fn label(self) -> &'static str {
        match self {
            SeverityBand::ExtremeFear => "extreme fear",
            SeverityBand::Fear => "fear",
            SeverityBand::Neutral => "neutral",
            SeverityBand::Greed => "greed",
            SeverityBand::ExtremeGreed => "extreme greed",
        }
    }

    /// Emoji shown next to a score.
    pub fn emoji(self) -> &'static str {
        match self {
            SeverityBand::ExtremeFear => "🔴",
            SeverityBand::Fear => "🟠",
            SeverityBand::Neutral => "🟡",
            SeverityBand::Greed => "🟢",
            SeverityBand::ExtremeGreed => "💚",
        }
    }

    /// Inclusive lower and exclusive upper bound of the band on the 0..=100 scale.
    pub fn range(self) -> (f64, f64) {
        match self {
            SeverityBand::ExtremeFear => (0.0, 25.0),
            SeverityBand::Fear => (25.0, 45.0),
            SeverityBand::Neutral => (45.0, 55.0),
            SeverityBand::Greed => (55.0, 75.0),
            SeverityBand::ExtremeGreed => (75.0, 100.0),
        }
    }
}

/// A historical reference point the composite publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPeriod {
    /// `previous_close`
    PreviousClose,
    /// `previous_1_week`
    OneWeek,
    /// `previous_1_month`
    OneMonth,
    /// `previous_1_year`
    OneYear,
}

impl ComparisonPeriod {
    /// All periods, nearest first.
    pub const ALL: [ComparisonPeriod; 4] = [
        ComparisonPeriod::PreviousClose,
        ComparisonPeriod::OneWeek,
        ComparisonPeriod::OneMonth,
        ComparisonPeriod::OneYear,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            ComparisonPeriod::PreviousClose => "Previous Close",
            ComparisonPeriod::OneWeek => "1 Week Ago",
            ComparisonPeriod::OneMonth => "1 Month Ago",
            ComparisonPeriod::OneYear => "1 Year Ago",
        }
    }
}

/// The current score against one reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodDelta {
    /// Which reference point.
    pub period: ComparisonPeriod,
    /// Score at that point.
    pub previous: f64,
    /// `current - previous`.
    pub change: f64,
}

impl PeriodDelta {
    /// Change with an explicit sign and one decimal, e.g. `+2.3`, `-0.4`.
    pub fn signed(&self) -> String {
        format!("{:+.1}", self.change)
    }
}

impl CompositeIndex {
    /// Published score for `period`.
    pub fn previous(&self, period: ComparisonPeriod) -> f64 {
        match period {
            ComparisonPeriod::PreviousClose => self.previous_close,
            ComparisonPeriod::OneWeek => self.previous_1_week,
            ComparisonPeriod::OneMonth => self.previous_1_month,
            ComparisonPeriod::OneYear => self.previous_1_year,
        }
    }

    /// `score - previous(period)`.
    pub fn delta(&self, period: ComparisonPeriod) -> f64 {
        self.score - self.previous(period)
    }

    /// Deltas for every period, nearest first.
    pub fn comparisons(&self) -> [PeriodDelta; 4] {
        ComparisonPeriod::ALL.map(|period| PeriodDelta {
            period,
            previous: self.previous(period),
            change: self.delta(period),
        })
    }

    /// Trading signal for the composite score.
    pub fn signal(&self) -> TradingSignal {
        TradingSignal::from_score(self.score)
    }

    /// Severity band for the composite score.
    pub fn band(&self) -> SeverityBand {
        SeverityBand::from_score(self.score)
    }

    /// The last `limit` points of the series, still oldest first.
    pub fn recent_history(&self, limit: usize) -> &[DataPoint] {
        let start = self.historical.len().saturating_sub(limit);
        &self.historical[start..]
    }

    /// Series-free view for JSON consumers.
    pub fn summary(&self) -> CompositeSummary {
        CompositeSummary {
            score: self.score,
            rating: self.rating.clone(),
            timestamp: self.timestamp,
            previous_close: self.previous_close,
            previous_1_week: self.previous_1_week,
            previous_1_month: self.previous_1_month,
            previous_1_year: self.previous_1_year,
            indicators: self.indicators.iter().map(IndicatorSummary::from).collect(),
        }
    }
}

impl Indicators {
    /// Fuzzy lookup by name.
    ///
    /// The query is lowercased and `_`/`-` become spaces; the first indicator
    /// in canonical order whose lowercased name contains the result wins.
    pub fn find(&self, query: &str) -> Option<&Indicator> {
        let needle = query.to_lowercase().replace(['_', '-'], " ");
        self.iter()
            .find(|indicator| indicator.name.to_lowercase().contains(&needle))
    }

    /// Kind of the first indicator matching `query`, see [`Indicators::find`].
    pub fn find_kind(&self, query: &str) -> Option<IndicatorKind> {
        self.find(query).map(|indicator| indicator.kind)
    }
}

/// Indicator fields without the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSummary {
    /// Canonical name.
    pub name: &'static str,
    /// Current score.
    pub score: f64,
    /// Upstream label.
    pub rating: String,
    /// Last update.
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<&Indicator> for IndicatorSummary {
    fn from(indicator: &Indicator) -> Self {
        Self {
            name: indicator.name,
            score: indicator.score,
            rating: indicator.rating.clone(),
            timestamp: indicator.timestamp,
        }
    }
}

/// Composite fields plus per-indicator summaries, without any series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeSummary {
    /// Current score.
    pub score: f64,
    /// Upstream label.
    pub rating: String,
    /// Snapshot time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Score at the previous close.
    pub previous_close: f64,
    /// Score one week ago.
    pub previous_1_week: f64,
    /// Score one month ago.
    pub previous_1_month: f64,
    /// Score one year ago.
    pub previous_1_year: f64,
    /// All seven indicators in canonical order.
    pub indicators: Vec<IndicatorSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::cnn::fearandgreed::build_composite_index;
    use serde_json::json;

    fn index_with(score: f64) -> CompositeIndex {
        build_composite_index(&json!({
            "fear_and_greed": {
                "score": score,
                "rating": "greed",
                "previous_close": 70.0,
                "previous_1_week": 75.5,
                "previous_1_month": 50.0,
                "previous_1_year": 72.3
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_signal_boundaries() {
        let cases = [
            (0.0, TradingSignal::StrongBuy),
            (19.9, TradingSignal::StrongBuy),
            (20.0, TradingSignal::Buy),
            (39.9, TradingSignal::Buy),
            (40.0, TradingSignal::Hold),
            (59.9, TradingSignal::Hold),
            (60.0, TradingSignal::Sell),
            (79.9, TradingSignal::Sell),
            (80.0, TradingSignal::StrongSell),
            (100.0, TradingSignal::StrongSell),
        ];
        for (score, expected) in cases {
            assert_eq!(TradingSignal::from_score(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (24.9, SeverityBand::ExtremeFear),
            (25.0, SeverityBand::Fear),
            (44.9, SeverityBand::Fear),
            (45.0, SeverityBand::Neutral),
            (55.0, SeverityBand::Greed),
            (74.9, SeverityBand::Greed),
            (75.0, SeverityBand::ExtremeGreed),
        ];
        for (score, expected) in cases {
            assert_eq!(SeverityBand::from_score(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_scales_are_monotonic_over_range() {
        let mut last_signal = TradingSignal::from_score(0.0) as u8;
        let mut last_band = SeverityBand::from_score(0.0) as u8;
        for tenth in 0..=1000 {
            let score = tenth as f64 / 10.0;
            let signal = TradingSignal::from_score(score) as u8;
            let band = SeverityBand::from_score(score) as u8;
            assert!(signal >= last_signal && band >= last_band);
            last_signal = signal;
            last_band = band;
        }
    }

    #[test]
    fn test_greed_score_gets_independent_signal_and_band() {
        let index = index_with(72.3);
        assert_eq!(index.band(), SeverityBand::Greed);
        assert_eq!(index.band().label(), "greed");
        assert_eq!(index.signal(), TradingSignal::Sell);
        assert_eq!(index.signal().code(), "SELL");
        assert_eq!(index.signal().recommendation(), "Greed in market - consider taking profits");
    }

    #[test]
    fn test_period_deltas() {
        let index = index_with(72.3);
        let deltas = index.comparisons();
        assert_eq!(deltas[0].period, ComparisonPeriod::PreviousClose);
        assert_eq!(deltas[0].signed(), "+2.3");
        assert_eq!(deltas[1].signed(), "-3.2");
        assert_eq!(deltas[2].signed(), "+22.3");
        assert_eq!(deltas[3].signed(), "+0.0");
        assert_eq!(index.previous(ComparisonPeriod::OneWeek), 75.5);
        assert!((index.delta(ComparisonPeriod::OneMonth) - 22.3).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_lookup() {
        let index = index_with(50.0);
        let found = index.indicators.find("vix").unwrap();
        assert_eq!(found.name, "Market Volatility (VIX)");
        assert_eq!(index.indicators.find_kind("junk_bond"), Some(IndicatorKind::JunkBondDemand));
        assert_eq!(index.indicators.find_kind("SAFE-HAVEN"), Some(IndicatorKind::SafeHavenDemand));
        assert_eq!(index.indicators.find_kind("stock price"), Some(IndicatorKind::StockPriceStrength));
        assert!(index.indicators.find("nonexistent_xyz").is_none());
    }

    #[test]
    fn test_recent_history_limits() {
        let index = build_composite_index(&json!({
            "fear_and_greed_historical": {"data": [
                {"x": 1000.0, "y": 1.0}, {"x": 2000.0, "y": 2.0}, {"x": 3000.0, "y": 3.0}
            ]}
        }))
        .unwrap();
        let scores = |points: &[DataPoint]| points.iter().map(|p| p.score).collect::<Vec<_>>();
        assert_eq!(scores(index.recent_history(2)), vec![2.0, 3.0]);
        assert_eq!(scores(index.recent_history(10)), vec![1.0, 2.0, 3.0]);
        assert!(index.recent_history(0).is_empty());
    }

    #[test]
    fn test_summary_has_no_series() {
        let summary = index_with(72.3).summary();
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["score"], 72.3);
        assert_eq!(value["indicators"].as_array().unwrap().len(), 7);
        assert!(value.get("historical").is_none());
        assert!(value["indicators"][0].get("historical").is_none());
    }
}
