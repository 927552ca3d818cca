//! # CNN Fear & Greed Index Data Model and Client
//!
//! Turns CNN's graph document into a [`CompositeIndex`]. The upstream schema is
//! undocumented and drops fields without notice, so decoding walks the
//! `serde_json::Value` by hand and substitutes a default for anything missing
//! or mistyped: `0.0` for numbers, `"N/A"` for labels, `None` for the
//! composite timestamp, the epoch for series timestamps. Only a document that
//! is not a JSON object is rejected.
//!
//! The seven sub-indicators live in a fixed-size [`Indicators`] array indexed
//! by [`IndicatorKind`], so a snapshot always carries all of them in the same
//! order no matter what the upstream key order was.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::core::error::FgiError;
use crate::loggers::loggerlocal::LoggerLocal;
use crate::markets::cnn::apicallcnn::ApiCallCnn;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::ops::Index;
use std::sync::Arc;

/// Placeholder for labels the upstream document does not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// The seven sub-measures of the index, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IndicatorKind {
    /// Spread between junk and investment grade bond yields.
    #[serde(rename = "junk_bond_demand")]
    JunkBondDemand,
    /// VIX against its 50-day average.
    #[serde(rename = "market_volatility_vix")]
    MarketVolatility,
    /// Put/call volume ratio.
    #[serde(rename = "put_call_options")]
    PutCallOptions,
    /// S&P 500 against its 125-day average.
    #[serde(rename = "market_momentum_sp500")]
    MarketMomentum,
    /// NYSE 52-week highs against lows.
    #[serde(rename = "stock_price_strength")]
    StockPriceStrength,
    /// McClellan volume summation.
    #[serde(rename = "stock_price_breadth")]
    StockPriceBreadth,
    /// Stock against bond returns.
    #[serde(rename = "safe_haven_demand")]
    SafeHavenDemand,
}

impl IndicatorKind {
    /// Every kind in canonical order.
    pub const ALL: [IndicatorKind; 7] = [
        IndicatorKind::JunkBondDemand,
        IndicatorKind::MarketVolatility,
        IndicatorKind::PutCallOptions,
        IndicatorKind::MarketMomentum,
        IndicatorKind::StockPriceStrength,
        IndicatorKind::StockPriceBreadth,
        IndicatorKind::SafeHavenDemand,
    ];

    /// Key of this indicator's block in the upstream document.
    pub fn api_key(self) -> &'static str {
        match self {
            IndicatorKind::JunkBondDemand => "junk_bond_demand",
            IndicatorKind::MarketVolatility => "market_volatility_vix",
            IndicatorKind::PutCallOptions => "put_call_options",
            IndicatorKind::MarketMomentum => "market_momentum_sp500",
            IndicatorKind::StockPriceStrength => "stock_price_strength",
            IndicatorKind::StockPriceBreadth => "stock_price_breadth",
            IndicatorKind::SafeHavenDemand => "safe_haven_demand",
        }
    }

    /// Human readable name.
    pub fn canonical_name(self) -> &'static str {
        match self {
            IndicatorKind::JunkBondDemand => "Junk Bond Demand",
            IndicatorKind::MarketVolatility => "Market Volatility (VIX)",
            IndicatorKind::PutCallOptions => "Put and Call Options",
            IndicatorKind::MarketMomentum => "Market Momentum (S&P 500)",
            IndicatorKind::StockPriceStrength => "Stock Price Strength",
            IndicatorKind::StockPriceBreadth => "Stock Price Breadth",
            IndicatorKind::SafeHavenDemand => "Safe Haven Demand",
        }
    }

    /// Position in [`IndicatorKind::ALL`].
    pub fn position(self) -> usize {
        self as usize
    }
}

/// # Data Point
///
/// One entry of a historical series. Upstream calls the fields `x` (epoch
/// milliseconds), `y` (score) and `rating`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    /// When the value was observed.
    pub timestamp: DateTime<Utc>,
    /// Score at that time.
    pub score: f64,
    /// Upstream label at that time.
    pub rating: String,
}

impl Default for DataPoint {
    fn default() -> Self {
        Self {
            timestamp: DateTime::<Utc>::default(),
            score: 0.0,
            rating: NOT_AVAILABLE.to_string(),
        }
    }
}

/// One named sub-component of sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    /// Which of the seven measures this is.
    pub kind: IndicatorKind,
    /// Canonical name, see [`IndicatorKind::canonical_name`].
    pub name: &'static str,
    /// Current score.
    pub score: f64,
    /// Current upstream label.
    pub rating: String,
    /// Last update, absent when upstream omits it.
    pub timestamp: Option<DateTime<Utc>>,
    /// Series, oldest first. Empty when upstream has none.
    pub historical: Vec<DataPoint>,
}

impl Indicator {
    /// A zeroed indicator used when its upstream block is missing.
    pub fn placeholder(kind: IndicatorKind) -> Self {
        Self {
            kind,
            name: kind.canonical_name(),
            score: 0.0,
            rating: NOT_AVAILABLE.to_string(),
            timestamp: None,
            historical: Vec::new(),
        }
    }
}

/// # Indicators
///
/// Exactly seven indicators in canonical order. Index with an
/// [`IndicatorKind`] or iterate in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Indicators([Indicator; 7]);

impl Indicators {
    /// Wraps seven indicators, placing each one at its kind's position.
    pub fn from_fn(mut build: impl FnMut(IndicatorKind) -> Indicator) -> Self {
        Indicators(IndicatorKind::ALL.map(|kind| {
            let mut indicator = build(kind);
            indicator.kind = kind;
            indicator.name = kind.canonical_name();
            indicator
        }))
    }

    /// The indicator for `kind`.
    pub fn get(&self, kind: IndicatorKind) -> &Indicator {
        &self.0[kind.position()]
    }

    /// All indicators in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, Indicator> {
        self.0.iter()
    }

    /// All indicators as a slice.
    pub fn as_slice(&self) -> &[Indicator] {
        &self.0
    }

    /// Always 7.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Index<IndicatorKind> for Indicators {
    type Output = Indicator;

    fn index(&self, kind: IndicatorKind) -> &Indicator {
        self.get(kind)
    }
}

impl<'a> IntoIterator for &'a Indicators {
    type Item = &'a Indicator;
    type IntoIter = std::slice::Iter<'a, Indicator>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// # Composite Index
///
/// The overall sentiment snapshot built from one upstream document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeIndex {
    /// Current score, 0 to 100.
    pub score: f64,
    /// Upstream label, not recomputed locally.
    pub rating: String,
    /// Score at the previous close.
    pub previous_close: f64,
    /// Score one week ago.
    pub previous_1_week: f64,
    /// Score one month ago.
    pub previous_1_month: f64,
    /// Score one year ago.
    pub previous_1_year: f64,
    /// When upstream computed the snapshot.
    pub timestamp: Option<DateTime<Utc>>,
    /// Roughly one year of daily points, oldest first.
    pub historical: Vec<DataPoint>,
    /// The seven sub-indicators.
    pub indicators: Indicators,
}

fn number(obj: Option<&Map<String, Value>>, key: &str) -> f64 {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn label(obj: Option<&Map<String, Value>>, key: &str) -> String {
    obj.and_then(|o| o.get(key))
        .and_then(Value::as_str)
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn millis_to_utc(value: &Value) -> Option<DateTime<Utc>> {
    let ms = value.as_f64()?;
    if !ms.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(ms as i64).single()
}

/// Parses the composite timestamp, e.g. `2024-01-05T21:00:00+00:00`.
///
/// `+00:00` is rewritten to `+0000` first. RFC 3339 and an offset-less
/// datetime (read as UTC) are accepted too. A number is read as epoch ms.
pub fn parse_composite_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    if value.is_number() {
        return millis_to_utc(value);
    }
    let text = value.as_str()?.trim();
    let normalized = text.replace("+00:00", "+0000");
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn data_point(value: &Value) -> DataPoint {
    let obj = value.as_object();
    DataPoint {
        timestamp: obj
            .and_then(|o| o.get("x"))
            .and_then(millis_to_utc)
            .unwrap_or_default(),
        score: number(obj, "y"),
        rating: label(obj, "rating"),
    }
}

fn series(section: Option<&Map<String, Value>>) -> Vec<DataPoint> {
    section
        .and_then(|s| s.get("data"))
        .and_then(Value::as_array)
        .map(|points| points.iter().map(data_point).collect())
        .unwrap_or_default()
}

fn build_indicator(doc: &Map<String, Value>, kind: IndicatorKind) -> Indicator {
    let section = doc.get(kind.api_key()).and_then(Value::as_object);
    Indicator {
        kind,
        name: kind.canonical_name(),
        score: number(section, "score"),
        rating: label(section, "rating"),
        timestamp: section
            .and_then(|s| s.get("timestamp"))
            .and_then(millis_to_utc),
        historical: series(section),
    }
}

/// # Build Composite Index
///
/// Pure conversion from the raw upstream document to a snapshot.
///
/// # Errors
/// [`FgiError::Schema`] when `raw` is not a JSON object. Nothing inside the
/// object can make this fail.
pub fn build_composite_index(raw: &Value) -> Result<CompositeIndex, FgiError> {
    let doc = raw.as_object().ok_or_else(|| FgiError::Schema {
        details: format!("expected a JSON object at the top level, got {}", json_kind(raw)),
    })?;

    let composite = doc.get("fear_and_greed").and_then(Value::as_object);
    let historical = doc.get("fear_and_greed_historical").and_then(Value::as_object);

    Ok(CompositeIndex {
        score: number(composite, "score"),
        rating: label(composite, "rating"),
        previous_close: number(composite, "previous_close"),
        previous_1_week: number(composite, "previous_1_week"),
        previous_1_month: number(composite, "previous_1_month"),
        previous_1_year: number(composite, "previous_1_year"),
        timestamp: composite
            .and_then(|c| c.get("timestamp"))
            .and_then(parse_composite_timestamp),
        historical: series(historical),
        indicators: Indicators::from_fn(|kind| build_indicator(doc, kind)),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// # Fear and Greed Client
///
/// Fetch followed by build. Holds only shared, immutable collaborators and
/// never caches, so every call returns a brand new snapshot.
pub struct FearAndGreed {
    api_call: Arc<ApiCallCnn>,
    logger: Arc<LoggerLocal>,
}

impl FearAndGreed {
    /// Creates a client over an existing fetcher.
    pub fn new(api_call: Arc<ApiCallCnn>, logger: Arc<LoggerLocal>) -> Self {
        Self { api_call, logger }
    }

    /// Fetches and builds the current snapshot.
    pub async fn fetch_latest(&self) -> Result<CompositeIndex, FgiError> {
        self.fetch(None).await
    }

    /// Fetches and builds the snapshot CNN published for `date`.
    pub async fn fetch_at_date(&self, date: NaiveDate) -> Result<CompositeIndex, FgiError> {
        self.fetch(Some(date)).await
    }

    async fn fetch(&self, date: Option<NaiveDate>) -> Result<CompositeIndex, FgiError> {
        let raw = self.api_call.fetch_cnn(date).await?;

        match build_composite_index(&raw) {
            Ok(index) => {
                self.logger
                    .debug(
                        "Fear and Greed data normalized successfully",
                        Some(json!({"score": index.score, "rating": index.rating, "points": index.historical.len()})),
                    )
                    .await;
                Ok(index)
            }
            Err(e) => {
                self.logger
                    .error(&format!("Normalization failed for Fear and Greed: {}", e), None)
                    .await;
                Err(e)
            }
        }
    }
}
