//! # CNN Business API Integration Module
//!
//! - **`apicallcnn`**: one GET against the dataviz endpoint, returning raw JSON.
//! - **`fearandgreed`**: the snapshot model, the lenient builder and the
//!   `FearAndGreed` fetch-and-build client.
//! - **`sentiment`**: trading signal, severity band, period deltas and fuzzy
//!   indicator lookup.
//! - **`report`**: plain-text summaries.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// HTTP client for the CNN dataviz API.
pub mod apicallcnn;
/// Snapshot model, builder and fetch-and-build client.
pub mod fearandgreed;
/// Plain-text renderings of a snapshot.
pub mod report;
/// Derived metrics over a built snapshot.
pub mod sentiment;

pub use apicallcnn::{ApiCallCnn, CnnOptions};
pub use fearandgreed::{
    build_composite_index, CompositeIndex, DataPoint, FearAndGreed, Indicator, IndicatorKind,
    Indicators,
};
pub use sentiment::{
    ComparisonPeriod, CompositeSummary, IndicatorSummary, PeriodDelta, SeverityBand,
    TradingSignal, DISCLAIMER,
};
