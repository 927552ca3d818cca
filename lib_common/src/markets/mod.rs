//! # Financial Market APIs Module
//!
//! Clients and data models for market data providers. Only CNN's Fear & Greed
//! index is wired in; each provider gets its own submodule.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// CNN Business Fear & Greed Index: fetcher, model, metrics and reports.
pub mod cnn;
