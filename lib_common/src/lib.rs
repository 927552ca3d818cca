//! # lib_common
//!
//! Shared library behind the Fear & Greed toolkit. Modules are gated by cargo
//! features so a front-end only compiles what it uses.
//!
//! - **`core`**: error taxonomy and the time-boxed snapshot cache.
//! - **`loggers`**: `LoggerLocal`, a leveled TTY/file logger.
//! - **`markets`**: the CNN Fear & Greed fetcher, model builder, sentiment
//!   metrics and report text.
//! - **`retrieve`**: a generic HTTP `ApiClient` on top of `reqwest`.
//! - **`utils`**: small time and text helpers.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

#[cfg(feature = "core")]
pub mod core;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "markets")]
pub mod markets;
#[cfg(feature = "retrieve")]
pub mod retrieve;
#[cfg(feature = "utils")]
pub mod utils;
