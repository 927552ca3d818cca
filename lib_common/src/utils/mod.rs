//! # Utilities Module
//!
//! General-purpose helpers shared across `lib_common` and the front-end crates.
//!
//! ## Contained Modules:
//!
//! - **`misc`**: timestamp formatting for log records and small text helpers
//!   used by report renderers.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Miscellaneous utility functions.
pub mod misc;
