//! # Data Retrieval Module
//!
//! Generic HTTP plumbing shared by the market clients. Request building,
//! timeouts, retries and JSON decoding live here so the CNN client only deals
//! with paths and payloads.
//!
//! - **`ky_http`**: `ApiClient`, a `reqwest` client with a deadline and an
//!   optional `reqwest-retry` backoff layer.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic JSON HTTP client with timeout and optional retry middleware.
pub mod ky_http;

pub use ky_http::{ApiClient, ApiResponse, KyError, KyOptions};
