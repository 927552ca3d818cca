//! # Core Module
//!
//! Pieces every front-end shares regardless of which data source it renders:
//!
//! - **`error`**: `FgiError`, the taxonomy for transport, malformed-body and
//!   schema failures.
//! - **`snapshot_cache`**: `SnapshotCache`, the single-slot TTL cache that the
//!   REST API and the dashboard own. The fetch/build pipeline itself never
//!   caches.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Error taxonomy for the fetch and build pipeline.
pub mod error;
/// Time-boxed single-slot cache owned by front-ends.
pub mod snapshot_cache;

// --- Public API Re-exports ---
pub use error::{FgiError, TransportCause};
pub use snapshot_cache::SnapshotCache;
