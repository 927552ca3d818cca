//! # Error Taxonomy
//!
//! A single error type for everything that can go wrong between the upstream
//! endpoint and a fully built snapshot. Missing fields inside an otherwise
//! well-formed document are never errors; they are defaulted by the model
//! builder.

use std::fmt;
use thiserror::Error;

/// The underlying reason a transport-level failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCause {
    /// The server answered with a non-2xx HTTP status.
    Status(u16),
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// Connection refused, DNS failure, TLS failure, reset, etc.
    Network(String),
}

impl fmt::Display for TransportCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportCause::Status(code) => write!(f, "HTTP status {}", code),
            TransportCause::Timeout(details) => write!(f, "timed out ({})", details),
            TransportCause::Network(details) => write!(f, "network failure ({})", details),
        }
    }
}

/// Errors raised by the Fear & Greed fetch and build pipeline.
#[derive(Debug, Clone, Error)]
pub enum FgiError {
    /// Network, timeout or HTTP-status failure while fetching.
    #[error("Transport error for {endpoint}: {cause}")]
    Transport {
        /// The URL or path that was requested.
        endpoint: String,
        /// What went wrong on the wire.
        cause: TransportCause,
    },

    /// The response body was not valid JSON.
    #[error("Malformed response from {endpoint}: {details}")]
    MalformedResponse {
        /// The URL or path that was requested.
        endpoint: String,
        /// Parser diagnostics.
        details: String,
    },

    /// The JSON document is not a mapping at the top level.
    #[error("Schema error: {details}")]
    Schema {
        /// Description of the structural problem.
        details: String,
    },

    /// The configured base URL could not be parsed or joined.
    #[error("Invalid endpoint {endpoint}: {details}")]
    InvalidEndpoint {
        /// The offending URL.
        endpoint: String,
        /// Parser diagnostics.
        details: String,
    },
}

impl FgiError {
    /// `true` when the failure is a transport timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FgiError::Transport { cause: TransportCause::Timeout(_), .. }
        )
    }

    /// The HTTP status carried by a transport error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FgiError::Transport { cause: TransportCause::Status(code), .. } => Some(*code),
            _ => None,
        }
    }
}
