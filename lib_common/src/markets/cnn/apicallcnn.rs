//! # CNN API Client
//!
//! One GET against CNN's dataviz endpoint per call, returning the raw JSON
//! document. Headers mimic a browser because the endpoint rejects obvious bots.
//!
//! There is no retry loop here. [`CnnOptions::retries`] can switch on the
//! `reqwest-retry` layer of the underlying [`ApiClient`], but the default is a
//! single attempt.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use crate::core::error::{FgiError, TransportCause};
use crate::loggers::loggerlocal::LoggerLocal;
use crate::retrieve::ky_http::{ApiClient, KyError, KyOptions};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Production base URL of CNN's data visualisation API.
pub const CNN_BASE_URL: &str = "https://production.dataviz.cnn.io/";
/// Path of the Fear & Greed graph document, relative to the base URL.
pub const GRAPHDATA_PATH: &str = "index/fearandgreed/graphdata";
/// Browser-like user agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
/// Default whole-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`ApiCallCnn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnnOptions {
    /// Absolute base URL; [`GRAPHDATA_PATH`] is joined onto it.
    pub base_url: String,
    /// Whole-request deadline.
    pub timeout: Duration,
    /// Extra attempts on transient failures. Zero means a single attempt.
    pub retries: u32,
}

impl Default for CnnOptions {
    fn default() -> Self {
        Self {
            base_url: CNN_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        }
    }
}

/// # CNN API Call Client
///
/// Thin wrapper pairing a configured [`ApiClient`] with a shared logger.
/// Holds no mutable state, so one instance can serve concurrent callers.
pub struct ApiCallCnn {
    client: ApiClient,
    logger: Arc<LoggerLocal>,
}

impl ApiCallCnn {
    /// Client for the production endpoint with default options.
    pub fn new(logger: Arc<LoggerLocal>) -> Result<Self, FgiError> {
        Self::with_options(CnnOptions::default(), logger)
    }

    /// Client with explicit options.
    ///
    /// # Errors
    /// [`FgiError::InvalidEndpoint`] when `base_url` is not an absolute URL.
    pub fn with_options(options: CnnOptions, logger: Arc<LoggerLocal>) -> Result<Self, FgiError> {
        // Url::join drops the last segment of a base without a trailing slash.
        let base_url = if options.base_url.ends_with('/') {
            options.base_url.clone()
        } else {
            format!("{}/", options.base_url)
        };
        let ky_options = KyOptions {
            timeout: options.timeout,
            retries: options.retries,
        };
        let client = ApiClient::new(&base_url, ky_options).map_err(|e| FgiError::InvalidEndpoint {
            endpoint: options.base_url.clone(),
            details: e.to_string(),
        })?;
        Ok(Self { client, logger })
    }

    /// Request path for the latest document or a dated snapshot.
    pub fn graphdata_path(date: Option<NaiveDate>) -> String {
        match date {
            Some(d) => format!("{}/{}", GRAPHDATA_PATH, d.format("%Y-%m-%d")),
            None => GRAPHDATA_PATH.to_string(),
        }
    }

    fn request_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// # Fetch CNN Data
    ///
    /// Issues one GET and returns the decoded JSON document. `date` selects
    /// the historical snapshot for that day; `None` fetches the latest.
    ///
    /// # Errors
    /// - non-2xx status, timeout or network failure: [`FgiError::Transport`]
    /// - a body that is not JSON: [`FgiError::MalformedResponse`]
    pub async fn fetch_cnn(&self, date: Option<NaiveDate>) -> Result<Value, FgiError> {
        let path = Self::graphdata_path(date);
        let endpoint = self
            .client
            .endpoint(&path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| path.clone());

        let result = self
            .client
            .request::<Value>(Method::GET, &path, Some(Self::request_headers()))
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let err = map_ky_error(&endpoint, e);
                self.logger
                    .error(&format!("CNN request failed: {}", err), Some(json!({"endpoint": endpoint})))
                    .await;
                return Err(err);
            }
        };

        if !response.success {
            let err = FgiError::Transport {
                endpoint: endpoint.clone(),
                cause: TransportCause::Status(response.status),
            };
            self.logger
                .error(
                    &format!("HTTP Request failed for {}: Status {}", path, response.status),
                    Some(json!({"status": response.status, "endpoint": endpoint})),
                )
                .await;
            return Err(err);
        }

        match response.data {
            Some(body) => {
                self.logger
                    .trace("CNN document received", Some(json!({"endpoint": endpoint})))
                    .await;
                Ok(body)
            }
            None => Err(FgiError::MalformedResponse {
                endpoint,
                details: "empty response body".to_string(),
            }),
        }
    }
}

fn map_ky_error(endpoint: &str, e: KyError) -> FgiError {
    let endpoint = endpoint.to_string();
    match e {
        KyError::Url { url, source } => FgiError::InvalidEndpoint {
            endpoint: url,
            details: source.to_string(),
        },
        KyError::Client(details) => FgiError::InvalidEndpoint { endpoint, details },
        KyError::Timeout { .. } => FgiError::Transport {
            endpoint,
            cause: TransportCause::Timeout(e.to_string()),
        },
        KyError::Network { details, .. } => FgiError::Transport {
            endpoint,
            cause: TransportCause::Network(details),
        },
        KyError::Decode { details, .. } => FgiError::MalformedResponse { endpoint, details },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::loggerlocal::LoggerLocalOptions;

    fn quiet_logger() -> Arc<LoggerLocal> {
        let options = LoggerLocalOptions { use_tty: None, use_file: None, log_dir: None };
        Arc::new(LoggerLocal::new("apicallcnn-test".to_string(), Some(options)))
    }

    #[test]
    fn test_graphdata_path() {
        assert_eq!(ApiCallCnn::graphdata_path(None), "index/fearandgreed/graphdata");
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            ApiCallCnn::graphdata_path(Some(date)),
            "index/fearandgreed/graphdata/2024-01-05"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let options = CnnOptions { base_url: "::nope::".to_string(), ..CnnOptions::default() };
        let err = ApiCallCnn::with_options(options, quiet_logger()).err().unwrap();
        assert!(matches!(err, FgiError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_default_options() {
        let options = CnnOptions::default();
        assert_eq!(options.base_url, CNN_BASE_URL);
        assert_eq!(options.timeout, Duration::from_secs(30));
        assert_eq!(options.retries, 0);
    }

    #[test]
    fn test_ky_error_mapping() {
        let err = map_ky_error("e", KyError::Timeout { url: "e".to_string() });
        assert!(err.is_timeout());
        let err = map_ky_error("e", KyError::Decode { url: "e".to_string(), details: "bad".to_string() });
        assert!(matches!(err, FgiError::MalformedResponse { .. }));
        let err = map_ky_error("e", KyError::Network { url: "e".to_string(), details: "refused".to_string() });
        assert!(matches!(err, FgiError::Transport { cause: TransportCause::Network(_), .. }));
    }
}
