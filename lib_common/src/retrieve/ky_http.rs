//! # HTTP Retrieval Utilities
//!
//! An asynchronous JSON client around `reqwest` with a per-request timeout and
//! optional exponential-backoff retries. Failures are reported as [`KyError`]
//! so callers can tell a timeout from a refused connection from a body that
//! is not JSON.

use reqwest::{header::HeaderMap, Method};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A standardized container for API responses.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The deserialized body of a 2xx response.
    pub data: Option<T>,
    /// The raw body of a non-2xx response.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// Client tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KyOptions {
    /// Whole-request deadline, connect through body.
    pub timeout: Duration,
    /// Extra attempts on transient failures. Zero disables the retry layer.
    pub retries: u32,
}

impl Default for KyOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 0,
        }
    }
}

/// Failures raised by [`ApiClient`].
#[derive(Debug, Error)]
pub enum KyError {
    /// The base URL or the joined path is not a valid absolute URL.
    #[error("Invalid URL {url}: {source}")]
    Url {
        /// The text that failed to parse.
        url: String,
        /// Parser diagnostics.
        #[source]
        source: url::ParseError,
    },

    /// The underlying client could not be constructed.
    #[error("Cannot build HTTP client: {0}")]
    Client(String),

    /// The request exceeded [`KyOptions::timeout`].
    #[error("Request to {url} timed out")]
    Timeout {
        /// The requested URL.
        url: String,
    },

    /// Connection, DNS, TLS or protocol failure.
    #[error("Request to {url} failed: {details}")]
    Network {
        /// The requested URL.
        url: String,
        /// Underlying error text.
        details: String,
    },

    /// A 2xx body that does not deserialize into the requested type.
    #[error("Cannot decode response from {url}: {details}")]
    Decode {
        /// The requested URL.
        url: String,
        /// Parser diagnostics.
        details: String,
    },
}

impl KyError {
    fn from_reqwest(url: &Url, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            KyError::Timeout { url: url.to_string() }
        } else {
            KyError::Network { url: url.to_string(), details: e.to_string() }
        }
    }

    fn from_middleware(url: &Url, e: reqwest_middleware::Error) -> Self {
        match e {
            reqwest_middleware::Error::Reqwest(inner) => KyError::from_reqwest(url, inner),
            reqwest_middleware::Error::Middleware(inner) => KyError::Network {
                url: url.to_string(),
                details: inner.to_string(),
            },
        }
    }
}

/// A JSON HTTP client bound to a base URL.
pub struct ApiClient {
    inner: ClientWithMiddleware,
    base_url: Url,
    options: KyOptions,
}

impl ApiClient {
    /// Creates a client for `base_url` (absolute, normally ending in `/`).
    ///
    /// # Errors
    /// [`KyError::Url`] for an unparsable base URL, [`KyError::Client`] when
    /// the TLS backend cannot be initialised.
    pub fn new(base_url: &str, options: KyOptions) -> Result<Self, KyError> {
        let url = Url::parse(base_url).map_err(|source| KyError::Url {
            url: base_url.to_string(),
            source,
        })?;

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| KyError::Client(e.to_string()))?;

        let mut builder = ClientBuilder::new(client);
        if options.retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(Self {
            inner: builder.build(),
            base_url: url,
            options,
        })
    }

    /// The base every request path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Options the client was built with.
    pub fn options(&self) -> KyOptions {
        self.options
    }

    /// Resolves `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, KyError> {
        self.base_url.join(path).map_err(|source| KyError::Url {
            url: format!("{}{}", self.base_url, path),
            source,
        })
    }

    /// Sends `method` to `path` and decodes a 2xx body as JSON into `T`.
    ///
    /// Non-2xx answers are not errors: they come back with `success == false`
    /// and the raw body in `error_body`.
    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse<T>, KyError>
    where
        T: DeserializeOwned,
    {
        let full_url = self.endpoint(path)?;
        let mut req = self.inner.request(method, full_url.clone());
        if let Some(h) = headers {
            req = req.headers(h);
        }

        let response = req
            .send()
            .await
            .map_err(|e| KyError::from_middleware(&full_url, e))?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| KyError::from_reqwest(&full_url, e))?;
            let data = serde_json::from_slice::<T>(&bytes).map_err(|e| KyError::Decode {
                url: full_url.to_string(),
                details: e.to_string(),
            })?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, timeout: Duration) -> ApiClient {
        let base = format!("{}/", server.uri());
        ApiClient::new(&base, KyOptions { timeout, retries: 0 }).unwrap()
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = ApiClient::new("not a url", KyOptions::default()).err().unwrap();
        assert!(matches!(err, KyError::Url { .. }));
    }

    #[tokio::test]
    async fn test_decodes_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, "application/json".parse().unwrap());
        let resp: ApiResponse<Value> = client.request(Method::GET, "data", Some(headers)).await.unwrap();

        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["a"], 1);
    }

    #[tokio::test]
    async fn test_non_success_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let resp: ApiResponse<Value> = client.request(Method::GET, "missing", None).await.unwrap();

        assert!(!resp.success);
        assert_eq!(resp.status, 404);
        assert_eq!(resp.error_body.as_deref(), Some("nope"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_secs(5));
        let err = client.request::<Value>(Method::GET, "x", None).await.unwrap_err();
        assert!(matches!(err, KyError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_slow_server_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = client_for(&server, Duration::from_millis(50));
        let err = client.request::<Value>(Method::GET, "slow", None).await.unwrap_err();
        assert!(matches!(err, KyError::Timeout { .. }));
    }
}
