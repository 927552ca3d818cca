//! End-to-end fetch and build against a local stand-in for the CNN endpoint.

use chrono::NaiveDate;
use lib_common::core::{FgiError, TransportCause};
use lib_common::loggers::{LoggerLocal, LoggerLocalOptions};
use lib_common::markets::cnn::{ApiCallCnn, CnnOptions, FearAndGreed, IndicatorKind, TradingSignal};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GRAPHDATA: &str = "/index/fearandgreed/graphdata";

fn document() -> Value {
    let mut doc = Map::new();
    doc.insert(
        "fear_and_greed".to_string(),
        json!({
            "score": 18.4,
            "rating": "extreme fear",
            "timestamp": "2024-03-01T23:59:58+00:00",
            "previous_close": 22.0,
            "previous_1_week": 35.5,
            "previous_1_month": 48.0,
            "previous_1_year": 61.2
        }),
    );
    doc.insert(
        "fear_and_greed_historical".to_string(),
        json!({
            "data": [
                {"x": 1709164800000.0, "y": 24.0, "rating": "extreme fear"},
                {"x": 1709251200000.0, "y": 18.4, "rating": "extreme fear"}
            ]
        }),
    );
    for kind in IndicatorKind::ALL {
        doc.insert(
            kind.api_key().to_string(),
            json!({
                "timestamp": 1709251200000.0,
                "score": 20.0,
                "rating": "extreme fear",
                "data": [{"x": 1709251200000.0, "y": 20.0, "rating": "extreme fear"}]
            }),
        );
    }
    Value::Object(doc)
}

struct Harness {
    server: MockServer,
    _logs: TempDir,
    logger: Arc<LoggerLocal>,
}

impl Harness {
    async fn start() -> Self {
        let logs = tempfile::tempdir().unwrap();
        let logger = Arc::new(LoggerLocal::new(
            "fgi_e2e".to_string(),
            Some(LoggerLocalOptions::file_only(Some(logs.path().to_path_buf()))),
        ));
        Self { server: MockServer::start().await, _logs: logs, logger }
    }

    async fn respond(&self, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    fn client(&self, timeout: Duration) -> FearAndGreed {
        let options = CnnOptions {
            base_url: self.server.uri(),
            timeout,
            retries: 0,
        };
        let api_call = ApiCallCnn::with_options(options, Arc::clone(&self.logger)).unwrap();
        FearAndGreed::new(Arc::new(api_call), Arc::clone(&self.logger))
    }
}

#[tokio::test]
async fn test_latest_snapshot_is_built() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path(GRAPHDATA))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document()))
        .mount(&harness.server)
        .await;

    let index = harness.client(Duration::from_secs(5)).fetch_latest().await.unwrap();
    assert_eq!(index.score, 18.4);
    assert_eq!(index.rating, "extreme fear");
    assert_eq!(index.previous_1_year, 61.2);
    assert_eq!(index.historical.len(), 2);
    assert_eq!(index.indicators.len(), 7);
    assert_eq!(index.signal(), TradingSignal::StrongBuy);
    assert_eq!(
        index.indicators.get(IndicatorKind::JunkBondDemand).name,
        "Junk Bond Demand"
    );
}

#[tokio::test]
async fn test_dated_snapshot_uses_dated_path() {
    let harness = Harness::start().await;
    harness
        .respond(
            &format!("{}/2024-03-01", GRAPHDATA),
            ResponseTemplate::new(200).set_body_json(document()),
        )
        .await;

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let index = harness.client(Duration::from_secs(5)).fetch_at_date(date).await.unwrap();
    assert_eq!(index.score, 18.4);
}

#[tokio::test]
async fn test_http_status_is_transport_error() {
    let harness = Harness::start().await;
    harness.respond(GRAPHDATA, ResponseTemplate::new(503)).await;

    let err = harness.client(Duration::from_secs(5)).fetch_latest().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(matches!(
        err,
        FgiError::Transport { cause: TransportCause::Status(503), .. }
    ));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let harness = Harness::start().await;
    harness
        .respond(GRAPHDATA, ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .await;

    let err = harness.client(Duration::from_secs(5)).fetch_latest().await.unwrap_err();
    assert!(matches!(err, FgiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_non_object_document_is_schema_error() {
    let harness = Harness::start().await;
    harness
        .respond(GRAPHDATA, ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
        .await;

    let err = harness.client(Duration::from_secs(5)).fetch_latest().await.unwrap_err();
    assert!(matches!(err, FgiError::Schema { .. }));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let harness = Harness::start().await;
    harness
        .respond(
            GRAPHDATA,
            ResponseTemplate::new(200)
                .set_body_json(document())
                .set_delay(Duration::from_secs(3)),
        )
        .await;

    let err = harness
        .client(Duration::from_millis(200))
        .fetch_latest()
        .await
        .unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {}", err);
}

#[tokio::test]
async fn test_empty_document_builds_defaults() {
    let harness = Harness::start().await;
    harness
        .respond(GRAPHDATA, ResponseTemplate::new(200).set_body_json(json!({})))
        .await;

    let index = harness.client(Duration::from_secs(5)).fetch_latest().await.unwrap();
    assert_eq!(index.score, 0.0);
    assert!(index.historical.is_empty());
    assert!(index.indicators.iter().all(|i| i.rating == "N/A"));
}

#[tokio::test]
#[ignore = "hits the production CNN endpoint"]
async fn test_live_latest_snapshot() {
    let logs = tempfile::tempdir().unwrap();
    let logger = Arc::new(LoggerLocal::new(
        "fgi_live".to_string(),
        Some(LoggerLocalOptions::file_only(Some(logs.path().to_path_buf()))),
    ));
    let api_call = ApiCallCnn::new(Arc::clone(&logger)).unwrap();
    let index = FearAndGreed::new(Arc::new(api_call), logger)
        .fetch_latest()
        .await
        .unwrap();

    assert!((0.0..=100.0).contains(&index.score));
    assert!(!index.historical.is_empty());
    assert_eq!(index.indicators.len(), 7);
}
