//! Upstream fixtures shared by the server tests.

use lib_common::loggers::{LoggerLocal, LoggerLocalOptions};
use lib_common::markets::cnn::{ApiCallCnn, CnnOptions, FearAndGreed, IndicatorKind};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GRAPHDATA: &str = "/index/fearandgreed/graphdata";

/// A complete upstream document: composite 72.3 "greed", three history
/// points and all seven indicators.
pub fn sample_document() -> Value {
    let mut doc = Map::new();
    doc.insert(
        "fear_and_greed".to_string(),
        json!({
            "score": 72.3,
            "rating": "greed",
            "timestamp": "2024-01-05T23:59:57+00:00",
            "previous_close": 70.1,
            "previous_1_week": 65.0,
            "previous_1_month": 50.0,
            "previous_1_year": 80.0
        }),
    );
    doc.insert(
        "fear_and_greed_historical".to_string(),
        json!({
            "timestamp": 1704499200000.0,
            "score": 72.3,
            "rating": "greed",
            "data": [
                {"x": 1704326400000.0, "y": 60.0, "rating": "greed"},
                {"x": 1704412800000.0, "y": 30.0, "rating": "fear"},
                {"x": 1704499200000.0, "y": 72.3, "rating": "greed"}
            ]
        }),
    );
    for (i, kind) in IndicatorKind::ALL.iter().enumerate() {
        let score = 10.0 + i as f64 * 12.5;
        doc.insert(
            kind.api_key().to_string(),
            json!({
                "timestamp": 1704488400000.0,
                "score": score,
                "rating": "neutral",
                "data": [{"x": 1704488400000.0, "y": score, "rating": "neutral"}]
            }),
        );
    }
    Value::Object(doc)
}

pub async fn upstream_with(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GRAPHDATA))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

pub async fn healthy_upstream() -> MockServer {
    upstream_with(ResponseTemplate::new(200).set_body_json(sample_document())).await
}

pub fn quiet_logger() -> Arc<LoggerLocal> {
    let options = LoggerLocalOptions { use_tty: None, use_file: None, log_dir: None };
    Arc::new(LoggerLocal::new("servers-test".to_string(), Some(options)))
}

pub fn client_for(server: &MockServer) -> Arc<FearAndGreed> {
    let options = CnnOptions {
        base_url: format!("{}/", server.uri()),
        timeout: Duration::from_secs(5),
        retries: 0,
    };
    let logger = quiet_logger();
    let api_call = Arc::new(ApiCallCnn::with_options(options, logger.clone()).unwrap());
    Arc::new(FearAndGreed::new(api_call, logger))
}
