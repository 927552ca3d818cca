//! # REST API
//!
//! Read-only JSON endpoints over the latest snapshot. Snapshots are reused for
//! the configured TTL (five minutes by default); an upstream failure maps to
//! `502 Bad Gateway`.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use lib_common::core::{FgiError, SnapshotCache};
use lib_common::markets::cnn::{CompositeIndex, CompositeSummary, FearAndGreed, IndicatorSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// Default number of points returned by `/historical`.
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

/// Shared handler state: the client and the snapshot cache.
pub struct ApiState {
    fgi: Arc<FearAndGreed>,
    cache: SnapshotCache<CompositeIndex>,
}

impl ApiState {
    pub fn new(fgi: Arc<FearAndGreed>, ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            fgi,
            cache: SnapshotCache::new(ttl),
        })
    }

    async fn snapshot(&self) -> Result<Arc<CompositeIndex>, ApiError> {
        self.cache
            .get_or_try_refresh(|| self.fgi.fetch_latest())
            .await
            .map_err(ApiError::Upstream)
    }
}

#[derive(Debug)]
pub enum ApiError {
    Upstream(FgiError),
    IndicatorNotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Upstream(e) => {
                log::error!("Upstream fetch failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            ApiError::IndicatorNotFound(name) => {
                (StatusCode::NOT_FOUND, format!("Indicator '{}' not found", name))
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ScoreResponse {
    pub score: f64,
    pub rating: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct SignalResponse {
    pub score: f64,
    pub rating: String,
    pub signal: String,
    pub recommendation: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct HistoricalPoint {
    pub date: String,
    pub score: f64,
    pub rating: String,
}

#[derive(Deserialize, Debug)]
pub struct HistoricalParams {
    pub limit: Option<usize>,
}

pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(get_fear_greed))
        .route("/score", get(get_score))
        .route("/signal", get(get_signal))
        .route("/indicator/{name}", get(get_indicator))
        .route("/historical", get(get_historical))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

async fn get_fear_greed(State(state): State<Arc<ApiState>>) -> Result<Json<CompositeSummary>, ApiError> {
    let index = state.snapshot().await?;
    Ok(Json(index.summary()))
}

async fn get_score(State(state): State<Arc<ApiState>>) -> Result<Json<ScoreResponse>, ApiError> {
    let index = state.snapshot().await?;
    Ok(Json(ScoreResponse {
        score: index.score,
        rating: index.rating.clone(),
    }))
}

async fn get_signal(State(state): State<Arc<ApiState>>) -> Result<Json<SignalResponse>, ApiError> {
    let index = state.snapshot().await?;
    let signal = index.signal();
    Ok(Json(SignalResponse {
        score: index.score,
        rating: index.rating.clone(),
        signal: signal.code().to_string(),
        recommendation: signal.recommendation().to_string(),
    }))
}

async fn get_indicator(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<IndicatorSummary>, ApiError> {
    let index = state.snapshot().await?;
    index
        .indicators
        .find(&name)
        .map(|indicator| Json(IndicatorSummary::from(indicator)))
        .ok_or(ApiError::IndicatorNotFound(name))
}

async fn get_historical(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<HistoricalParams>,
) -> Result<Json<Vec<HistoricalPoint>>, ApiError> {
    let index = state.snapshot().await?;
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let points = index
        .recent_history(limit)
        .iter()
        .map(|p| HistoricalPoint {
            date: p.timestamp.to_rfc3339(),
            score: p.score,
            rating: p.rating.clone(),
        })
        .collect();
    Ok(Json(points))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
