//! Health endpoints
//!
//! `/health` describes this service; `/api/health` forwards the engine's own.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::{ApiError, ApiResult, AppState};

/// Service health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("ok")
    pub status: String,
    /// Module name ("wrangler-ui")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Jobs submitted but not yet seen finished
    pub pending_jobs: usize,
    /// Jobs with cached results
    pub completed_jobs: usize,
    /// Engine this service talks to
    pub engine_url: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;
    let (pending_jobs, completed_jobs) = state.jobs.counts().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "wrangler-ui".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        pending_jobs,
        completed_jobs,
        engine_url: state.engine.base_url().to_string(),
    })
}

/// GET /api/health
///
/// 503 if the engine cannot be reached or reports unhealthy.
pub async fn engine_health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state
        .engine
        .health()
        .await
        .map(Json)
        .map_err(|e| ApiError::Unavailable(e.to_string()))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(engine_health))
}
