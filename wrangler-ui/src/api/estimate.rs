//! Duration and section estimate endpoints

use axum::{extract::State, routing::post, Json, Router};

use crate::models::{DurationEstimate, EstimateDurationRequest, EstimateSectionsRequest, SectionsResponse};
use crate::services::duration_estimator::{effective_bpm, estimate_duration, estimate_sections};
use crate::AppState;

/// POST /estimate-duration
///
/// Never fails: an LM-stage failure falls back to the heuristic.
pub async fn estimate_duration_handler(
    State(state): State<AppState>,
    Json(req): Json<EstimateDurationRequest>,
) -> Json<DurationEstimate> {
    let estimate = estimate_duration(
        state.engine.as_ref(),
        &req.lyrics,
        req.bpm,
        &req.time_signature,
        &req.lm_model,
    )
    .await;

    tracing::debug!(
        seconds = estimate.seconds,
        method = ?estimate.method,
        "Estimated duration"
    );
    Json(estimate)
}

/// POST /estimate-sections
pub async fn estimate_sections_handler(
    Json(req): Json<EstimateSectionsRequest>,
) -> Json<SectionsResponse> {
    let sections = estimate_sections(
        &req.lyrics,
        req.duration,
        effective_bpm(req.bpm),
        &req.time_signature,
    );
    Json(SectionsResponse { sections })
}

/// Build estimate routes
pub fn estimate_routes() -> Router<AppState> {
    Router::new()
        .route("/estimate-duration", post(estimate_duration_handler))
        .route("/estimate-sections", post(estimate_sections_handler))
}
