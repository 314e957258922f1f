//! Generation endpoints
//!
//! `/generate` submits and returns immediately; the browser then polls
//! `/status/{task_id}`. `/generate-lyrics` is the exception: it waits for the
//! engine server-side (bounded) and returns the finished lyrics.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::io;

use crate::models::{
    GenerateLyricsRequest, GenerateLyricsResponse, GenerationRequest, JobStatus, ResultItem,
    StatusResponse, TaskCreated,
};
use crate::services::{map_request, EngineError};
use crate::utils::audio_path::{query_param, stage_source_audio};
use crate::utils::poll_retry::{poll_until_ready, PollError, PollOutcome};
use crate::{ApiError, ApiResult, AppState};

/// POST /generate
pub async fn generate(
    State(state): State<AppState>,
    Json(mut req): Json<GenerationRequest>,
) -> ApiResult<Json<TaskCreated>> {
    if let Some(source) = req.src_audio_path.clone().filter(|p| !p.is_empty()) {
        let staged = stage_source_audio(&source).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                ApiError::Validation(format!("Source audio not found: {}", source))
            }
            _ => ApiError::Io(e),
        })?;
        req.src_audio_path = Some(staged);
    }

    let payload = map_request(&req);
    let task_id = state.engine.submit(&payload).await?;

    tracing::info!(
        task_id = %task_id,
        task_type = %req.task_type,
        model = %req.gen_model,
        "Submitted generation"
    );
    state.jobs.record_pending(&task_id, req).await;

    Ok(Json(TaskCreated { task_id }))
}

/// GET /status/{task_id}
///
/// Finished jobs answer from the cache without touching the engine.
pub async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    if let Some(results) = state.jobs.completed_results(&task_id).await {
        return Ok(Json(StatusResponse::done(results)));
    }

    let status = state.engine.poll(&task_id).await?;
    if let (JobStatus::Done, Some(results)) = (status.status, status.results.as_ref()) {
        state.jobs.complete(&task_id, results.clone()).await;
    }

    Ok(Json(status))
}

/// POST /generate-lyrics
///
/// Submits a sample-query job (the engine writes caption and lyrics from the
/// description) and waits for it. 504 when the wait budget runs out.
pub async fn generate_lyrics(
    State(state): State<AppState>,
    Json(req): Json<GenerateLyricsRequest>,
) -> ApiResult<Json<GenerateLyricsResponse>> {
    if req.description.trim().is_empty() {
        return Err(ApiError::Validation("Description cannot be empty".to_string()));
    }

    let sample = GenerationRequest {
        sample_query: Some(req.description.clone()),
        vocal_language: req.vocal_language.clone(),
        ..Default::default()
    };
    let task_id = state.engine.submit(&map_request(&sample)).await?;
    state.jobs.record_pending(&task_id, sample).await;
    tracing::info!(task_id = %task_id, "Submitted lyrics generation");

    let policy = state.config.lyrics_poll_policy();
    let engine = state.engine.clone();
    let poll_task_id = task_id.clone();
    let finished = poll_until_ready("lyrics generation", policy, || {
        let engine = engine.clone();
        let task_id = poll_task_id.clone();
        async move {
            let status = engine.poll(&task_id).await?;
            Ok::<_, EngineError>(if status.status.is_terminal() {
                PollOutcome::Ready(status)
            } else {
                PollOutcome::Pending
            })
        }
    })
    .await
    .map_err(|e| match e {
        PollError::Exhausted { attempts } => ApiError::Timeout(format!(
            "Lyrics generation still running after {} polls",
            attempts
        )),
        PollError::Failed { source, .. } => ApiError::from(source),
    })?;

    let results = match finished {
        StatusResponse {
            status: JobStatus::Done,
            results: Some(results),
        } => results,
        _ => return Err(ApiError::Upstream("Lyrics generation failed".to_string())),
    };
    state.jobs.complete(&task_id, results.clone()).await;

    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::Upstream("Lyrics generation returned no results".to_string()))?;

    Ok(Json(lyrics_response(first)))
}

fn meta_field(meta: Option<&Value>, key: &str) -> Option<Value> {
    meta.and_then(|m| m.get(key)).filter(|v| !v.is_null()).cloned()
}

fn meta_string(meta: Option<&Value>, key: &str, default: &str) -> String {
    match meta_field(meta, key) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => default.to_string(),
    }
}

/// Shape the first sample-query result for the lyrics panel
pub(crate) fn lyrics_response(item: ResultItem) -> GenerateLyricsResponse {
    let meta = item.meta.as_ref();
    let audio_path = query_param(&item.audio_url, "path").unwrap_or_default();

    GenerateLyricsResponse {
        caption: item
            .prompt
            .clone()
            .unwrap_or_else(|| meta_string(meta, "prompt", "")),
        lyrics: item
            .lyrics
            .clone()
            .unwrap_or_else(|| meta_string(meta, "lyrics", "")),
        bpm: meta_field(meta, "bpm"),
        key_scale: meta_string(meta, "keyscale", ""),
        time_signature: meta_string(meta, "timesignature", "4/4"),
        duration: meta_field(meta, "duration"),
        audio_path,
        audio_url: item.audio_url,
    }
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/status/:task_id", get(status))
        .route("/generate-lyrics", post(generate_lyrics))
}
