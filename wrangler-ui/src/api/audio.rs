//! Audio proxy and download endpoints

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use mime_guess::mime::Mime;
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::utils::audio_path::{content_type_for, local_audio_file};
use crate::{ApiError, ApiResult, AppState};

/// Prefix of downloaded file names
pub const DOWNLOAD_PREFIX: &str = "acestep";

/// `GET /audio` query
#[derive(Debug, Deserialize)]
pub struct AudioQuery {
    /// Engine audio location (bare path or `/v1/audio?path=...`)
    pub path: String,
}

/// `acestep-<first 8 chars of job id>-<1-based index>.<format>`
pub fn download_filename(job_id: &str, index: usize, extension: &str) -> String {
    let short_id: String = job_id.chars().take(8).collect();
    format!("{}-{}-{}.{}", DOWNLOAD_PREFIX, short_id, index + 1, extension)
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename)
}

/// GET /audio?path=...
///
/// Local files are served directly (with Range support, so the player can
/// seek); anything else is relayed from the engine.
pub async fn audio_proxy(
    State(state): State<AppState>,
    Query(query): Query<AudioQuery>,
    request: Request,
) -> ApiResult<Response> {
    if let Some(local) = local_audio_file(&query.path).await {
        // Same content type as the engine path, audio/mpeg when unknown
        let mime: Mime = content_type_for(&local).parse().map_err(|e| {
            ApiError::Internal(format!("Content type for {}: {}", local.display(), e))
        })?;
        let response = match ServeFile::new_with_mime(&local, &mime).oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
        return Ok(response.map(Body::new));
    }

    let audio = state
        .engine
        .fetch_audio(&query.path)
        .await
        .map_err(|e| ApiError::Upstream(format!("Audio fetch error: {}", e)))?;

    Ok(([(CONTENT_TYPE, audio.content_type)], audio.bytes).into_response())
}

/// GET /download/{job_id}/{index}/audio
pub async fn download_audio(
    State(state): State<AppState>,
    Path((job_id, index)): Path<(String, usize)>,
) -> ApiResult<Response> {
    let lookup = state
        .jobs
        .lookup_result(&job_id, index)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No result {} for job {}", index, job_id)))?;

    let audio = state
        .engine
        .fetch_audio(&lookup.item.audio_url)
        .await
        .map_err(|e| ApiError::Upstream(format!("Audio fetch error: {}", e)))?;

    let filename = download_filename(&job_id, index, &lookup.format);
    tracing::debug!(job_id = %job_id, index, filename = %filename, "Audio download");

    Ok((
        [
            (CONTENT_TYPE, audio.content_type),
            (CONTENT_DISPOSITION, attachment(&filename)),
        ],
        audio.bytes,
    )
        .into_response())
}

/// GET /download/{job_id}/{index}/json
///
/// Pretty-printed `{generated_at, params, meta}` sidecar for one result.
pub async fn download_json(
    State(state): State<AppState>,
    Path((job_id, index)): Path<(String, usize)>,
) -> ApiResult<Response> {
    let lookup = state
        .jobs
        .lookup_result(&job_id, index)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No result {} for job {}", index, job_id)))?;

    let params = match &lookup.params {
        Some(params) => {
            serde_json::to_value(params).map_err(|e| ApiError::Internal(e.to_string()))?
        }
        None => json!({}),
    };
    let document = json!({
        "generated_at": Utc::now().to_rfc3339(),
        "params": params,
        "meta": lookup.item.meta.clone().unwrap_or(Value::Null),
    });
    let body =
        serde_json::to_string_pretty(&document).map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = download_filename(&job_id, index, "json");
    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (CONTENT_DISPOSITION, attachment(&filename)),
        ],
        body,
    )
        .into_response())
}

/// Build audio routes
pub fn audio_routes() -> Router<AppState> {
    Router::new()
        .route("/audio", get(audio_proxy))
        .route("/download/:job_id/:index/audio", get(download_audio))
        .route("/download/:job_id/:index/json", get(download_json))
}
