//! Audio upload endpoint for rework sources

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};

use crate::models::UploadResponse;
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// POST /upload-audio
///
/// Accepts `audio/*` only. The returned `path` is what the UI passes back as
/// `src_audio_path`.
pub async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("audio/") {
            return Err(ApiError::Validation(format!(
                "Only audio files are accepted (got '{}')",
                content_type
            )));
        }

        let filename = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let (upload_id, record) = state.uploads.save(filename.clone(), &bytes).await?;
        return Ok(Json(UploadResponse {
            upload_id,
            path: record.path.to_string_lossy().into_owned(),
            filename,
        }));
    }

    Err(ApiError::Validation(format!(
        "Missing '{}' field",
        UPLOAD_FIELD
    )))
}

/// Build upload routes
pub fn upload_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/upload-audio",
        post(upload_audio).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}
