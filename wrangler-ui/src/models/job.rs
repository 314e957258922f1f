//! Job status and normalized generation results

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Job status as seen by the UI
///
/// The engine reports 0/1/2; this is the normalized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Done,
    Error,
}

impl JobStatus {
    /// Map the engine's numeric status code
    pub fn from_engine_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(JobStatus::Processing),
            1 => Some(JobStatus::Done),
            2 => Some(JobStatus::Error),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

/// One generated artifact (one per batch item)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Engine-relative audio location, either a bare path or `/v1/audio?path=...`
    pub audio_url: String,
    /// Metadata echoed by the engine (bpm, keyscale, duration, ...)
    pub meta: Option<Value>,
    /// Caption the engine actually used (differs from the request in sample-query mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Lyrics the engine actually used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

/// `GET /status/{task_id}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultItem>>,
}

impl StatusResponse {
    pub fn processing() -> Self {
        Self {
            status: JobStatus::Processing,
            results: None,
        }
    }

    pub fn error() -> Self {
        Self {
            status: JobStatus::Error,
            results: None,
        }
    }

    pub fn done(results: Vec<ResultItem>) -> Self {
        Self {
            status: JobStatus::Done,
            results: Some(results),
        }
    }
}

/// `POST /generate` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: String,
}

/// `POST /upload-audio` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub upload_id: String,
    /// Server-side path, usable as `src_audio_path` for a rework
    pub path: String,
    pub filename: Option<String>,
}
