//! Generation engine HTTP client
//!
//! The engine is an opaque local inference server. Its wire protocol is frozen:
//! - `POST /release_task` → `{"data": {"task_id": "..."}}`
//! - `POST /query_result` with `{"task_id_list": [id]}` →
//!   `{"data": [{"status": 0|1|2, "result": "<JSON string>"}]}`
//! - `GET  /v1/audio?path=...` → audio bytes
//! - `POST /format_input` → LM analysis of lyrics (duration, bpm, ...)
//! - `GET  /health`
//!
//! On status 1 the `result` field is a *string containing JSON*, not a nested
//! object. It is decoded in a second step after the envelope.
//!
//! Each call has its own timeout: submission longest, polling shortest, audio
//! in between, and analysis short because it is best-effort.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use wrangler_common::config::EngineTimeoutConfig;

use crate::models::{EnginePayload, JobStatus, ResultItem, StatusResponse};
use crate::services::duration_estimator::LyricsAnalyzer;
use crate::utils::audio_path::{content_type_for, local_audio_file, DEFAULT_AUDIO_CONTENT_TYPE};

const USER_AGENT: &str = concat!("wrangler-ui/", env!("CARGO_PKG_VERSION"));

/// Engine client errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Engine unreachable, connection reset, or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Engine answered with a non-success status
    #[error("Engine returned {0}: {1}")]
    Status(u16, String),

    /// Engine answered with a body we cannot interpret
    #[error("Unexpected engine response: {0}")]
    Parse(String),

    /// Reading a local audio file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-call timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineTimeouts {
    pub submit: Duration,
    pub poll: Duration,
    pub audio: Duration,
    pub analyze: Duration,
}

impl From<&EngineTimeoutConfig> for EngineTimeouts {
    fn from(config: &EngineTimeoutConfig) -> Self {
        Self {
            submit: Duration::from_secs(config.submit_timeout_secs),
            poll: Duration::from_secs(config.poll_timeout_secs),
            audio: Duration::from_secs(config.audio_timeout_secs),
            analyze: Duration::from_secs(config.analyze_timeout_secs),
        }
    }
}

impl Default for EngineTimeouts {
    fn default() -> Self {
        Self::from(&EngineTimeoutConfig::default())
    }
}

/// Audio bytes plus the content type to relay
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Hints from the engine's lyric analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisHints {
    /// Suggested song length in seconds
    pub duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SubmitEnvelope {
    data: SubmitData,
}

#[derive(Debug, Deserialize)]
struct SubmitData {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    data: Vec<QueryEntry>,
}

#[derive(Debug, Deserialize)]
struct QueryEntry {
    status: i64,
    #[serde(default)]
    result: Option<Value>,
}

/// One element of the decoded `result` string
#[derive(Debug, Deserialize)]
struct EngineResultEntry {
    #[serde(default)]
    file: String,
    #[serde(default)]
    metas: Option<Value>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    lyrics: Option<String>,
}

impl From<EngineResultEntry> for ResultItem {
    fn from(entry: EngineResultEntry) -> Self {
        Self {
            audio_url: entry.file,
            meta: entry.metas,
            prompt: entry.prompt,
            lyrics: entry.lyrics,
        }
    }
}

/// Extract the task id from a `/release_task` response body
pub fn parse_submit_response(body: &[u8]) -> Result<String, EngineError> {
    let envelope: SubmitEnvelope = serde_json::from_slice(body)
        .map_err(|e| EngineError::Parse(format!("release_task body: {}", e)))?;
    Ok(envelope.data.task_id)
}

/// Decode the string-encoded `result` of a finished task
pub fn decode_results(raw: &str) -> Result<Vec<ResultItem>, EngineError> {
    let entries: Vec<EngineResultEntry> = serde_json::from_str(raw)
        .map_err(|e| EngineError::Parse(format!("result string is not a JSON list: {}", e)))?;
    Ok(entries.into_iter().map(ResultItem::from).collect())
}

/// Normalize a `/query_result` response body
pub fn parse_query_response(body: &[u8]) -> Result<StatusResponse, EngineError> {
    let envelope: QueryEnvelope = serde_json::from_slice(body)
        .map_err(|e| EngineError::Parse(format!("query_result body: {}", e)))?;
    let entry = envelope
        .data
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::Parse("query_result returned no entries".to_string()))?;

    match JobStatus::from_engine_code(entry.status) {
        Some(JobStatus::Processing) => Ok(StatusResponse::processing()),
        Some(JobStatus::Error) => Ok(StatusResponse::error()),
        Some(JobStatus::Done) => match entry.result {
            Some(Value::String(raw)) => Ok(StatusResponse::done(decode_results(&raw)?)),
            Some(other) => Err(EngineError::Parse(format!(
                "result must be a JSON-encoded string, got {}",
                json_kind(&other)
            ))),
            None => Err(EngineError::Parse("done task has no result".to_string())),
        },
        None => Err(EngineError::Parse(format!(
            "unknown task status code {}",
            entry.status
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn number_like(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Pull hints out of a `/format_input` body
///
/// The engine wraps its answer in `data` or `result`; one level is unwrapped.
pub fn parse_analysis(body: &Value) -> AnalysisHints {
    let inner = ["data", "result"]
        .iter()
        .find_map(|key| body.get(key).filter(|v| v.is_object()))
        .unwrap_or(body);

    AnalysisHints {
        duration: number_like(inner.get("duration")),
    }
}

/// Generation engine client
pub struct EngineClient {
    base_url: String,
    http_client: reqwest::Client,
    timeouts: EngineTimeouts,
}

impl EngineClient {
    pub fn new(base_url: impl Into<String>, timeouts: EngineTimeouts) -> Result<Self, EngineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| EngineError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
            timeouts,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeouts(&self) -> EngineTimeouts {
        self.timeouts
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Engine URL serving the audio at `path`
    ///
    /// Engine-relative URLs (`/v1/audio?path=...`) are used as-is; bare paths are
    /// wrapped into the engine's audio endpoint.
    pub fn audio_url(&self, path: &str) -> String {
        if path.contains('?') {
            self.url(path)
        } else {
            let encoded: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
            self.url(&format!("/v1/audio?path={}", encoded))
        }
    }

    async fn checked_bytes(response: reqwest::Response) -> Result<Vec<u8>, EngineError> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Status(status.as_u16(), error_text));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Forward the engine's own health document
    pub async fn health(&self) -> Result<Value, EngineError> {
        let response = self
            .http_client
            .get(self.url("/health"))
            .timeout(self.timeouts.poll)
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let body = Self::checked_bytes(response).await?;
        serde_json::from_slice(&body).map_err(|e| EngineError::Parse(format!("health body: {}", e)))
    }

    /// Submit a generation job, returning the engine's task id
    pub async fn submit(&self, payload: &EnginePayload) -> Result<String, EngineError> {
        tracing::debug!(
            prompt = %payload.prompt,
            batch_size = payload.batch_size,
            inference_steps = payload.inference_steps,
            "Submitting task to engine"
        );

        let response = self
            .http_client
            .post(self.url("/release_task"))
            .timeout(self.timeouts.submit)
            .json(payload)
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let body = Self::checked_bytes(response).await?;
        let task_id = parse_submit_response(&body)?;

        tracing::info!(task_id = %task_id, "Engine accepted task");
        Ok(task_id)
    }

    /// Query a task's status; results are decoded only when done
    pub async fn poll(&self, task_id: &str) -> Result<StatusResponse, EngineError> {
        let response = self
            .http_client
            .post(self.url("/query_result"))
            .timeout(self.timeouts.poll)
            .json(&json!({ "task_id_list": [task_id] }))
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let body = Self::checked_bytes(response).await?;
        let status = parse_query_response(&body)?;

        tracing::debug!(task_id = %task_id, status = ?status.status, "Polled engine");
        Ok(status)
    }

    /// Audio bytes for an engine audio location
    ///
    /// Reads the file directly when it exists on this machine, otherwise relays
    /// the engine's bytes and content type (default `audio/mpeg`).
    pub async fn fetch_audio(&self, path: &str) -> Result<AudioBytes, EngineError> {
        if let Some(local) = local_audio_file(path).await {
            let bytes = tokio::fs::read(&local).await?;
            return Ok(AudioBytes {
                content_type: content_type_for(&local),
                bytes,
            });
        }

        let response = self
            .http_client
            .get(self.audio_url(path))
            .timeout(self.timeouts.audio)
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
            .to_string();
        let bytes = Self::checked_bytes(response).await?;

        Ok(AudioBytes {
            bytes,
            content_type,
        })
    }

    /// LM analysis of lyrics; best-effort, callers fall back on failure
    pub async fn analyze(&self, lyrics: &str) -> Result<AnalysisHints, EngineError> {
        let response = self
            .http_client
            .post(self.url("/format_input"))
            .timeout(self.timeouts.analyze)
            .json(&json!({ "prompt": "", "lyrics": lyrics }))
            .send()
            .await
            .map_err(|e| EngineError::Network(e.to_string()))?;

        let body = Self::checked_bytes(response).await?;
        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| EngineError::Parse(format!("format_input body: {}", e)))?;
        Ok(parse_analysis(&value))
    }
}

#[async_trait]
impl LyricsAnalyzer for EngineClient {
    async fn suggest_duration(&self, lyrics: &str) -> anyhow::Result<Option<f64>> {
        Ok(self.analyze(lyrics).await?.duration)
    }
}
