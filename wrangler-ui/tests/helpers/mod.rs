//! Test helpers: an in-process fake generation engine and app builders

#![allow(dead_code)]

pub mod log_capture;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wrangler_ui::config::UiConfig;
use wrangler_ui::services::{EngineClient, EngineTimeouts, UploadStore};
use wrangler_ui::AppState;

/// Bytes served by the fake engine's audio endpoint
pub const FAKE_AUDIO: &[u8] = b"ID3-fake-audio-bytes";

/// How the fake engine answers `/query_result`
#[derive(Debug, Clone)]
pub enum Outcome {
    /// status 1 with these entries string-encoded into `result`
    Done(Value),
    /// status 2
    Failed,
}

#[derive(Debug, Clone)]
pub struct Behavior {
    /// `/query_result` calls answered with status 0 before the outcome
    pub pending_polls: usize,
    pub outcome: Outcome,
    /// `/format_input` body
    pub analysis: Value,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            pending_polls: 0,
            outcome: Outcome::Done(default_results()),
            analysis: json!({ "data": { "duration": 187.0, "bpm": 92 } }),
        }
    }
}

/// Two results with bare paths that do not exist locally
pub fn default_results() -> Value {
    json!([
        {
            "file": "/nonexistent/wrangler-test/out_0.mp3",
            "metas": { "bpm": 120, "keyscale": "C major", "duration": 30 }
        },
        {
            "file": "/v1/audio?path=%2Fnonexistent%2Fwrangler-test%2Fout_1.mp3",
            "metas": { "bpm": 120, "keyscale": "C major", "duration": 30 }
        }
    ])
}

#[derive(Debug)]
struct FakeState {
    behavior: Behavior,
    query_calls: AtomicUsize,
    next_task: AtomicUsize,
    submissions: Mutex<Vec<Value>>,
}

/// Handle to a running fake engine
#[derive(Clone)]
pub struct FakeEngine {
    pub url: String,
    state: Arc<FakeState>,
}

impl FakeEngine {
    pub async fn start(behavior: Behavior) -> Self {
        let state = Arc::new(FakeState {
            behavior,
            query_calls: AtomicUsize::new(0),
            next_task: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/release_task", post(release_task))
            .route("/query_result", post(query_result))
            .route("/format_input", post(format_input))
            .route("/v1/audio", get(audio))
            .route("/health", get(health))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    pub fn query_calls(&self) -> usize {
        self.state.query_calls.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }
}

async fn release_task(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    state.submissions.lock().unwrap().push(body);
    let n = state.next_task.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": { "task_id": format!("a1b2c3d4e5f6-task-{}", n) } }))
}

async fn query_result(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Json<Value> {
    assert!(body["task_id_list"].is_array(), "engine expects task_id_list");
    let call = state.query_calls.fetch_add(1, Ordering::SeqCst);

    if call < state.behavior.pending_polls {
        return Json(json!({ "data": [{ "status": 0 }] }));
    }
    match &state.behavior.outcome {
        Outcome::Done(results) => Json(json!({
            "data": [{ "status": 1, "result": results.to_string() }]
        })),
        Outcome::Failed => Json(json!({ "data": [{ "status": 2 }] })),
    }
}

async fn format_input(State(state): State<Arc<FakeState>>) -> Json<Value> {
    Json(state.behavior.analysis.clone())
}

async fn audio() -> (StatusCode, [(&'static str, &'static str); 1], &'static [u8]) {
    (StatusCode::OK, [("content-type", "audio/mpeg")], FAKE_AUDIO)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "engine": "fake" }))
}

/// URL where nothing is listening
pub async fn dead_engine_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// App state pointing at `engine_url`, uploads under `upload_dir`
pub fn test_state(config: UiConfig, upload_dir: &std::path::Path) -> AppState {
    let engine = EngineClient::new(config.engine_url.clone(), EngineTimeouts::default()).unwrap();
    let uploads = UploadStore::new(upload_dir.to_path_buf()).unwrap();
    AppState::new(config, engine, uploads)
}

/// Send one request through the router, returning status, headers and body
pub async fn send(
    app: &Router,
    request: Request<Body>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}
