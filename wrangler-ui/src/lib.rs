//! wrangler-ui library interface
//!
//! UI backend in front of the generation engine: maps friendly parameters to
//! the engine schema, submits and polls jobs, keeps finished results for
//! download, and proxies audio to the browser.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::UiConfig;
use crate::services::{EngineClient, EngineError, JobStore, UploadStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved startup configuration
    pub config: Arc<UiConfig>,
    /// Generation engine client
    pub engine: Arc<EngineClient>,
    /// Pending and completed jobs
    pub jobs: JobStore,
    /// Uploaded rework sources
    pub uploads: UploadStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: UiConfig, engine: EngineClient, uploads: UploadStore) -> Self {
        Self {
            config: Arc::new(config),
            engine: Arc::new(engine),
            jobs: JobStore::new(),
            uploads,
            startup_time: Utc::now(),
        }
    }

    /// Build engine client and upload store from configuration
    pub fn from_config(config: UiConfig) -> Result<Self, EngineError> {
        let engine = EngineClient::new(config.engine_url.clone(), config.timeouts())?;
        let uploads = match &config.upload_dir {
            Some(dir) => UploadStore::new(dir.clone())?,
            None => UploadStore::in_temp_dir()?,
        };
        Ok(Self::new(config, engine, uploads))
    }
}

/// Build application router
///
/// API routes first; the static frontend (if configured) is the fallback.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    let app = Router::new()
        .merge(api::generation_routes())
        .merge(api::audio_routes())
        .merge(api::estimate_routes())
        .merge(api::upload_routes(max_upload_bytes))
        .merge(api::health_routes())
        .with_state(state);

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    // Outermost, so static fallback requests get spans too
    app.layer(TraceLayer::new_for_http())
}
