//! Services for wrangler-ui
//!
//! - Engine client (HTTP to the generation engine)
//! - Parameter mapping and duration/section estimation (pure)
//! - Job and upload stores (in-memory)

pub mod duration_estimator;
pub mod engine_client;
pub mod job_store;
pub mod parameter_mapper;
pub mod upload_store;

pub use duration_estimator::{estimate_duration, estimate_sections, heuristic_seconds, LyricsAnalyzer};
pub use engine_client::{AnalysisHints, AudioBytes, EngineClient, EngineError, EngineTimeouts};
pub use job_store::{CompletedJob, JobStore, PendingJob, ResultLookup};
pub use parameter_mapper::map_request;
pub use upload_store::{UploadRecord, UploadStore};
