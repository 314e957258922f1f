//! Data models for wrangler-ui
//!
//! - Generation requests (friendly UI parameters) and the engine wire payload
//! - Job status and normalized results
//! - Duration/section estimate requests and responses

pub mod estimate;
pub mod generation;
pub mod job;

pub use estimate::{
    DurationEstimate, EstimateDurationRequest, EstimateSectionsRequest, EstimationMethod,
    SectionEstimate, SectionsResponse,
};
pub use generation::{EnginePayload, GenerateLyricsRequest, GenerateLyricsResponse, GenerationRequest};
pub use job::{JobStatus, ResultItem, StatusResponse, TaskCreated, UploadResponse};
