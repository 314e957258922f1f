//! HTTP API handlers for wrangler-ui

pub mod audio;
pub mod estimate;
pub mod generation;
pub mod health;
pub mod upload;

pub use audio::audio_routes;
pub use estimate::estimate_routes;
pub use generation::generation_routes;
pub use health::health_routes;
pub use upload::upload_routes;
