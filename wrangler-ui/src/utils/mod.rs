//! Utility modules for wrangler-ui

pub mod audio_path;
pub mod poll_retry;
