//! Test helpers for wrangler-common

pub mod log_capture;
