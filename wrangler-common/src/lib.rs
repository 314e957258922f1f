//! # Wrangler Common Library
//!
//! Shared code for the Wrangler services:
//! - Common error type
//! - TOML bootstrap configuration loading
//! - Configuration tier resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
