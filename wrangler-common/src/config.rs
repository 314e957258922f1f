//! Bootstrap configuration loading
//!
//! Settings are resolved once at startup with the priority:
//! 1. Command-line argument (or its environment variable)
//! 2. TOML config file
//! 3. Compiled default
//!
//! A missing TOML file is never fatal: defaults apply and the returned
//! [`ConfigFileStatus`] is logged as a warning once tracing is up.
//! A TOML file that exists but cannot be parsed aborts startup.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "wrangler";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional; absent values fall through to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Listen address for the UI backend
    pub host: Option<String>,

    /// Listen port for the UI backend
    pub port: Option<u16>,

    /// Base URL of the generation engine (e.g. "http://localhost:8001")
    pub engine_url: Option<String>,

    /// Directory holding the static frontend (index.html, app.js, ...)
    pub static_dir: Option<PathBuf>,

    /// Directory where uploaded audio is stored
    pub upload_dir: Option<PathBuf>,

    /// Upper bound for a single audio upload, in bytes
    pub max_upload_bytes: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub engine: EngineTimeoutConfig,

    #[serde(default)]
    pub lyrics: LyricsPollConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Per-call timeouts for the generation engine, in seconds
///
/// Submission gets the longest budget, polling the shortest.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineTimeoutConfig {
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
    #[serde(default = "default_audio_timeout")]
    pub audio_timeout_secs: u64,
    #[serde(default = "default_analyze_timeout")]
    pub analyze_timeout_secs: u64,
}

impl Default for EngineTimeoutConfig {
    fn default() -> Self {
        Self {
            submit_timeout_secs: default_submit_timeout(),
            poll_timeout_secs: default_poll_timeout(),
            audio_timeout_secs: default_audio_timeout(),
            analyze_timeout_secs: default_analyze_timeout(),
        }
    }
}

/// Bounded polling used by the lyrics long-poll endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct LyricsPollConfig {
    #[serde(default = "default_lyrics_interval")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_lyrics_attempts")]
    pub max_attempts: u32,
}

impl Default for LyricsPollConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_lyrics_interval(),
            max_attempts: default_lyrics_attempts(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_submit_timeout() -> u64 {
    30
}

fn default_poll_timeout() -> u64 {
    10
}

fn default_audio_timeout() -> u64 {
    60
}

fn default_analyze_timeout() -> u64 {
    15
}

fn default_lyrics_interval() -> u64 {
    2000
}

fn default_lyrics_attempts() -> u32 {
    300 // 300 x 2s = 10 min
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Command-line argument or its environment variable
    Argument,
    /// TOML config file
    Toml,
    /// Compiled default
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::Argument => "command line/environment",
            ConfigSource::Toml => "TOML config",
            ConfigSource::Default => "compiled default",
        };
        f.write_str(name)
    }
}

/// Pick the highest-priority value among argument, TOML and default
pub fn resolve_setting<T>(argument: Option<T>, toml: Option<T>, default: T) -> (T, ConfigSource) {
    if let Some(value) = argument {
        return (value, ConfigSource::Argument);
    }
    if let Some(value) = toml {
        return (value, ConfigSource::Toml);
    }
    (default, ConfigSource::Default)
}

/// Default config file path for the platform, e.g. `~/.config/wrangler/<file_name>`
pub fn default_config_path(file_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(file_name))
}

/// What `load_toml_config` found at the config path
///
/// Loading runs before the tracing subscriber exists (the file carries the log
/// level), so the outcome is returned and logged by the caller afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFileStatus {
    /// File read and parsed
    Loaded(PathBuf),
    /// No file at the path; built-in defaults apply
    Missing(PathBuf),
}

impl ConfigFileStatus {
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigFileStatus::Missing(_))
    }

    /// Report the outcome: `info` when loaded, `warn` when missing
    pub fn log(&self) {
        match self {
            ConfigFileStatus::Loaded(path) => {
                info!("Loaded config from {}", path.display());
            }
            ConfigFileStatus::Missing(path) => {
                warn!(
                    "Config file not found at {}, using built-in defaults",
                    path.display()
                );
            }
        }
    }
}

/// Load the TOML bootstrap config
///
/// Missing file → defaults + `ConfigFileStatus::Missing`.
/// Unreadable or malformed file → `Error::Config`.
pub fn load_toml_config(path: &Path) -> Result<(TomlConfig, ConfigFileStatus)> {
    if !path.exists() {
        return Ok((
            TomlConfig::default(),
            ConfigFileStatus::Missing(path.to_path_buf()),
        ));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    Ok((config, ConfigFileStatus::Loaded(path.to_path_buf())))
}
