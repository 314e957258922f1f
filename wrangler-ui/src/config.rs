//! Startup configuration for wrangler-ui
//!
//! Resolves every bootstrap setting from command line/environment, then the
//! TOML file, then compiled defaults, and logs where the engine URL came from.

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use wrangler_common::config::{resolve_setting, EngineTimeoutConfig, LyricsPollConfig, TomlConfig};

use crate::services::EngineTimeouts;
use crate::utils::poll_retry::PollPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8001";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Config file name under the platform config dir
pub const CONFIG_FILE_NAME: &str = "wrangler-ui.toml";

/// Values supplied on the command line (or their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ArgOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub engine_url: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub host: String,
    pub port: u16,
    pub engine_url: String,
    /// Static frontend; `None` disables static serving
    pub static_dir: Option<PathBuf>,
    /// Upload directory; `None` means a fresh dir under the system temp dir
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub log_level: String,
    pub engine_timeouts: EngineTimeoutConfig,
    pub lyrics_poll: LyricsPollConfig,
}

impl UiConfig {
    pub fn resolve(args: ArgOverrides, toml: TomlConfig) -> Self {
        let (host, _) = resolve_setting(args.host, toml.host, DEFAULT_HOST.to_string());
        let (port, _) = resolve_setting(args.port, toml.port, DEFAULT_PORT);
        let (engine_url, engine_source) =
            resolve_setting(args.engine_url, toml.engine_url, DEFAULT_ENGINE_URL.to_string());
        let static_dir = args.static_dir.or(toml.static_dir);
        let upload_dir = args.upload_dir.or(toml.upload_dir);

        info!("Engine URL {} (from {})", engine_url, engine_source);

        Self {
            host,
            port,
            engine_url,
            static_dir,
            upload_dir,
            max_upload_bytes: toml.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_level: toml.logging.level,
            engine_timeouts: toml.engine,
            lyrics_poll: toml.lyrics,
        }
    }

    /// Defaults throughout, pointing at `engine_url`
    pub fn for_engine(engine_url: impl Into<String>) -> Self {
        Self::resolve(
            ArgOverrides {
                engine_url: Some(engine_url.into()),
                ..Default::default()
            },
            TomlConfig::default(),
        )
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeouts(&self) -> EngineTimeouts {
        EngineTimeouts::from(&self.engine_timeouts)
    }

    pub fn lyrics_poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.lyrics_poll.poll_interval_ms),
            self.lyrics_poll.max_attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_beats_toml() {
        let toml = TomlConfig {
            port: Some(9000),
            engine_url: Some("http://toml:8001".into()),
            ..Default::default()
        };
        let args = ArgOverrides {
            engine_url: Some("http://cli:8001".into()),
            ..Default::default()
        };

        let config = UiConfig::resolve(args, toml);
        assert_eq!(config.engine_url, "http://cli:8001");
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_defaults() {
        let config = UiConfig::resolve(ArgOverrides::default(), TomlConfig::default());
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.engine_url, DEFAULT_ENGINE_URL);
        assert!(config.static_dir.is_none());
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.lyrics_poll_policy().budget(), Duration::from_secs(600));
    }
}
