//! wrangler-ui - UI backend for the music generation engine
//!
//! Serves the browser UI, translates its friendly parameters to the engine
//! schema and proxies jobs and audio to the engine API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wrangler_common::config::{default_config_path, load_toml_config, TomlConfig};
use wrangler_ui::config::{ArgOverrides, UiConfig, CONFIG_FILE_NAME};
use wrangler_ui::{build_router, AppState};

/// Command-line arguments for wrangler-ui
#[derive(Parser, Debug)]
#[command(name = "wrangler-ui")]
#[command(about = "UI backend for the music generation engine")]
#[command(version)]
struct Args {
    /// Interface to bind
    #[arg(long, env = "WRANGLER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WRANGLER_PORT")]
    port: Option<u16>,

    /// Base URL of the generation engine API
    #[arg(long, env = "ACESTEP_API_URL")]
    engine_url: Option<String>,

    /// Directory with the built frontend
    #[arg(long, env = "WRANGLER_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Where uploaded rework sources are stored
    #[arg(long, env = "WRANGLER_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "WRANGLER_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ArgOverrides {
        ArgOverrides {
            host: self.host.clone(),
            port: self.port,
            engine_url: self.engine_url.clone(),
            static_dir: self.static_dir.clone(),
            upload_dir: self.upload_dir.clone(),
        }
    }
}

fn init_tracing(level: &str) {
    let fallback = format!(
        "wrangler_ui={level},wrangler_common={level},tower_http={level}",
        level = level
    );
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(|| default_config_path(CONFIG_FILE_NAME));
    let (toml_config, config_status) = match &config_path {
        Some(path) => {
            let (config, status) = load_toml_config(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (config, Some(status))
        }
        None => (TomlConfig::default(), None),
    };

    // RUST_LOG wins over the config file
    init_tracing(&toml_config.logging.level);

    info!(
        "Starting wrangler-ui v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_status {
        Some(status) => status.log(),
        None => warn!("No platform config directory, using built-in defaults"),
    }

    let config = UiConfig::resolve(args.overrides(), toml_config);
    let addr = config.listen_addr();
    match &config.static_dir {
        Some(dir) => info!("Serving frontend from {}", dir.display()),
        None => info!("No static dir configured, API only"),
    }

    let state = AppState::from_config(config).context("Failed to initialize engine client")?;
    info!("Uploads stored in {}", state.uploads.dir().display());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
