//! Pinyin Burn Server
//!
//! An HTTP service that takes a video and an SRT subtitle, renders the
//! subtitle as an ASS script with a pinyin reading line above each caption,
//! and burns both tracks into the video with FFmpeg.

mod burn;
mod config;
mod config_file;
mod error;
mod ffmpeg;
mod http;
#[cfg(test)]
mod integration;
mod metrics;
mod state;
mod subtitle;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;
use crate::error::{BurnError, Result};
use crate::http::create_router;
use crate::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
const APP_NAME: &str = "pinyin-burn-server";

#[tokio::main]
async fn main() -> Result<()> {
    // `--generate-config [path]` writes a default config file and exits
    let mut args = std::env::args().skip(1);
    let first = args.next();
    if first.as_deref() == Some("--generate-config") {
        let path = args.next().unwrap_or_else(|| "config.toml".to_string());
        crate::config_file::generate_default_config(&path)
            .map_err(|e| BurnError::Config(format!("Failed to write {}: {}", path, e)))?;
        println!("Wrote default configuration to {}", path);
        return Ok(());
    }

    // Load configuration
    let config_path = first.unwrap_or_else(|| "config.toml".to_string());
    let (config, load_error) = if std::path::Path::new(&config_path).exists() {
        match crate::config_file::ConfigFile::from_file(&config_path) {
            Ok(cf) => (cf.into_server_config(), None),
            Err(e) => (ServerConfig::default(), Some(e.to_string())),
        }
    } else {
        (ServerConfig::default(), None)
    };

    // Initialize logging
    init_logging(&config);

    tracing::info!("{} v{} starting", APP_NAME, VERSION);
    if let Some(e) = load_error {
        tracing::warn!(
            "Failed to load config file {}: {}. Using defaults.",
            config_path,
            e
        );
    }
    tracing::info!("Configuration loaded: {:?}", config);

    // Create application state
    let state = Arc::new(AppState::new(config.clone()));

    match state.encoder.version().await {
        Ok(version) => tracing::info!("FFmpeg version: {}", version),
        Err(e) => tracing::warn!("FFmpeg not usable, burn requests will fail: {}", e),
    }

    let fonts_dir = state.fonts_dir();
    if !fonts_dir.is_dir() {
        tracing::warn!("Font directory {} does not exist", fonts_dir.display());
    }

    let upload_dir = state.upload_dir();
    tokio::fs::create_dir_all(&upload_dir).await?;
    tracing::info!("Upload directory: {}", upload_dir.display());

    // Build router
    let app = create_router(state.clone());

    // Start server
    let addr: SocketAddr = config
        .socket_addr()
        .parse()
        .map_err(|e| BurnError::Config(format!("Invalid listen address: {}", e)))?;
    tracing::info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initialize logging with tracing
fn init_logging(config: &ServerConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("pinyin_burn_server={},tower_http=debug", config.log_level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
