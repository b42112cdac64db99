//! HTTP server module
//!
//! Four routes: `GET /` (liveness), `POST /upload`, `POST /train` and
//! `POST /predict`. Uploaded CSVs live in one directory, the artifact
//! set of the last training run in another.

mod api;
mod error;
mod handlers;
mod state;
pub mod uploads;

pub use api::create_router;
pub use error::{ServerError, PREDICTION_FAILED};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

pub const DEFAULT_UPLOAD_DIR: &str = "data/uploads";
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub models_dir: String,
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string()),
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| DEFAULT_MODELS_DIR.to_string()),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16 * 1024 * 1024), // 16MB
        }
    }
}

/// Start the server with the given configuration
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        upload_dir = %config.upload_dir,
        models_dir = %config.models_dir,
        "Initializing server directories"
    );

    std::fs::create_dir_all(&config.upload_dir)?;
    std::fs::create_dir_all(&config.models_dir)?;

    let state = Arc::new(AppState::new(config.clone()));
    if state.store.model_path().exists() {
        info!(model = %state.store.model_path().display(), "Serving previously trained model");
    } else {
        info!("No trained model yet, /predict answers 404 until /train succeeds");
    }
    let app = create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        started_at = %start_time.to_rfc3339(),
        pid = std::process::id(),
        "Server listening"
    );

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, stopping server");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        if std::env::var("API_PORT").is_err() {
            assert_eq!(config.port, 5000);
        }
        if std::env::var("MODELS_DIR").is_err() {
            assert_eq!(config.models_dir, "models");
        }
    }
}
