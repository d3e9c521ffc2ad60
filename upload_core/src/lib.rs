//! Core library for the file upload server: multipart upload handling,
//! content sniffing, on-disk storage and the static file route.

pub mod config;
pub mod error;
pub mod files;
pub mod handlers;
pub mod middleware;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use files::{FileManager, FileManagerConfig, FileUpload, FileValidator, StoredFile};
pub use handlers::routes::create_routes;

use axum::Router;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub file_manager: FileManager,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FileManager::with_default_config())
    }
}

impl AppState {
    pub fn new(file_manager: FileManager) -> Self {
        Self { file_manager }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(FileManager::new(FileManagerConfig::from(&config.uploads)))
    }
}

pub fn create_app(state: AppState) -> Router {
    middleware::logging::with_logging(create_routes(&state)).with_state(state)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        "Server started on {}, use /upload for uploading files and /files/{{fileName}} for downloading",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
