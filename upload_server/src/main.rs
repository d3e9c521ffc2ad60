//! Main entry point for the upload server binary

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use upload_core::{create_app, run_server, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Upload server v{}", env!("CARGO_PKG_VERSION"));
    info!("Server will bind to: {}", config.bind_address());
    info!(
        "Uploads go to {} (limit {} bytes, allowed types: {})",
        config.uploads.upload_dir.display(),
        config.uploads.max_upload_bytes,
        config.uploads.allowed_content_types.join(", ")
    );

    config.create_directories().context("Failed to create upload directory")?;
    let addr: SocketAddr = config.bind_address().parse().context("Invalid bind address")?;

    let state = AppState::from_config(&config);
    state.file_manager.initialize().await?;

    run_server(create_app(state), addr).await?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins; otherwise debug builds log at debug and release at info.
fn default_filter() -> EnvFilter {
    let level = if cfg!(debug_assertions) { "debug" } else { "info" };
    EnvFilter::new(format!("server={level},upload_core={level},tower_http=info"))
}

/// `LOG_FORMAT=json` switches to one JSON object per line.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json().with_target(true)).init();
    } else {
        registry.with(fmt::layer().compact().with_target(true)).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_both_crates() {
        let filter = default_filter().to_string();
        assert!(filter.contains("server="));
        assert!(filter.contains("upload_core="));
        assert!(filter.contains("tower_http=info"));
    }
}
