//! Segline API - User Segmentation Service
//!
//! HTTP service that creates and deletes segments, links users to them, and
//! answers membership queries. Storage is either in memory or SQLite, chosen
//! by configuration.

mod config;
mod dto;
mod handlers;
mod logging;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use segline_domain::SegmentService;
use segline_store::SegmentStore;
use tracing::{error, info};

use crate::config::{AppConfig, StorageBackend};

#[derive(Parser, Debug)]
#[command(name = "segline-api")]
#[command(about = "Assigns users to named segments and answers membership queries")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file; defaults apply when it does not exist
    #[arg(long, env = "SEGLINE_CONFIG_PATH", default_value = "configs/segline.toml")]
    config_path: PathBuf,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub segment_service: Arc<SegmentService<SegmentStore>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config_path)?;

    logging::init_logger(&config.log_level, config.log_format)?;

    info!(
        config_path = %cli.config_path.display(),
        bind_addr = %config.bind_addr,
        backend = ?config.storage.backend,
        "Starting Segline API"
    );

    let store = match config.storage.backend {
        StorageBackend::Memory => SegmentStore::in_memory(),
        StorageBackend::Sqlite => SegmentStore::sqlite(&config.storage.database_url)
            .with_context(|| {
                format!("failed to open SQLite store at {}", config.storage.database_url)
            })?,
    };
    info!(backend = store.backend_name(), "Initialized segment storage");

    let state = AppState {
        segment_service: Arc::new(SegmentService::new(store)),
    };

    // Build HTTP router
    let app = routes::create_router(state);

    info!(addr = %config.bind_addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            error!(error = %err, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
