//! daily-puzzle server entry point.
//!
//! Loads configuration, opens the configured storage backend, seeds the
//! puzzle catalog, and starts the Axum HTTP server with REST and
//! WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use daily_puzzle::api;
use daily_puzzle::app_state::AppState;
use daily_puzzle::catalog;
use daily_puzzle::config::{PuzzleConfig, StorageBackend};
use daily_puzzle::domain::EventBus;
use daily_puzzle::repository::{InMemoryRepository, PostgresRepository, Repository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = PuzzleConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.storage_backend,
        "starting daily-puzzle"
    );

    // Build storage layer
    let repository: Arc<dyn Repository> = match config.storage_backend {
        StorageBackend::Memory => Arc::new(InMemoryRepository::new()),
        StorageBackend::Postgres => Arc::new(PostgresRepository::connect(&config).await?),
    };

    // Seed the catalog
    let puzzles = catalog::load_catalog(config.catalog_path.as_deref()).await?;
    catalog::seed(repository.as_ref(), puzzles).await?;

    // Build application state
    let event_bus = EventBus::new(config.event_bus_capacity);
    let app = api::build_app(
        AppState::new(repository, event_bus),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
