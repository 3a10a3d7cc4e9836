//! Embedded scan service: axum router over the vulnerability store

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::post;
use tokio::signal;

use crate::config::ServeConfig;
use crate::error::Result;
use crate::store::VulnStore;

pub mod ingest;
pub mod routes;

use ingest::RepoWorkspace;

/// Shared state for the route handlers
pub struct AppState {
    /// rusqlite connection behind a lock; handlers reach it via spawn_blocking
    pub store: Mutex<VulnStore>,
    pub workspace: RepoWorkspace,
}

impl AppState {
    pub fn new(database_path: &Path, clone_dir: &Path) -> Result<Self> {
        Ok(Self {
            store: Mutex::new(VulnStore::open(database_path)?),
            workspace: RepoWorkspace::new(clone_dir),
        })
    }
}

/// Build the service router
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/scan", post(routes::scan_repo))
        .route("/query", post(routes::query_data))
        .with_state(state)
}

/// Run the service until ctrl-c
pub async fn run(config: &ServeConfig) -> Result<()> {
    let state = Arc::new(AppState::new(
        Path::new(&config.database_path),
        Path::new(&config.clone_dir),
    )?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Scan service listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}
