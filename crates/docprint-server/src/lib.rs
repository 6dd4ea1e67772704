//! # docprint-server
//!
//! HTTP front end for the generation cache.
//!
//! - `POST /api/pdf/generate` takes a JSON transaction request and returns
//!   the PDF, rendering it only if no document with the same fingerprint is
//!   stored yet
//! - `GET /api/pdf/{fingerprint}` returns a stored document
//! - `GET /health` is a liveness check

pub mod config;
pub mod errors;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use docprint::{ArtifactStore, Assembler, MemoryStore, PdfAssembler, SqliteStore};
use tokio::net::TcpListener;

pub use config::{CliArgs, Settings, StorageSettings};
pub use routes::{router, AppState};

/// Open the configured store and wire it to the PDF assembler.
pub fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let store: Arc<dyn ArtifactStore> = match &settings.storage {
        StorageSettings::Memory => {
            tracing::warn!("using in-memory store, documents are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageSettings::Sqlite { path } => {
            let store = SqliteStore::open(path)
                .with_context(|| format!("failed to open store at {}", path.display()))?;
            tracing::info!(path = %path.display(), "opened artifact store");
            Arc::new(store)
        }
    };
    let assembler: Arc<dyn Assembler> = Arc::new(PdfAssembler::new());

    Ok(AppState::new(store, assembler, settings.cache.clone()))
}

/// Serve until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let state = build_state(&settings)?;
    let app = router(state, settings.server.max_body_bytes);

    let listener = TcpListener::bind(settings.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(addr = %local_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
