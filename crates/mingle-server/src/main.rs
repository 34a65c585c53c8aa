//! # mingle-server
//!
//! Development relay + upload server for the Mingle client stack.
//!
//! This binary provides:
//! - **WebSocket relay** implementing the named-event protocol against
//!   in-memory world state (messages, posts, profiles, relationships)
//! - **Media upload** (`POST /upload`, multipart) with files served back
//!   under `/files/{name}`
//! - **REST API** (axum) for health checks

mod api;
mod config;
mod error;
mod media_store;
mod relay;
mod world;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::media_store::MediaStore;
use crate::relay::RelayHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mingle_server=debug")),
        )
        .init();

    info!("Starting Mingle dev server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Media store (creates directory if missing)
    let media = Arc::new(
        MediaStore::new(config.upload_dir.clone(), config.max_upload_size).await?,
    );

    // Relay hub holding the in-memory world
    let hub = Arc::new(RelayHub::new());

    let addr = config.http_addr;
    let state = AppState {
        media,
        hub,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Serve
    // -----------------------------------------------------------------------
    api::serve(state, addr).await
}
