//! API service binary.
//!
//! Configuration comes from the environment:
//!
//! - `ECTD_ROOT` — submission root directory (default `./submissions`)
//! - `ECTD_BIND` — listen address (default `127.0.0.1:8080`)
//! - `ECTD_REGIONS_CONFIG` — optional region rule YAML
//! - `RUST_LOG` — tracing filter (default `info`)

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use ectd_api::{app, AppConfig, AppState};
use ectd_assembler::InMemoryDocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let root = PathBuf::from(std::env::var("ECTD_ROOT").unwrap_or_else(|_| "./submissions".into()));
    std::fs::create_dir_all(&root)?;
    let regions_config = std::env::var("ECTD_REGIONS_CONFIG").ok().map(PathBuf::from);
    let bind = std::env::var("ECTD_BIND").unwrap_or_else(|_| "127.0.0.1:8080".into());

    let state = AppState::in_memory(
        AppConfig {
            root: root.clone(),
            regions_config,
        },
        Arc::new(InMemoryDocumentStore::new()),
    );

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, root = %root.display(), "ectd-api listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
