mod accounts;
mod assessment;
mod config;
mod cv;
mod errors;
mod locks;
mod models;
mod recommendations;
mod reporting;
mod routes;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::locks::UserLocks;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{JsonStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aptitude API v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config).await?;

    tokio::fs::create_dir_all(&config.uploads_dir)
        .await
        .with_context(|| format!("Could not create {}", config.uploads_dir.display()))?;

    let state = AppState {
        store,
        config: config.clone(),
        locks: UserLocks::new(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Opens the configured persistence backend, seeding it on first use.
async fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.storage_backend {
        StorageBackend::Json => {
            let store = JsonStore::open(&config.data_dir).await?;
            info!("Using JSON store at {}", store.dir().display());
            Ok(Arc::new(store))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let store = PgStore::connect(url).await?;
            Ok(Arc::new(store))
        }
    }
}
