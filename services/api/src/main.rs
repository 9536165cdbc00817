//! Parcel tracking API server.
//!
//! Serves the parcel REST API, the printable labels and, optionally, the
//! pre-built browser client.

use std::sync::Arc;

use anyhow::Result;
use parcel_api::{
    api,
    config::{self, StoreKind},
    db::{Database, MemoryParcelStore, ParcelStore},
    state::AppState,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real environment variables win.
    let dotenv = dotenvy::dotenv();

    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to PARCEL_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting parcel API server");
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to read .env file"),
    }
    info!(
        listen_addr = %config.listen_addr,
        store = ?config.store,
        "Configuration loaded"
    );

    let codec = config.codec.build()?;

    // Open the parcel store
    let (store, db): (Arc<dyn ParcelStore>, Option<Database>) = match config.store {
        StoreKind::Postgres => {
            let db = match Database::connect(&config.database).await {
                Ok(db) => {
                    info!("Database connection established");
                    db
                }
                Err(e) => {
                    error!(error = %e, "Failed to connect to database");
                    return Err(e.into());
                }
            };

            // Run migrations in dev mode
            if config.dev_mode {
                info!("Running database migrations (dev mode)");
                if let Err(e) = db.run_migrations().await {
                    error!(error = %e, "Failed to run migrations");
                    return Err(e.into());
                }
            }

            let store: Arc<dyn ParcelStore> = Arc::new(db.parcel_store());
            (store, Some(db))
        }
        StoreKind::Memory => {
            warn!("Using in-memory parcel store; data is lost on exit");
            let store: Arc<dyn ParcelStore> = Arc::new(MemoryParcelStore::new());
            (store, None)
        }
    };

    // Create application state
    let state = AppState::new(store, codec);

    // Build and run the server
    if let Some(dir) = &config.static_dir {
        info!(static_dir = %dir.display(), "Serving static client bundle");
    }
    let app = api::create_router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Listening for connections");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Received shutdown signal");
        })
        .await;

    if let Err(e) = &result {
        error!(error = %e, "Server error");
    }

    if let Some(db) = db {
        db.close().await;
    }

    info!("Parcel API server shutdown complete");
    result.map_err(Into::into)
}
