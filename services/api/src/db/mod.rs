//! Database layer for the parcel API.
//!
//! This module provides:
//! - Connection pool management
//! - The [`ParcelStore`] contract used by the HTTP handlers
//! - A Postgres-backed store and an in-process store
//!
//! The Postgres layer uses SQLx.

mod error;
mod memory;
mod parcels;

pub use error::DbError;
pub use memory::MemoryParcelStore;
pub use parcels::PgParcelStore;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::parcel::{NewParcel, Parcel, ParcelId, ParcelPatch};

/// Persistence operations for parcels.
///
/// Every operation touches a single row. Concurrent updates of the same row
/// are last-write-wins.
#[async_trait]
pub trait ParcelStore: Send + Sync {
    /// Persist a new parcel, stamping its arrival time with the current time.
    async fn create(&self, parcel: NewParcel) -> Result<Parcel, DbError>;

    /// Fetch a parcel by row id.
    async fn find_by_id(&self, id: ParcelId) -> Result<Option<Parcel>, DbError>;

    /// Fetch all parcels, newest arrival first.
    async fn list_all(&self) -> Result<Vec<Parcel>, DbError>;

    /// Apply the present fields of `patch`. Returns `None` if the row is absent.
    async fn update(&self, id: ParcelId, patch: ParcelPatch) -> Result<Option<Parcel>, DbError>;

    /// Delete a parcel. Returns false if the row was absent.
    async fn delete(&self, id: ParcelId) -> Result<bool, DbError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<(), DbError>;
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL.
    pub database_url: String,

    /// Maximum number of connections in the pool.
    pub max_connections: u32,

    /// Minimum number of idle connections.
    pub min_connections: u32,

    /// Connection acquire timeout.
    pub acquire_timeout: Duration,

    /// Idle connection timeout.
    pub idle_timeout: Duration,

    /// Maximum lifetime of a connection.
    pub max_lifetime: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/parcels".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl DbConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/parcels".to_string());

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        let min_connections = std::env::var("DB_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        Self {
            database_url,
            max_connections,
            min_connections,
            ..Default::default()
        }
    }
}

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to database"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .connect(&config.database_url)
            .await
            .map_err(DbError::Connect)?;

        info!("Database connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations.
    ///
    /// Migrations are loaded at runtime from the first directory that exists.
    pub async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        let candidates = vec![
            std::path::PathBuf::from("./migrations"),
            std::path::PathBuf::from("services/api/migrations"),
            std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations"),
        ];
        let mut last_error: Option<sqlx::migrate::MigrateError> = None;

        for dir in &candidates {
            match sqlx::migrate::Migrator::new(dir.clone()).await {
                Ok(migrator) => {
                    info!(migrations_dir = %dir.display(), "Loaded migrations");
                    migrator.run(&self.pool).await.map_err(DbError::Migration)?;
                    info!("Database migrations complete");
                    return Ok(());
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        let tried = candidates
            .iter()
            .map(|dir| dir.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Err(DbError::MigrationDirNotFound {
            tried,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        })
    }

    /// Get a parcel store handle.
    pub fn parcel_store(&self) -> PgParcelStore {
        PgParcelStore::new(self.pool.clone())
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.database_url.ends_with("/parcels"));
    }
}
