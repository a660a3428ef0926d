use crate::config::{StorageBackend, StorageConfig};
use crate::error::Error;
use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub mod migrations;
pub mod models;
pub mod repositories;
pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore, PgStore};

/// Open the configured store backend, running migrations for postgres
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory store; schedules and logs are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            info!("Using file store at {:?}", config.path);
            Ok(Arc::new(FileStore::open(&config.path).await?))
        }
        StorageBackend::Postgres => {
            if config.max_connections == 0 {
                return Err(Error::Config("storage.max_connections must be at least 1".to_string()).into());
            }

            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(5))
                .connect(&config.database_url)
                .await
                .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

            info!("Connected to PostgreSQL database");

            migrations::run_migrations(&pool).await?;
            Ok(Arc::new(PgStore::new(Arc::new(pool))))
        }
    }
}
