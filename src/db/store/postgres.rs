use super::KeyValueStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Key-value store backed by the `key_value_store` table
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    /// Create a store over an existing pool; the table must already exist
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM key_value_store
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to read key {}: {}", key, e)))?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to write key {}: {}", key, e)))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM key_value_store
            WHERE key = $1
            "#,
        )
        .bind(key)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Storage(format!("Failed to remove key {}: {}", key, e)))?;

        Ok(())
    }
}
