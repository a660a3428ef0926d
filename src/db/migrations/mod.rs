use anyhow::Result;
use sqlx::{Executor, PgPool};
use tracing::info;

const CREATE_KEY_VALUE_STORE: &str = r#"
CREATE TABLE IF NOT EXISTS key_value_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Create the tables the postgres store needs; safe to run repeatedly
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    pool.execute(CREATE_KEY_VALUE_STORE).await?;
    info!("Applied migration: key_value_store");

    Ok(())
}
