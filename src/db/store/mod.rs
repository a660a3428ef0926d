use crate::error::Result;
use async_trait::async_trait;

pub mod file;
pub mod memory;
pub mod postgres;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Durable string blob storage keyed by fixed names.
///
/// Writes replace the whole value for a key; concurrent writers are
/// last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}
