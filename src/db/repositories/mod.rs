use crate::db::store::KeyValueStore;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod off_hours_logs;
pub mod schedules;

pub use off_hours_logs::OffHoursLogRepository;
pub use schedules::SchedulesRepository;

/// Store key holding the JSON array of schedules
pub const SCHEDULES_KEY: &str = "alert_schedules";
/// Store key holding the JSON array of off-hours log entries, most recent first
pub const OFF_HOURS_LOG_KEY: &str = "alert_logs_off_hours";

/// Read a JSON array stored under `key`; a missing key is an empty list
async fn load_records<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>> {
    match store.get(key).await? {
        Some(blob) if !blob.trim().is_empty() => serde_json::from_str(&blob)
            .map_err(|e| Error::Serialization(format!("Failed to decode {}: {}", key, e))),
        _ => Ok(Vec::new()),
    }
}

/// Replace the JSON array stored under `key`
async fn save_records<T: Serialize>(store: &dyn KeyValueStore, key: &str, records: &[T]) -> Result<()> {
    let blob = serde_json::to_string(records)
        .map_err(|e| Error::Serialization(format!("Failed to encode {}: {}", key, e)))?;
    store.set(key, &blob).await
}
