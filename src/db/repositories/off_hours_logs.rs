use super::{load_records, save_records, OFF_HOURS_LOG_KEY};
use crate::db::models::{LogFilter, LogStatistics, NewOffHoursLogEntry, OffHoursLogEntry};
use crate::db::store::KeyValueStore;
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of entries kept in the off-hours log
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Append-only log of suppressed alerts, most recent first and capped at `capacity`
#[derive(Clone)]
pub struct OffHoursLogRepository {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
}

impl OffHoursLogRepository {
    /// Create a new off-hours log repository with the default capacity
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_LOG_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    async fn load(&self) -> Result<Vec<OffHoursLogEntry>> {
        load_records(self.store.as_ref(), OFF_HOURS_LOG_KEY).await
    }

    async fn save(&self, entries: &[OffHoursLogEntry]) -> Result<()> {
        save_records(self.store.as_ref(), OFF_HOURS_LOG_KEY, entries).await
    }

    /// Record a suppressed alert, evicting the oldest entries past capacity
    pub async fn append(&self, entry: NewOffHoursLogEntry) -> Result<OffHoursLogEntry> {
        let entry = OffHoursLogEntry::from_new(entry);

        let mut entries = self.load().await?;
        entries.insert(0, entry.clone());
        if entries.len() > self.capacity {
            debug!("Off-hours log over capacity, evicting {}", entries.len() - self.capacity);
            entries.truncate(self.capacity);
        }
        self.save(&entries).await?;

        debug!(
            "Logged off-hours alert {} for camera {}",
            entry.id, entry.camera_id
        );
        Ok(entry)
    }

    /// Entries matching every filter, most recent first
    pub async fn query(&self, filter: &LogFilter) -> Result<Vec<OffHoursLogEntry>> {
        let limit = filter.limit.unwrap_or(usize::MAX);

        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|e| filter.matches(e))
            .take(limit)
            .collect())
    }

    /// Delete entries older than `days` days; returns how many were removed.
    ///
    /// Ages too large to represent clamp to the earliest instant, removing nothing.
    pub async fn purge_older_than(&self, days: i64) -> Result<usize> {
        if days < 0 {
            return Err(Error::Validation(format!(
                "Purge age must not be negative, got {} days",
                days
            )));
        }

        let cutoff = Duration::try_days(days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.purge_before(cutoff).await
    }

    /// Delete entries with a timestamp strictly before `cutoff`
    pub async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.load().await?;
        let before = entries.len();
        entries.retain(|e| e.timestamp >= cutoff);
        let removed = before - entries.len();

        if removed > 0 {
            self.save(&entries).await?;
            info!("Purged {} off-hours log entries older than {}", removed, cutoff);
        }

        Ok(removed)
    }

    /// Remove every entry
    pub async fn clear(&self) -> Result<()> {
        self.store.remove(OFF_HOURS_LOG_KEY).await?;
        info!("Cleared off-hours log");
        Ok(())
    }

    pub async fn statistics(&self) -> Result<LogStatistics> {
        self.statistics_at(Utc::now()).await
    }

    /// Statistics with the time windows measured back from `now`
    pub async fn statistics_at(&self, now: DateTime<Utc>) -> Result<LogStatistics> {
        let entries = self.load().await?;

        let day_ago = now - Duration::hours(24);
        let week_ago = now - Duration::days(7);
        let month_ago = now - Duration::days(30);

        let mut stats = LogStatistics {
            total: entries.len(),
            ..LogStatistics::default()
        };

        for entry in &entries {
            if entry.is_critical {
                stats.critical += 1;
            } else {
                stats.normal += 1;
            }
            *stats.by_camera.entry(entry.camera_id.clone()).or_insert(0) += 1;

            if entry.timestamp >= day_ago {
                stats.last_24_hours += 1;
            }
            if entry.timestamp >= week_ago {
                stats.last_7_days += 1;
            }
            if entry.timestamp >= month_ago {
                stats.last_30_days += 1;
            }
        }

        Ok(stats)
    }
}
