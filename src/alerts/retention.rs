use crate::config::LogRetentionConfig;
use crate::db::repositories::OffHoursLogRepository;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

/// Periodically purges old off-hours log entries
pub struct LogRetentionService {
    config: LogRetentionConfig,
    logs: OffHoursLogRepository,
}

impl LogRetentionService {
    /// Create a new log retention service
    pub fn new(config: LogRetentionConfig, logs: OffHoursLogRepository) -> Self {
        Self { config, logs }
    }

    /// Start the retention loop in the background; `None` when disabled
    pub fn start(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            info!("Off-hours log retention is disabled");
            return None;
        }

        info!(
            "Starting off-hours log retention: max age {} days, interval {} seconds",
            self.config.max_age_days, self.config.check_interval_secs
        );

        Some(tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(self.config.check_interval_secs.max(1)));

            loop {
                interval.tick().await;

                if let Err(e) = self.run_purge().await {
                    error!("Error purging off-hours log: {}", e);
                }
            }
        }))
    }

    /// Purge once, returning the number of entries removed
    pub async fn run_purge(&self) -> Result<usize> {
        let removed = self.logs.purge_older_than(self.config.max_age_days).await?;

        if removed == 0 {
            info!("No expired off-hours log entries found");
        } else {
            info!("Removed {} expired off-hours log entries", removed);
        }

        Ok(removed)
    }
}
