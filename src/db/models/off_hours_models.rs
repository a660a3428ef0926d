use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A suppressed alert. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffHoursLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub camera_id: String,
    pub camera_name: String,
    pub is_critical: bool,
    pub reason: String,
    pub alert_message: String,
}

impl OffHoursLogEntry {
    pub fn from_new(entry: NewOffHoursLogEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            camera_id: entry.camera_id,
            camera_name: entry.camera_name,
            is_critical: entry.is_critical,
            reason: entry.reason,
            alert_message: entry.alert_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOffHoursLogEntry {
    pub camera_id: String,
    pub camera_name: String,
    pub is_critical: bool,
    pub reason: String,
    pub alert_message: String,
}

/// Log query filters, combined with AND. `None` imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub camera_id: Option<String>,
    /// Inclusive lower bound on `timestamp`
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`
    pub end_date: Option<DateTime<Utc>>,
    pub is_critical: Option<bool>,
    /// Maximum number of entries returned, most recent first
    pub limit: Option<usize>,
}

impl LogFilter {
    pub fn matches(&self, entry: &OffHoursLogEntry) -> bool {
        if let Some(camera_id) = &self.camera_id {
            if &entry.camera_id != camera_id {
                return false;
            }
        }
        if let Some(start) = self.start_date {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if entry.timestamp > end {
                return false;
            }
        }
        if let Some(is_critical) = self.is_critical {
            if entry.is_critical != is_critical {
                return false;
            }
        }
        true
    }
}

/// Aggregate counts over the off-hours log.
///
/// The time windows are measured independently from the same "now" and overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStatistics {
    pub total: usize,
    pub critical: usize,
    pub normal: usize,
    pub by_camera: BTreeMap<String, usize>,
    pub last_24_hours: usize,
    pub last_7_days: usize,
    pub last_30_days: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(camera_id: &str, is_critical: bool, age: Duration) -> OffHoursLogEntry {
        OffHoursLogEntry {
            timestamp: Utc::now() - age,
            ..OffHoursLogEntry::from_new(NewOffHoursLogEntry {
                camera_id: camera_id.to_string(),
                camera_name: format!("Camera {}", camera_id),
                is_critical,
                reason: "Outside schedule".to_string(),
                alert_message: "Face match".to_string(),
            })
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(LogFilter::default().matches(&entry("a", false, Duration::days(400))));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let now = Utc::now();
        let filter = LogFilter {
            camera_id: Some("a".to_string()),
            start_date: Some(now - Duration::days(2)),
            end_date: Some(now),
            is_critical: Some(true),
            limit: None,
        };

        assert!(filter.matches(&entry("a", true, Duration::hours(1))));
        assert!(!filter.matches(&entry("b", true, Duration::hours(1))));
        assert!(!filter.matches(&entry("a", false, Duration::hours(1))));
        assert!(!filter.matches(&entry("a", true, Duration::days(3))));
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let e = entry("a", false, Duration::hours(5));
        let filter = LogFilter {
            start_date: Some(e.timestamp),
            end_date: Some(e.timestamp),
            ..LogFilter::default()
        };
        assert!(filter.matches(&e));
    }
}
