use super::evaluator::{ScheduleDecision, ScheduleEvaluator};
use crate::db::models::{NewOffHoursLogEntry, OffHoursLogEntry};
use crate::db::repositories::OffHoursLogRepository;
use crate::error::Result;
use chrono::NaiveDateTime;
use log::info;

/// A detection alert about to be dispatched
#[derive(Debug, Clone)]
pub struct Alert {
    pub camera_id: String,
    pub camera_name: String,
    pub is_critical: bool,
    pub message: String,
    /// Local wall time the alert was raised
    pub raised_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertOutcome {
    /// Dispatch the alert normally
    Deliver(ScheduleDecision),
    /// The alert was off-hours and has been logged instead
    Suppressed(OffHoursLogEntry),
}

/// Checks each alert against its camera's schedule and logs the ones it suppresses
#[derive(Clone)]
pub struct AlertGate {
    evaluator: ScheduleEvaluator,
    logs: OffHoursLogRepository,
}

impl AlertGate {
    pub fn new(evaluator: ScheduleEvaluator, logs: OffHoursLogRepository) -> Self {
        Self { evaluator, logs }
    }

    pub async fn process(&self, alert: &Alert) -> Result<AlertOutcome> {
        let decision = self
            .evaluator
            .evaluate_for_camera(&alert.camera_id, alert.raised_at, alert.is_critical)
            .await;

        if decision.is_within() {
            return Ok(AlertOutcome::Deliver(decision));
        }

        let entry = self
            .logs
            .append(NewOffHoursLogEntry {
                camera_id: alert.camera_id.clone(),
                camera_name: alert.camera_name.clone(),
                is_critical: alert.is_critical,
                reason: decision.to_string(),
                alert_message: alert.message.clone(),
            })
            .await?;

        info!(
            "Suppressed alert from camera {} ({}): {}",
            alert.camera_name, alert.camera_id, entry.reason
        );
        Ok(AlertOutcome::Suppressed(entry))
    }
}
