use crate::db::models::{Schedule, TimeSlot};
use crate::db::repositories::SchedulesRepository;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Weekday};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// What to decide when the schedule can't be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Deliver the alert
    #[default]
    FailOpen,
    /// Treat the alert as off-hours
    FailClosed,
}

impl ResolutionPolicy {
    fn within(self) -> bool {
        matches!(self, ResolutionPolicy::FailOpen)
    }
}

/// The outcome of evaluating a schedule, with the rule that decided it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    ScheduleNotFound { within: bool },
    StoreUnavailable { within: bool },
    CriticalOverride,
    SlotMatched(TimeSlot),
    ExceptionEnabled(NaiveDate),
    ExceptionDisabled(NaiveDate),
    DayDisabled(Weekday),
    OutsideSlots(Weekday),
}

impl ScheduleDecision {
    /// Whether alerts should be delivered normally
    pub fn is_within(&self) -> bool {
        match self {
            Self::ScheduleNotFound { within } | Self::StoreUnavailable { within } => *within,
            Self::CriticalOverride | Self::SlotMatched(_) | Self::ExceptionEnabled(_) => true,
            Self::ExceptionDisabled(_) | Self::DayDisabled(_) | Self::OutsideSlots(_) => false,
        }
    }
}

impl Display for ScheduleDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScheduleNotFound { .. } => write!(f, "No schedule configured"),
            Self::StoreUnavailable { .. } => write!(f, "Schedule store unavailable"),
            Self::CriticalOverride => write!(f, "Critical alert override"),
            Self::SlotMatched(slot) => write!(f, "Within slot {}-{}", slot.start, slot.end),
            Self::ExceptionEnabled(date) => write!(f, "Exception enables {}", date),
            Self::ExceptionDisabled(date) => write!(f, "Exception disables {}", date),
            Self::DayDisabled(day) => write!(f, "Schedule disabled on {}", day),
            Self::OutsideSlots(day) => write!(f, "Outside scheduled hours on {}", day),
        }
    }
}

/// Decide whether `at` (local wall time) falls inside `schedule`.
///
/// A matching slot wins outright; otherwise a dated exception is
/// authoritative, even when the weekday itself is disabled.
pub fn evaluate_schedule(schedule: &Schedule, at: NaiveDateTime, is_critical: bool) -> ScheduleDecision {
    if is_critical && schedule.critical_override {
        return ScheduleDecision::CriticalOverride;
    }

    let weekday = at.weekday();
    let day = schedule.days.day(weekday);

    if day.enabled {
        let minute_of_day = (at.hour() * 60 + at.minute()) as u16;
        if let Some(slot) = day.slots.iter().find(|slot| slot.contains(minute_of_day)) {
            return ScheduleDecision::SlotMatched(*slot);
        }
    }

    let date = at.date();
    match schedule.exception_for(date) {
        Some(exception) if exception.enabled => ScheduleDecision::ExceptionEnabled(date),
        Some(_) => ScheduleDecision::ExceptionDisabled(date),
        None if day.enabled => ScheduleDecision::OutsideSlots(weekday),
        None => ScheduleDecision::DayDisabled(weekday),
    }
}

/// Evaluates stored schedules. Never returns an error; unresolvable
/// schedules are decided by the configured `ResolutionPolicy`.
#[derive(Clone)]
pub struct ScheduleEvaluator {
    schedules: SchedulesRepository,
    policy: ResolutionPolicy,
}

impl ScheduleEvaluator {
    pub fn new(schedules: SchedulesRepository, policy: ResolutionPolicy) -> Self {
        Self { schedules, policy }
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// Evaluate the schedule with id `schedule_id` at `at`
    pub async fn evaluate(&self, schedule_id: &Uuid, at: NaiveDateTime, is_critical: bool) -> ScheduleDecision {
        match self.schedules.get_by_id(schedule_id).await {
            Ok(Some(schedule)) => self.decide(&schedule, at, is_critical),
            Ok(None) => {
                debug!("Schedule {} not found, applying {:?}", schedule_id, self.policy);
                ScheduleDecision::ScheduleNotFound {
                    within: self.policy.within(),
                }
            }
            Err(e) => {
                warn!("Failed to load schedule {}: {}", schedule_id, e);
                ScheduleDecision::StoreUnavailable {
                    within: self.policy.within(),
                }
            }
        }
    }

    /// Evaluate the schedule that applies to `camera_id`, falling back to the global schedule
    pub async fn evaluate_for_camera(&self, camera_id: &str, at: NaiveDateTime, is_critical: bool) -> ScheduleDecision {
        match self.schedules.get_by_camera(camera_id).await {
            Ok(Some(schedule)) => self.decide(&schedule, at, is_critical),
            Ok(None) => {
                debug!("No schedule for camera {}, applying {:?}", camera_id, self.policy);
                ScheduleDecision::ScheduleNotFound {
                    within: self.policy.within(),
                }
            }
            Err(e) => {
                warn!("Failed to load schedule for camera {}: {}", camera_id, e);
                ScheduleDecision::StoreUnavailable {
                    within: self.policy.within(),
                }
            }
        }
    }

    pub async fn is_within_schedule(&self, schedule_id: &Uuid, at: NaiveDateTime, is_critical: bool) -> bool {
        self.evaluate(schedule_id, at, is_critical).await.is_within()
    }

    /// `is_within_schedule` at the current local time
    pub async fn is_within_schedule_now(&self, schedule_id: &Uuid, is_critical: bool) -> bool {
        self.is_within_schedule(schedule_id, Local::now().naive_local(), is_critical)
            .await
    }

    fn decide(&self, schedule: &Schedule, at: NaiveDateTime, is_critical: bool) -> ScheduleDecision {
        let decision = evaluate_schedule(schedule, at, is_critical);
        debug!("Schedule {} at {}: {}", schedule.id, at, decision);
        decision
    }
}
