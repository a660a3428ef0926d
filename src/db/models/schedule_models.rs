use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Minutes since midnight, `0..=1440`. Serialized as `HH:MM`.
///
/// `24:00` is the explicit end of the day so an all-day slot doesn't depend
/// on `23:59` as a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(24 * 60);

    pub fn from_hm(hours: u16, minutes: u16) -> Result<Self> {
        if minutes > 59 || hours > 24 || (hours == 24 && minutes != 0) {
            return Err(Error::Validation(format!(
                "Time of day out of range: {:02}:{:02}",
                hours, minutes
            )));
        }
        Ok(Self(hours * 60 + minutes))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Expected HH:MM, got {:?}", s));

        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
            return Err(invalid());
        }
        if !hours.chars().chain(minutes.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: u16 = hours.parse().map_err(|_| invalid())?;
        let minutes: u16 = minutes.parse().map_err(|_| invalid())?;

        Self::from_hm(hours, minutes)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(time: TimeOfDay) -> Self {
        time.to_string()
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// A `[start, end]` window within a day, inclusive at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSlot {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn all_day() -> Self {
        Self::new(TimeOfDay::MIDNIGHT, TimeOfDay::END_OF_DAY)
    }

    pub fn contains(&self, minute_of_day: u16) -> bool {
        self.start.minutes() <= minute_of_day && minute_of_day <= self.end.minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DaySchedule {
    pub enabled: bool,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

impl DaySchedule {
    pub fn all_day() -> Self {
        Self {
            enabled: true,
            slots: vec![TimeSlot::all_day()],
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }
}

/// One `DaySchedule` per weekday, serialized as a map keyed `monday`..`sunday`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeeklyDays {
    #[serde(default)]
    pub monday: DaySchedule,
    #[serde(default)]
    pub tuesday: DaySchedule,
    #[serde(default)]
    pub wednesday: DaySchedule,
    #[serde(default)]
    pub thursday: DaySchedule,
    #[serde(default)]
    pub friday: DaySchedule,
    #[serde(default)]
    pub saturday: DaySchedule,
    #[serde(default)]
    pub sunday: DaySchedule,
}

impl WeeklyDays {
    /// Every weekday set to the same `DaySchedule`
    pub fn uniform(day: DaySchedule) -> Self {
        Self {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day.clone(),
            saturday: day.clone(),
            sunday: day,
        }
    }

    pub fn day(&self, weekday: Weekday) -> &DaySchedule {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Weekday, &DaySchedule)> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .map(move |weekday| (weekday, self.day(weekday)))
    }
}

/// A calendar date whose enabled state overrides the weekly pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    pub date: NaiveDate,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub name: String,
    /// `None` marks the global/default schedule
    #[serde(default)]
    pub camera_id: Option<String>,
    pub days: WeeklyDays,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
    #[serde(default)]
    pub critical_override: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Build a stored schedule from create input with a fresh id and timestamps
    pub fn from_new(data: NewSchedule) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: data.name,
            camera_id: data.camera_id,
            days: data.days,
            exceptions: data.exceptions,
            critical_override: data.critical_override,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_global(&self) -> bool {
        self.camera_id.is_none()
    }

    pub fn exception_for(&self, date: NaiveDate) -> Option<&ScheduleException> {
        self.exceptions.iter().find(|e| e.date == date)
    }

    /// Replace the exception for the same date, or append it
    pub fn upsert_exception(&mut self, exception: ScheduleException) {
        match self.exceptions.iter_mut().find(|e| e.date == exception.date) {
            Some(existing) => *existing = exception,
            None => self.exceptions.push(exception),
        }
    }

    /// Returns whether an exception was removed
    pub fn remove_exception(&mut self, date: NaiveDate) -> bool {
        let before = self.exceptions.len();
        self.exceptions.retain(|e| e.date != date);
        self.exceptions.len() != before
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_days(&self.days)?;
        validate_exceptions(&self.exceptions)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation("Schedule name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_days(days: &WeeklyDays) -> Result<()> {
    for (weekday, day) in days.iter() {
        for slot in &day.slots {
            if slot.start > slot.end {
                return Err(Error::Validation(format!(
                    "Slot {}-{} on {} ends before it starts",
                    slot.start, slot.end, weekday
                )));
            }
        }
    }
    Ok(())
}

fn validate_exceptions(exceptions: &[ScheduleException]) -> Result<()> {
    for (i, exception) in exceptions.iter().enumerate() {
        if exceptions[..i].iter().any(|e| e.date == exception.date) {
            return Err(Error::Validation(format!(
                "Duplicate exception for {}",
                exception.date
            )));
        }
    }
    Ok(())
}

/// Input for creating a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedule {
    pub name: String,
    #[serde(default)]
    pub camera_id: Option<String>,
    pub days: WeeklyDays,
    #[serde(default)]
    pub exceptions: Vec<ScheduleException>,
    #[serde(default)]
    pub critical_override: bool,
}

impl NewSchedule {
    /// Always-open global schedule materialized when the store is empty
    pub fn default_schedule() -> Self {
        Self {
            name: "Default schedule".to_string(),
            camera_id: None,
            days: WeeklyDays::uniform(DaySchedule::all_day()),
            exceptions: Vec::new(),
            critical_override: false,
        }
    }
}

/// Partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePatch {
    pub name: Option<String>,
    /// `Some(None)` clears the camera association
    #[serde(default, skip_serializing_if = "Option::is_none", with = "double_option")]
    pub camera_id: Option<Option<String>>,
    pub days: Option<WeeklyDays>,
    pub exceptions: Option<Vec<ScheduleException>>,
    pub critical_override: Option<bool>,
}

impl SchedulePatch {
    /// Check only the fields this patch replaces; stored values it leaves alone are kept as-is
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(days) = &self.days {
            validate_days(days)?;
        }
        if let Some(exceptions) = &self.exceptions {
            validate_exceptions(exceptions)?;
        }
        Ok(())
    }

    pub fn apply(self, schedule: &mut Schedule) {
        if let Some(name) = self.name {
            schedule.name = name;
        }
        if let Some(camera_id) = self.camera_id {
            schedule.camera_id = camera_id;
        }
        if let Some(days) = self.days {
            schedule.days = days;
        }
        if let Some(exceptions) = self.exceptions {
            schedule.exceptions = exceptions;
        }
        if let Some(critical_override) = self.critical_override {
            schedule.critical_override = critical_override;
        }
    }
}

// Distinguishes an absent field from an explicit `null`
mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: &str, end: &str) -> TimeSlot {
        TimeSlot::new(start.parse().unwrap(), end.parse().unwrap())
    }

    #[test]
    fn test_parses_and_formats_time_of_day() {
        assert_eq!("09:05".parse::<TimeOfDay>().unwrap().minutes(), 545);
        assert_eq!("9:05".parse::<TimeOfDay>().unwrap().to_string(), "09:05");
        assert_eq!("24:00".parse::<TimeOfDay>().unwrap(), TimeOfDay::END_OF_DAY);

        for bad in ["24:01", "12:60", "1200", "ab:cd", "12:5", "", "-1:00"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_signed_components_are_rejected() {
        for bad in ["+9:05", "09:+5", "+09:00", "9:-5"] {
            assert!(bad.parse::<TimeOfDay>().is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_slot_bounds_are_inclusive() {
        let office = slot("09:00", "17:00");
        assert!(office.contains(9 * 60));
        assert!(office.contains(17 * 60));
        assert!(!office.contains(17 * 60 + 1));
        assert!(!office.contains(8 * 60 + 59));

        assert!(TimeSlot::all_day().contains(23 * 60 + 59));
    }

    #[test]
    fn test_schedule_json_matches_stored_layout() {
        let json = serde_json::json!({
            "id": "6f1c1d5e-6a3c-4c1c-9a51-7d0a0f0f2b11",
            "name": "Lobby",
            "cameraId": "cam-1",
            "days": {
                "monday": {"enabled": true, "slots": [{"start": "09:00", "end": "17:00"}]}
            },
            "exceptions": [{"date": "2026-12-25", "enabled": false, "reason": "Holiday"}],
            "criticalOverride": true,
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        });

        let schedule: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.camera_id.as_deref(), Some("cam-1"));
        assert_eq!(schedule.days.monday.slots, vec![slot("09:00", "17:00")]);
        assert!(!schedule.days.sunday.enabled);
        assert!(schedule.critical_override);

        let back = serde_json::to_value(&schedule).unwrap();
        assert_eq!(back["days"]["monday"]["slots"][0]["end"], "17:00");
        assert_eq!(back["exceptions"][0]["date"], "2026-12-25");
    }

    #[test]
    fn test_upsert_replaces_exception_for_same_date() {
        let mut schedule = Schedule::from_new(NewSchedule::default_schedule());
        let date = NaiveDate::from_ymd_opt(2026, 12, 25).unwrap();

        schedule.upsert_exception(ScheduleException {
            date,
            enabled: false,
            reason: None,
        });
        schedule.upsert_exception(ScheduleException {
            date,
            enabled: true,
            reason: Some("Open after all".to_string()),
        });

        assert_eq!(schedule.exceptions.len(), 1);
        assert!(schedule.exception_for(date).unwrap().enabled);
        assert!(schedule.remove_exception(date));
        assert!(!schedule.remove_exception(date));
    }

    #[test]
    fn test_validate_rejects_inverted_slots() {
        let mut schedule = Schedule::from_new(NewSchedule::default_schedule());
        schedule.days.tuesday.slots.push(slot("18:00", "08:00"));

        let err = schedule.validate().unwrap_err();
        assert!(matches!(err, Error::Validation(ref msg) if msg.contains("Tue")));
    }

    #[test]
    fn test_patch_can_clear_camera() {
        let mut schedule = Schedule::from_new(NewSchedule {
            camera_id: Some("cam-1".to_string()),
            ..NewSchedule::default_schedule()
        });

        let patch: SchedulePatch = serde_json::from_str(r#"{"cameraId": null}"#).unwrap();
        patch.apply(&mut schedule);
        assert!(schedule.is_global());

        let untouched: SchedulePatch = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert_eq!(untouched.camera_id, None);
        untouched.apply(&mut schedule);
        assert_eq!(schedule.name, "Renamed");
    }

    #[test]
    fn test_patch_round_trip_keeps_camera_untouched() {
        let patch = SchedulePatch {
            name: Some("Renamed".to_string()),
            ..SchedulePatch::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert!(json.get("cameraId").is_none());

        let back: SchedulePatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, patch);

        let clearing = SchedulePatch {
            camera_id: Some(None),
            ..SchedulePatch::default()
        };
        let back: SchedulePatch =
            serde_json::from_value(serde_json::to_value(&clearing).unwrap()).unwrap();
        assert_eq!(back.camera_id, Some(None));
    }

    #[test]
    fn test_patch_validates_only_replaced_fields() {
        let patch = SchedulePatch {
            critical_override: Some(true),
            ..SchedulePatch::default()
        };
        assert!(patch.validate().is_ok());

        let mut overnight = WeeklyDays::default();
        overnight.monday = DaySchedule {
            enabled: true,
            slots: vec![slot("22:00", "06:00")],
        };
        let patch = SchedulePatch {
            days: Some(overnight),
            ..SchedulePatch::default()
        };
        assert!(matches!(patch.validate(), Err(Error::Validation(_))));

        let patch = SchedulePatch {
            name: Some("  ".to_string()),
            ..SchedulePatch::default()
        };
        assert!(matches!(patch.validate(), Err(Error::Validation(_))));
    }
}
