pub mod off_hours_models;
pub mod schedule_models;

pub use off_hours_models::{LogFilter, LogStatistics, NewOffHoursLogEntry, OffHoursLogEntry};
pub use schedule_models::{
    DaySchedule, NewSchedule, Schedule, ScheduleException, SchedulePatch, TimeOfDay, TimeSlot,
    WeeklyDays,
};
