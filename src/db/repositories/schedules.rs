use super::{load_records, save_records, SCHEDULES_KEY};
use crate::db::models::{NewSchedule, Schedule, ScheduleException, SchedulePatch};
use crate::db::store::KeyValueStore;
use crate::error::{Error, Result};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Alert schedules repository.
///
/// Every call reads the full schedule list from the store and writes it back
/// on mutation; nothing is cached between calls.
#[derive(Clone)]
pub struct SchedulesRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SchedulesRepository {
    /// Create a new schedules repository
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn save(&self, schedules: &[Schedule]) -> Result<()> {
        save_records(self.store.as_ref(), SCHEDULES_KEY, schedules).await
    }

    /// Get all schedules, materializing the default schedule if none exist
    pub async fn list(&self) -> Result<Vec<Schedule>> {
        let schedules: Vec<Schedule> = load_records(self.store.as_ref(), SCHEDULES_KEY).await?;
        if !schedules.is_empty() {
            return Ok(schedules);
        }

        let default = Schedule::from_new(NewSchedule::default_schedule());
        info!("No schedules stored, creating default schedule {}", default.id);
        let schedules = vec![default];
        self.save(&schedules).await?;

        Ok(schedules)
    }

    /// Get schedule by ID
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<Schedule>> {
        Ok(self.list().await?.into_iter().find(|s| &s.id == id))
    }

    /// Get the schedule for a camera, falling back to the global schedule
    pub async fn get_by_camera(&self, camera_id: &str) -> Result<Option<Schedule>> {
        let schedules = self.list().await?;

        let found = schedules
            .iter()
            .find(|s| s.camera_id.as_deref() == Some(camera_id))
            .or_else(|| schedules.iter().find(|s| s.is_global()))
            .cloned();

        Ok(found)
    }

    /// Create a new schedule
    pub async fn create(&self, data: NewSchedule) -> Result<Schedule> {
        let schedule = Schedule::from_new(data);
        schedule.validate()?;

        let mut schedules = self.list().await?;
        schedules.push(schedule.clone());
        self.save(&schedules).await?;

        info!("Created schedule {} ({})", schedule.name, schedule.id);
        Ok(schedule)
    }

    /// Merge `patch` into an existing schedule
    pub async fn update(&self, id: &Uuid, patch: SchedulePatch) -> Result<Schedule> {
        patch.validate()?;
        self.modify(id, |schedule| patch.apply(schedule)).await
    }

    /// Delete schedule
    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut schedules = self.list().await?;
        let before = schedules.len();
        schedules.retain(|s| &s.id != id);

        if schedules.len() == before {
            return Err(Error::NotFound(format!("Schedule {}", id)));
        }

        self.save(&schedules).await?;
        info!("Deleted schedule {}", id);
        Ok(())
    }

    /// Add an exception, replacing any existing one for the same date
    pub async fn add_exception(&self, schedule_id: &Uuid, exception: ScheduleException) -> Result<Schedule> {
        debug!("Setting exception {} on schedule {}", exception.date, schedule_id);
        self.modify(schedule_id, |schedule| schedule.upsert_exception(exception))
            .await
    }

    /// Remove the exception for `date`. Missing schedules and dates are ignored.
    pub async fn remove_exception(&self, schedule_id: &Uuid, date: NaiveDate) -> Result<()> {
        let mut schedules = self.list().await?;

        let removed = schedules
            .iter_mut()
            .find(|s| &s.id == schedule_id)
            .map(|schedule| {
                let removed = schedule.remove_exception(date);
                if removed {
                    schedule.updated_at = Utc::now();
                }
                removed
            })
            .unwrap_or(false);

        if removed {
            self.save(&schedules).await?;
            debug!("Removed exception {} from schedule {}", date, schedule_id);
        }

        Ok(())
    }

    async fn modify<F>(&self, id: &Uuid, change: F) -> Result<Schedule>
    where
        F: FnOnce(&mut Schedule),
    {
        let mut schedules = self.list().await?;
        let schedule = schedules
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| Error::NotFound(format!("Schedule {}", id)))?;

        change(schedule);
        schedule.updated_at = Utc::now();
        let updated = schedule.clone();

        self.save(&schedules).await?;
        Ok(updated)
    }
}
