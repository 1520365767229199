use std::sync::Arc;

use brain_core::Clock;
use brain_core::model::ReminderSchedule;
use chrono::{DateTime, Utc, Weekday};
use storage::repository::ReminderRepository;

use crate::error::ReminderServiceError;
use crate::notifications::{Notification, Notifier};

/// Stores the training reminder and fires it when due.
#[derive(Clone)]
pub struct ReminderService {
    clock: Clock,
    repo: Arc<dyn ReminderRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderService {
    #[must_use]
    pub fn new(
        clock: Clock,
        repo: Arc<dyn ReminderRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clock,
            repo,
            notifier,
        }
    }

    /// Saved schedule, or the default one if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `ReminderServiceError::Storage` if the store cannot be read.
    pub async fn schedule(&self) -> Result<ReminderSchedule, ReminderServiceError> {
        Ok(self.repo.get_schedule().await?.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns `ReminderServiceError::Storage` if the schedule cannot be stored.
    pub async fn save(&self, schedule: ReminderSchedule) -> Result<(), ReminderServiceError> {
        self.repo.save_schedule(&schedule).await?;
        tracing::info!(
            enabled = schedule.enabled(),
            time = %schedule.time_label(),
            days = schedule.days().mask(),
            "reminder schedule updated"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ReminderServiceError::Storage` on store failures.
    pub async fn set_enabled(&self, enabled: bool) -> Result<ReminderSchedule, ReminderServiceError> {
        let schedule = self.schedule().await?.with_enabled(enabled);
        self.save(schedule).await?;
        Ok(schedule)
    }

    /// Set the time of day from `HH:MM` text.
    ///
    /// # Errors
    ///
    /// Returns `ReminderServiceError::Reminder` for malformed times and
    /// `ReminderServiceError::Storage` on store failures.
    pub async fn set_time(&self, raw: &str) -> Result<ReminderSchedule, ReminderServiceError> {
        let time = ReminderSchedule::parse_time(raw)?;
        let schedule = self.schedule().await?.with_time(time);
        self.save(schedule).await?;
        Ok(schedule)
    }

    /// # Errors
    ///
    /// Returns `ReminderServiceError::Storage` on store failures.
    pub async fn toggle_day(&self, day: Weekday) -> Result<ReminderSchedule, ReminderServiceError> {
        let schedule = self.schedule().await?;
        let mut days = schedule.days();
        days.toggle(day);
        let schedule = schedule.with_days(days);
        self.save(schedule).await?;
        Ok(schedule)
    }

    /// Next reminder after the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns `ReminderServiceError::Storage` if the store cannot be read.
    pub async fn next_fire(&self) -> Result<Option<DateTime<Utc>>, ReminderServiceError> {
        Ok(self.schedule().await?.next_after(self.clock.now()))
    }

    /// Sends the reminder if an occurrence after `last_fired` has come due.
    ///
    /// Returns the occurrence that fired.
    ///
    /// # Errors
    ///
    /// Returns `ReminderServiceError::Notify` if the notification could not be
    /// delivered and `ReminderServiceError::Storage` on store failures.
    pub async fn fire_if_due(
        &self,
        last_fired: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, ReminderServiceError> {
        let schedule = self.schedule().await?;
        let Some(due) = schedule.next_after(last_fired) else {
            return Ok(None);
        };
        if due > self.clock.now() {
            return Ok(None);
        }
        self.notifier
            .notify(&Notification::training_reminder())
            .await?;
        tracing::info!(%due, "training reminder sent");
        Ok(Some(due))
    }
}
