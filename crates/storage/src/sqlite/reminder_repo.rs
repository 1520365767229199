use brain_core::model::{ReminderSchedule, Weekdays};
use chrono::Utc;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ReminderRepository, StorageError};

#[async_trait::async_trait]
impl ReminderRepository for SqliteRepository {
    async fn get_schedule(&self) -> Result<Option<ReminderSchedule>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT enabled, time_of_day, days_mask
                FROM reminder_settings
                WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let enabled: bool = row.try_get("enabled").map_err(ser)?;
        let time: String = row.try_get("time_of_day").map_err(ser)?;
        let time = ReminderSchedule::parse_time(&time).map_err(ser)?;
        let mask: i64 = row.try_get("days_mask").map_err(ser)?;
        let mask = u8::try_from(mask)
            .map_err(|_| StorageError::Serialization(format!("invalid days_mask: {mask}")))?;
        let days = Weekdays::from_mask(mask).map_err(ser)?;

        Ok(Some(ReminderSchedule::new(enabled, time, days)))
    }

    async fn save_schedule(&self, schedule: &ReminderSchedule) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO reminder_settings (id, enabled, time_of_day, days_mask, updated_at)
                VALUES (1, ?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    enabled = excluded.enabled,
                    time_of_day = excluded.time_of_day,
                    days_mask = excluded.days_mask,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(schedule.enabled())
        .bind(schedule.time_label())
        .bind(i64::from(schedule.days().mask()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        tracing::debug!(
            enabled = schedule.enabled(),
            time = %schedule.time_label(),
            "saved reminder schedule"
        );
        Ok(())
    }
}
