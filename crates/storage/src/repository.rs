use async_trait::async_trait;
use brain_core::model::{EndReason, GameResult, GameType, ReminderSchedule, ResultId, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Email recorded when no signed-in identity supplied one.
pub const ANONYMOUS_EMAIL: &str = "anonymous";

/// Persisted shape of a finished game.
///
/// Carries the derived percentage and submission metadata alongside the
/// `GameResult` fields so listings never have to recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken_secs: u32,
    pub ended_by: EndReason,
    pub game_type: GameType,
    pub platform: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<UserId>,
    pub user_email: String,
}

impl ResultRecord {
    #[must_use]
    pub fn from_result(
        result: &GameResult,
        created_at: DateTime<Utc>,
        platform: impl Into<String>,
        user_id: Option<UserId>,
        user_email: Option<String>,
    ) -> Self {
        Self {
            score: result.score(),
            total_questions: result.total_questions(),
            percentage: result.percentage(),
            time_taken_secs: result.time_taken_secs(),
            ended_by: result.ended_by(),
            game_type: result.game_type(),
            platform: platform.into(),
            created_at,
            user_id,
            user_email: user_email.unwrap_or_else(|| ANONYMOUS_EMAIL.to_owned()),
        }
    }

    /// Copy of the record with the owning user cleared, for the public store.
    #[must_use]
    pub fn without_user(&self) -> Self {
        Self {
            user_id: None,
            ..self.clone()
        }
    }

    /// Rebuild the domain result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the stored score exceeds the total.
    pub fn to_result(&self) -> Result<GameResult, StorageError> {
        GameResult::new(
            self.score,
            self.total_questions,
            self.time_taken_secs,
            self.ended_by,
            self.game_type,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// A result record together with the identifier its store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredResult {
    pub id: ResultId,
    pub record: ResultRecord,
}

impl StoredResult {
    #[must_use]
    pub fn new(id: ResultId, record: ResultRecord) -> Self {
        Self { id, record }
    }
}

/// Results owned by a signed-in user (the primary store).
#[async_trait]
pub trait UserResultRepository: Send + Sync {
    /// Append a result under `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_user_result(
        &self,
        user: &UserId,
        record: &ResultRecord,
    ) -> Result<ResultId, StorageError>;

    /// Most recent results for `user`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_user_results(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError>;
}

/// Provider-level results with no owner (the fallback store).
#[async_trait]
pub trait PublicResultRepository: Send + Sync {
    /// Append an anonymous result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_public_result(&self, record: &ResultRecord) -> Result<ResultId, StorageError>;

    /// Most recent anonymous results, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_public_results(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError>;
}

/// Single-row storage for the training reminder.
#[async_trait]
pub trait ReminderRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_schedule(&self) -> Result<Option<ReminderSchedule>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the schedule cannot be stored.
    async fn save_schedule(&self, schedule: &ReminderSchedule) -> Result<(), StorageError>;
}

fn newest_first(mut rows: Vec<StoredResult>, limit: u32) -> Vec<StoredResult> {
    // Ties break on id, matching the SQLite `ORDER BY created_at DESC, id DESC`.
    rows.sort_by(|a, b| {
        b.record
            .created_at
            .cmp(&a.record.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    rows
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    user_results: Arc<Mutex<HashMap<UserId, Vec<StoredResult>>>>,
    public_results: Arc<Mutex<Vec<StoredResult>>>,
    reminder: Arc<Mutex<Option<ReminderSchedule>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserResultRepository for InMemoryRepository {
    async fn append_user_result(
        &self,
        user: &UserId,
        record: &ResultRecord,
    ) -> Result<ResultId, StorageError> {
        let mut guard = self
            .user_results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = ResultId::generate();
        let mut record = record.clone();
        record.user_id = Some(user.clone());
        guard
            .entry(user.clone())
            .or_default()
            .push(StoredResult::new(id, record));
        Ok(id)
    }

    async fn list_user_results(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self
            .user_results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let rows = guard.get(user).cloned().unwrap_or_default();
        Ok(newest_first(rows, limit))
    }
}

#[async_trait]
impl PublicResultRepository for InMemoryRepository {
    async fn append_public_result(&self, record: &ResultRecord) -> Result<ResultId, StorageError> {
        let mut guard = self
            .public_results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = ResultId::generate();
        guard.push(StoredResult::new(id, record.without_user()));
        Ok(id)
    }

    async fn list_public_results(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        let guard = self
            .public_results
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(newest_first(guard.clone(), limit))
    }
}

#[async_trait]
impl ReminderRepository for InMemoryRepository {
    async fn get_schedule(&self) -> Result<Option<ReminderSchedule>, StorageError> {
        let guard = self
            .reminder
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    async fn save_schedule(&self, schedule: &ReminderSchedule) -> Result<(), StorageError> {
        let mut guard = self
            .reminder
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(*schedule);
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub user_results: Arc<dyn UserResultRepository>,
    pub public_results: Arc<dyn PublicResultRepository>,
    pub reminders: Arc<dyn ReminderRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let user_results: Arc<dyn UserResultRepository> = Arc::new(repo.clone());
        let public_results: Arc<dyn PublicResultRepository> = Arc::new(repo.clone());
        let reminders: Arc<dyn ReminderRepository> = Arc::new(repo);
        Self {
            user_results,
            public_results,
            reminders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::time::fixed_now;
    use chrono::Duration;

    fn build_record(score: u32, minutes_ago: i64) -> ResultRecord {
        let result = GameResult::new(
            score,
            10,
            60,
            EndReason::AllQuestionsAnswered,
            GameType::Multiplication,
        )
        .unwrap();
        ResultRecord::from_result(
            &result,
            fixed_now() - Duration::minutes(minutes_ago),
            "test",
            None,
            None,
        )
    }

    #[test]
    fn record_derives_percentage_and_anonymous_email() {
        let record = build_record(7, 0);
        assert_eq!(record.percentage, 70);
        assert_eq!(record.user_email, ANONYMOUS_EMAIL);
        assert_eq!(record.to_result().unwrap().score(), 7);
    }

    #[tokio::test]
    async fn user_results_are_scoped_and_newest_first() {
        let repo = InMemoryRepository::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        repo.append_user_result(&alice, &build_record(3, 30)).await.unwrap();
        let newest = repo.append_user_result(&alice, &build_record(9, 1)).await.unwrap();
        repo.append_user_result(&bob, &build_record(5, 5)).await.unwrap();

        let rows = repo.list_user_results(&alice, 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, newest);
        assert_eq!(rows[0].record.user_id, Some(alice.clone()));

        let limited = repo.list_user_results(&alice, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert!(repo.list_public_results(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn equal_timestamps_list_by_descending_id() {
        let repo = InMemoryRepository::new();
        let user = UserId::new("dave");
        let mut ids = Vec::new();
        for score in 0..4 {
            ids.push(repo.append_user_result(&user, &build_record(score, 5)).await.unwrap());
        }
        ids.sort_unstable_by(|a, b| b.cmp(a));

        let listed: Vec<_> = repo
            .list_user_results(&user, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn public_results_never_keep_a_user() {
        let repo = InMemoryRepository::new();
        let mut record = build_record(4, 0);
        record.user_id = Some(UserId::new("carol"));

        repo.append_public_result(&record).await.unwrap();
        let rows = repo.list_public_results(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].record.user_id, None);
    }

    #[tokio::test]
    async fn reminder_schedule_round_trips() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_schedule().await.unwrap(), None);
        let schedule = ReminderSchedule::default().with_enabled(false);
        repo.save_schedule(&schedule).await.unwrap();
        assert_eq!(repo.get_schedule().await.unwrap(), Some(schedule));
    }
}
