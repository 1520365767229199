use brain_core::model::{ResultId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, map_result_row};
use crate::repository::{
    PublicResultRepository, ResultRecord, StorageError, StoredResult, UserResultRepository,
};

#[derive(Clone, Copy)]
enum Scope {
    User,
    Public,
}

impl Scope {
    fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Public => "public",
        }
    }
}

impl SqliteRepository {
    async fn insert_result(
        &self,
        scope: Scope,
        record: &ResultRecord,
    ) -> Result<ResultId, StorageError> {
        let id = ResultId::generate();
        sqlx::query(
            r"
                INSERT INTO game_results (
                    id, scope, user_id, user_email, score, total_questions,
                    percentage, time_taken_secs, ended_by, game_type, platform, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
        )
        .bind(id.to_string())
        .bind(scope.as_str())
        .bind(record.user_id.as_ref().map(|u| u.as_str().to_owned()))
        .bind(&record.user_email)
        .bind(i64::from(record.score))
        .bind(i64::from(record.total_questions))
        .bind(i64::from(record.percentage))
        .bind(i64::from(record.time_taken_secs))
        .bind(record.ended_by.as_str())
        .bind(record.game_type.as_str())
        .bind(&record.platform)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        tracing::debug!(%id, scope = scope.as_str(), "stored game result");
        Ok(id)
    }
}

#[async_trait::async_trait]
impl UserResultRepository for SqliteRepository {
    async fn append_user_result(
        &self,
        user: &UserId,
        record: &ResultRecord,
    ) -> Result<ResultId, StorageError> {
        let record = ResultRecord {
            user_id: Some(user.clone()),
            ..record.clone()
        };
        self.insert_result(Scope::User, &record).await
    }

    async fn list_user_results(
        &self,
        user: &UserId,
        limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, user_email, score, total_questions, percentage,
                    time_taken_secs, ended_by, game_type, platform, created_at
                FROM game_results
                WHERE scope = 'user' AND user_id = ?1
                ORDER BY created_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}

#[async_trait::async_trait]
impl PublicResultRepository for SqliteRepository {
    async fn append_public_result(&self, record: &ResultRecord) -> Result<ResultId, StorageError> {
        self.insert_result(Scope::Public, &record.without_user())
            .await
    }

    async fn list_public_results(&self, limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, user_email, score, total_questions, percentage,
                    time_taken_secs, ended_by, game_type, platform, created_at
                FROM game_results
                WHERE scope = 'public'
                ORDER BY created_at DESC, id DESC
                LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_result_row).collect()
    }
}
