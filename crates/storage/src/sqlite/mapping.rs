use brain_core::model::{EndReason, GameType, ResultId, UserId};
use sqlx::Row;

use crate::repository::{ResultRecord, StorageError, StoredResult};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_result_row(row: &sqlx::sqlite::SqliteRow) -> Result<StoredResult, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let id: ResultId = id.parse().map_err(ser)?;

    let ended_by: String = row.try_get("ended_by").map_err(ser)?;
    let ended_by: EndReason = ended_by.parse().map_err(ser)?;
    let game_type: String = row.try_get("game_type").map_err(ser)?;
    let game_type: GameType = game_type.parse().map_err(ser)?;

    let record = ResultRecord {
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        total_questions: u32_from_i64(
            "total_questions",
            row.try_get("total_questions").map_err(ser)?,
        )?,
        percentage: u32_from_i64("percentage", row.try_get("percentage").map_err(ser)?)?,
        time_taken_secs: u32_from_i64(
            "time_taken_secs",
            row.try_get("time_taken_secs").map_err(ser)?,
        )?,
        ended_by,
        game_type,
        platform: row.try_get("platform").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
        user_id: row
            .try_get::<Option<String>, _>("user_id")
            .map_err(ser)?
            .map(UserId::new),
        user_email: row.try_get("user_email").map_err(ser)?,
    };
    Ok(StoredResult::new(id, record))
}
