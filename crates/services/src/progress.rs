use std::collections::BTreeSet;
use std::sync::Arc;

use brain_core::Clock;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use storage::repository::{
    PublicResultRepository, ResultRecord, StoredResult, UserResultRepository,
};

use crate::error::ProgressError;
use crate::identity::IdentityProvider;

/// Number of recent results the progress screen summarises.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;

/// Aggregates shown on the progress screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressStats {
    pub games_played: u32,
    pub best_percentage: u32,
    pub average_percentage: u32,
    pub perfect_scores: u32,
    pub day_streak: u32,
}

impl ProgressStats {
    /// Summarise `records` as of the UTC day `today`.
    #[must_use]
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a ResultRecord>,
        today: NaiveDate,
    ) -> Self {
        let mut stats = Self::default();
        let mut sum: u64 = 0;
        let mut days = BTreeSet::new();

        for record in records {
            stats.games_played += 1;
            stats.best_percentage = stats.best_percentage.max(record.percentage);
            sum += u64::from(record.percentage);
            if record.total_questions > 0 && record.score == record.total_questions {
                stats.perfect_scores += 1;
            }
            days.insert(record.created_at.date_naive());
        }

        if stats.games_played > 0 {
            let n = u64::from(stats.games_played);
            stats.average_percentage = u32::try_from((sum * 2 + n) / (n * 2)).unwrap_or(100);
        }
        stats.day_streak = day_streak(&days, today);
        stats
    }
}

/// Consecutive days with a result, ending today or yesterday.
fn day_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let start = if days.contains(&today) {
        Some(today)
    } else {
        today
            .checked_sub_days(Days::new(1))
            .filter(|yesterday| days.contains(yesterday))
    };

    let mut streak = 0;
    let mut cursor = start;
    while let Some(day) = cursor.filter(|d| days.contains(d)) {
        streak += 1;
        cursor = day.checked_sub_days(Days::new(1));
    }
    streak
}

/// Reads recent results for the current player and derives stats.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    identity: Arc<dyn IdentityProvider>,
    user_results: Arc<dyn UserResultRepository>,
    public_results: Arc<dyn PublicResultRepository>,
    limit: u32,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        user_results: Arc<dyn UserResultRepository>,
        public_results: Arc<dyn PublicResultRepository>,
    ) -> Self {
        Self {
            clock,
            identity,
            user_results,
            public_results,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Newest results for the signed-in player, or public results when anonymous.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the store cannot be read.
    pub async fn recent_results(&self) -> Result<Vec<StoredResult>, ProgressError> {
        let rows = match self.identity.current() {
            Some(identity) => {
                self.user_results
                    .list_user_results(identity.user_id(), self.limit)
                    .await?
            }
            None => self.public_results.list_public_results(self.limit).await?,
        };
        tracing::debug!(count = rows.len(), "loaded recent results");
        Ok(rows)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the store cannot be read.
    pub async fn stats(&self) -> Result<ProgressStats, ProgressError> {
        let rows = self.recent_results().await?;
        let today = self.clock.now().date_naive();
        Ok(ProgressStats::from_records(
            rows.iter().map(|r| &r.record),
            today,
        ))
    }
}
