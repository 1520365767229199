use std::sync::{Arc, Mutex, PoisonError};

use brain_core::Clock;
use brain_core::model::{GameResult, ResultId};
use serde::Serialize;
use storage::repository::{PublicResultRepository, ResultRecord, UserResultRepository};

use crate::error::SubmissionError;
use crate::identity::IdentityProvider;
use crate::notifications::{Notification, Notifier};

/// Which store accepted a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultScope {
    User,
    Public,
}

/// Outcome of a submission. Persistence failure is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SubmitOutcome {
    Persisted { id: ResultId, scope: ResultScope },
    Failed { reason: String },
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted { .. })
    }
}

//
// ─── SUBMITTER ─────────────────────────────────────────────────────────────────
//

/// Persists finished games and confirms them with a notification.
#[derive(Clone)]
pub struct ResultSubmitter {
    clock: Clock,
    platform: String,
    identity: Arc<dyn IdentityProvider>,
    user_results: Arc<dyn UserResultRepository>,
    public_results: Arc<dyn PublicResultRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ResultSubmitter {
    #[must_use]
    pub fn new(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        user_results: Arc<dyn UserResultRepository>,
        public_results: Arc<dyn PublicResultRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            clock,
            platform: std::env::consts::OS.to_owned(),
            identity,
            user_results,
            public_results,
            notifier,
        }
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Store `result` under the current identity, falling back once to the
    /// public store with the identity cleared.
    pub async fn submit(&self, result: &GameResult) -> SubmitOutcome {
        let identity = self.identity.current();
        let record = ResultRecord::from_result(
            result,
            self.clock.now(),
            self.platform.clone(),
            identity.as_ref().map(|i| i.user_id().clone()),
            identity.as_ref().and_then(|i| i.email().map(str::to_owned)),
        );

        let outcome = match identity {
            Some(identity) => {
                match self
                    .user_results
                    .append_user_result(identity.user_id(), &record)
                    .await
                {
                    Ok(id) => SubmitOutcome::Persisted {
                        id,
                        scope: ResultScope::User,
                    },
                    Err(user_err) => {
                        tracing::warn!(
                            error = %user_err,
                            user = %identity.user_id(),
                            "user store rejected result, retrying public store"
                        );
                        self.save_public(&record.without_user(), Some(&user_err.to_string()))
                            .await
                    }
                }
            }
            None => self.save_public(&record, None).await,
        };

        if let SubmitOutcome::Persisted { id, scope } = &outcome {
            tracing::info!(%id, ?scope, percentage = record.percentage, "result saved");
            let notification = Notification::result_saved(record.game_type, record.percentage);
            if let Err(err) = self.notifier.notify(&notification).await {
                tracing::warn!(error = %err, "result notification failed");
            }
        }
        outcome
    }

    async fn save_public(&self, record: &ResultRecord, earlier: Option<&str>) -> SubmitOutcome {
        match self.public_results.append_public_result(record).await {
            Ok(id) => SubmitOutcome::Persisted {
                id,
                scope: ResultScope::Public,
            },
            Err(err) => {
                tracing::error!(error = %err, "public store rejected result");
                let reason = match earlier {
                    Some(first) => format!("user store: {first}; public store: {err}"),
                    None => format!("public store: {err}"),
                };
                SubmitOutcome::Failed { reason }
            }
        }
    }
}

//
// ─── TRACKER ───────────────────────────────────────────────────────────────────
//

/// Save state shown next to a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved(ResultId),
    Error(String),
}

/// One-shot guard around [`ResultSubmitter`] for a single finished game.
pub struct SubmissionTracker {
    submitter: ResultSubmitter,
    status: Mutex<SaveStatus>,
}

impl SubmissionTracker {
    #[must_use]
    pub fn new(submitter: ResultSubmitter) -> Self {
        Self {
            submitter,
            status: Mutex::new(SaveStatus::Idle),
        }
    }

    #[must_use]
    pub fn status(&self) -> SaveStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submit `result` unless this tracker already has.
    ///
    /// Dropping the returned future mid-save leaves the status at
    /// `SaveStatus::Error` with [`SAVE_CANCELLED`]; the result may or may not
    /// have reached a store, so it is not submitted again.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::AlreadySubmitted` on every call after the first,
    /// whatever the first call's outcome.
    pub async fn submit(&self, result: &GameResult) -> Result<SubmitOutcome, SubmissionError> {
        self.transition(|status| {
            if *status != SaveStatus::Idle {
                return Err(SubmissionError::AlreadySubmitted);
            }
            *status = SaveStatus::Saving;
            Ok(())
        })?;
        let saving = SavingGuard {
            status: &self.status,
        };

        let outcome = self.submitter.submit(result).await;
        saving.finish(match &outcome {
            SubmitOutcome::Persisted { id, .. } => SaveStatus::Saved(*id),
            SubmitOutcome::Failed { reason } => SaveStatus::Error(reason.clone()),
        });
        Ok(outcome)
    }

    fn transition(
        &self,
        f: impl FnOnce(&mut SaveStatus) -> Result<(), SubmissionError>,
    ) -> Result<(), SubmissionError> {
        let mut guard = self
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

/// Status reason left behind when a save is abandoned mid-flight.
pub const SAVE_CANCELLED: &str = "save cancelled before it finished";

/// Moves a tracker out of `Saving` even if the submit future is dropped.
struct SavingGuard<'a> {
    status: &'a Mutex<SaveStatus>,
}

impl SavingGuard<'_> {
    fn finish(self, next: SaveStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status == SaveStatus::Saving {
            *status = SaveStatus::Error(SAVE_CANCELLED.to_owned());
        }
    }
}
