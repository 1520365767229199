use std::sync::Arc;

use brain_core::Clock;
use storage::repository::Storage;

use crate::error::AppServicesError;
use crate::identity::IdentityProvider;
use crate::notifications::Notifier;
use crate::progress::ProgressService;
use crate::quiz_service::QuizService;
use crate::reminder_service::ReminderService;
use crate::submission::{ResultSubmitter, SubmissionTracker};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    quiz: Arc<QuizService>,
    submitter: ResultSubmitter,
    progress: Arc<ProgressService>,
    reminders: Arc<ReminderService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, identity, notifier))
    }

    #[must_use]
    pub fn in_memory(
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, identity, notifier)
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let submitter = ResultSubmitter::new(
            clock,
            Arc::clone(&identity),
            Arc::clone(&storage.user_results),
            Arc::clone(&storage.public_results),
            Arc::clone(&notifier),
        );
        let progress = Arc::new(ProgressService::new(
            clock,
            identity,
            Arc::clone(&storage.user_results),
            Arc::clone(&storage.public_results),
        ));
        let reminders = Arc::new(ReminderService::new(
            clock,
            Arc::clone(&storage.reminders),
            notifier,
        ));

        Self {
            quiz: Arc::new(QuizService::new()),
            submitter,
            progress,
            reminders,
        }
    }

    #[must_use]
    pub fn with_quiz_service(mut self, quiz: QuizService) -> Self {
        self.quiz = Arc::new(quiz);
        self
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn submitter(&self) -> &ResultSubmitter {
        &self.submitter
    }

    /// Fresh one-shot tracker for a newly finished game.
    #[must_use]
    pub fn submission_tracker(&self) -> SubmissionTracker {
        SubmissionTracker::new(self.submitter.clone())
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn reminders(&self) -> Arc<ReminderService> {
        Arc::clone(&self.reminders)
    }
}
