#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod progress;
pub mod quiz_service;
pub mod reminder_service;
pub mod runner;
pub mod submission;
pub mod timer;

pub use brain_core::Clock;

pub use app_services::AppServices;
pub use error::{
    AppServicesError, NotifyError, ProgressError, QuizError, ReminderServiceError,
    SubmissionError,
};
pub use identity::{Identity, IdentityProvider, StaticIdentity};
pub use notifications::{Notification, Notifier, TracingNotifier};
pub use progress::{ProgressService, ProgressStats};
pub use quiz_service::{QuizRequest, QuizService, RunningQuiz};
pub use reminder_service::ReminderService;
pub use runner::{QuizHandle, QuizRunner};
pub use submission::{
    ResultScope, ResultSubmitter, SAVE_CANCELLED, SaveStatus, SubmissionTracker, SubmitOutcome,
};
pub use timer::CountdownTimer;
