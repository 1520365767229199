use async_trait::async_trait;
use brain_core::model::GameType;

use crate::error::NotifyError;

/// A local notification: title line plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Confirmation sent after a result reaches either store.
    #[must_use]
    pub fn result_saved(game_type: GameType, percentage: u32) -> Self {
        Self::new(
            "Result saved",
            format!("Your {} result ({percentage}%) was saved.", game_type.family()),
        )
    }

    #[must_use]
    pub fn training_reminder() -> Self {
        Self::new("Time to train", "Your daily brain workout is waiting.")
    }
}

/// Delivers notifications to the player.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `NotifyError` if the notification could not be shown.
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that only records the notification in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}
