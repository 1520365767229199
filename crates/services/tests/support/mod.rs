#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use brain_core::model::{ResultId, UserId};
use services::{Notification, Notifier, NotifyError};
use storage::repository::{
    PublicResultRepository, ResultRecord, StorageError, StoredResult, UserResultRepository,
};

/// Result store that rejects every write.
pub struct FailingStore;

#[async_trait]
impl UserResultRepository for FailingStore {
    async fn append_user_result(
        &self,
        _user: &UserId,
        _record: &ResultRecord,
    ) -> Result<ResultId, StorageError> {
        Err(StorageError::Connection("permission denied".into()))
    }

    async fn list_user_results(
        &self,
        _user: &UserId,
        _limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        Err(StorageError::Connection("permission denied".into()))
    }
}

#[async_trait]
impl PublicResultRepository for FailingStore {
    async fn append_public_result(&self, _record: &ResultRecord) -> Result<ResultId, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn list_public_results(&self, _limit: u32) -> Result<Vec<StoredResult>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

/// User store whose writes never complete.
pub struct StalledStore;

#[async_trait]
impl UserResultRepository for StalledStore {
    async fn append_user_result(
        &self,
        _user: &UserId,
        _record: &ResultRecord,
    ) -> Result<ResultId, StorageError> {
        std::future::pending().await
    }

    async fn list_user_results(
        &self,
        _user: &UserId,
        _limit: u32,
    ) -> Result<Vec<StoredResult>, StorageError> {
        Ok(Vec::new())
    }
}

/// Notifier that remembers what it was asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(NotifyError::PermissionDenied);
        }
        Ok(())
    }
}

pub fn recording() -> Arc<RecordingNotifier> {
    Arc::new(RecordingNotifier::default())
}
