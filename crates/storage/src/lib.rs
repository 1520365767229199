#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    ANONYMOUS_EMAIL, InMemoryRepository, PublicResultRepository, ReminderRepository,
    ResultRecord, Storage, StorageError, StoredResult, UserResultRepository,
};
