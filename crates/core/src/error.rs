use thiserror::Error;

use crate::generator::GeneratorError;
use crate::model::{MemoryError, QuestionError, ReminderError, ResultError, SessionError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Result(#[from] ResultError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Reminder(#[from] ReminderError),
}
