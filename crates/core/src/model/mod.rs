mod ids;
mod memory;
mod question;
mod reminder;
mod result;
mod session;

pub use ids::{ResultId, UserId};
pub use memory::{DEFAULT_SYMBOLS, FlipOutcome, MemoryBoard, MemoryError};
pub use question::{OPTION_COUNT, OperandRange, Operation, Operator, Question, QuestionError};
pub use reminder::{ReminderError, ReminderSchedule, Weekdays};
pub use result::{EndReason, GameResult, GameType, Rating, ResultError, Trophy, percentage};
pub use session::{AnswerOutcome, QuizSession, SessionError, SessionStatus, TickOutcome};
