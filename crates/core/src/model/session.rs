use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::question::Question;
use crate::model::result::{EndReason, GameResult, GameType, ResultError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("time budget must be at least one second")]
    ZeroTimeBudget,

    #[error("too many questions for a single session: {len}")]
    TooManyQuestions { len: usize },

    #[error("session can only be started from idle (currently {status:?})")]
    NotIdle { status: SessionStatus },

    #[error("session has not ended yet")]
    NotEnded,

    #[error(transparent)]
    Result(#[from] ResultError),
}

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    Ended,
}

/// What happened to an `answer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The session was not running; nothing changed.
    Ignored,
    Recorded { correct: bool, finished: bool },
}

/// What happened to a timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Ignored,
    Ticked { remaining: u32 },
    Expired,
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// A single timed quiz attempt.
///
/// All transitions are synchronous and total: calls that do not apply in the
/// current status are reported as no-ops instead of errors, except `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    questions: Vec<Question>,
    game_type: GameType,
    time_budget_secs: u32,
    current_index: usize,
    score: u32,
    time_remaining_secs: u32,
    status: SessionStatus,
    end_reason: Option<EndReason>,
}

impl QuizSession {
    /// # Errors
    ///
    /// Returns `SessionError::Empty` for an empty question list,
    /// `SessionError::ZeroTimeBudget` for a zero budget, and
    /// `SessionError::TooManyQuestions` if the count does not fit in `u32`.
    pub fn new(
        questions: Vec<Question>,
        time_budget_secs: u32,
        game_type: GameType,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        if time_budget_secs == 0 {
            return Err(SessionError::ZeroTimeBudget);
        }
        if u32::try_from(questions.len()).is_err() {
            return Err(SessionError::TooManyQuestions {
                len: questions.len(),
            });
        }

        Ok(Self {
            questions,
            game_type,
            time_budget_secs,
            current_index: 0,
            score: 0,
            time_remaining_secs: time_budget_secs,
            status: SessionStatus::Idle,
            end_reason: None,
        })
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    #[must_use]
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn time_budget_secs(&self) -> u32 {
        self.time_budget_secs
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining_secs
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.status == SessionStatus::Ended
    }

    /// Question awaiting an answer, `None` once every question was answered.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Share of questions answered so far, in percent (0–100).
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        crate::model::result::percentage(
            u32::try_from(self.current_index).unwrap_or(u32::MAX),
            u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
        )
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotIdle` unless the session has never been started.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(SessionError::NotIdle {
                status: self.status,
            });
        }
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// Pauses a running session. Returns `false` when there was nothing to pause.
    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Running {
            return false;
        }
        self.status = SessionStatus::Paused;
        true
    }

    /// Resumes a paused session. Returns `false` when it was not paused.
    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Running;
        true
    }

    /// Grades `selected` against the current question and advances.
    ///
    /// Ignored unless running, so a tap that lands after the clock ran out is a no-op.
    pub fn answer(&mut self, selected: u64) -> AnswerOutcome {
        if self.status != SessionStatus::Running {
            return AnswerOutcome::Ignored;
        }
        let Some(question) = self.questions.get(self.current_index) else {
            return AnswerOutcome::Ignored;
        };

        let correct = question.is_correct(selected);
        if correct {
            self.score += 1;
        }
        self.current_index += 1;

        let finished = self.current_index == self.questions.len();
        if finished {
            self.end(EndReason::AllQuestionsAnswered);
        }
        AnswerOutcome::Recorded { correct, finished }
    }

    /// Consumes one second of the budget. Reaching zero ends the session.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Ignored;
        }
        self.time_remaining_secs = self.time_remaining_secs.saturating_sub(1);
        if self.time_remaining_secs == 0 {
            self.end(EndReason::TimeExpired);
            return TickOutcome::Expired;
        }
        TickOutcome::Ticked {
            remaining: self.time_remaining_secs,
        }
    }

    /// Ends a running or paused session early. Returns `false` otherwise.
    pub fn quit(&mut self) -> bool {
        if !matches!(self.status, SessionStatus::Running | SessionStatus::Paused) {
            return false;
        }
        self.end(EndReason::Quit);
        true
    }

    fn end(&mut self, reason: EndReason) {
        self.status = SessionStatus::Ended;
        self.end_reason = Some(reason);
    }

    /// Snapshot of the outcome once the session has ended.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotEnded` while the session is still in play.
    pub fn result(&self) -> Result<GameResult, SessionError> {
        let Some(reason) = self.end_reason.filter(|_| self.is_ended()) else {
            return Err(SessionError::NotEnded);
        };
        let total = u32::try_from(self.questions.len()).map_err(|_| {
            SessionError::TooManyQuestions {
                len: self.questions.len(),
            }
        })?;
        let time_taken = self.time_budget_secs - self.time_remaining_secs;
        Ok(GameResult::new(
            self.score,
            total,
            time_taken,
            reason,
            self.game_type,
        )?)
    }

    /// Discards the session, keeping only its result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotEnded` while the session is still in play; the
    /// session is dropped either way.
    pub fn into_result(self) -> Result<GameResult, SessionError> {
        self.result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Operator;

    fn build_questions(n: u32) -> Vec<Question> {
        (1..=n)
            .map(|i| Question::new(Operator::Add, i, 1, [u64::from(i) + 1, 0, 100, 200]).unwrap())
            .collect()
    }

    fn running_session(n: u32, budget: u32) -> QuizSession {
        let mut session =
            QuizSession::new(build_questions(n), budget, GameType::Addition).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn construction_rejects_empty_and_zero_budget() {
        assert_eq!(
            QuizSession::new(Vec::new(), 60, GameType::Addition).unwrap_err(),
            SessionError::Empty
        );
        assert_eq!(
            QuizSession::new(build_questions(1), 0, GameType::Addition).unwrap_err(),
            SessionError::ZeroTimeBudget
        );
    }

    #[test]
    fn start_only_from_idle() {
        let mut session = running_session(2, 10);
        assert_eq!(
            session.start().unwrap_err(),
            SessionError::NotIdle {
                status: SessionStatus::Running
            }
        );
    }

    #[test]
    fn answers_score_and_finish() {
        let mut session = running_session(3, 30);
        assert_eq!(
            session.answer(2),
            AnswerOutcome::Recorded {
                correct: true,
                finished: false
            }
        );
        assert_eq!(
            session.answer(999),
            AnswerOutcome::Recorded {
                correct: false,
                finished: false
            }
        );
        assert_eq!(
            session.answer(4),
            AnswerOutcome::Recorded {
                correct: true,
                finished: true
            }
        );
        assert_eq!(session.status(), SessionStatus::Ended);
        assert_eq!(session.end_reason(), Some(EndReason::AllQuestionsAnswered));
        assert_eq!(session.score(), 2);
        assert_eq!(session.current_index(), 3);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn answers_outside_running_are_ignored() {
        let mut session =
            QuizSession::new(build_questions(2), 10, GameType::Addition).unwrap();
        assert_eq!(session.answer(2), AnswerOutcome::Ignored);

        session.start().unwrap();
        assert!(session.pause());
        assert_eq!(session.answer(2), AnswerOutcome::Ignored);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut session = running_session(2, 10);
        assert!(session.pause());
        assert!(!session.pause());
        assert_eq!(session.status(), SessionStatus::Paused);
        assert!(session.resume());
        assert!(!session.resume());
        assert_eq!(session.status(), SessionStatus::Running);
    }

    #[test]
    fn ticks_only_while_running_and_expire_at_zero() {
        let mut session = running_session(5, 2);
        session.pause();
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.time_remaining_secs(), 2);

        session.resume();
        assert_eq!(session.tick(), TickOutcome::Ticked { remaining: 1 });
        assert_eq!(session.tick(), TickOutcome::Expired);
        assert_eq!(session.end_reason(), Some(EndReason::TimeExpired));
        assert_eq!(session.tick(), TickOutcome::Ignored);
        assert_eq!(session.answer(2), AnswerOutcome::Ignored);
        assert_eq!(session.time_remaining_secs(), 0);
    }

    #[test]
    fn result_reports_time_taken() {
        let mut session = running_session(2, 120);
        for _ in 0..7 {
            session.tick();
        }
        assert_eq!(session.result().unwrap_err(), SessionError::NotEnded);
        session.answer(2);
        session.answer(3);

        let result = session.into_result().unwrap();
        assert_eq!(result.score(), 2);
        assert_eq!(result.total_questions(), 2);
        assert_eq!(result.time_taken_secs(), 7);
        assert_eq!(result.ended_by(), EndReason::AllQuestionsAnswered);
    }

    #[test]
    fn quit_ends_from_paused() {
        let mut session = running_session(4, 60);
        session.answer(2);
        session.pause();
        assert!(session.quit());
        assert!(!session.quit());
        let result = session.result().unwrap();
        assert_eq!(result.ended_by(), EndReason::Quit);
        assert_eq!(result.score(), 1);
    }

    #[test]
    fn score_never_exceeds_index() {
        let mut session = running_session(6, 60);
        for selected in [2, 0, 4, 5, 0, 7, 8, 9] {
            session.answer(selected);
            assert!(session.score() as usize <= session.current_index());
            assert!(session.current_index() <= session.total_questions());
        }
    }
}
