use std::time::Duration;

use brain_core::QuestionGenerator;
use brain_core::model::{GameResult, GameType, OperandRange, Operation, QuizSession};
use rand::Rng;
use tokio::task::JoinHandle;

use crate::error::QuizError;
use crate::runner::{QuizHandle, QuizRunner};
use crate::timer::TICK_PERIOD;

/// Inbound request for a timed quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRequest {
    pub count: usize,
    pub operation: Operation,
    pub range: OperandRange,
    pub time_budget_secs: u32,
}

impl Default for QuizRequest {
    fn default() -> Self {
        Self {
            count: 10,
            operation: Operation::Multiplication,
            range: OperandRange::default(),
            time_budget_secs: 120,
        }
    }
}

/// A spawned quiz: the control handle plus the task that yields its result.
pub struct RunningQuiz {
    pub handle: QuizHandle,
    pub finished: JoinHandle<Option<GameResult>>,
}

/// Builds question sets and spawns session runners.
#[derive(Debug, Clone)]
pub struct QuizService {
    generator: QuestionGenerator,
    tick_period: Duration,
}

impl Default for QuizService {
    fn default() -> Self {
        Self {
            generator: QuestionGenerator::new(),
            tick_period: TICK_PERIOD,
        }
    }
}

impl QuizService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_generator(mut self, generator: QuestionGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Generate the questions for `request` and wrap them in an idle session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the request cannot produce a valid question set
    /// or session.
    pub fn build_session<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &QuizRequest,
    ) -> Result<QuizSession, QuizError> {
        let questions =
            self.generator
                .generate(rng, request.count, request.operation, request.range)?;
        let session = QuizSession::new(
            questions,
            request.time_budget_secs,
            GameType::from(request.operation),
        )?;
        Ok(session)
    }

    /// Spawn and start a quiz using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the request is invalid; nothing is spawned then.
    pub async fn start_session(&self, request: &QuizRequest) -> Result<RunningQuiz, QuizError> {
        let session = self.build_session(&mut rand::rng(), request)?;
        self.launch(session).await
    }

    /// Spawn and start a quiz drawing questions from `rng`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the request is invalid; nothing is spawned then.
    pub async fn start_session_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        request: &QuizRequest,
    ) -> Result<RunningQuiz, QuizError> {
        let session = self.build_session(rng, request)?;
        self.launch(session).await
    }

    async fn launch(&self, session: QuizSession) -> Result<RunningQuiz, QuizError> {
        tracing::info!(
            questions = session.total_questions(),
            game_type = session.game_type().as_str(),
            budget_secs = session.time_budget_secs(),
            "starting quiz"
        );
        let (handle, finished) = QuizRunner::spawn(session, self.tick_period);
        handle.start().await?;
        Ok(RunningQuiz { handle, finished })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::GeneratorError;
    use brain_core::model::{EndReason, SessionError, SessionStatus};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[tokio::test(start_paused = true)]
    async fn default_request_runs_ten_multiplication_questions() {
        let service = QuizService::new();
        let mut rng = StdRng::seed_from_u64(8);
        let quiz = service
            .start_session_with_rng(&mut rng, &QuizRequest::default())
            .await
            .unwrap();

        let snapshot = quiz.handle.snapshot();
        assert_eq!(snapshot.status(), SessionStatus::Running);
        assert_eq!(snapshot.total_questions(), 10);
        assert_eq!(snapshot.time_remaining_secs(), 120);
        assert_eq!(snapshot.game_type(), GameType::Multiplication);

        tokio::time::sleep(Duration::from_millis(5500)).await;
        for _ in 0..10 {
            let answer = quiz
                .handle
                .snapshot()
                .current_question()
                .map(|q| q.correct_answer())
                .unwrap();
            quiz.handle.answer(answer).await.unwrap();
        }

        let result = quiz.finished.await.unwrap().unwrap();
        assert_eq!(result.score(), 10);
        assert_eq!(result.percentage(), 100);
        assert_eq!(result.ended_by(), EndReason::AllQuestionsAnswered);
        assert_eq!(
            result.time_taken_secs(),
            120 - quiz.handle.snapshot().time_remaining_secs()
        );
        assert_eq!(result.time_taken_secs(), 5);
    }

    #[test]
    fn invalid_requests_are_rejected_before_spawning() {
        let service = QuizService::new();
        let mut rng = StdRng::seed_from_u64(1);

        let zero_count = QuizRequest {
            count: 0,
            ..QuizRequest::default()
        };
        assert!(matches!(
            service.build_session(&mut rng, &zero_count),
            Err(QuizError::Generator(GeneratorError::ZeroCount))
        ));

        let zero_budget = QuizRequest {
            time_budget_secs: 0,
            ..QuizRequest::default()
        };
        assert!(matches!(
            service.build_session(&mut rng, &zero_budget),
            Err(QuizError::Session(SessionError::ZeroTimeBudget))
        ));
    }

    #[test]
    fn mixed_requests_map_to_mixed_game_type() {
        let service = QuizService::new();
        let mut rng = StdRng::seed_from_u64(2);
        let request = QuizRequest {
            operation: Operation::Mixed,
            count: 3,
            ..QuizRequest::default()
        };
        let session = service.build_session(&mut rng, &request).unwrap();
        assert_eq!(session.game_type(), GameType::Mixed);
        assert_eq!(session.status(), SessionStatus::Idle);
    }
}
