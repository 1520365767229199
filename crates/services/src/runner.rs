//! Actor that owns a quiz session and its countdown.
//!
//! Player commands and timer ticks are applied one at a time from a single
//! `select!` loop, so a tap racing the last second can never observe a
//! half-applied transition.

use std::time::Duration;

use brain_core::model::{
    AnswerOutcome, GameResult, QuizSession, SessionError, SessionStatus, TickOutcome,
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::QuizError;
use crate::timer::CountdownTimer;

const COMMAND_BUFFER: usize = 16;

enum Command {
    Start(oneshot::Sender<Result<(), SessionError>>),
    Pause(oneshot::Sender<bool>),
    Resume(oneshot::Sender<bool>),
    Answer(u64, oneshot::Sender<AnswerOutcome>),
    Quit(oneshot::Sender<bool>),
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable handle for driving a running quiz.
///
/// Dropping every handle before the session ends stops the runner and its
/// join handle resolves to `None`.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<QuizSession>,
}

impl QuizHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, QuizError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| QuizError::RunnerClosed)?;
        rx.await.map_err(|_| QuizError::RunnerClosed)
    }

    /// Like `request`, but a runner that stopped because its session ended
    /// answers with `ended` instead of an error.
    async fn request_or<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
        ended: T,
    ) -> Result<T, QuizError> {
        match self.request(build).await {
            Err(QuizError::RunnerClosed) if self.state.borrow().is_ended() => Ok(ended),
            other => other,
        }
    }

    /// # Errors
    ///
    /// Returns `QuizError::Session` if the session was already started or has
    /// ended, and `QuizError::RunnerClosed` if the runner stopped early.
    pub async fn start(&self) -> Result<(), QuizError> {
        let ended = Err(SessionError::NotIdle {
            status: SessionStatus::Ended,
        });
        Ok(self.request_or(Command::Start, ended).await??)
    }

    /// Returns `false` when there is nothing to pause, including after the end.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RunnerClosed` if the runner stopped before the session ended.
    pub async fn pause(&self) -> Result<bool, QuizError> {
        self.request_or(Command::Pause, false).await
    }

    /// # Errors
    ///
    /// Returns `QuizError::RunnerClosed` if the runner stopped before the session ended.
    pub async fn resume(&self) -> Result<bool, QuizError> {
        self.request_or(Command::Resume, false).await
    }

    /// Late answers after the session ended are `AnswerOutcome::Ignored`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::RunnerClosed` if the runner stopped before the session ended.
    pub async fn answer(&self, selected: u64) -> Result<AnswerOutcome, QuizError> {
        self.request_or(|reply| Command::Answer(selected, reply), AnswerOutcome::Ignored)
            .await
    }

    /// # Errors
    ///
    /// Returns `QuizError::RunnerClosed` if the runner stopped before the session ended.
    pub async fn quit(&self) -> Result<bool, QuizError> {
        self.request_or(Command::Quit, false).await
    }

    /// Latest published state. Still readable after the runner stopped.
    #[must_use]
    pub fn snapshot(&self) -> QuizSession {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every published state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QuizSession> {
        self.state.clone()
    }
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Spawns quiz sessions onto the current tokio runtime.
pub struct QuizRunner;

impl QuizRunner {
    /// Spawns a runner for `session` ticking once per `period`.
    ///
    /// The session is not started; call [`QuizHandle::start`].
    #[must_use]
    pub fn spawn(
        session: QuizSession,
        period: Duration,
    ) -> (QuizHandle, JoinHandle<Option<GameResult>>) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (state_tx, state_rx) = watch::channel(session.clone());
        let timer = CountdownTimer::new(period);
        let join = tokio::spawn(run(session, commands_rx, state_tx, timer));
        (
            QuizHandle {
                commands: commands_tx,
                state: state_rx,
            },
            join,
        )
    }
}

async fn run(
    mut session: QuizSession,
    mut commands: mpsc::Receiver<Command>,
    state: watch::Sender<QuizSession>,
    mut timer: CountdownTimer,
) -> Option<GameResult> {
    loop {
        tokio::select! {
            biased;
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("quiz handles dropped before the session ended");
                    return None;
                };
                apply(&mut session, command);
            }
            () = timer.tick() => {
                if let TickOutcome::Expired = session.tick() {
                    tracing::info!(score = session.score(), "quiz time expired");
                }
            }
        }

        match session.status() {
            SessionStatus::Running => timer.arm(),
            SessionStatus::Paused => timer.suspend(),
            SessionStatus::Idle | SessionStatus::Ended => timer.disarm(),
        }
        state.send_replace(session.clone());

        if session.is_ended() {
            return match session.result() {
                Ok(result) => {
                    tracing::info!(
                        score = result.score(),
                        total = result.total_questions(),
                        ended_by = result.ended_by().as_str(),
                        "quiz session ended"
                    );
                    Some(result)
                }
                Err(err) => {
                    tracing::error!(error = %err, "ended session produced no result");
                    None
                }
            };
        }
    }
}

fn apply(session: &mut QuizSession, command: Command) {
    // Replies are best-effort: a caller that stopped waiting is not an error.
    match command {
        Command::Start(reply) => {
            let outcome = session.start();
            if outcome.is_ok() {
                tracing::debug!(
                    questions = session.total_questions(),
                    budget_secs = session.time_budget_secs(),
                    "quiz session started"
                );
            }
            let _ = reply.send(outcome);
        }
        Command::Pause(reply) => {
            let _ = reply.send(session.pause());
        }
        Command::Resume(reply) => {
            let _ = reply.send(session.resume());
        }
        Command::Answer(selected, reply) => {
            let _ = reply.send(session.answer(selected));
        }
        Command::Quit(reply) => {
            let _ = reply.send(session.quit());
        }
    }
}
