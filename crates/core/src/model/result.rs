use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::question::Operation;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("score {score} exceeds total questions {total}")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("unknown game type: {0}")]
    UnknownGameType(String),

    #[error("unknown end reason: {0}")]
    UnknownEndReason(String),
}

//
// ─── LABELS ───────────────────────────────────────────────────────────────────
//

/// Game a result came from. Stored as its kebab-case label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Mixed,
    MemoryMatch,
}

impl GameType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Addition => "addition",
            GameType::Subtraction => "subtraction",
            GameType::Multiplication => "multiplication",
            GameType::Division => "division",
            GameType::Mixed => "mixed",
            GameType::MemoryMatch => "memory-match",
        }
    }

    /// Broad game family used in notifications ("math" for every arithmetic quiz).
    #[must_use]
    pub fn family(self) -> &'static str {
        match self {
            GameType::MemoryMatch => "memory",
            _ => "math",
        }
    }
}

impl From<Operation> for GameType {
    fn from(operation: Operation) -> Self {
        match operation {
            Operation::Addition => GameType::Addition,
            Operation::Subtraction => GameType::Subtraction,
            Operation::Multiplication => GameType::Multiplication,
            Operation::Division => GameType::Division,
            Operation::Mixed => GameType::Mixed,
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = ResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "addition" => Ok(GameType::Addition),
            "subtraction" => Ok(GameType::Subtraction),
            "multiplication" => Ok(GameType::Multiplication),
            "division" => Ok(GameType::Division),
            "mixed" => Ok(GameType::Mixed),
            "memory-match" => Ok(GameType::MemoryMatch),
            other => Err(ResultError::UnknownGameType(other.to_owned())),
        }
    }
}

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    TimeExpired,
    AllQuestionsAnswered,
    /// The player left before time ran out or the last question was answered.
    Quit,
    AllPairsMatched,
}

impl EndReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TimeExpired => "time-expired",
            EndReason::AllQuestionsAnswered => "all-questions-answered",
            EndReason::Quit => "quit",
            EndReason::AllPairsMatched => "all-pairs-matched",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            EndReason::TimeExpired => "Time's up!",
            EndReason::AllQuestionsAnswered => "Quiz completed!",
            EndReason::Quit => "You finished early",
            EndReason::AllPairsMatched => "All pairs found!",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndReason {
    type Err = ResultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time-expired" => Ok(EndReason::TimeExpired),
            "all-questions-answered" => Ok(EndReason::AllQuestionsAnswered),
            "quit" => Ok(EndReason::Quit),
            "all-pairs-matched" => Ok(EndReason::AllPairsMatched),
            other => Err(ResultError::UnknownEndReason(other.to_owned())),
        }
    }
}

//
// ─── GRADING ──────────────────────────────────────────────────────────────────
//

/// Rounded percentage, `0` when there were no questions.
#[must_use]
pub fn percentage(score: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    // Integer round-half-up of score * 100 / total.
    let scaled = u64::from(score) * 200 + u64::from(total);
    let pct = scaled / (u64::from(total) * 2);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

/// Encouragement headline shown with the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    Excellent,
    Good,
    KeepPracticing,
}

impl Rating {
    #[must_use]
    pub fn from_percentage(pct: u32) -> Self {
        match pct {
            70.. => Rating::Excellent,
            50.. => Rating::Good,
            _ => Rating::KeepPracticing,
        }
    }

    #[must_use]
    pub fn headline(self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent!",
            Rating::Good => "Good Job!",
            Rating::KeepPracticing => "Keep Practicing!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trophy {
    None,
    Bronze,
    Silver,
    Gold,
}

impl Trophy {
    #[must_use]
    pub fn from_percentage(pct: u32) -> Self {
        match pct {
            90.. => Trophy::Gold,
            70.. => Trophy::Silver,
            50.. => Trophy::Bronze,
            _ => Trophy::None,
        }
    }
}

//
// ─── RESULT ───────────────────────────────────────────────────────────────────
//

/// Immutable outcome of a finished game, handed to result submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    score: u32,
    total_questions: u32,
    time_taken_secs: u32,
    ended_by: EndReason,
    game_type: GameType,
}

impl GameResult {
    /// # Errors
    ///
    /// Returns `ResultError::ScoreExceedsTotal` if `score > total_questions`.
    pub fn new(
        score: u32,
        total_questions: u32,
        time_taken_secs: u32,
        ended_by: EndReason,
        game_type: GameType,
    ) -> Result<Self, ResultError> {
        if score > total_questions {
            return Err(ResultError::ScoreExceedsTotal {
                score,
                total: total_questions,
            });
        }
        Ok(Self {
            score,
            total_questions,
            time_taken_secs,
            ended_by,
            game_type,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u32 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn ended_by(&self) -> EndReason {
        self.ended_by
    }

    #[must_use]
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total_questions)
    }

    #[must_use]
    pub fn rating(&self) -> Rating {
        Rating::from_percentage(self.percentage())
    }

    #[must_use]
    pub fn trophy(&self) -> Trophy {
        Trophy::from_percentage(self.percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_and_guards_zero_total() {
        assert_eq!(percentage(7, 10), 70);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(10, 10), 100);
    }

    #[test]
    fn grading_tiers_follow_percentage() {
        let result = GameResult::new(9, 10, 80, EndReason::AllQuestionsAnswered, GameType::Mixed)
            .unwrap();
        assert_eq!(result.percentage(), 90);
        assert_eq!(result.trophy(), Trophy::Gold);
        assert_eq!(result.rating(), Rating::Excellent);

        assert_eq!(Rating::from_percentage(50), Rating::Good);
        assert_eq!(Rating::from_percentage(49), Rating::KeepPracticing);
        assert_eq!(Trophy::from_percentage(69), Trophy::Bronze);
        assert_eq!(Trophy::from_percentage(10), Trophy::None);
    }

    #[test]
    fn score_cannot_exceed_total() {
        let err = GameResult::new(3, 2, 0, EndReason::Quit, GameType::Addition).unwrap_err();
        assert_eq!(err, ResultError::ScoreExceedsTotal { score: 3, total: 2 });
    }

    #[test]
    fn labels_round_trip_through_strings() {
        for reason in [
            EndReason::TimeExpired,
            EndReason::AllQuestionsAnswered,
            EndReason::Quit,
            EndReason::AllPairsMatched,
        ] {
            assert_eq!(reason.as_str().parse::<EndReason>().unwrap(), reason);
        }
        assert_eq!("memory-match".parse::<GameType>().unwrap(), GameType::MemoryMatch);
        assert!("chess".parse::<GameType>().is_err());
    }
}
