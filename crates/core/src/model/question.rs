use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of answer choices shown for every question.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("operand range is inverted: min {min} > max {max}")]
    InvertedRange { min: u32, max: u32 },

    #[error("options must hold four distinct values")]
    DuplicateOptions,

    #[error("correct answer {answer} is not among the options")]
    AnswerNotOffered { answer: u64 },

    #[error("{left} {operator} {right} does not produce a whole non-negative answer")]
    InvalidOperands {
        operator: Operator,
        left: u32,
        right: u32,
    },

    #[error("unknown operation: {0}")]
    UnknownOperation(String),
}

//
// ─── OPERATORS ────────────────────────────────────────────────────────────────
//

/// Arithmetic operator applied to a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "−",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    /// Applies the operator, returning `None` when the answer would be negative,
    /// fractional, or undefined.
    #[must_use]
    pub fn apply(self, left: u32, right: u32) -> Option<u64> {
        let (l, r) = (u64::from(left), u64::from(right));
        match self {
            Operator::Add => Some(l + r),
            Operator::Subtract => l.checked_sub(r),
            Operator::Multiply => Some(l * r),
            Operator::Divide => {
                if r == 0 || l % r != 0 {
                    None
                } else {
                    Some(l / r)
                }
            }
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Kind of quiz the player asked for. `Mixed` draws a fresh operator per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Addition,
    Subtraction,
    #[default]
    Multiplication,
    Division,
    Mixed,
}

impl Operation {
    /// Fixed operator for single-operator quizzes, `None` for `Mixed`.
    #[must_use]
    pub fn operator(self) -> Option<Operator> {
        match self {
            Operation::Addition => Some(Operator::Add),
            Operation::Subtraction => Some(Operator::Subtract),
            Operation::Multiplication => Some(Operator::Multiply),
            Operation::Division => Some(Operator::Divide),
            Operation::Mixed => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
            Operation::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(Operation::Addition),
            "subtraction" | "subtract" | "sub" | "-" => Ok(Operation::Subtraction),
            "multiplication" | "multiply" | "mul" | "x" | "*" => Ok(Operation::Multiplication),
            "division" | "divide" | "div" | "/" => Ok(Operation::Division),
            "mixed" | "mix" => Ok(Operation::Mixed),
            other => Err(QuestionError::UnknownOperation(other.to_owned())),
        }
    }
}

//
// ─── OPERAND RANGE ────────────────────────────────────────────────────────────
//

/// Inclusive range operands are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    min: u32,
    max: u32,
}

impl OperandRange {
    /// # Errors
    ///
    /// Returns `QuestionError::InvertedRange` if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, QuestionError> {
        if min > max {
            return Err(QuestionError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[must_use]
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Default for OperandRange {
    fn default() -> Self {
        Self { min: 1, max: 12 }
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// One multiple-choice arithmetic problem. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    operator: Operator,
    operands: [u32; 2],
    correct_answer: u64,
    options: [u64; OPTION_COUNT],
}

impl Question {
    /// Builds a question, checking that the options are distinct and include the answer.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidOperands` if the operator has no whole answer,
    /// `QuestionError::DuplicateOptions` if two options repeat, or
    /// `QuestionError::AnswerNotOffered` if the answer is missing from the options.
    pub fn new(
        operator: Operator,
        left: u32,
        right: u32,
        options: [u64; OPTION_COUNT],
    ) -> Result<Self, QuestionError> {
        let correct_answer = operator
            .apply(left, right)
            .ok_or(QuestionError::InvalidOperands {
                operator,
                left,
                right,
            })?;

        let unique: HashSet<u64> = options.iter().copied().collect();
        if unique.len() != OPTION_COUNT {
            return Err(QuestionError::DuplicateOptions);
        }
        if !unique.contains(&correct_answer) {
            return Err(QuestionError::AnswerNotOffered {
                answer: correct_answer,
            });
        }

        Ok(Self {
            operator,
            operands: [left, right],
            correct_answer,
            options,
        })
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        self.operator
    }

    #[must_use]
    pub fn operands(&self) -> [u32; 2] {
        self.operands
    }

    #[must_use]
    pub fn correct_answer(&self) -> u64 {
        self.correct_answer
    }

    #[must_use]
    pub fn options(&self) -> &[u64; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn is_correct(&self, selected: u64) -> bool {
        selected == self.correct_answer
    }

    /// Prompt text such as `7 × 6 = ?`.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "{} {} {} = ?",
            self.operands[0], self.operator, self.operands[1]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_reject_non_whole_answers() {
        assert_eq!(Operator::Subtract.apply(3, 5), None);
        assert_eq!(Operator::Divide.apply(7, 2), None);
        assert_eq!(Operator::Divide.apply(7, 0), None);
        assert_eq!(Operator::Divide.apply(42, 6), Some(7));
        assert_eq!(Operator::Multiply.apply(u32::MAX, 2), Some(u64::from(u32::MAX) * 2));
    }

    #[test]
    fn question_requires_distinct_options_with_answer() {
        let ok = Question::new(Operator::Multiply, 7, 6, [40, 42, 36, 49]).unwrap();
        assert_eq!(ok.correct_answer(), 42);
        assert_eq!(ok.prompt(), "7 × 6 = ?");

        let dup = Question::new(Operator::Multiply, 7, 6, [42, 42, 36, 49]).unwrap_err();
        assert_eq!(dup, QuestionError::DuplicateOptions);

        let missing = Question::new(Operator::Add, 15, 23, [35, 37, 42, 40]).unwrap_err();
        assert_eq!(missing, QuestionError::AnswerNotOffered { answer: 38 });
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(OperandRange::new(12, 1).is_err());
        let range = OperandRange::new(3, 3).unwrap();
        assert!(range.contains(3));
        assert!(!range.contains(4));
    }

    #[test]
    fn operation_parses_common_spellings() {
        assert_eq!("Multiply".parse::<Operation>().unwrap(), Operation::Multiplication);
        assert_eq!("mixed".parse::<Operation>().unwrap(), Operation::Mixed);
        assert!(matches!(
            "modulo".parse::<Operation>(),
            Err(QuestionError::UnknownOperation(_))
        ));
    }
}
