//! Random multiple-choice arithmetic question generation.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::{OPTION_COUNT, OperandRange, Operation, Operator, Question, QuestionError};

/// Offsets added to the correct answer to build plausible wrong choices.
pub const DEFAULT_DISTRACTOR_OFFSETS: [i64; 16] =
    [-10, -8, -6, -5, -4, -3, -2, -1, 1, 2, 3, 4, 5, 6, 8, 10];

/// Random draws allowed per question before falling back to a sweep of the offsets.
pub const MAX_DISTRACTOR_DRAWS: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("question count must be at least one")]
    ZeroCount,

    #[error("distractor offsets are empty")]
    NoOffsets,

    #[error("operand range {min}..={max} has no non-zero divisor")]
    NoDivisor { min: u32, max: u32 },

    #[error(
        "could not find {needed} distinct non-negative distractors for answer {answer}; \
         operand range or offsets are too narrow"
    )]
    DistractorsExhausted { answer: u64, needed: usize },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Builds quiz questions with one correct answer and three distractors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionGenerator {
    offsets: Vec<i64>,
    max_draws: usize,
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_DISTRACTOR_OFFSETS.to_vec(),
            max_draws: MAX_DISTRACTOR_DRAWS,
        }
    }
}

impl QuestionGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the distractor offset set.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::NoOffsets` for an empty set.
    pub fn with_offsets(mut self, offsets: Vec<i64>) -> Result<Self, GeneratorError> {
        if offsets.is_empty() {
            return Err(GeneratorError::NoOffsets);
        }
        self.offsets = offsets;
        Ok(self)
    }

    #[must_use]
    pub fn with_max_draws(mut self, max_draws: usize) -> Self {
        self.max_draws = max_draws;
        self
    }

    /// Generate `count` questions for `operation` with operands from `range`.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError::ZeroCount` for `count == 0`,
    /// `GeneratorError::NoDivisor` when division is requested over `0..=0`, and
    /// `GeneratorError::DistractorsExhausted` when the offsets cannot supply
    /// three distinct non-negative distractors.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
        operation: Operation,
        range: OperandRange,
    ) -> Result<Vec<Question>, GeneratorError> {
        if count == 0 {
            return Err(GeneratorError::ZeroCount);
        }
        let divisor_floor = range.min().max(1);
        let division_possible = divisor_floor <= range.max();
        if operation == Operation::Division && !division_possible {
            return Err(GeneratorError::NoDivisor {
                min: range.min(),
                max: range.max(),
            });
        }

        (0..count)
            .map(|_| {
                let operator = match operation.operator() {
                    Some(op) => op,
                    None => pick_mixed_operator(rng, division_possible),
                };
                self.question(rng, operator, range)
            })
            .collect()
    }

    fn question<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        operator: Operator,
        range: OperandRange,
    ) -> Result<Question, GeneratorError> {
        let (left, right) = draw_operands(rng, operator, range);
        let answer = operator
            .apply(left, right)
            .ok_or(QuestionError::InvalidOperands {
                operator,
                left,
                right,
            })?;
        let mut options = self.options_for(rng, answer)?;
        options.shuffle(rng);
        Ok(Question::new(operator, left, right, options)?)
    }

    fn options_for<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        answer: u64,
    ) -> Result<[u64; OPTION_COUNT], GeneratorError> {
        let mut seen = HashSet::with_capacity(OPTION_COUNT);
        let mut options = Vec::with_capacity(OPTION_COUNT);
        seen.insert(answer);
        options.push(answer);

        let mut push = |offset: i64, options: &mut Vec<u64>| {
            if let Some(candidate) = offset_answer(answer, offset)
                && seen.insert(candidate)
            {
                options.push(candidate);
            }
        };

        for _ in 0..self.max_draws {
            if options.len() == OPTION_COUNT {
                break;
            }
            if let Some(&offset) = self.offsets.choose(rng) {
                push(offset, &mut options);
            }
        }

        // Deterministic sweep so a run of unlucky draws cannot starve the question.
        for &offset in &self.offsets {
            if options.len() == OPTION_COUNT {
                break;
            }
            push(offset, &mut options);
        }

        options
            .try_into()
            .map_err(|_| GeneratorError::DistractorsExhausted {
                answer,
                needed: OPTION_COUNT - 1,
            })
    }
}

fn offset_answer(answer: u64, offset: i64) -> Option<u64> {
    if offset >= 0 {
        answer.checked_add(offset.unsigned_abs())
    } else {
        answer.checked_sub(offset.unsigned_abs())
    }
}

fn pick_mixed_operator<R: Rng + ?Sized>(rng: &mut R, allow_division: bool) -> Operator {
    // Divide is last in `Operator::ALL`.
    let upper = if allow_division {
        Operator::ALL.len()
    } else {
        Operator::ALL.len() - 1
    };
    Operator::ALL[rng.random_range(0..upper)]
}

fn draw_operands<R: Rng + ?Sized>(
    rng: &mut R,
    operator: Operator,
    range: OperandRange,
) -> (u32, u32) {
    let mut draw = |lo: u32| rng.random_range(lo..=range.max());
    match operator {
        Operator::Add | Operator::Multiply => (draw(range.min()), draw(range.min())),
        Operator::Subtract => {
            let (a, b) = (draw(range.min()), draw(range.min()));
            (a.max(b), a.min(b))
        }
        Operator::Divide => {
            let divisor = draw(range.min().max(1));
            let quotient = draw(range.min());
            // Dividend may exceed the range but must fit in u32.
            let quotient = quotient.min(u32::MAX / divisor);
            (divisor * quotient, divisor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_well_formed(q: &Question) {
        let unique: HashSet<_> = q.options().iter().collect();
        assert_eq!(unique.len(), OPTION_COUNT);
        assert!(q.options().contains(&q.correct_answer()));
        let [l, r] = q.operands();
        assert_eq!(q.operator().apply(l, r), Some(q.correct_answer()));
    }

    #[test]
    fn generates_requested_count_of_valid_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = OperandRange::new(1, 12).unwrap();
        let questions = QuestionGenerator::new()
            .generate(&mut rng, 10, Operation::Multiplication, range)
            .unwrap();

        assert_eq!(questions.len(), 10);
        for q in &questions {
            assert_well_formed(q);
            assert_eq!(q.operator(), Operator::Multiply);
            let [l, r] = q.operands();
            assert!(range.contains(l) && range.contains(r));
        }
    }

    #[test]
    fn every_operation_yields_whole_answers() {
        let mut rng = StdRng::seed_from_u64(42);
        let range = OperandRange::new(0, 20).unwrap();
        let generator = QuestionGenerator::new();
        for operation in [
            Operation::Addition,
            Operation::Subtraction,
            Operation::Multiplication,
            Operation::Division,
            Operation::Mixed,
        ] {
            for q in generator.generate(&mut rng, 50, operation, range).unwrap() {
                assert_well_formed(&q);
                if q.operator() == Operator::Divide {
                    assert_ne!(q.operands()[1], 0);
                }
            }
        }
    }

    #[test]
    fn zero_answers_still_get_three_distractors() {
        let mut rng = StdRng::seed_from_u64(3);
        let range = OperandRange::new(0, 0).unwrap();
        let questions = QuestionGenerator::new()
            .generate(&mut rng, 5, Operation::Addition, range)
            .unwrap();
        for q in &questions {
            assert_eq!(q.correct_answer(), 0);
            assert_well_formed(q);
        }
    }

    #[test]
    fn single_draw_budget_falls_back_to_sweep() {
        let mut rng = StdRng::seed_from_u64(11);
        let generator = QuestionGenerator::new().with_max_draws(0);
        let range = OperandRange::new(2, 9).unwrap();
        for q in generator
            .generate(&mut rng, 20, Operation::Addition, range)
            .unwrap()
        {
            assert_well_formed(&q);
        }
    }

    #[test]
    fn narrow_offsets_fail_instead_of_looping() {
        let mut rng = StdRng::seed_from_u64(1);
        let generator = QuestionGenerator::new().with_offsets(vec![-1, -2, -3]).unwrap();
        let range = OperandRange::new(0, 0).unwrap();
        let err = generator
            .generate(&mut rng, 1, Operation::Addition, range)
            .unwrap_err();
        assert_eq!(
            err,
            GeneratorError::DistractorsExhausted {
                answer: 0,
                needed: 3
            }
        );
    }

    #[test]
    fn rejects_bad_requests() {
        let mut rng = StdRng::seed_from_u64(5);
        let generator = QuestionGenerator::new();
        let range = OperandRange::default();
        assert_eq!(
            generator
                .generate(&mut rng, 0, Operation::Addition, range)
                .unwrap_err(),
            GeneratorError::ZeroCount
        );
        let zero = OperandRange::new(0, 0).unwrap();
        assert_eq!(
            generator
                .generate(&mut rng, 3, Operation::Division, zero)
                .unwrap_err(),
            GeneratorError::NoDivisor { min: 0, max: 0 }
        );
        assert_eq!(
            QuestionGenerator::new().with_offsets(Vec::new()).unwrap_err(),
            GeneratorError::NoOffsets
        );
    }

    #[test]
    fn mixed_over_zero_range_skips_division() {
        let mut rng = StdRng::seed_from_u64(9);
        let zero = OperandRange::new(0, 0).unwrap();
        let questions = QuestionGenerator::new()
            .generate(&mut rng, 30, Operation::Mixed, zero)
            .unwrap();
        assert!(questions.iter().all(|q| q.operator() != Operator::Divide));
    }
}
