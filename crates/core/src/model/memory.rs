use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::model::result::{EndReason, GameResult, GameType, ResultError};

/// Symbols used by the default board (six pairs, twelve cards).
pub const DEFAULT_SYMBOLS: [&str; 6] = ["cat", "dog", "fox", "frog", "rabbit", "tiger"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MemoryError {
    #[error("a memory board needs at least one pair")]
    NoPairs,

    #[error("symbol {0:?} appears more than once")]
    DuplicateSymbol(String),

    #[error("board is not complete yet")]
    NotComplete,

    #[error(transparent)]
    Result(#[from] ResultError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Flip rejected: card already face-up or matched, a mismatch is showing,
    /// the index is out of range, or the board is complete.
    Ignored,
    Revealed,
    Matched,
    /// Both cards stay face-up until `hide_mismatch` is called.
    Mismatched,
    Completed,
}

/// Pairs-matching board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBoard {
    cards: Vec<String>,
    matched: Vec<bool>,
    face_up: Vec<usize>,
    moves: u32,
    elapsed_secs: u32,
    started: bool,
}

impl MemoryBoard {
    /// Lay out each symbol twice in the given order.
    ///
    /// # Errors
    ///
    /// Returns `MemoryError::NoPairs` for an empty symbol list and
    /// `MemoryError::DuplicateSymbol` if a symbol repeats.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self, MemoryError> {
        if symbols.is_empty() {
            return Err(MemoryError::NoPairs);
        }
        let mut cards = Vec::with_capacity(symbols.len() * 2);
        for symbol in symbols {
            let symbol = symbol.as_ref();
            if cards.iter().any(|c: &String| c == symbol) {
                return Err(MemoryError::DuplicateSymbol(symbol.to_owned()));
            }
            cards.push(symbol.to_owned());
        }
        cards.extend_from_within(..);

        Ok(Self {
            matched: vec![false; cards.len()],
            cards,
            face_up: Vec::with_capacity(2),
            moves: 0,
            elapsed_secs: 0,
            started: false,
        })
    }

    /// Lay out each symbol twice in random order.
    ///
    /// # Errors
    ///
    /// Same as [`MemoryBoard::from_symbols`].
    pub fn shuffled<R: Rng + ?Sized, S: AsRef<str>>(
        rng: &mut R,
        symbols: &[S],
    ) -> Result<Self, MemoryError> {
        let mut board = Self::from_symbols(symbols)?;
        board.cards.shuffle(rng);
        Ok(board)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn pairs(&self) -> u32 {
        u32::try_from(self.cards.len() / 2).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.matched.iter().all(|m| *m)
    }

    #[must_use]
    pub fn matched_pairs(&self) -> u32 {
        let count = self.matched.iter().filter(|m| **m).count() / 2;
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Symbol at `index` if it is currently visible (face-up or matched).
    #[must_use]
    pub fn visible_symbol(&self, index: usize) -> Option<&str> {
        let visible = self.matched.get(index).copied()? || self.face_up.contains(&index);
        visible.then(|| self.cards[index].as_str())
    }

    /// True while two mismatched cards are waiting to be turned back.
    #[must_use]
    pub fn mismatch_pending(&self) -> bool {
        self.face_up.len() == 2
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if index >= self.cards.len()
            || self.is_complete()
            || self.mismatch_pending()
            || self.matched[index]
            || self.face_up.contains(&index)
        {
            return FlipOutcome::Ignored;
        }

        self.started = true;
        self.moves += 1;
        self.face_up.push(index);

        let [first, second] = self.face_up[..] else {
            return FlipOutcome::Revealed;
        };
        if self.cards[first] != self.cards[second] {
            return FlipOutcome::Mismatched;
        }

        self.matched[first] = true;
        self.matched[second] = true;
        self.face_up.clear();
        if self.is_complete() {
            FlipOutcome::Completed
        } else {
            FlipOutcome::Matched
        }
    }

    /// Turns a pending mismatched pair face-down. Returns `false` if none was showing.
    pub fn hide_mismatch(&mut self) -> bool {
        if !self.mismatch_pending() {
            return false;
        }
        self.face_up.clear();
        true
    }

    /// Advances the game clock by one second once play has begun.
    pub fn tick(&mut self) {
        if self.started && !self.is_complete() {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    /// # Errors
    ///
    /// Returns `MemoryError::NotComplete` until every pair is matched.
    pub fn result(&self) -> Result<GameResult, MemoryError> {
        if !self.is_complete() {
            return Err(MemoryError::NotComplete);
        }
        let pairs = self.pairs();
        Ok(GameResult::new(
            pairs,
            pairs,
            self.elapsed_secs,
            EndReason::AllPairsMatched,
            GameType::MemoryMatch,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board() -> MemoryBoard {
        // Layout: a b a b
        MemoryBoard::from_symbols(&["a", "b"]).unwrap()
    }

    #[test]
    fn matching_pair_stays_revealed() {
        let mut board = board();
        assert_eq!(board.flip(0), FlipOutcome::Revealed);
        assert_eq!(board.flip(2), FlipOutcome::Matched);
        assert_eq!(board.visible_symbol(0), Some("a"));
        assert_eq!(board.visible_symbol(1), None);
        assert_eq!(board.matched_pairs(), 1);
        assert_eq!(board.moves(), 2);
    }

    #[test]
    fn mismatch_blocks_flips_until_hidden() {
        let mut board = board();
        board.flip(0);
        assert_eq!(board.flip(1), FlipOutcome::Mismatched);
        assert_eq!(board.flip(2), FlipOutcome::Ignored);
        assert_eq!(board.moves(), 2);

        assert!(board.hide_mismatch());
        assert!(!board.hide_mismatch());
        assert_eq!(board.visible_symbol(0), None);
        assert_eq!(board.flip(2), FlipOutcome::Revealed);
    }

    #[test]
    fn repeated_and_matched_flips_are_ignored() {
        let mut board = board();
        board.flip(0);
        assert_eq!(board.flip(0), FlipOutcome::Ignored);
        board.flip(2);
        assert_eq!(board.flip(2), FlipOutcome::Ignored);
        assert_eq!(board.flip(99), FlipOutcome::Ignored);
        assert_eq!(board.moves(), 2);
    }

    #[test]
    fn completes_and_reports_result() {
        let mut board = board();
        board.tick();
        assert_eq!(board.elapsed_secs(), 0);

        board.flip(0);
        board.tick();
        board.flip(2);
        board.tick();
        board.flip(1);
        assert_eq!(board.flip(3), FlipOutcome::Completed);
        board.tick();

        assert!(board.is_complete());
        assert_eq!(board.elapsed_secs(), 2);
        assert_eq!(board.flip(0), FlipOutcome::Ignored);

        let result = board.result().unwrap();
        assert_eq!(result.score(), 2);
        assert_eq!(result.total_questions(), 2);
        assert_eq!(result.time_taken_secs(), 2);
        assert_eq!(result.ended_by(), EndReason::AllPairsMatched);
        assert_eq!(result.game_type(), GameType::MemoryMatch);
    }

    #[test]
    fn shuffled_board_keeps_every_symbol_twice() {
        let mut rng = StdRng::seed_from_u64(4);
        let board = MemoryBoard::shuffled(&mut rng, &DEFAULT_SYMBOLS).unwrap();
        assert_eq!(board.len(), 12);
        for symbol in DEFAULT_SYMBOLS {
            assert_eq!(board.cards.iter().filter(|c| *c == symbol).count(), 2);
        }
    }

    #[test]
    fn rejects_bad_symbol_sets() {
        let empty: [&str; 0] = [];
        assert_eq!(MemoryBoard::from_symbols(&empty).unwrap_err(), MemoryError::NoPairs);
        assert_eq!(
            MemoryBoard::from_symbols(&["a", "a"]).unwrap_err(),
            MemoryError::DuplicateSymbol("a".into())
        );
        assert_eq!(board().result().unwrap_err(), MemoryError::NotComplete);
    }
}
