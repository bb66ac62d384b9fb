/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::Move;

/// Number of past turns remembered.
const MEMORY_LEN: usize = 2;

/// The last few moves a side played, used to keep it from shuffling back and forth.
///
/// Owned by the caller across turns: handed to a search at the start of a turn and handed back,
/// updated, in the search's result. Nothing in here is touched while the search is recursing.
///
/// Remembers two things, newest first:
/// * the last two moves played,
/// * the last two of those moves that gave check.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TurnMemory {
    moves: [Option<Move>; MEMORY_LEN],
    checks: [Option<Move>; MEMORY_LEN],
}

impl TurnMemory {
    /// Creates an empty [`TurnMemory`], as at the start of a game.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            moves: [None; MEMORY_LEN],
            checks: [None; MEMORY_LEN],
        }
    }

    /// Records `mv` as the move just played. Its flag decides whether it is also remembered as a check.
    pub fn record(&mut self, mv: Move) {
        push_front(&mut self.moves, mv);

        if mv.flag().gives_check() {
            push_front(&mut self.checks, mv);
        }
    }

    /// The most recently played moves, newest first.
    pub fn recent_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().flatten().copied()
    }

    /// The most recently played moves that gave check, newest first.
    pub fn recent_checks(&self) -> impl Iterator<Item = Move> + '_ {
        self.checks.iter().flatten().copied()
    }

    /// Returns `true` if playing `mv` would repeat recent play.
    ///
    /// That is the case when `mv` is one of the last two moves played, or when it moves
    /// the piece that delivered one of the last two checks off of the square it checked from.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Move, MoveFlag, TurnMemory};
    /// let mut memory = TurnMemory::new();
    /// memory.record("d1h5".parse::<Move>().unwrap().with_flag(MoveFlag::Check));
    ///
    /// assert!(memory.is_repetition("d1h5".parse().unwrap()));
    /// assert!(memory.is_repetition("h5f7".parse().unwrap()));
    /// assert!(!memory.is_repetition("g1f3".parse().unwrap()));
    /// ```
    pub fn is_repetition(&self, mv: Move) -> bool {
        self.recent_moves().any(|played| played == mv)
            || self.recent_checks().any(|check| check.to() == mv.from())
    }

    /// Forgets everything, as at the start of a new game.
    #[inline(always)]
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// Shifts every entry one slot back, dropping the oldest, and puts `mv` in front.
#[inline(always)]
fn push_front(slots: &mut [Option<Move>; MEMORY_LEN], mv: Move) {
    slots.rotate_right(1);
    slots[0] = Some(mv);
}

impl fmt::Display for TurnMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let moves = self.recent_moves().map(|mv| mv.to_string()).collect::<Vec<_>>();
        let checks = self.recent_checks().map(|mv| mv.to_string()).collect::<Vec<_>>();

        write!(
            f,
            "moves: [{}] checks: [{}]",
            moves.join(", "),
            checks.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoveFlag, Square};

    #[test]
    fn test_only_two_moves_are_remembered() {
        let mut memory = TurnMemory::new();
        let first = Move::new(Square::G1, Square::F3);
        let second = Move::new(Square::F3, Square::G1);
        let third = Move::new(Square::B1, Square::C3);

        memory.record(first);
        memory.record(second);
        memory.record(third);

        assert_eq!(memory.recent_moves().collect::<Vec<_>>(), [third, second]);
        assert!(!memory.is_repetition(first));
        assert!(memory.is_repetition(second));
    }

    #[test]
    fn test_quiet_moves_are_not_checks() {
        let mut memory = TurnMemory::new();
        memory.record(Move::new(Square::E2, Square::E4));
        assert_eq!(memory.recent_checks().count(), 0);

        memory.record(Move::new(Square::D1, Square::H5).with_flag(MoveFlag::Checkmate));
        assert_eq!(memory.recent_checks().count(), 1);
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut memory = TurnMemory::new();
        memory.record(Move::new(Square::D1, Square::H5).with_flag(MoveFlag::Check));
        memory.clear();
        assert_eq!(memory, TurnMemory::default());
        assert_eq!(memory.to_string(), "moves: [] checks: []");
    }
}
