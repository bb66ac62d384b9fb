/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use anyhow::{bail, Context, Result};

use crate::{Score, Square};

/// A list of moves, as produced by the move generator.
pub type MoveList = Vec<Move>;

/// Annotation describing what a [`Move`] does to the opponent's King.
///
/// Computed once the move has been chosen, never during legality checking.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, PartialOrd, Ord)]
pub enum MoveFlag {
    #[default]
    None,
    Check,
    Checkmate,
}

impl MoveFlag {
    /// Returns `true` if the move attacks the opponent's King, including mate.
    #[inline(always)]
    pub const fn gives_check(&self) -> bool {
        matches!(self, Self::Check | Self::Checkmate)
    }

    /// Suffix used when displaying a move with this flag.
    #[inline(always)]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Check => "+",
            Self::Checkmate => "#",
        }
    }
}

/// A move of the piece on `from` to `to`.
///
/// Promotion is implicit: a Pawn landing on its farthest rank always becomes a Queen.
///
/// The [`MoveFlag`] is an annotation and takes no part in equality or hashing,
/// so a move compares equal to itself before and after being annotated.
#[derive(Clone, Copy, Default)]
pub struct Move {
    from: Square,
    to: Square,
    flag: MoveFlag,
}

impl Move {
    /// Creates a new, unannotated [`Move`].
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            flag: MoveFlag::None,
        }
    }

    /// Creates a [`Move`] from raw `(file, rank)` coordinates, rejecting anything off the board.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Move, Square};
    /// assert_eq!(Move::from_coords((4, 1), (4, 3)), Some(Move::new(Square::E2, Square::E4)));
    /// assert_eq!(Move::from_coords((4, 1), (4, 8)), None);
    /// ```
    #[inline(always)]
    pub const fn from_coords(from: (i8, i8), to: (i8, i8)) -> Option<Self> {
        match (
            Square::from_coords(from.0, from.1),
            Square::from_coords(to.0, to.1),
        ) {
            (Some(from), Some(to)) => Some(Self::new(from, to)),
            _ => None,
        }
    }

    /// Returns a copy of this [`Move`] carrying the provided annotation.
    #[inline(always)]
    pub const fn with_flag(self, flag: MoveFlag) -> Self {
        Self { flag, ..self }
    }

    /// Source square.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Destination square.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Check/Checkmate annotation.
    #[inline(always)]
    pub const fn flag(&self) -> MoveFlag {
        self.flag
    }

    /// Parses a move in coordinate notation, like `e2e4`.
    ///
    /// A trailing `+`/`#` is accepted and sets the flag. A trailing promotion letter `q` is accepted and ignored,
    /// since every promotion is to a Queen.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Move, MoveFlag, Square};
    /// let mv = Move::from_uci("e7e8q+").unwrap();
    /// assert_eq!(mv.from(), Square::E7);
    /// assert_eq!(mv.to(), Square::E8);
    /// assert_eq!(mv.flag(), MoveFlag::Check);
    /// ```
    pub fn from_uci(mv: &str) -> Result<Self> {
        let (body, flag) = if let Some(body) = mv.strip_suffix('#') {
            (body, MoveFlag::Checkmate)
        } else if let Some(body) = mv.strip_suffix('+') {
            (body, MoveFlag::Check)
        } else {
            (mv, MoveFlag::None)
        };

        let body = match body.len() {
            4 => body,
            5 if body.ends_with(['q', 'Q']) => &body[..4],
            _ => bail!("Move must be of the form 'e2e4'. Got {mv:?}"),
        };

        let from = body
            .get(0..2)
            .context("Move is missing its source square")?
            .parse()?;
        let to = body
            .get(2..4)
            .context("Move is missing its destination square")?
            .parse()?;

        Ok(Self::new(from, to).with_flag(flag))
    }
}

impl PartialEq for Move {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, self.to, self.flag.suffix())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self, self.flag)
    }
}

/// A [`Move`] paired with the score assigned to it by search or move ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: Score,
}

impl ScoredMove {
    #[inline(always)]
    pub const fn new(mv: Move, score: Score) -> Self {
        Self { mv, score }
    }
}

impl fmt::Display for ScoredMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mv, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_does_not_affect_equality() {
        let mv = Move::new(Square::G1, Square::F3);
        assert_eq!(mv, mv.with_flag(MoveFlag::Checkmate));
        assert_ne!(mv, Move::new(Square::F3, Square::G1));
    }

    #[test]
    fn test_display_includes_flag_suffix() {
        let mv = Move::new(Square::D1, Square::H5);
        assert_eq!(mv.to_string(), "d1h5");
        assert_eq!(mv.with_flag(MoveFlag::Check).to_string(), "d1h5+");
        assert_eq!(mv.with_flag(MoveFlag::Checkmate).to_string(), "d1h5#");
    }

    #[test]
    fn test_from_uci_rejects_garbage() {
        assert!(Move::from_uci("e2").is_err());
        assert!(Move::from_uci("e2e9").is_err());
        assert!(Move::from_uci("e7e8n").is_err());
        assert!(Move::from_uci("e2e4").is_ok());
    }
}
