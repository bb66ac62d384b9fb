/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

/// Represents a single square on an `8x8` chess board.
///
/// Internally stored as `file + rank * 8`, so the indices of the board are:
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
///
/// A [`Square`] is always on the board. Raw coordinates are bounds-checked on conversion,
/// so nothing downstream ever has to look up an off-board cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(u8);

impl Square {
    pub const A1: Self = Self::at(0, 0);
    pub const B1: Self = Self::at(1, 0);
    pub const C1: Self = Self::at(2, 0);
    pub const D1: Self = Self::at(3, 0);
    pub const E1: Self = Self::at(4, 0);
    pub const F1: Self = Self::at(5, 0);
    pub const G1: Self = Self::at(6, 0);
    pub const H1: Self = Self::at(7, 0);

    pub const A2: Self = Self::at(0, 1);
    pub const B2: Self = Self::at(1, 1);
    pub const C2: Self = Self::at(2, 1);
    pub const D2: Self = Self::at(3, 1);
    pub const E2: Self = Self::at(4, 1);
    pub const F2: Self = Self::at(5, 1);
    pub const G2: Self = Self::at(6, 1);
    pub const H2: Self = Self::at(7, 1);

    pub const A3: Self = Self::at(0, 2);
    pub const B3: Self = Self::at(1, 2);
    pub const C3: Self = Self::at(2, 2);
    pub const D3: Self = Self::at(3, 2);
    pub const E3: Self = Self::at(4, 2);
    pub const F3: Self = Self::at(5, 2);
    pub const G3: Self = Self::at(6, 2);
    pub const H3: Self = Self::at(7, 2);

    pub const A4: Self = Self::at(0, 3);
    pub const B4: Self = Self::at(1, 3);
    pub const C4: Self = Self::at(2, 3);
    pub const D4: Self = Self::at(3, 3);
    pub const E4: Self = Self::at(4, 3);
    pub const F4: Self = Self::at(5, 3);
    pub const G4: Self = Self::at(6, 3);
    pub const H4: Self = Self::at(7, 3);

    pub const A5: Self = Self::at(0, 4);
    pub const B5: Self = Self::at(1, 4);
    pub const C5: Self = Self::at(2, 4);
    pub const D5: Self = Self::at(3, 4);
    pub const E5: Self = Self::at(4, 4);
    pub const F5: Self = Self::at(5, 4);
    pub const G5: Self = Self::at(6, 4);
    pub const H5: Self = Self::at(7, 4);

    pub const A6: Self = Self::at(0, 5);
    pub const B6: Self = Self::at(1, 5);
    pub const C6: Self = Self::at(2, 5);
    pub const D6: Self = Self::at(3, 5);
    pub const E6: Self = Self::at(4, 5);
    pub const F6: Self = Self::at(5, 5);
    pub const G6: Self = Self::at(6, 5);
    pub const H6: Self = Self::at(7, 5);

    pub const A7: Self = Self::at(0, 6);
    pub const B7: Self = Self::at(1, 6);
    pub const C7: Self = Self::at(2, 6);
    pub const D7: Self = Self::at(3, 6);
    pub const E7: Self = Self::at(4, 6);
    pub const F7: Self = Self::at(5, 6);
    pub const G7: Self = Self::at(6, 6);
    pub const H7: Self = Self::at(7, 6);

    pub const A8: Self = Self::at(0, 7);
    pub const B8: Self = Self::at(1, 7);
    pub const C8: Self = Self::at(2, 7);
    pub const D8: Self = Self::at(3, 7);
    pub const E8: Self = Self::at(4, 7);
    pub const F8: Self = Self::at(5, 7);
    pub const G8: Self = Self::at(6, 7);
    pub const H8: Self = Self::at(7, 7);

    pub const COUNT: usize = 64;

    /// Board-relative constructor for the named constants. `file` and `rank` must be `[0, 7]`.
    #[inline(always)]
    const fn at(file: u8, rank: u8) -> Self {
        Self(file + rank * 8)
    }

    /// Returns an iterator over all 64 squares, starting at `a1` and ending at `h8`.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 64);
    /// assert_eq!(iter.next().unwrap(), Square::A1);
    /// assert_eq!(iter.last().unwrap(), Square::H8);
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(Self)
    }

    /// Creates a new [`Square`] from a file and rank, each of which must be `[0, 7]`.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::new(2, 3), Some(Square::C4));
    /// assert_eq!(Square::new(8, 0), None);
    /// ```
    #[inline(always)]
    pub const fn new(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self::at(file, rank))
        } else {
            None
        }
    }

    /// Creates a new [`Square`] from signed coordinates, rejecting anything off the board.
    #[inline(always)]
    pub const fn from_coords(file: i8, rank: i8) -> Option<Self> {
        if file < 0 || rank < 0 {
            None
        } else {
            Self::new(file as u8, rank as u8)
        }
    }

    /// Creates a new [`Square`] from an index in `[0, 63]`.
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Invalid index for Square: Must be between [0, 63]. Got {index}");
        }
        Ok(Self(index as u8))
    }

    /// The file (column) of this square, `0` for the a-file up to `7` for the h-file.
    #[inline(always)]
    pub const fn file(&self) -> u8 {
        self.0 % 8
    }

    /// The rank (row) of this square, `0` for the first rank up to `7` for the eighth.
    #[inline(always)]
    pub const fn rank(&self) -> u8 {
        self.0 / 8
    }

    /// Returns this square as a `usize`, for indexing into lists of 64 elements.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the square `df` files and `dr` ranks away, if it is still on the board.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::E2.offset(0, 2), Some(Square::E4));
    /// assert_eq!(Square::H1.offset(1, 0), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, df: i8, dr: i8) -> Option<Self> {
        Self::from_coords(self.file() as i8 + df, self.rank() as i8 + dr)
    }

    /// Signed file and rank distance from `self` to `to`.
    #[inline(always)]
    pub const fn delta(&self, to: Self) -> (i8, i8) {
        (
            to.file() as i8 - self.file() as i8,
            to.rank() as i8 - self.rank() as i8,
        )
    }

    /// Returns `true` if `self` and `other` share a file or rank.
    #[inline(always)]
    pub const fn is_orthogonal_to(&self, other: Self) -> bool {
        let (df, dr) = self.delta(other);
        (df == 0) != (dr == 0)
    }

    /// Returns `true` if `self` and `other` share a diagonal.
    #[inline(always)]
    pub const fn is_diagonal_to(&self, other: Self) -> bool {
        let (df, dr) = self.delta(other);
        df != 0 && df.abs() == dr.abs()
    }

    /// Iterates the squares strictly between `self` and `to`.
    ///
    /// Yields nothing if the two squares are equal, adjacent, or not on a shared line.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// let between: Vec<_> = Square::A1.between(Square::D4).collect();
    /// assert_eq!(between, [Square::B2, Square::C3]);
    /// assert_eq!(Square::A1.between(Square::B3).count(), 0);
    /// ```
    #[inline(always)]
    pub fn between(self, to: Self) -> Between {
        let (df, dr) = self.delta(to);
        let aligned = self.is_orthogonal_to(to) || self.is_diagonal_to(to);
        Between {
            next: self,
            to,
            step: (df.signum(), dr.signum()),
            remaining: if aligned { df.abs().max(dr.abs()) - 1 } else { 0 },
        }
    }

    /// Parses a [`Square`] from algebraic notation like `e4`.
    ///
    /// # Example
    /// ```
    /// # use rookery::Square;
    /// assert_eq!(Square::from_uci("e4").unwrap(), Square::E4);
    /// assert!(Square::from_uci("i9").is_err());
    /// ```
    pub fn from_uci(square: &str) -> Result<Self> {
        let mut chars = square.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square must be two characters, like 'e4'. Got {square:?}");
        };

        let file = match file.to_ascii_lowercase() {
            f @ 'a'..='h' => f as u8 - b'a',
            _ => bail!("Invalid file {file:?} in square {square:?}"),
        };
        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .ok_or_else(|| anyhow!("Invalid rank {rank:?} in square {square:?}"))?;

        Ok(Self::at(file, rank as u8 - 1))
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

/// Iterator over the squares strictly between two aligned squares. See [`Square::between`].
#[derive(Debug, Clone)]
pub struct Between {
    next: Square,
    to: Square,
    step: (i8, i8),
    remaining: i8,
}

impl Iterator for Between {
    type Item = Square;
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining <= 0 {
            return None;
        }
        self.remaining -= 1;
        self.next = self.next.offset(self.step.0, self.step.1)?;
        debug_assert_ne!(self.next, self.to);
        Some(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_display_and_parse() {
        for square in Square::iter() {
            assert_eq!(square.to_string().parse::<Square>().unwrap(), square);
        }
        assert_eq!(Square::E4.to_string(), "e4");
    }

    #[test]
    fn test_off_board_coords_rejected() {
        assert_eq!(Square::from_coords(-1, 3), None);
        assert_eq!(Square::from_coords(3, 8), None);
        assert_eq!(Square::A8.offset(0, 1), None);
        assert_eq!(Square::from_coords(7, 7), Some(Square::H8));
    }

    #[test]
    fn test_between_orthogonal_and_diagonal() {
        let file: Vec<_> = Square::E1.between(Square::E5).collect();
        assert_eq!(file, [Square::E2, Square::E3, Square::E4]);

        let rank: Vec<_> = Square::H4.between(Square::D4).collect();
        assert_eq!(rank, [Square::G4, Square::F4, Square::E4]);

        let diag: Vec<_> = Square::H8.between(Square::E5).collect();
        assert_eq!(diag, [Square::G7, Square::F6]);
    }

    #[test]
    fn test_between_unaligned_or_adjacent_is_empty() {
        assert_eq!(Square::E4.between(Square::F6).count(), 0);
        assert_eq!(Square::E4.between(Square::E5).count(), 0);
        assert_eq!(Square::E4.between(Square::E4).count(), 0);
    }
}
