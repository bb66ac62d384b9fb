/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Index, str::FromStr};

use anyhow::{bail, Result};

use super::{Color, Move, Piece, PieceKind, Square};

/// FEN placements for the standard starting position.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

/// A snapshot of all pieces and their locations on a chess board.
///
/// Has no knowledge of side-to-move, castling, en passant, or move counters.
/// The side to move is always supplied alongside the board by the caller.
///
/// Internally a flat mailbox of 64 cells, so copying a [`Board`] is cheap.
/// Search explores a branch by copying the board and applying the trial move to the copy
/// (see [`Board::with_move_made`]), never by mutating and undoing.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    mailbox: [Option<Piece>; Square::COUNT],
}

impl Board {
    /// Creates a new, empty [`Board`] containing no pieces.
    ///
    /// # Example
    /// ```
    /// # use rookery::Board;
    /// let board = Board::new();
    /// assert_eq!(board.to_fen(), "8/8/8/8/8/8/8/8");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
        }
    }

    /// Constructs a [`Board`] from a FEN string.
    ///
    /// Only the placements field is read. Any fields after it (side to move, castling, etc.) are ignored.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Board, Piece, Square};
    /// let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    /// assert_eq!(board.piece_at(Square::E1), Some(Piece::WHITE_KING));
    /// assert_eq!(board.piece_at(Square::E8), Some(Piece::BLACK_KING));
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut board = Self::new();

        let Some(placements) = fen.split_ascii_whitespace().next() else {
            bail!("FEN string is empty");
        };

        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
        }

        // Reversed so that White's pieces are at the "bottom" of the board
        for (rank, placements) in placements.split('/').rev().enumerate() {
            let mut file = 0;

            for piece_char in placements.chars() {
                if let Ok(piece) = Piece::from_uci(piece_char) {
                    let Some(square) = Square::new(file, rank as u8) else {
                        bail!("FEN rank {} overflows the board: {placements:?}", rank + 1);
                    };
                    board.place(piece, square);
                    file += 1;
                } else {
                    let digit = piece_char.to_digit(10).filter(|n| (1..=8).contains(n));
                    let Some(empty) = digit else {
                        bail!("FEN placements must be piece chars or digits. Got {piece_char:?}");
                    };
                    file += empty as u8;

                    if file > 8 {
                        bail!("FEN rank {} overflows the board: {placements:?}", rank + 1);
                    }
                }
            }

            if file != 8 {
                bail!(
                    "FEN rank {} must describe exactly 8 files. Got {placements:?}",
                    rank + 1
                );
            }
        }

        Ok(board)
    }

    /// Generates the placements field of a FEN string for this board.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(72);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                // Safe unwrap: both are in `[0, 7]`
                let square = Square::new(file, rank).unwrap();
                if let Some(piece) = self.piece_at(square) {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    fen.push(piece.char());
                } else {
                    empty += 1;
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }

    /// Fetches the [`Piece`] at the provided [`Square`], if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// Returns `true` if there is a piece at the given [`Square`].
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.mailbox[square.index()].is_some()
    }

    /// Fetches the [`Color`] of the piece at the provided [`Square`], if there is one.
    #[inline(always)]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.piece_at(square).map(|piece| piece.color())
    }

    /// Places `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.mailbox[square.index()] = Some(piece);
    }

    /// Removes and returns the piece on `square`, if there was one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()].take()
    }

    /// Iterates over every occupied square and the piece on it, from `a1` to `h8`.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over every square holding a piece of `color`, and the piece on it.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color() == color)
    }

    /// Scans the board for `color`'s King.
    ///
    /// Nothing is cached: the location is recomputed from the cells on every call.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::iter().find(|&square| self.piece_at(square) == Some(king))
    }

    /// Applies `mv` to this board in place.
    ///
    /// The piece on `mv.from()` replaces whatever is on `mv.to()`.
    /// A Pawn landing on its farthest rank becomes a Queen.
    /// No legality checks are performed; see [`crate::is_legal`].
    ///
    /// # Example
    /// ```
    /// # use rookery::{Board, Move, Piece, Square};
    /// let mut board = Board::from_fen("k7/4P3/8/8/8/8/8/4K3").unwrap();
    /// board.make_move(Move::new(Square::E7, Square::E8));
    /// assert_eq!(board.piece_at(Square::E8), Some(Piece::WHITE_QUEEN));
    /// assert_eq!(board.piece_at(Square::E7), None);
    /// ```
    pub fn make_move(&mut self, mv: Move) {
        let Some(mut piece) = self.take(mv.from()) else {
            return;
        };

        if piece.is_pawn() && mv.to().rank() == piece.color().promotion_rank() {
            piece = piece.promoted(PieceKind::Queen);
        }

        self.place(piece, mv.to());
    }

    /// Copy-make: returns a copy of this board with `mv` applied, leaving `self` untouched.
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut board = *self;
        board.make_move(mv);
        board
    }
}

impl Default for Board {
    /// The standard starting position.
    #[inline(always)]
    fn default() -> Self {
        let mut board = Self::new();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        for (file, kind) in back_rank.into_iter().enumerate() {
            for color in Color::all() {
                let home = match color {
                    Color::White => 0,
                    Color::Black => 7,
                };
                // Safe unwraps: every file and rank here is in `[0, 7]`
                let back = Square::new(file as u8, home).unwrap();
                let pawns = Square::new(file as u8, color.pawn_rank()).unwrap();
                board.place(Piece::new(color, kind), back);
                board.place(Piece::new(color, PieceKind::Pawn), pawns);
            }
        }

        board
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Index<Square> for Board {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.mailbox[index.index()]
    }
}

impl From<[Option<Piece>; Square::COUNT]> for Board {
    fn from(mailbox: [Option<Piece>; Square::COUNT]) -> Self {
        Self { mailbox }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{}| ", rank + 1)?;

            for file in 0..8 {
                // Safe unwrap: both are in `[0, 7]`
                let square = Square::new(file, rank).unwrap();
                let occupant = self.piece_at(square).map(|p| p.char()).unwrap_or('.');
                write!(f, "{occupant} ")?;
            }

            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..8 {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in b'a'..=b'h' {
            write!(f, "{} ", file as char)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_fen())
    }
}
