/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use super::attacks::{attackers, leaves_king_safe};
use crate::{is_legal, Board, Color, Move, MoveFlag, Square};

/// Offsets of the eight squares surrounding a King.
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// How much danger a King is in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum KingSafety {
    /// Not attacked.
    #[default]
    Safe,

    /// Attacked, with at least one legal response.
    Check,

    /// Attacked, with no legal response of any kind.
    Checkmate,
}

impl KingSafety {
    /// Returns `true` if the King is attacked, mated or not.
    #[inline(always)]
    pub const fn is_check(&self) -> bool {
        matches!(self, Self::Check | Self::Checkmate)
    }

    #[inline(always)]
    pub const fn is_checkmate(&self) -> bool {
        matches!(self, Self::Checkmate)
    }
}

impl From<KingSafety> for MoveFlag {
    /// The annotation given to a move that leaves the opponent's King in this state.
    #[inline(always)]
    fn from(safety: KingSafety) -> Self {
        match safety {
            KingSafety::Safe => Self::None,
            KingSafety::Check => Self::Check,
            KingSafety::Checkmate => Self::Checkmate,
        }
    }
}

impl fmt::Display for KingSafety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Safe => "safe",
            Self::Check => "check",
            Self::Checkmate => "checkmate",
        };
        write!(f, "{name}")
    }
}

/// Classifies the safety of `color`'s King, standing on `king`.
///
/// Responses to check are tried from cheapest to most expensive, stopping at the first that works:
/// 1. The King steps to a safe neighboring square.
/// 2. A single checker is captured.
/// 3. A single sliding checker is blocked.
///
/// A double check can only be answered by moving the King.
///
/// Capturing and blocking only count if they leave the King unattacked, so a position is [`KingSafety::Checkmate`]
/// exactly when `color` is in check and has no legal move at all.
///
/// # Example
/// ```
/// # use rookery::{classify, Board, Color, KingSafety, Square};
/// // Back-rank mate
/// let board = Board::from_fen("6k1/8/8/8/8/8/6PP/r6K").unwrap();
/// assert_eq!(classify(&board, Square::H1, Color::White), KingSafety::Checkmate);
/// ```
pub fn classify(board: &Board, king: Square, color: Color) -> KingSafety {
    let checkers: Vec<Square> = attackers(board, king, color).collect();

    match checkers.as_slice() {
        [] => KingSafety::Safe,

        _ if can_king_escape(board, king, color) => KingSafety::Check,

        &[checker]
            if can_checker_be_captured(board, checker, color)
                || can_check_be_blocked(board, checker, king, color) =>
        {
            KingSafety::Check
        }

        _ => KingSafety::Checkmate,
    }
}

/// Scans the board for `color`'s King and classifies its safety. See [`classify`].
///
/// A board without a King of that color is considered [`KingSafety::Safe`].
pub fn king_safety(board: &Board, color: Color) -> KingSafety {
    board
        .king_square(color)
        .map_or(KingSafety::Safe, |king| classify(board, king, color))
}

/// Returns `true` if the King on `king` has at least one legal step to a square that is not attacked.
pub fn can_king_escape(board: &Board, king: Square, color: Color) -> bool {
    KING_STEPS
        .iter()
        .filter_map(|&(df, dr)| king.offset(df, dr))
        .any(|to| is_legal(board, Move::new(king, to), color))
}

/// Returns `true` if any of `color`'s pieces can capture the piece on `checker` without leaving its King attacked.
pub fn can_checker_be_captured(board: &Board, checker: Square, color: Color) -> bool {
    board.pieces_of(color).any(|(from, _)| {
        let mv = Move::new(from, checker);
        is_legal(board, mv, color) && leaves_king_safe(board, mv, color)
    })
}

/// Returns `true` if any of `color`'s pieces other than the King can move onto a square strictly between
/// `checker` and `king`, without leaving its King attacked.
///
/// Checks from Knights, Pawns and Kings have no squares in between and can never be blocked.
pub fn can_check_be_blocked(board: &Board, checker: Square, king: Square, color: Color) -> bool {
    let slider = board
        .piece_at(checker)
        .is_some_and(|piece| piece.kind().is_slider());

    if !slider {
        return false;
    }

    checker.between(king).any(|block| {
        board
            .pieces_of(color)
            .filter(|(_, piece)| !piece.is_king())
            .any(|(from, _)| {
                let mv = Move::new(from, block);
                is_legal(board, mv, color) && leaves_king_safe(board, mv, color)
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safety(fen: &str, color: Color) -> KingSafety {
        king_safety(&Board::from_fen(fen).unwrap(), color)
    }

    #[test]
    fn test_not_in_check_is_safe() {
        assert_eq!(safety(crate::FEN_STARTPOS, Color::White), KingSafety::Safe);
        assert_eq!(safety(crate::FEN_STARTPOS, Color::Black), KingSafety::Safe);
    }

    #[test]
    fn test_escape_by_stepping_aside() {
        assert_eq!(safety("4k3/8/8/8/8/8/8/4K2r", Color::White), KingSafety::Check);
    }

    #[test]
    fn test_escape_by_capturing_the_checker() {
        // King is boxed in, but the Rook on a8 can take the checker on a1
        let board = Board::from_fen("R5k1/8/8/8/8/8/6PP/r6K").unwrap();
        assert!(!can_king_escape(&board, Square::H1, Color::White));
        assert!(can_checker_be_captured(&board, Square::A1, Color::White));
        assert_eq!(classify(&board, Square::H1, Color::White), KingSafety::Check);
    }

    #[test]
    fn test_escape_by_blocking() {
        let board = Board::from_fen("6k1/8/8/8/8/4N3/6PP/r6K").unwrap();
        assert!(!can_king_escape(&board, Square::H1, Color::White));
        assert!(!can_checker_be_captured(&board, Square::A1, Color::White));
        assert!(can_check_be_blocked(&board, Square::A1, Square::H1, Color::White));
        assert_eq!(classify(&board, Square::H1, Color::White), KingSafety::Check);
    }

    #[test]
    fn test_pinned_defender_cannot_block() {
        // The Bishop could block on f1, but only by stepping out of the Queen's pin
        let board = Board::from_fen("6k1/8/8/8/8/5q2/6BP/r6K").unwrap();
        assert_eq!(classify(&board, Square::H1, Color::White), KingSafety::Checkmate);
    }

    #[test]
    fn test_knight_checks_cannot_be_blocked() {
        let board = Board::from_fen("6rk/5Npp/8/8/8/8/8/6K1").unwrap();
        assert!(!can_check_be_blocked(&board, Square::F7, Square::H8, Color::Black));
        assert_eq!(classify(&board, Square::H8, Color::Black), KingSafety::Checkmate);
    }

    #[test]
    fn test_double_check_requires_king_move() {
        // Either checker could be captured on its own, but not both at once
        let board = Board::from_fen("k7/8/8/8/3Q4/8/5nPP/r6K").unwrap();
        assert_eq!(count_checkers(&board, Square::H1), 2);
        assert_eq!(classify(&board, Square::H1, Color::White), KingSafety::Checkmate);
    }

    fn count_checkers(board: &Board, king: Square) -> usize {
        crate::count_attackers(board, king, Color::White)
    }

    #[test]
    fn test_flag_conversion() {
        assert_eq!(MoveFlag::from(KingSafety::Safe), MoveFlag::None);
        assert_eq!(MoveFlag::from(KingSafety::Check), MoveFlag::Check);
        assert_eq!(MoveFlag::from(KingSafety::Checkmate), MoveFlag::Checkmate);
    }
}
