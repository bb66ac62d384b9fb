/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::legality::{probe, Probe};
use crate::{Board, Color, Move, Square};

/// Iterates the squares of every enemy piece that threatens `square`.
///
/// `color` is the color of the side being threatened (the occupant of `square`, or the side
/// that would like to move there). Every piece of the opponent is asked, through the legality oracle
/// in attack mode, whether it could move onto `square` next turn.
pub fn attackers(board: &Board, square: Square, color: Color) -> impl Iterator<Item = Square> + '_ {
    let enemy = color.opponent();
    board
        .pieces_of(enemy)
        .map(|(from, _)| from)
        .filter(move |&from| probe(board, Move::new(from, square), enemy, Probe::Attack))
}

/// Number of enemy pieces threatening `square`. More than one attacker on a King is a double check.
#[inline(always)]
pub fn count_attackers(board: &Board, square: Square, color: Color) -> usize {
    attackers(board, square, color).count()
}

/// Returns `true` if any enemy of `color` threatens `square`.
///
/// # Example
/// ```
/// # use rookery::{is_attacked, Board, Color, Square};
/// let board = Board::from_fen("4k3/8/8/8/8/8/r7/4K3").unwrap();
/// assert!(is_attacked(&board, Square::E2, Color::White));
/// assert!(!is_attacked(&board, Square::F1, Color::White));
/// ```
#[inline(always)]
pub fn is_attacked(board: &Board, square: Square, color: Color) -> bool {
    attackers(board, square, color).next().is_some()
}

/// Returns `true` if `color`'s King is currently threatened.
///
/// A board with no King of that color is never in check.
pub fn king_in_check(board: &Board, color: Color) -> bool {
    board
        .king_square(color)
        .is_some_and(|king| is_attacked(board, king, color))
}

/// Simulates `mv` on a copy of `board` and returns `true` if `color`'s King is not attacked afterwards.
///
/// Promotions are applied before the check, so the promoted Queen is what stands on the destination.
pub fn leaves_king_safe(board: &Board, mv: Move, color: Color) -> bool {
    let after = board.with_move_made(mv);
    !king_in_check(&after, color)
}

/// Returns `true` if `color` may play `mv` without exposing its own King.
///
/// This is the full definition of a legal move, and the check used to validate an opponent's submitted move.
#[inline(always)]
pub fn is_fully_legal(board: &Board, mv: Move, color: Color) -> bool {
    crate::is_legal(board, mv, color) && leaves_king_safe(board, mv, color)
}
