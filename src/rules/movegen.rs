/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::cmp::Reverse;

use super::attacks::{is_attacked, leaves_king_safe};
use crate::{is_legal, Board, Color, Move, MoveList, Piece, PieceKind, Square};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

const ORTHOGONAL_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

const DIAGONAL_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Bonus given to a move that promotes, on top of any capture it makes.
const PROMOTION_BONUS: i32 = PieceKind::Queen.value() * 10;

/// Generates every legal move for `color` on `board`.
///
/// Candidates come from each piece's fixed step set (Pawn, Knight, King) or from walking its rays (Bishop, Rook, Queen)
/// until the first occupied square. Every candidate must then pass the legality oracle and must not leave `color`'s
/// King attacked once played.
///
/// The order of the returned moves carries no meaning. See [`order_moves`].
///
/// # Example
/// ```
/// # use rookery::{generate_moves, Board, Color};
/// assert_eq!(generate_moves(&Board::default(), Color::White).len(), 20);
/// ```
pub fn generate_moves(board: &Board, color: Color) -> MoveList {
    let mut moves = MoveList::with_capacity(48);

    for (from, piece) in board.pieces_of(color) {
        push_legal_moves(board, from, piece, &mut moves);
    }

    moves
}

/// Generates every legal move for the piece on `square`, if it belongs to `color`.
pub fn generate_moves_from(board: &Board, square: Square, color: Color) -> MoveList {
    let mut moves = MoveList::new();

    if let Some(piece) = board.piece_at(square).filter(|p| p.color() == color) {
        push_legal_moves(board, square, piece, &mut moves);
    }

    moves
}

fn push_legal_moves(board: &Board, from: Square, piece: Piece, moves: &mut MoveList) {
    let color = piece.color();
    let mut targets = Vec::with_capacity(27);
    candidate_targets(board, from, piece, &mut targets);

    let legal = targets.into_iter().map(|to| Move::new(from, to)).filter(|&mv| {
        // King moves already simulate self-check inside the oracle
        is_legal(board, mv, color) && (piece.is_king() || leaves_king_safe(board, mv, color))
    });

    moves.extend(legal);
}

/// Pushes every destination `piece` could geometrically reach from `from`, before any legality filtering.
fn candidate_targets(board: &Board, from: Square, piece: Piece, targets: &mut Vec<Square>) {
    match piece.kind() {
        PieceKind::Pawn => {
            let forward = piece.color().forward();
            let pawn_deltas = [(0, forward), (0, 2 * forward), (-1, forward), (1, forward)];
            steps(from, &pawn_deltas, targets);
        }
        PieceKind::Knight => steps(from, &KNIGHT_DELTAS, targets),
        PieceKind::King => steps(from, &KING_DELTAS, targets),
        PieceKind::Bishop => rays(board, from, &DIAGONAL_RAYS, targets),
        PieceKind::Rook => rays(board, from, &ORTHOGONAL_RAYS, targets),
        PieceKind::Queen => {
            rays(board, from, &ORTHOGONAL_RAYS, targets);
            rays(board, from, &DIAGONAL_RAYS, targets);
        }
    }
}

/// Pushes every on-board square a fixed offset away from `from`.
#[inline(always)]
fn steps(from: Square, deltas: &[(i8, i8)], targets: &mut Vec<Square>) {
    targets.extend(deltas.iter().filter_map(|&(df, dr)| from.offset(df, dr)));
}

/// Walks each ray outward from `from`, stopping on (and including) the first occupied square.
fn rays(board: &Board, from: Square, directions: &[(i8, i8)], targets: &mut Vec<Square>) {
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            targets.push(next);
            if board.has(next) {
                break;
            }
            current = next;
        }
    }
}

/// Heuristic score used to expand promising moves first.
///
/// Captures score by the victim's value less the mover's, promotions earn a bonus,
/// and a move whose destination is attacked once played is penalized by the mover's value.
/// Has no effect on the result of a search, only on how much of the tree can be pruned.
pub fn move_order_score(board: &Board, mv: Move, color: Color) -> i32 {
    let Some(mover) = board.piece_at(mv.from()) else {
        return i32::MIN;
    };
    // A King can never be lost in a legal line, so it risks nothing by moving
    let mover_value = if mover.is_king() { 0 } else { mover.value() };

    let promotes = mover.is_pawn() && mv.to().rank() == color.promotion_rank();

    let mut score = 0;

    if let Some(victim) = board.piece_at(mv.to()) {
        score += victim.value() * 10 - mover_value;
    }

    if promotes {
        score += PROMOTION_BONUS;
    }

    let after = board.with_move_made(mv);
    if is_attacked(&after, mv.to(), color) {
        let at_risk = if promotes {
            PieceKind::Queen.value()
        } else {
            mover_value
        };
        score -= at_risk * 10;
    }

    score
}

/// Sorts `moves` so that the most promising come first. See [`move_order_score`].
pub fn order_moves(board: &Board, moves: &mut [Move], color: Color) {
    moves.sort_by_cached_key(|&mv| Reverse(move_order_score(board, mv, color)));
}

/// Perform a perft at the specified depth, counting the leaf nodes of the tree of legal moves.
///
/// Uses bulk counting at depth 1. Sides alternate at each ply, starting with `color`.
#[inline(always)]
pub fn perft(board: &Board, color: Color, depth: usize) -> u64 {
    perft_generic::<true, false>(board, color, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each root move.
#[inline(always)]
pub fn splitperft(board: &Board, color: Color, depth: usize) -> u64 {
    perft_generic::<true, true>(board, color, depth)
}

/// Generic version of [`perft`] that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    board: &Board,
    color: Color,
    depth: usize,
) -> u64 {
    if BULK && !SPLIT && depth == 1 {
        return generate_moves(board, color).len() as u64;
    } else if depth == 0 {
        return 1;
    }

    generate_moves(board, color)
        .into_iter()
        .fold(0, |nodes, mv| {
            let new_nodes = perft_generic::<BULK, false>(
                &board.with_move_made(mv),
                color.opponent(),
                depth - 1,
            );

            if SPLIT {
                println!("{mv}\t{new_nodes}");
            }

            nodes + new_nodes
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::king_in_check;

    fn moves_of(fen: &str, color: Color) -> Vec<String> {
        let board = Board::from_fen(fen).unwrap();
        let mut moves: Vec<_> = generate_moves(&board, color)
            .into_iter()
            .map(|mv| mv.to_string())
            .collect();
        moves.sort();
        moves
    }

    #[test]
    fn test_startpos_black_has_twenty() {
        assert_eq!(generate_moves(&Board::default(), Color::Black).len(), 20);
    }

    #[test]
    fn test_rays_stop_at_first_piece() {
        let moves = moves_of("4k3/8/8/8/1p6/8/8/R3K3", Color::White);
        let rook: Vec<_> = moves.iter().filter(|m| m.starts_with("a1")).collect();
        // Up the a-file to a8, and along the first rank to d1
        assert_eq!(rook.len(), 7 + 3);
    }

    #[test]
    fn test_pinned_pieces_stay_put() {
        let moves = moves_of("4k3/4r3/8/8/8/8/4N3/4K3", Color::White);
        assert!(moves.iter().all(|m| !m.starts_with("e2")));
    }

    #[test]
    fn test_promotion_moves_are_generated() {
        let board = Board::from_fen("k7/4P3/8/8/8/8/8/4K3").unwrap();
        let moves = generate_moves(&board, Color::White);
        let promotion = Move::new(Square::E7, Square::E8);
        assert!(moves.contains(&promotion));
        assert_eq!(
            board.with_move_made(promotion).piece_at(Square::E8),
            Some(Piece::WHITE_QUEEN)
        );
    }

    #[test]
    fn test_moves_from_single_square() {
        let board = Board::default();
        assert_eq!(generate_moves_from(&board, Square::G1, Color::White).len(), 2);
        assert!(generate_moves_from(&board, Square::G1, Color::Black).is_empty());
        assert!(generate_moves_from(&board, Square::E4, Color::White).is_empty());
    }

    #[test]
    fn test_ordering_prefers_winning_captures() {
        // The Rook can take an undefended Queen, or push a Pawn
        let board = Board::from_fen("4k3/8/8/3q4/8/8/7P/3RK3").unwrap();
        let mut moves = generate_moves(&board, Color::White);
        order_moves(&board, &mut moves, Color::White);
        assert_eq!(moves[0], Move::new(Square::D1, Square::D5));
    }

    #[test]
    fn test_ordering_penalizes_hanging_pieces() {
        let board = Board::from_fen("4k3/8/8/3p4/8/8/8/4Q1K1").unwrap();
        let hang = Move::new(Square::E1, Square::E4);
        let safe = Move::new(Square::E1, Square::E2);
        assert!(
            move_order_score(&board, hang, Color::White)
                < move_order_score(&board, safe, Color::White)
        );
    }

    #[test]
    fn test_perft_startpos_shallow() {
        let board = Board::default();
        assert_eq!(perft(&board, Color::White, 1), 20);
        assert_eq!(perft(&board, Color::White, 2), 400);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_generated_moves_never_leave_king_attacked(
            picks in prop::collection::vec(any::<prop::sample::Index>(), 0..24)
        ) {
            let mut board = Board::default();
            let mut color = Color::White;

            for pick in picks {
                let moves = generate_moves(&board, color);
                for &mv in &moves {
                    prop_assert!(
                        !king_in_check(&board.with_move_made(mv), color),
                        "{mv} exposes the king on {board:?}"
                    );
                }

                if moves.is_empty() {
                    break;
                }
                board.make_move(*pick.get(&moves));
                color = color.opponent();
            }
        }
    }
}
