/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{is_attacked, Board, Color, Move, PieceKind, Square};

/// How a legality probe treats the piece being asked about.
///
/// [`Probe::Move`] asks "may this piece actually go there?", while [`Probe::Attack`] asks
/// "does this piece threaten that square?". The two differ for exactly two kinds:
///
/// * Pawns push straight ahead but only threaten their two forward diagonals,
///   whether or not anything stands on them.
/// * Kings must not step into an attacked square when moving, which requires simulating the move
///   and asking the Threat Analyzer about the result. Threatening a square requires no such simulation.
///
/// The Threat Analyzer only ever issues [`Probe::Attack`] probes, so a King's self-check simulation
/// never triggers another simulation. Mutual recursion between the oracle and the Threat Analyzer is
/// therefore at most one level deep.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Probe {
    Move,
    Attack,
}

/// Decides whether `color` may play `mv` on `board`.
///
/// Checks the move geometry of the piece on `mv.from()`, that nothing obstructs its path,
/// that the destination does not hold one of `color`'s own pieces and, for Kings only,
/// that the King does not step onto a square attacked by the opponent.
///
/// Malformed queries are never an error: an empty source square, a source holding the opponent's piece,
/// or a move whose source and destination coincide are all simply not legal.
///
/// Non-King moves that expose their own King are *not* rejected here; see [`crate::leaves_king_safe`].
///
/// # Example
/// ```
/// # use rookery::{is_legal, Board, Color, Move, Square};
/// let board = Board::default();
/// assert!(is_legal(&board, Move::new(Square::E2, Square::E4), Color::White));
/// assert!(!is_legal(&board, Move::new(Square::E2, Square::E5), Color::White));
/// assert!(!is_legal(&board, Move::new(Square::E7, Square::E5), Color::White));
/// ```
#[inline(always)]
pub fn is_legal(board: &Board, mv: Move, color: Color) -> bool {
    probe(board, mv, color, Probe::Move)
}

/// Dispatches a legality probe to the rule for the kind of piece on `mv.from()`.
pub(crate) fn probe(board: &Board, mv: Move, color: Color, mode: Probe) -> bool {
    let (from, to) = (mv.from(), mv.to());

    let Some(piece) = board.piece_at(from) else {
        return false;
    };

    if piece.color() != color || from == to {
        return false;
    }

    // No piece may ever land on a friendly piece
    if board.color_at(to) == Some(color) {
        return false;
    }

    match piece.kind() {
        PieceKind::Pawn => pawn_rule(board, from, to, color, mode),
        PieceKind::Knight => knight_rule(from, to),
        PieceKind::Bishop => bishop_rule(board, from, to),
        PieceKind::Rook => rook_rule(board, from, to),
        PieceKind::Queen => queen_rule(board, from, to),
        PieceKind::King => king_rule(board, mv, color, mode),
    }
}

fn pawn_rule(board: &Board, from: Square, to: Square, color: Color, mode: Probe) -> bool {
    let (df, dr) = from.delta(to);
    let forward = color.forward();

    // Diagonal steps are captures; only an enemy may stand there when actually moving
    if df.abs() == 1 && dr == forward {
        return match mode {
            Probe::Attack => true,
            Probe::Move => board.has(to),
        };
    }

    if mode == Probe::Attack || df != 0 {
        return false;
    }

    if dr == forward {
        !board.has(to)
    } else if dr == 2 * forward && from.rank() == color.pawn_rank() {
        // Both the skipped square and the destination must be empty
        from.between(to).all(|square| !board.has(square)) && !board.has(to)
    } else {
        false
    }
}

fn knight_rule(from: Square, to: Square) -> bool {
    let (df, dr) = from.delta(to);
    matches!((df.abs(), dr.abs()), (1, 2) | (2, 1))
}

fn bishop_rule(board: &Board, from: Square, to: Square) -> bool {
    from.is_diagonal_to(to) && path_is_clear(board, from, to)
}

fn rook_rule(board: &Board, from: Square, to: Square) -> bool {
    from.is_orthogonal_to(to) && path_is_clear(board, from, to)
}

fn queen_rule(board: &Board, from: Square, to: Square) -> bool {
    if from.is_diagonal_to(to) {
        bishop_rule(board, from, to)
    } else {
        rook_rule(board, from, to)
    }
}

fn king_rule(board: &Board, mv: Move, color: Color, mode: Probe) -> bool {
    let (df, dr) = mv.from().delta(mv.to());
    if df.abs() > 1 || dr.abs() > 1 {
        return false;
    }

    match mode {
        Probe::Attack => true,
        Probe::Move => {
            let after = board.with_move_made(mv);
            !is_attacked(&after, mv.to(), color)
        }
    }
}

/// Returns `true` if no piece occupies any square strictly between `from` and `to`.
#[inline(always)]
fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    from.between(to).all(|square| !board.has(square))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn legal(fen: &str, mv: &str, color: Color) -> bool {
        let board = Board::from_fen(fen).unwrap();
        is_legal(&board, mv.parse().unwrap(), color)
    }

    #[test]
    fn test_malformed_queries_are_not_legal() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3";
        // Empty source
        assert!(!legal(fen, "d2d3", Color::White));
        // Wrong color
        assert!(!legal(fen, "e2e3", Color::Black));
        // Null move
        assert!(!legal(fen, "e2e2", Color::White));
    }

    #[test]
    fn test_pawn_pushes() {
        let fen = "4k3/8/8/8/8/4n3/3PP3/4K3";
        assert!(legal(fen, "d2d3", Color::White));
        assert!(legal(fen, "d2d4", Color::White));
        // Blocked single and double steps
        assert!(!legal(fen, "e2e3", Color::White));
        assert!(!legal(fen, "e2e4", Color::White));
        // Backwards and sideways
        assert!(!legal(fen, "d2d1", Color::White));
        assert!(!legal(fen, "d2c2", Color::White));
    }

    #[test]
    fn test_double_step_only_from_home_rank() {
        let fen = "4k3/8/8/8/8/3P4/8/4K3";
        assert!(legal(fen, "d3d4", Color::White));
        assert!(!legal(fen, "d3d5", Color::White));

        let fen = "4k3/3p4/8/8/8/8/8/4K3";
        assert!(legal(fen, "d7d5", Color::Black));
        assert!(!legal(fen, "d7d8", Color::Black));
    }

    #[test]
    fn test_pawn_captures_need_an_enemy() {
        let fen = "4k3/8/8/8/8/2p1N3/3P4/4K3";
        assert!(legal(fen, "d2c3", Color::White));
        assert!(!legal(fen, "d2e3", Color::White));

        let fen = "4k3/8/8/8/8/8/3P4/4K3";
        assert!(!legal(fen, "d2c3", Color::White));
        assert!(!legal(fen, "d2e3", Color::White));
    }

    #[test]
    fn test_pawn_attacks_ignore_occupancy() {
        let board = Board::from_fen("4k3/8/8/8/8/8/3P4/4K3").unwrap();
        let diagonal = Move::new(Square::D2, Square::C3);
        let push = Move::new(Square::D2, Square::D3);
        assert!(probe(&board, diagonal, Color::White, Probe::Attack));
        assert!(!probe(&board, push, Color::White, Probe::Attack));
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let fen = "4k3/8/8/8/8/2P5/8/R3K2B";
        // Rook along the first rank is blocked by its own king
        assert!(legal(fen, "a1d1", Color::White));
        assert!(!legal(fen, "a1f1", Color::White));
        assert!(legal(fen, "a1a8", Color::White));
        // Bishop along the long diagonal
        assert!(legal(fen, "h1d5", Color::White));
        assert!(!legal(fen, "h1h5", Color::White));

        let fen = "4k3/8/8/8/8/8/1P6/B3K3";
        assert!(!legal(fen, "a1c3", Color::White));
    }

    #[test]
    fn test_queen_moves_like_rook_or_bishop() {
        let fen = "4k3/8/8/8/3Q4/8/8/4K3";
        assert!(legal(fen, "d4d8", Color::White));
        assert!(legal(fen, "d4h8", Color::White));
        assert!(legal(fen, "d4a4", Color::White));
        assert!(!legal(fen, "d4e6", Color::White));
    }

    #[test]
    fn test_knight_jumps() {
        let board = Board::default();
        assert!(is_legal(&board, "g1f3".parse().unwrap(), Color::White));
        assert!(is_legal(&board, "b8c6".parse().unwrap(), Color::Black));
        // Own piece on the destination
        assert!(!is_legal(&board, "g1e2".parse().unwrap(), Color::White));
        assert!(!is_legal(&board, "g1g3".parse().unwrap(), Color::White));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let fen = "4k3/8/8/8/8/8/r7/4K3";
        assert!(!legal(fen, "e1e2", Color::White));
        assert!(!legal(fen, "e1d2", Color::White));
        assert!(legal(fen, "e1f1", Color::White));
        assert!(!legal(fen, "e1e3", Color::White));
    }

    #[test]
    fn test_king_cannot_capture_protected_piece() {
        let fen = "4k3/8/8/8/8/8/3q2r1/4K3";
        assert!(!legal(fen, "e1d2", Color::White));

        let fen = "4k3/8/8/8/8/8/3q4/4K3";
        assert!(legal(fen, "e1d2", Color::White));
    }

    fn any_move() -> impl Strategy<Value = Move> {
        (0..64usize, 0..64usize).prop_map(|(from, to)| {
            Move::new(
                Square::from_index(from).unwrap(),
                Square::from_index(to).unwrap(),
            )
        })
    }

    proptest! {
        #[test]
        fn test_oracle_is_idempotent(
            fen in prop::sample::select(vec![
                crate::FEN_STARTPOS,
                "6rk/5Npp/8/8/3Q4/8/5nPP/r6K",
                "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8",
                "4k3/4r3/8/8/8/8/3PqP2/4K3",
            ]),
            mv in any_move(),
            white in any::<bool>(),
        ) {
            let board = Board::from_fen(fen).unwrap();
            let color = if white { Color::White } else { Color::Black };
            let first = is_legal(&board, mv, color);
            prop_assert_eq!(first, is_legal(&board, mv, color));

            let reparsed = Board::from_fen(fen).unwrap();
            prop_assert_eq!(first, is_legal(&reparsed, mv, color));
        }
    }
}
