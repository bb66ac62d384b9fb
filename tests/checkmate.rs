/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Every classification is checked against exhaustive move generation:
//! a checked King is mated exactly when its side has no legal move.

use rookery::{count_attackers, generate_moves, king_safety, Board, Color, KingSafety};

fn test_classification(fen: &str, color: Color, expected: KingSafety) {
    let board = Board::from_fen(fen).unwrap();
    let safety = king_safety(&board, color);
    assert_eq!(safety, expected, "classification failed on {fen}");

    let king = board.king_square(color).unwrap();
    let checkers = count_attackers(&board, king, color);
    let moves = generate_moves(&board, color);
    assert_eq!(safety.is_check(), checkers > 0, "check disagrees with attackers on {fen}");
    assert_eq!(
        safety.is_checkmate(),
        checkers > 0 && moves.is_empty(),
        "classification disagrees with generation on {fen}: {moves:?}"
    );
}

#[test]
fn test_single_check_escapable() {
    test_classification("4k3/8/8/8/8/8/8/4K2r", Color::White, KingSafety::Check);
}

#[test]
fn test_single_check_blockable_slider() {
    let fen = "6k1/8/8/8/8/4N3/6PP/r6K";
    test_classification(fen, Color::White, KingSafety::Check);

    // The Knight interposes on either square
    let board = Board::from_fen(fen).unwrap();
    let moves = generate_moves(&board, Color::White);
    assert_eq!(moves.len(), 2);
}

#[test]
fn test_back_rank_mate() {
    test_classification("6k1/8/8/8/8/8/6PP/r6K", Color::White, KingSafety::Checkmate);
}

#[test]
fn test_double_check() {
    // The Queen could take the Knight, but the Rook would still give check
    test_classification("k7/8/8/8/3Q4/8/5nPP/r6K", Color::White, KingSafety::Checkmate);
}

#[test]
fn test_smothered_mate() {
    test_classification("6rk/5Npp/8/8/8/8/8/6K1", Color::Black, KingSafety::Checkmate);
}

#[test]
fn test_boxed_king_against_supported_queen() {
    test_classification("4k3/4r3/8/8/8/8/3PqP2/4K3", Color::White, KingSafety::Checkmate);
}

#[test]
fn test_boxed_king_takes_unsupported_queen() {
    test_classification("4k3/8/8/8/8/8/3PqP2/4K3", Color::White, KingSafety::Check);
}

#[test]
fn test_quiet_positions_are_safe() {
    test_classification(rookery::FEN_STARTPOS, Color::White, KingSafety::Safe);
    test_classification(rookery::FEN_STARTPOS, Color::Black, KingSafety::Safe);
}
