/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Duration;

use rookery::{
    generate_moves, Board, Color, Engine, EngineConfig, GameOver, Move, MoveFlag, Piece, Score,
    Square,
};

fn engine(depth: u8) -> Engine {
    Engine::new(EngineConfig {
        depth,
        seed: Some(0xC0FFEE),
        ..Default::default()
    })
}

#[test]
fn test_opening_move_is_a_quiet_non_king_move() {
    let board = Board::default();
    let mv = engine(2)
        .select_move(&board, Color::White)
        .bestmove
        .unwrap();

    assert_eq!(board.color_at(mv.from()), Some(Color::White));
    assert!(!board.has(mv.to()));
    assert_ne!(board.piece_at(mv.from()), Some(Piece::WHITE_KING));
}

#[test]
fn test_pawn_promotes_to_queen() {
    let board = Board::from_fen("k7/4P3/8/8/8/8/8/4K3").unwrap();
    let res = engine(1).select_move(&board, Color::White);
    let mv = res.bestmove.unwrap();
    assert_eq!(mv, Move::new(Square::E7, Square::E8));
    assert_eq!(mv.flag(), MoveFlag::Check);

    let after = board.with_move_made(mv);
    assert_eq!(after.piece_at(Square::E8), Some(Piece::WHITE_QUEEN));
    assert_eq!(after.piece_at(Square::E7), None);
}

#[test]
fn test_takes_a_free_queen() {
    let board = Board::from_fen("4k3/8/8/3q4/8/8/8/3RK3").unwrap();
    let mv = engine(2)
        .select_move(&board, Color::White)
        .bestmove
        .unwrap();
    assert_eq!(mv, Move::new(Square::D1, Square::D5));
}

#[test]
fn test_finds_back_rank_mate() {
    let board = Board::from_fen("6k1/5ppp/8/8/8/8/5PPP/3R2K1").unwrap();
    let res = engine(3).select_move(&board, Color::White);
    let mv = res.bestmove.unwrap();

    assert_eq!(mv, Move::new(Square::D1, Square::D8));
    assert_eq!(mv.flag(), MoveFlag::Checkmate);
    assert_eq!(res.score, Score::MATE - 1);
    assert_eq!(res.score.moves_to_mate(), 1);
}

#[test]
fn test_black_finds_back_rank_mate() {
    let board = Board::from_fen("3r2k1/5ppp/8/8/8/8/5PPP/3R2K1").unwrap();
    let res = engine(2).select_move(&board, Color::Black);
    let mv = res.bestmove.unwrap();

    assert_eq!(mv, Move::new(Square::D8, Square::D1));
    assert_eq!(mv.flag(), MoveFlag::Checkmate);
    assert_eq!(res.score, Score::MATE - 1);
}

#[test]
fn test_no_move_when_stalemated() {
    let board = Board::from_fen("k7/8/1Q6/8/8/8/8/7K").unwrap();
    let res = engine(3).select_move(&board, Color::Black);
    assert_eq!(res.bestmove, None);
    assert_eq!(res.game_over, Some(GameOver::Stalemate));
    assert_eq!(res.score, Score::DRAW);
}

#[test]
fn test_no_move_when_checkmated() {
    let board = Board::from_fen("1k1R4/8/1K6/8/8/8/8/8").unwrap();
    let res = engine(3).select_move(&board, Color::Black);
    assert_eq!(res.bestmove, None);
    assert_eq!(res.game_over, Some(GameOver::Checkmate));
    assert_eq!(res.score, -Score::MATE);
}

#[test]
fn test_does_not_repeat_within_two_turns() {
    // At depth 1 every opening move scores the same
    let board = Board::default();
    let mut engine = engine(1);

    let played = (0..3)
        .map(|_| engine.select_move(&board, Color::White).bestmove.unwrap())
        .collect::<Vec<_>>();

    assert_ne!(played[0], played[1]);
    assert_ne!(played[1], played[2]);
    assert_ne!(played[0], played[2]);
}

#[test]
fn test_expired_deadline_still_returns_a_legal_move() {
    let board = Board::default();
    let mut engine = Engine::new(EngineConfig {
        depth: 4,
        movetime: Some(Duration::ZERO),
        seed: Some(1),
    });

    let res = engine.select_move(&board, Color::White);
    let mv = res.bestmove.unwrap();
    assert!(res.timed_out);
    assert!(generate_moves(&board, Color::White).contains(&mv));
}

#[test]
fn test_validation_matches_generation() {
    let engine = Engine::default();
    let board = Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R").unwrap();

    for color in Color::all() {
        let legal = generate_moves(&board, color);
        for from in Square::iter() {
            for to in Square::iter() {
                let mv = Move::new(from, to);
                assert_eq!(
                    engine.validate_opponent_move(&board, mv, color),
                    legal.contains(&mv),
                    "{color} {mv}"
                );
            }
        }
    }
}

#[test]
fn test_self_play_alternates_sides() {
    let mut white = engine(1);
    let mut black = engine(1);
    let mut board = Board::default();

    for ply in 0..8 {
        let (side, player) = if ply % 2 == 0 {
            (Color::White, &mut white)
        } else {
            (Color::Black, &mut black)
        };

        let Some(mv) = player.select_move(&board, side).bestmove else {
            break;
        };
        assert!(player.validate_opponent_move(&board, mv, side));
        board.make_move(mv);
    }

    assert!(white.memory().recent_moves().count() > 0);
    assert!(white.memory().recent_moves().count() <= 2);
    assert!(black.memory().recent_moves().count() <= 2);
}
