/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    cmp::Reverse,
    fmt,
    time::{Duration, Instant},
};

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info};

use crate::{
    evaluate, generate_moves, king_in_check, king_safety, order_moves, Board, Color, Move,
    MoveFlag, Score, ScoredMove, TurnMemory,
};

/// Maximum depth that can be searched
pub const MAX_DEPTH: usize = 64;

/// Depth searched when nothing else is requested.
///
/// Every legality probe scans the whole board, so depths past 3-4 plies quickly become impractical.
pub const DEFAULT_DEPTH: u8 = 3;

/// Why there was nothing to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOver {
    /// The side to move is in check and has no legal move.
    Checkmate,

    /// The side to move is not in check, but has no legal move.
    Stalemate,
}

impl fmt::Display for GameOver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checkmate => write!(f, "checkmate"),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Move chosen, annotated with whether it gives check or mate.
    ///
    /// `None` only if the side to move had no legal move, in which case [`Self::game_over`] says why.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from the searching side's perspective.
    pub score: Score,

    /// Depth, in plies, that the root moves were searched to.
    pub depth: u8,

    /// Every root move with its backed-up score, best first.
    pub candidates: Vec<ScoredMove>,

    /// The searching side's turn memory, updated with `bestmove`.
    ///
    /// Hand this to the next search for the same side.
    pub memory: TurnMemory,

    /// Whether the deadline cut any branch short.
    pub timed_out: bool,

    /// Set when the side to move had no legal move at all.
    pub game_over: Option<GameOver>,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
            candidates: Vec::new(),
            memory: TurnMemory::new(),
            timed_out: false,
            game_over: None,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: u8,

    /// Start time of the search.
    pub starttime: Instant,

    /// Hard limit on search time.
    ///
    /// Polled at every node. Once exceeded, nodes stop expanding and return their static evaluation instead.
    pub hard_timeout: Duration,

    /// Seed for breaking ties between equally-scored moves.
    ///
    /// If `None`, ties are broken with entropy from the OS.
    pub seed: Option<u64>,
}

impl SearchConfig {
    /// Constructs a new [`SearchConfig`], overriding the defaults with whatever was supplied.
    pub fn new(depth: Option<u8>, movetime: Option<Duration>) -> Self {
        let mut config = Self::default();

        if let Some(depth) = depth {
            config.max_depth = depth.clamp(1, MAX_DEPTH as u8);
        }

        if let Some(movetime) = movetime {
            config.hard_timeout = movetime;
        }

        config
    }

    /// Returns `true` if the search has run past its hard timeout.
    #[inline(always)]
    pub fn is_expired(&self) -> bool {
        self.starttime.elapsed() >= self.hard_timeout
    }
}

impl Default for SearchConfig {
    /// A default [`SearchConfig`] searches to [`DEFAULT_DEPTH`] without a deadline.
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            starttime: Instant::now(),
            hard_timeout: Duration::MAX,
            seed: None,
        }
    }
}

/// Executes an alpha-beta search on the provided board for one side.
///
/// The searching side is the maximizing player at every layer. Its opponent's replies are the minimizing layers.
pub struct Search<'a> {
    /// The board to search on.
    ///
    /// This board will be copied when moves are applied to it.
    board: &'a Board,

    /// The side whose move is being chosen.
    color: Color,

    /// The result of the search, updated as-needed during search.
    result: SearchResult,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Source of randomness for picking among equally-scored moves.
    rng: StdRng,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance that picks a move for `color` on `board`.
    ///
    /// `memory` is `color`'s turn memory from its previous turns. It is read once the root moves have been scored,
    /// and returned, updated, in the [`SearchResult`].
    pub fn new(board: &'a Board, color: Color, memory: TurnMemory, config: SearchConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let result = SearchResult {
            memory,
            depth: config.max_depth.max(1),
            ..Default::default()
        };

        Self {
            board,
            color,
            result,
            config,
            rng,
        }
    }

    /// Start the search, returning its results.
    ///
    /// Every root move is searched with a full window, so every candidate's score is exact and equal scores are real ties.
    /// The best-scoring moves that do not repeat recent play are collected and one is chosen among them at random.
    /// Finally, the chosen move is annotated with what it does to the opponent's King.
    pub fn start(mut self) -> SearchResult {
        debug!(
            fen = %self.board.to_fen(),
            color = %self.color,
            depth = self.result.depth,
            memory = %self.result.memory,
            "starting search"
        );

        let mut moves = generate_moves(self.board, self.color);

        // Nothing to play; report why instead of picking from an empty list
        if moves.is_empty() {
            let game_over = if king_in_check(self.board, self.color) {
                self.result.score = -Score::MATE;
                GameOver::Checkmate
            } else {
                self.result.score = Score::DRAW;
                GameOver::Stalemate
            };

            info!(color = %self.color, %game_over, "no legal moves");
            self.result.game_over = Some(game_over);
            return self.result;
        }

        order_moves(self.board, &mut moves, self.color);

        let depth = self.result.depth;
        let mut candidates = Vec::with_capacity(moves.len());
        for mv in moves {
            let child = self.board.with_move_made(mv);
            let score = self.alpha_beta_min(&child, -Score::INF, Score::INF, depth - 1, 1);
            candidates.push(ScoredMove::new(mv, score));
        }

        // Stable, so equal scores keep their move-ordering rank
        candidates.sort_by_key(|scored| Reverse(scored.score));

        if let Some(chosen) = self.pick(&candidates) {
            let bestmove = annotate(self.board, chosen.mv, self.color);
            self.result.memory.record(bestmove);
            self.result.bestmove = Some(bestmove);
            self.result.score = chosen.score;
        }
        self.result.candidates = candidates;

        let elapsed = self.config.starttime.elapsed();
        info!(
            depth,
            nodes = self.result.nodes,
            ms = elapsed.as_millis() as u64,
            bestmove = %self.result.bestmove.unwrap_or_default(),
            score = %self.result.score,
            timed_out = self.result.timed_out,
            "search concluded"
        );

        self.result
    }

    /// Chooses among the top-scoring candidates, skipping any that would repeat recent play.
    ///
    /// If every candidate repeats recent play, the memory is ignored rather than leaving nothing to play.
    fn pick(&mut self, candidates: &[ScoredMove]) -> Option<ScoredMove> {
        let memory = self.result.memory;
        let fresh = candidates
            .iter()
            .filter(|scored| !memory.is_repetition(scored.mv))
            .copied()
            .collect::<Vec<_>>();

        let skipped = candidates.len() - fresh.len();
        let pool = if fresh.is_empty() {
            debug!("every candidate repeats recent play; ignoring turn memory");
            candidates.to_vec()
        } else {
            if skipped > 0 {
                debug!(skipped, "filtered repeating candidates");
            }
            fresh
        };

        // `pool` is still sorted best-first
        let best = pool.first()?.score;
        let ties = pool
            .iter()
            .take_while(|scored| scored.score == best)
            .copied()
            .collect::<Vec<_>>();

        ties.choose(&mut self.rng).copied()
    }

    /// Handles everything a node must check before expanding its children.
    ///
    /// Returns a score if the node is checkmate, at the depth limit, or past the deadline.
    fn terminal_score(
        &mut self,
        board: &Board,
        side: Color,
        depth: u8,
        ply: i32,
    ) -> Option<Score> {
        self.result.nodes += 1;

        // The side to move has been mated by the previous move
        if king_safety(board, side).is_checkmate() {
            let score = if side == self.color {
                -Score::MATE + ply
            } else {
                Score::MATE - ply
            };
            return Some(score);
        }

        if depth == 0 {
            return Some(evaluate(board, self.color));
        }

        if self.config.is_expired() {
            if !self.result.timed_out {
                let ms = self.config.hard_timeout.as_millis() as u64;
                debug!(ms, "exceeded hard timeout; falling back to static evaluation");
            }
            self.result.timed_out = true;
            return Some(evaluate(board, self.color));
        }

        None
    }

    /// A layer where the searching side is to move, maximizing its score.
    fn alpha_beta_max(
        &mut self,
        board: &Board,
        mut alpha: Score,
        beta: Score,
        depth: u8,
        ply: i32,
    ) -> Score {
        if let Some(score) = self.terminal_score(board, self.color, depth, ply) {
            return score;
        }

        let mut moves = generate_moves(board, self.color);

        // Not mated (checked above), so this is stalemate
        if moves.is_empty() {
            return Score::DRAW;
        }

        order_moves(board, &mut moves, self.color);

        let mut best = -Score::INF;
        for mv in moves {
            let child = board.with_move_made(mv);
            let score = self.alpha_beta_min(&child, alpha, beta, depth - 1, ply + 1);
            best = best.max(score);

            if score >= beta {
                break;
            }
            alpha = alpha.max(score);
        }

        best
    }

    /// A layer where the opponent is to move, minimizing the searching side's score.
    fn alpha_beta_min(
        &mut self,
        board: &Board,
        alpha: Score,
        mut beta: Score,
        depth: u8,
        ply: i32,
    ) -> Score {
        let opponent = self.color.opponent();
        if let Some(score) = self.terminal_score(board, opponent, depth, ply) {
            return score;
        }

        let mut moves = generate_moves(board, opponent);

        if moves.is_empty() {
            return Score::DRAW;
        }

        order_moves(board, &mut moves, opponent);

        let mut best = Score::INF;
        for mv in moves {
            let child = board.with_move_made(mv);
            let score = self.alpha_beta_max(&child, alpha, beta, depth - 1, ply + 1);
            best = best.min(score);

            if score <= alpha {
                break;
            }
            beta = beta.min(score);
        }

        best
    }

    /// Plain minimax with the same leaf and terminal rules as the alpha-beta layers, but no pruning or ordering.
    #[cfg(test)]
    fn minimax(&mut self, board: &Board, depth: u8, ply: i32) -> Score {
        let maximizing = ply % 2 == 0;
        let side = if maximizing {
            self.color
        } else {
            self.color.opponent()
        };

        if let Some(score) = self.terminal_score(board, side, depth, ply) {
            return score;
        }

        let scores = generate_moves(board, side)
            .into_iter()
            .map(|mv| self.minimax(&board.with_move_made(mv), depth - 1, ply + 1))
            .collect::<Vec<_>>();

        let best = if maximizing {
            scores.into_iter().max()
        } else {
            scores.into_iter().min()
        };

        best.unwrap_or(Score::DRAW)
    }
}

/// Returns `mv` flagged with the safety of the opponent's King once `mv` has been played.
pub fn annotate(board: &Board, mv: Move, color: Color) -> Move {
    let after = board.with_move_made(mv);
    let flag: MoveFlag = king_safety(&after, color.opponent()).into();
    mv.with_flag(flag)
}
