/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{
    is_fully_legal, Board, Color, Move, Search, SearchConfig, SearchResult, TurnMemory,
    DEFAULT_DEPTH, MAX_DEPTH,
};

/// Settings an [`Engine`] applies to every search it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Depth, in plies, to search every root move to.
    pub depth: u8,

    /// Wall-clock budget for a single move, measured from the start of [`Engine::select_move`].
    ///
    /// `None` means the search always runs to full depth.
    pub movetime: Option<Duration>,

    /// Seed for tie-breaking between equally good moves. `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            movetime: None,
            seed: None,
        }
    }
}

/// A chess engine playing one side of a game.
///
/// The game itself (the live board and whose turn it is) belongs to whoever drives the engine.
/// The engine only keeps its own [`TurnMemory`] between turns, so that it does not shuffle
/// the same piece back and forth.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,

    /// Recent moves this engine has played.
    memory: TurnMemory,

    /// Number of searches run since the last new game; varies the tie-break seed between turns.
    searches: u64,
}

impl Engine {
    /// Constructs a new [`Engine`] with the provided settings and an empty memory.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            memory: TurnMemory::new(),
            searches: 0,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// The settings this engine searches with.
    #[inline(always)]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The moves this engine has played recently.
    #[inline(always)]
    pub fn memory(&self) -> TurnMemory {
        self.memory
    }

    /// Forgets everything about the previous game.
    pub fn new_game(&mut self) {
        debug!("clearing turn memory for a new game");
        self.memory.clear();
        self.searches = 0;
    }

    /// Chooses a move for `color` to play on `board`.
    ///
    /// The returned [`SearchResult::bestmove`] is annotated with whether it checks or mates the opponent,
    /// and is `None` only when `color` has no legal move, in which case [`SearchResult::game_over`] says why.
    ///
    /// The engine remembers the move it chose, and will avoid immediately repeating it on its next turns.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Board, Color, Engine, EngineConfig};
    /// let mut engine = Engine::new(EngineConfig { depth: 1, ..Default::default() });
    /// let board = Board::default();
    /// let mv = engine.select_move(&board, Color::White).bestmove.unwrap();
    /// assert_eq!(board.color_at(mv.from()), Some(Color::White));
    /// ```
    pub fn select_move(&mut self, board: &Board, color: Color) -> SearchResult {
        let config = SearchConfig {
            max_depth: self.config.depth.clamp(1, MAX_DEPTH as u8),
            starttime: Instant::now(),
            hard_timeout: self.config.movetime.unwrap_or(Duration::MAX),
            seed: self.config.seed.map(|seed| seed.wrapping_add(self.searches)),
        };
        self.searches += 1;

        let result = Search::new(board, color, self.memory, config).start();
        self.memory = result.memory;

        result
    }

    /// Checks a move submitted by the opponent, who is playing `color`, against `board` as it was before the move.
    ///
    /// Uses the very same rules as this engine's own move generation.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Board, Color, Engine};
    /// let engine = Engine::default();
    /// let board = Board::default();
    /// assert!(engine.validate_opponent_move(&board, "e7e5".parse().unwrap(), Color::Black));
    /// assert!(!engine.validate_opponent_move(&board, "e7e4".parse().unwrap(), Color::Black));
    /// ```
    pub fn validate_opponent_move(&self, board: &Board, mv: Move, color: Color) -> bool {
        let legal = is_fully_legal(board, mv, color);

        if !legal {
            warn!(%mv, %color, fen = %board.to_fen(), "rejected illegal move");
        }

        legal
    }
}
