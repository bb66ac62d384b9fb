/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Board representation: squares, pieces, moves, and positions.
mod board;

/// Command-line parsing and the interactive developer shell.
mod cli;

/// The engine facade that a game framework talks to.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Per-side memory of recently played moves.
mod history;

/// Move rules: legality, threats, check classification, and move generation.
mod rules;

/// Scores of positions, including mate scores.
mod score;

/// Main engine logic; all search related code.
mod search;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use history::*;
pub use rules::*;
pub use score::*;
pub use search::*;
