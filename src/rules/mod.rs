/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Threat detection: which enemy pieces attack a square.
mod attacks;

/// Check and checkmate classification of a King.
mod checkmate;

/// Per-piece move legality.
mod legality;

/// Legal move generation, move ordering, and perft.
mod movegen;

pub use attacks::*;
pub use checkmate::*;
pub use legality::is_legal;
pub use movegen::*;
