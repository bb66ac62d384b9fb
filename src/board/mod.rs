/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Move representation and annotations.
mod moves;

/// Colors, piece kinds, and pieces.
mod piece;

/// The board snapshot itself.
mod position;

/// Squares and square iteration.
mod square;

pub use moves::*;
pub use piece::*;
pub use position::*;
pub use square::*;
