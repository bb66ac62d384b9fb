/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Color, Score, Square};

/// Encapsulates the logic of scoring a chess position.
///
/// The score is pure material: every piece's value is added for `perspective` and subtracted for its opponent.
/// There are no positional or mobility terms.
/// A positive score is good for `perspective`, a negative one is better for its opponent, and 0 is equal.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The board whose position to evaluate.
    board: &'a Board,

    /// The side the score is reported for.
    perspective: Color,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `board`, scoring from `perspective`'s point of view.
    #[inline(always)]
    pub fn new(board: &'a Board, perspective: Color) -> Self {
        Self { board, perspective }
    }

    /// Evaluate this position from the perspective given at construction.
    ///
    /// # Example
    /// ```
    /// # use rookery::{Board, Color, Evaluator, Score};
    /// // White is a Rook up
    /// let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3").unwrap();
    /// assert_eq!(Evaluator::new(&board, Color::White).eval(), Score::new(5));
    /// assert_eq!(Evaluator::new(&board, Color::Black).eval(), Score::new(-5));
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.board
            .pieces()
            .fold(Score::DRAW, |score, (square, _)| {
                score + self.value_at(square).unwrap_or_default()
            })
    }

    /// Signed contribution of the piece on `square`, if there is one.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        self.board.piece_at(square).map(|piece| {
            let sign = if piece.color() == self.perspective { 1 } else { -1 };
            Score::new(piece.value() * sign)
        })
    }
}

/// Material balance of `board` from `perspective`'s point of view. See [`Evaluator`].
#[inline(always)]
pub fn evaluate(board: &Board, perspective: Color) -> Score {
    Evaluator::new(board, perspective).eval()
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_border(f)?;
        for rank in (0..8).rev() {
            write!(f, "{} |", rank + 1)?;

            // Step 1: Write the piece char
            for file in 0..8 {
                let square = Square::new(file, rank).ok_or(fmt::Error)?;
                let piece_char = self.board.piece_at(square).map_or(' ', |p| p.char());
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece, leaving Kings blank
            for file in 0..8 {
                let square = Square::new(file, rank).ok_or(fmt::Error)?;
                let contribution = match (self.board.piece_at(square), self.value_at(square)) {
                    (Some(piece), _) if piece.is_king() => String::new(),
                    (_, Some(val)) if val > Score::DRAW => format!("+{val}"),
                    (_, Some(val)) => format!("{val}"),
                    _ => String::new(),
                };
                write!(f, "{contribution:^5}|")?;
            }
            writeln!(f)?;

            write_border(f)?;
        }
        for file in b'a'..=b'h' {
            write!(f, "     {}", file as char)?;
        }

        let score = self.eval();
        let winning_side = if score > Score::DRAW {
            Some(self.perspective)
        } else if score < Score::DRAW {
            Some(self.perspective.opponent())
        } else {
            None
        };

        writeln!(f, "\n\nPerspective: {}", self.perspective)?;
        writeln!(
            f,
            "Winning side: {}",
            winning_side.map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

fn write_border(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "  +")?;
    for _ in 0..8 {
        write!(f, "-----+")?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_balanced() {
        let board = Board::default();
        assert_eq!(evaluate(&board, Color::White), Score::DRAW);
        assert_eq!(evaluate(&board, Color::Black), Score::DRAW);
    }

    #[test]
    fn test_perspectives_are_opposite() {
        let board = Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PP1PPPPP/RNBQKBNR").unwrap();
        // White is a Queen up and a Pawn down
        assert_eq!(evaluate(&board, Color::White), Score::new(8));
        assert_eq!(evaluate(&board, Color::Black), Score::new(-8));
    }

    #[test]
    fn test_missing_king_dominates() {
        let board = Board::from_fen("8/8/8/8/8/8/QQQQQQQQ/4K3").unwrap();
        let score = evaluate(&board, Color::White);
        assert_eq!(score, Score::new(100_000 + 72));
        assert!(!score.is_mate());
    }

    #[test]
    fn test_display_shows_contributions() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K3").unwrap();
        let shown = Evaluator::new(&board, Color::Black).to_string();
        assert!(shown.contains("-5"));
        assert!(shown.contains("Winning side: white"));
        assert!(shown.ends_with("Score: -5"));
    }
}
