//! This module implements "static" [evaluation], i.e. predicting the relative
//! value/score of given position without [`crate::search`].
//!
//! For convenience, the score is returned in centipawn units.
//!
//! [evaluation]: https://www.chessprogramming.org/Evaluation

use crate::chess::board::Board;

pub mod material;
mod score;

pub use material::material_advantage;
pub use score::Score;

/// Evaluation in centipawn (100 CP = 1 "pawn") units.
pub type Value = i32;

/// Static evaluation from the perspective of the side to move.
#[must_use]
pub fn evaluate(board: &Board) -> Score {
    Score::cp(material_advantage(board) * board.turn().sign())
}
