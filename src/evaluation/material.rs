//! Provides a very basic implementation of evaluation based on material
//! advantage using "[standard piece valuations]".
//!
//! While not very strong, this evaluation function is stable (will not change
//! because of the fixed piece "values"), easy to understand and deterministic,
//! which keeps computer moves reproducible.
//!
//! [standard piece valuations]: https://en.wikipedia.org/wiki/Chess_piece_relative_value

use crate::chess::board::Board;
use crate::chess::core::PieceKind;
use crate::evaluation::Value;

const PAWN_VALUE: Value = 100;
const KNIGHT_VALUE: Value = 300;
const BISHOP_VALUE: Value = 300;
const ROOK_VALUE: Value = 500;
const QUEEN_VALUE: Value = 900;

/// Kings are never captured, so they do not contribute to the balance.
#[must_use]
pub const fn piece_value(kind: PieceKind) -> Value {
    match kind {
        PieceKind::King => 0,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Pawn => PAWN_VALUE,
    }
}

/// White material minus Black material.
#[must_use]
pub fn material_advantage(board: &Board) -> Value {
    board
        .configuration()
        .pieces
        .iter()
        .map(|(_, piece)| piece.owner.sign() * piece_value(piece.kind))
        .sum()
}
