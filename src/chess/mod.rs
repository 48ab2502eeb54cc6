//! Implementation of chess rules: board state, move generation and the game
//! controller.

pub mod board;
pub mod core;
pub mod fen;
pub mod game;
pub mod movegen;
