//! Chess rules engine: keeps the board state, generates legal moves under full
//! chess rules (castling, en passant, promotion, check detection), reads and
//! writes positions in FEN and picks computer moves with a small minimax
//! search.
//!
//! ```
//! use chessmaster::{Game, Square};
//!
//! let mut game = Game::new();
//! let _ = game.make_move(Square::E2, Square::E4).unwrap();
//! let reply = game.ai_move(2).unwrap();
//! assert_eq!(reply.piece.owner, chessmaster::Player::Black);
//! ```

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod chess;
pub mod error;
pub mod evaluation;
pub mod search;

pub use chess::board::{Board, Configuration};
pub use chess::core::{Move, Piece, PieceKind, Player, Promotion, Square};
pub use chess::game::{Game, Status};
pub use error::{Error, Result};
