//! Errors returned by the public API.

use crate::chess::core::{Player, Square};

/// Everything that can go wrong when driving a game.
///
/// Low-level parsers report [`anyhow::Error`] with a context chain; the chain
/// is preserved inside [`Error::InvalidFen`] so callers can still print the
/// exact reason with `{:#}`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested move is not legal for the side to move. The game is left
    /// unchanged.
    #[error("illegal move {from}{to} for {side:?}")]
    IllegalMove {
        #[allow(missing_docs)]
        from: Square,
        #[allow(missing_docs)]
        to: Square,
        #[allow(missing_docs)]
        side: Player,
    },
    /// The position could not be parsed.
    #[error("invalid FEN: {0:#}")]
    InvalidFen(anyhow::Error),
    /// A position without the king of the given player was queried for
    /// checks.
    #[error("{0:?} king is missing from the board")]
    MissingKing(Player),
    /// The side to move has no legal moves (checkmate or stalemate).
    #[error("{0:?} has no legal moves")]
    NoLegalMoves(Player),
}

#[allow(missing_docs)]
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::IllegalMove {
                from: Square::E2,
                to: Square::E5,
                side: Player::White
            }
            .to_string(),
            "illegal move e2e5 for White"
        );
        assert_eq!(
            Error::InvalidFen(anyhow::anyhow!("missing side to move").context("bad input"))
                .to_string(),
            "invalid FEN: bad input: missing side to move"
        );
        assert_eq!(
            Error::MissingKing(Player::Black).to_string(),
            "Black king is missing from the board"
        );
    }
}
