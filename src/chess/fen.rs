//! [Forsyth-Edwards Notation] (FEN) import and export.
//!
//! FEN ::=
//!       Piece Placement
//!   ' ' Side to move
//!   ' ' Castling ability
//!   ' ' En passant target square
//!   ' ' Halfmove clock
//!   ' ' Fullmove counter
//!
//! All six parts are required: there are no defaults for missing fields.
//!
//! [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation

use std::fmt;
use std::num::NonZeroU16;

use anyhow::{bail, Context};

use crate::chess::board::{Board, Configuration};
use crate::chess::core::{CastleRights, Piece, Player, Rank, Square, BOARD_WIDTH};
use crate::error::{Error, Result};

/// Serializes the board state.
///
/// ```
/// use chessmaster::chess::board::Board;
/// use chessmaster::chess::fen;
///
/// assert_eq!(
///     fen::export(&Board::starting()),
///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
/// );
/// ```
#[must_use]
pub fn export(board: &Board) -> String {
    board.configuration().to_string()
}

/// Parses a position. Surrounding whitespace is ignored, everything else has
/// to be well-formed.
///
/// # Errors
///
/// [`Error::InvalidFen`] describing the first problem found.
pub fn import(input: &str) -> Result<Configuration> {
    parse(input.trim()).map_err(Error::InvalidFen)
}

fn parse(input: &str) -> anyhow::Result<Configuration> {
    let mut parts = input.split(' ');
    let mut result = Configuration::empty();
    let pieces_placement = match parts.next() {
        Some(placement) if !placement.is_empty() => placement,
        _ => bail!("incorrect FEN: missing pieces placement"),
    };
    let mut rank_id = BOARD_WIDTH;
    for rank_fen in pieces_placement.split('/') {
        if rank_id == 0 {
            bail!("incorrect FEN: expected 8 ranks, got {pieces_placement}");
        }
        rank_id -= 1;
        let rank = Rank::try_from(rank_id)?;
        let mut file: u8 = 0;
        for symbol in rank_fen.chars() {
            match symbol {
                '0' => bail!("incorrect FEN: empty square increment can not be 0"),
                '1'..='8' => file += symbol as u8 - b'0',
                _ => {
                    let piece = Piece::try_from(symbol)
                        .with_context(|| format!("incorrect FEN: rank {rank_fen}"))?;
                    if file >= BOARD_WIDTH {
                        bail!("incorrect FEN: rank size exceeds {BOARD_WIDTH}, got {rank_fen}");
                    }
                    let _ = result
                        .pieces
                        .set(Square::new(file.try_into()?, rank), Some(piece));
                    file += 1;
                },
            }
            if file > BOARD_WIDTH {
                bail!("incorrect FEN: rank size exceeds {BOARD_WIDTH}, got {rank_fen}");
            }
        }
        if file != BOARD_WIDTH {
            bail!(
                "incorrect FEN: rank size should be exactly {BOARD_WIDTH}, got {rank_fen} of length {file}"
            );
        }
    }
    if rank_id != 0 {
        bail!("incorrect FEN: there should be 8 ranks, got {pieces_placement}");
    }
    result.turn = match parts.next() {
        Some(value) => Player::try_from(value).context("incorrect FEN: side to move")?,
        None => bail!("incorrect FEN: missing side to move"),
    };
    result.castling = match parts.next() {
        Some(value) => CastleRights::try_from(value).context("incorrect FEN: castling rights")?,
        None => bail!("incorrect FEN: missing castling rights"),
    };
    result.en_passant = match parts.next() {
        Some("-") => None,
        Some(value) => {
            let square = Square::try_from(value).context("incorrect FEN: en passant square")?;
            // The pawn that was just pushed belongs to the side that is not to
            // move.
            let expected_rank = match result.turn {
                Player::White => Rank::Six,
                Player::Black => Rank::Three,
            };
            if square.rank() != expected_rank {
                bail!(
                    "incorrect FEN: en passant square should be on rank {expected_rank} when {:?} is to move, got {square}",
                    result.turn
                );
            }
            Some(square)
        },
        None => bail!("incorrect FEN: missing en passant square"),
    };
    result.halfmove_clock = match parts.next() {
        Some(value) => {
            if !value.bytes().all(|c| c.is_ascii_digit()) {
                bail!("incorrect FEN: halfmove clock can not contain anything other than digits, got {value}");
            }
            value
                .parse::<u16>()
                .with_context(|| format!("incorrect FEN: halfmove clock can not be parsed {value}"))?
        },
        None => bail!("incorrect FEN: missing halfmove clock"),
    };
    result.fullmove_counter = match parts.next() {
        Some(value) => {
            if !value.bytes().all(|c| c.is_ascii_digit()) {
                bail!("incorrect FEN: fullmove counter can not contain anything other than digits, got {value}");
            }
            value.parse::<NonZeroU16>().with_context(|| {
                format!("incorrect FEN: fullmove counter can not be parsed {value}")
            })?
        },
        None => bail!("incorrect FEN: missing fullmove counter"),
    };
    match parts.next() {
        None => Ok(result),
        Some(_) => bail!("incorrect FEN: trailing symbols are not allowed"),
    }
}

impl fmt::Display for Configuration {
    /// Prints the position in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", &self.pieces)?;
        write!(f, "{} ", &self.turn)?;
        write!(f, "{} ", &self.castling)?;
        match self.en_passant {
            Some(square) => write!(f, "{square} "),
            None => write!(f, "- "),
        }?;
        write!(f, "{} ", &self.halfmove_clock)?;
        write!(f, "{}", &self.fullmove_counter)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn check_correct_fen(fen: &str) {
        let configuration = import(fen).unwrap();
        assert_eq!(configuration.to_string(), fen.trim());
    }

    #[test]
    fn correct_fen() {
        check_correct_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        check_correct_fen("2r3r1/p3k3/1p3pp1/1B5p/5P2/2P1p1P1/PP4KP/3R4 w - - 0 34");
        check_correct_fen("rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7");
        check_correct_fen("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7");
        check_correct_fen("r3k3/5p2/2p5/p7/P3r3/2N2n2/1PP2P2/2K2B2 w q - 0 24");
        check_correct_fen("8/8/8/8/8/8/8/8 b - - 12 99");
    }

    #[test]
    fn surrounding_whitespace() {
        check_correct_fen(" 4k3/8/8/8/8/8/8/4K3 w - - 0 1\n");
    }

    #[test]
    fn starting_configuration() {
        assert_eq!(
            import("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap(),
            Configuration::starting()
        );
    }

    #[test]
    fn parsed_fields() {
        let configuration =
            import("rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w Kq c6 3 2").unwrap();
        assert_eq!(configuration.turn, Player::White);
        assert_eq!(
            configuration.castling,
            CastleRights::WHITE_SHORT | CastleRights::BLACK_LONG
        );
        assert_eq!(configuration.en_passant, Some(Square::C6));
        assert_eq!(configuration.halfmove_clock, 3);
        assert_eq!(configuration.fullmove_counter.get(), 2);
        assert_eq!(
            configuration.pieces.get(Square::C5),
            Some(Piece::try_from('p').unwrap())
        );
    }

    #[test]
    fn no_crash() {
        for input in [
            "",
            " ",
            "8/8/8/8/8/8/8/8",
            "3k2p1N/82/8/8/7B/6K1/3R4/8 b - - 0 1",
            "3k2p1N/8/8/8/7B/6K1/3R4/8 b - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkqK - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w qkQK - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq e6 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - -1 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - a 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 99999999",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR  w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR/8 w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNRR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1R w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/08/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppüppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        ] {
            assert!(
                matches!(import(input), Err(Error::InvalidFen(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn error_context() {
        let Err(error) = import("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 2")
        else {
            panic!("trailing field should be rejected");
        };
        assert_eq!(
            error.to_string(),
            "invalid FEN: incorrect FEN: trailing symbols are not allowed"
        );
        let Err(error) = import("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0") else {
            panic!("missing field should be rejected");
        };
        assert_eq!(
            error.to_string(),
            "invalid FEN: incorrect FEN: missing fullmove counter"
        );
    }
}
