//! The game controller: owns the board and the history of applied moves and
//! is the only place where the live position is mutated.

use std::collections::BTreeMap;
use std::str::FromStr;

use tracing::debug;

use crate::chess::board::{Board, Configuration};
use crate::chess::core::{Move, Piece, Player, Promotion, Square};
use crate::chess::{fen, movegen};
use crate::error::{Error, Result};
use crate::search::{self, Depth, Limits};

/// Halfmove clock value at which the [fifty-move rule] applies.
///
/// [fifty-move rule]: https://en.wikipedia.org/wiki/Fifty-move_rule
const FIFTY_MOVE_RULE_PLIES: u16 = 100;

/// State of the game for the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// Side to move has legal moves and is not in check.
    Ongoing,
    /// Side to move is in check but can escape.
    Check,
    #[allow(missing_docs)]
    Checkmate { winner: Player },
    /// Side to move has no legal moves but is not in check.
    Stalemate,
    /// 50 full moves without captures or pawn moves. Reported even if the
    /// side to move is in check; the game may continue.
    FiftyMoveRule,
}

impl Status {
    /// Returns `true` if no more moves can be made.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Checkmate { .. } | Self::Stalemate)
    }
}

/// A move together with the position it was played in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    #[allow(missing_docs)]
    pub played: Move,
    /// Configuration before the move was applied.
    pub before: Configuration,
}

/// A game of chess.
///
/// ```
/// use chessmaster::chess::core::Square;
/// use chessmaster::chess::game::Game;
///
/// let mut game = Game::new();
/// assert_eq!(game.moves(Square::E2).unwrap(), vec![Square::E3, Square::E4]);
/// let _ = game.make_move(Square::E2, Square::E4).unwrap();
/// assert_eq!(
///     game.export_fen(),
///     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Game {
    board: Board,
    history: Vec<HistoryEntry>,
}

impl Game {
    /// Standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Game starting from the given position.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFen`] if the position can not be parsed.
    pub fn from_fen(input: &str) -> Result<Self> {
        Ok(Self::from(fen::import(input)?))
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Player {
        self.board.turn()
    }

    /// Legal destinations of the piece on `square`. Empty if the square is
    /// empty or the piece belongs to the side that is not to move.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKing`] if the side to move has no king.
    pub fn moves(&self, square: Square) -> Result<Vec<Square>> {
        match self.board.get(square) {
            Some(piece) if piece.owner == self.turn() => movegen::legal_moves(&self.board, square),
            _ => Ok(Vec::new()),
        }
    }

    /// Legal destinations of every piece that can move, keyed by its square.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKing`] if the side to move has no king.
    pub fn all_moves(&self) -> Result<BTreeMap<Square, Vec<Square>>> {
        let mut result = BTreeMap::new();
        for next_move in movegen::generate_moves(&self.board)? {
            let destinations: &mut Vec<Square> = result.entry(next_move.from).or_default();
            if destinations.last() != Some(&next_move.to) {
                destinations.push(next_move.to);
            }
        }
        Ok(result)
    }

    /// Moves a piece of the side to move. Pawns reaching the last rank become
    /// queens.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalMove`] if the move is not legal; the game is left
    /// unchanged. [`Error::MissingKing`] if the side to move has no king.
    pub fn make_move(&mut self, from: Square, to: Square) -> Result<Move> {
        self.make_move_promoting(from, to, Promotion::Queen)
    }

    /// Same as [`Game::make_move`] with an explicit promotion choice. The
    /// choice is ignored for moves that do not promote.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalMove`] if the move is not legal; the game is left
    /// unchanged. [`Error::MissingKing`] if the side to move has no king.
    pub fn make_move_promoting(
        &mut self,
        from: Square,
        to: Square,
        promotion: Promotion,
    ) -> Result<Move> {
        let Some(next_move) = movegen::find_move(&self.board, from, to, Some(promotion))? else {
            let side = self.turn();
            debug!(%from, %to, ?side, "rejected illegal move");
            return Err(Error::IllegalMove { from, to, side });
        };
        self.history.push(HistoryEntry {
            played: next_move,
            before: self.board.configuration().clone(),
        });
        self.board.make_move(&next_move);
        debug!(%next_move, fen = %self.board, "applied move");
        Ok(next_move)
    }

    /// Position in Forsyth-Edwards Notation.
    #[must_use]
    pub fn export_fen(&self) -> String {
        fen::export(&self.board)
    }

    /// Lets the computer pick a move for the side to move, looking `depth`
    /// plies ahead, and plays it.
    ///
    /// # Errors
    ///
    /// [`Error::NoLegalMoves`] if the game is over. [`Error::MissingKing`] if
    /// a king is missing from the board.
    pub fn ai_move(&mut self, depth: Depth) -> Result<Move> {
        let result = search::best_move(&self.board, Limits::depth(depth))?;
        let Some(best_move) = result.best_move else {
            return Err(Error::NoLegalMoves(self.turn()));
        };
        self.make_move_promoting(
            best_move.from,
            best_move.to,
            best_move.promotion.unwrap_or(Promotion::Queen),
        )
    }

    /// Reports whether the game is over and why.
    ///
    /// Checkmate and stalemate come first, then the fifty-move rule, then
    /// check.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKing`] if the side to move has no king.
    pub fn status(&self) -> Result<Status> {
        let us = self.turn();
        let in_check = self.board.is_in_check(us)?;
        if movegen::generate_moves(&self.board)?.is_empty() {
            return Ok(if in_check {
                Status::Checkmate {
                    winner: us.opponent(),
                }
            } else {
                Status::Stalemate
            });
        }
        if self.board.configuration().halfmove_clock >= FIFTY_MOVE_RULE_PLIES {
            return Ok(Status::FiftyMoveRule);
        }
        Ok(if in_check {
            Status::Check
        } else {
            Status::Ongoing
        })
    }

    #[allow(missing_docs, clippy::missing_errors_doc)]
    pub fn is_checkmate(&self) -> Result<bool> {
        Ok(matches!(self.status()?, Status::Checkmate { .. }))
    }

    #[allow(missing_docs, clippy::missing_errors_doc)]
    pub fn is_stalemate(&self) -> Result<bool> {
        Ok(self.status()? == Status::Stalemate)
    }

    /// Applied moves, oldest first.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Takes back the last move and returns it.
    pub fn undo(&mut self) -> Option<Move> {
        let entry = self.history.pop()?;
        self.board = Board::new(entry.before);
        debug!(undone = %entry.played, fen = %self.board, "took back move");
        Some(entry.played)
    }

    /// Puts a piece on the board, replacing whatever stood there. History and
    /// clocks are not touched.
    pub fn set_piece(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.board.set(square, Some(piece))
    }

    /// Clears the square and returns its piece.
    pub fn remove_piece(&mut self, square: Square) -> Option<Piece> {
        self.board.set(square, None)
    }
}

impl From<Configuration> for Game {
    fn from(configuration: Configuration) -> Self {
        Self {
            board: Board::new(configuration),
            history: Vec::new(),
        }
    }
}

impl FromStr for Game {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::from_fen(input)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn game(fen: &str) -> Game {
        Game::from_fen(fen).expect("valid_position")
    }

    #[test]
    fn stalemate() {
        let mut game = game("3b2qk/p6p/1p3Q1P/8/8/n7/PP6/K7 b - - 3 2");
        assert_eq!(game.status().unwrap(), Status::Ongoing);

        // Black has no moves and is not in check.
        let _ = game.make_move(Square::D8, Square::F6).unwrap();
        assert!(game.all_moves().unwrap().is_empty());
        assert_eq!(game.status().unwrap(), Status::Stalemate);
        assert!(game.is_stalemate().unwrap());
        assert!(matches!(
            game.ai_move(2),
            Err(Error::NoLegalMoves(Player::White))
        ));
    }

    #[test]
    fn checkmate() {
        let mut game = game("3b3k/p5qp/1p3Q1P/8/8/n7/PP6/K7 w - - 4 3");
        assert_eq!(game.status().unwrap(), Status::Ongoing);

        let _ = game.make_move(Square::F6, Square::G7).unwrap();
        assert!(game.all_moves().unwrap().is_empty());
        assert_eq!(
            game.status().unwrap(),
            Status::Checkmate {
                winner: Player::White
            }
        );
        assert!(game.is_checkmate().unwrap());
        assert!(game.moves(Square::H8).unwrap().is_empty());
    }

    #[test]
    fn fifty_move_rule() {
        // All legal moves are just moving the kings back and forth, the
        // halfmove clock expires on the next turn.
        let mut game = game("8/5k2/3p4/1p1Pp2p/pP2Pp1P/P4P1K/8/8 b - - 99 50");
        assert_eq!(game.status().unwrap(), Status::Ongoing);

        let _ = game.make_move(Square::F7, Square::F6).unwrap();
        assert_eq!(game.status().unwrap(), Status::FiftyMoveRule);
        assert!(!game.status().unwrap().is_finished());
    }

    #[test]
    fn fifty_move_rule_before_check() {
        let game = game("4k3/8/8/8/8/8/4r3/4K3 w - - 100 60");
        assert!(game.board().is_in_check(Player::White).unwrap());
        assert_eq!(game.status().unwrap(), Status::FiftyMoveRule);
    }

    #[test]
    fn check() {
        let game = game("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
        assert_eq!(game.status().unwrap(), Status::Check);
    }

    #[test]
    fn rejected_move_keeps_state() {
        let mut game = Game::new();
        let before = game.export_fen();
        assert!(matches!(
            game.make_move(Square::E2, Square::E5),
            Err(Error::IllegalMove {
                from: Square::E2,
                to: Square::E5,
                side: Player::White
            })
        ));
        // Not our turn.
        assert!(game.make_move(Square::E7, Square::E5).is_err());
        // Empty square.
        assert!(game.make_move(Square::E4, Square::E5).is_err());
        assert_eq!(game.export_fen(), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn undo() {
        let mut game = Game::new();
        let _ = game.make_move(Square::G1, Square::F3).unwrap();
        let _ = game.make_move(Square::D7, Square::D5).unwrap();
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history()[1].played.to_string(), "d7d5");
        assert_eq!(
            game.undo().map(|undone| undone.to_string()),
            Some("d7d5".to_string())
        );
        assert_eq!(
            game.export_fen(),
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
        assert!(game.undo().is_some());
        assert!(game.undo().is_none());
        assert_eq!(game.board(), &Board::starting());
    }

    #[test]
    fn board_editing() {
        let mut game = Game::new();
        let queen = Piece::try_from('Q').unwrap();
        assert_eq!(game.set_piece(Square::E4, queen), None);
        assert_eq!(
            game.remove_piece(Square::D1),
            Some(Piece::try_from('Q').unwrap())
        );
        assert_eq!(game.board().get(Square::E4), Some(queen));
        assert!(game.moves(Square::E4).unwrap().contains(&Square::E7));
        assert!(game.history().is_empty());
    }

    #[test]
    fn all_moves_grouped() {
        let moves = Game::new().all_moves().unwrap();
        assert_eq!(moves.len(), 10);
        assert_eq!(moves[&Square::B1], vec![Square::C3, Square::A3]);
        assert_eq!(moves[&Square::E2], vec![Square::E3, Square::E4]);
    }
}
