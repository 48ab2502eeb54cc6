//! Mailbox [board representation] and the rules of applying moves to it.
//!
//! [`Board`] is a plain value: the whole state lives in a [`Configuration`]
//! that is cheap to copy, which is how the move generator checks legality and
//! how the search explores positions without touching the live game.
//!
//! [board representation]: https://www.chessprogramming.org/Mailbox

use std::fmt::{self, Write};
use std::num::NonZeroU16;
use std::ops::Index;
use std::str::FromStr;

use strum::IntoEnumIterator;

use crate::chess::core::{
    CastleRights,
    Direction,
    File,
    Move,
    Piece,
    PieceKind,
    Player,
    Rank,
    Square,
    BOARD_SIZE,
};
use crate::chess::fen;
use crate::error::{Error, Result};

/// `(file, rank)` jumps of a knight.
pub(crate) const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Squares reachable by sliding from `from` in `direction`, nearest first.
/// The ray does not stop at occupied squares: callers decide when to stop.
pub(crate) fn ray(from: Square, direction: Direction) -> impl Iterator<Item = Square> {
    std::iter::successors(from.shift(direction), move |square| square.shift(direction))
}

/// Square-centric piece placement: every square holds at most one piece.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Pieces([Option<Piece>; BOARD_SIZE as usize]);

impl Pieces {
    /// No pieces on the board.
    #[must_use]
    pub const fn empty() -> Self {
        Self([None; BOARD_SIZE as usize])
    }

    /// Standard chess starting placement.
    #[must_use]
    pub fn starting() -> Self {
        const BACKRANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        let mut pieces = Self::empty();
        for player in [Player::White, Player::Black] {
            for (file, kind) in File::iter().zip(BACKRANK) {
                let _ = pieces.set(
                    Square::new(file, Rank::backrank(player)),
                    Some(Piece::new(player, kind)),
                );
                let _ = pieces.set(
                    Square::new(file, Rank::pawns_starting(player)),
                    Some(Piece::new(player, PieceKind::Pawn)),
                );
            }
        }
        pieces
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn get(&self, square: Square) -> Option<Piece> {
        self.0[square as usize]
    }

    /// Places the piece on the square (or clears it) and returns whatever was
    /// standing there before.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        std::mem::replace(&mut self.0[square as usize], piece)
    }

    /// Occupied squares in A1..H8 order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }
}

impl Index<Square> for Pieces {
    type Output = Option<Piece>;

    fn index(&self, square: Square) -> &Self::Output {
        &self.0[square as usize]
    }
}

impl Default for Pieces {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Pieces {
    /// Prints piece placement in FEN format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            let mut empty_squares = 0i32;
            for file in File::iter() {
                if let Some(piece) = self.get(Square::new(file, rank)) {
                    if empty_squares != 0 {
                        write!(f, "{empty_squares}")?;
                        empty_squares = 0;
                    }
                    write!(f, "{piece}")?;
                } else {
                    empty_squares += 1;
                }
            }
            if empty_squares != 0 {
                write!(f, "{empty_squares}")?;
            }
            if rank != Rank::One {
                const RANK_SEPARATOR: char = '/';
                f.write_char(RANK_SEPARATOR)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Pieces {
    /// Dumps the board in a simple format ('.' for empty square, FEN algebraic
    /// symbol for piece).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            for file in File::iter() {
                match self.get(Square::new(file, rank)) {
                    Some(piece) => write!(f, "{piece}"),
                    None => f.write_char('.'),
                }?;
                if file != File::H {
                    f.write_char(' ')?;
                }
            }
            if rank != Rank::One {
                f.write_char('\n')?;
            }
        }
        Ok(())
    }
}

/// Only occupied squares are serialized: `{ "E2": "P", "E8": "k", ... }`.
#[cfg(feature = "serde")]
impl serde::Serialize for Pieces {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Pieces {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let occupied =
            <std::collections::BTreeMap<Square, Piece> as serde::Deserialize>::deserialize(
                deserializer,
            )?;
        let mut pieces = Self::empty();
        for (square, piece) in occupied {
            let _ = pieces.set(square, Some(piece));
        }
        Ok(pieces)
    }
}

/// Everything that describes a chess position: where the pieces are, whose
/// turn it is, castling rights, the en passant target and the move clocks.
/// It has 1:1 relationship with [Forsyth-Edwards Notation] (FEN).
///
/// [Forsyth-Edwards Notation]: https://www.chessprogramming.org/Forsyth-Edwards_Notation
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Configuration {
    #[allow(missing_docs)]
    pub pieces: Pieces,
    /// Side to move.
    pub turn: Player,
    #[allow(missing_docs)]
    pub castling: CastleRights,
    /// The square a pawn skipped over with a double push on the previous
    /// ply.
    pub en_passant: Option<Square>,
    /// [Halfmove Clock][^ply] keeps track of the number of (half-)moves
    /// since the last capture or pawn move and is used to enforce
    /// fifty[^fifty]-move draw rule.
    ///
    /// [Halfmove Clock]: https://www.chessprogramming.org/Halfmove_Clock
    /// [^ply]: "Half-move" or ["ply"](https://www.chessprogramming.org/Ply) means a move of only
    ///     one side.
    /// [^fifty]: 50 __full__ moves
    #[cfg_attr(feature = "serde", serde(rename = "halfMove"))]
    pub halfmove_clock: u16,
    /// Starts at 1 and is incremented after Black's move.
    #[cfg_attr(feature = "serde", serde(rename = "fullMove"))]
    pub fullmove_counter: NonZeroU16,
}

impl Configuration {
    /// Creates the starting position of the standard chess variant.
    ///
    /// ```
    /// use chessmaster::chess::board::Configuration;
    ///
    /// assert_eq!(
    ///     Configuration::starting().to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        Self {
            pieces: Pieces::starting(),
            castling: CastleRights::ALL,
            ..Self::empty()
        }
    }

    /// Empty board, White to move, no castling rights.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            pieces: Pieces::empty(),
            turn: Player::White,
            castling: CastleRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_counter: NonZeroU16::MIN,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::starting()
    }
}

/// Castling right lost when a piece leaves or lands on the square.
const fn rook_home_right(square: Square) -> CastleRights {
    match square {
        Square::A1 => CastleRights::WHITE_LONG,
        Square::H1 => CastleRights::WHITE_SHORT,
        Square::A8 => CastleRights::BLACK_LONG,
        Square::H8 => CastleRights::BLACK_SHORT,
        _ => CastleRights::NONE,
    }
}

/// Chess board with all the position metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    configuration: Configuration,
}

impl Board {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    /// ```
    /// use chessmaster::chess::board::Board;
    ///
    /// assert_eq!(
    ///     &Board::starting().to_string(),
    ///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    /// );
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        Self::new(Configuration::starting())
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Gives up the board state.
    #[must_use]
    pub fn into_configuration(self) -> Configuration {
        self.configuration
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Player {
        self.configuration.turn
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn get(&self, square: Square) -> Option<Piece> {
        self.configuration.pieces.get(square)
    }

    /// Places or removes a piece; returns the previous occupant.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) -> Option<Piece> {
        self.configuration.pieces.set(square, piece)
    }

    /// Location of the player's king.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKing`] if the player has no king on the board.
    pub fn king_location(&self, player: Player) -> Result<Square> {
        let king = Piece::new(player, PieceKind::King);
        self.configuration
            .pieces
            .iter()
            .find_map(|(square, piece)| (piece == king).then_some(square))
            .ok_or(Error::MissingKing(player))
    }

    /// Returns `true` if any piece of `by` attacks the square. Attacker's own
    /// king safety is not taken into account.
    #[must_use]
    pub fn is_square_attacked(&self, square: Square, by: Player) -> bool {
        let is = |candidate: Option<Square>, kind: PieceKind| {
            candidate.is_some_and(|from| self.get(from) == Some(Piece::new(by, kind)))
        };
        // Pawns attack diagonally forward, so look one rank "behind" the
        // target from the attacker's perspective.
        let (_, forward) = by.push_direction().delta();
        if is(square.offset(-1, -forward), PieceKind::Pawn)
            || is(square.offset(1, -forward), PieceKind::Pawn)
        {
            return true;
        }
        if KNIGHT_JUMPS
            .iter()
            .any(|&(file, rank)| is(square.offset(file, rank), PieceKind::Knight))
        {
            return true;
        }
        if Direction::ALL
            .iter()
            .any(|&direction| is(square.shift(direction), PieceKind::King))
        {
            return true;
        }
        let slider_hits = |directions: [Direction; 4], kind: PieceKind| {
            directions.iter().any(|&direction| {
                ray(square, direction)
                    .find_map(|target| self.get(target))
                    .is_some_and(|piece| {
                        piece.owner == by && (piece.kind == kind || piece.kind == PieceKind::Queen)
                    })
            })
        };
        slider_hits(Direction::ORTHOGONAL, PieceKind::Rook)
            || slider_hits(Direction::DIAGONAL, PieceKind::Bishop)
    }

    /// Returns `true` if the player's king is attacked.
    ///
    /// # Errors
    ///
    /// [`Error::MissingKing`] if the player has no king on the board.
    pub fn is_in_check(&self, player: Player) -> Result<bool> {
        Ok(self.is_square_attacked(self.king_location(player)?, player.opponent()))
    }

    /// Applies a move produced by [`crate::chess::movegen`]: relocates the
    /// pieces (including the rook when castling and the captured pawn for en
    /// passant) and updates castling rights, the en passant target, the clocks
    /// and the side to move.
    ///
    /// The move is not validated.
    pub fn make_move(&mut self, next_move: &Move) {
        let us = next_move.piece.owner;
        let configuration = &mut self.configuration;
        let pieces = &mut configuration.pieces;

        let _ = pieces.set(next_move.from, None);
        if next_move.is_en_passant() {
            // The captured pawn is next to the moving one, not on the target.
            let _ = pieces.set(
                Square::new(next_move.to.file(), next_move.from.rank()),
                None,
            );
        }
        let placed = match next_move.promotion {
            Some(promotion) => Piece::new(us, promotion.into()),
            None => next_move.piece,
        };
        let _ = pieces.set(next_move.to, Some(placed));
        if next_move.is_castle() {
            let backrank = next_move.from.rank();
            let (rook_from, rook_to) = if next_move.to.file() == File::G {
                (File::H, File::F)
            } else {
                (File::A, File::D)
            };
            let rook = pieces.set(Square::new(rook_from, backrank), None);
            let _ = pieces.set(Square::new(rook_to, backrank), rook);
        }

        if next_move.piece.kind == PieceKind::King {
            configuration.castling.remove(CastleRights::both(us));
        }
        configuration
            .castling
            .remove(rook_home_right(next_move.from) | rook_home_right(next_move.to));

        configuration.en_passant = if next_move.is_double_pawn_push() {
            next_move.from.shift(us.push_direction())
        } else {
            None
        };

        if next_move.piece.kind == PieceKind::Pawn || next_move.is_capture() {
            configuration.halfmove_clock = 0;
        } else {
            configuration.halfmove_clock = configuration.halfmove_clock.saturating_add(1);
        }
        if us == Player::Black {
            configuration.fullmove_counter = configuration.fullmove_counter.saturating_add(1);
        }
        configuration.turn = us.opponent();
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl From<Configuration> for Board {
    fn from(configuration: Configuration) -> Self {
        Self::new(configuration)
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        fen::import(input).map(Self::new)
    }
}

impl fmt::Display for Board {
    /// Prints board in Forsyth-Edwards Notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.configuration)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?}", &self.configuration.pieces)?;
        writeln!(f, "Player to move: {:?}", &self.configuration.turn)?;
        writeln!(f, "Castling: {}", &self.configuration.castling)?;
        writeln!(f, "En Passant: {:?}", &self.configuration.en_passant)?;
        writeln!(f, "Halfmove clock: {}", &self.configuration.halfmove_clock)?;
        writeln!(
            f,
            "Fullmove counter: {}",
            &self.configuration.fullmove_counter
        )?;
        writeln!(f, "FEN: {self}")
    }
}
