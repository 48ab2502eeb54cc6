//! Chess primitives commonly used within [`crate::chess`].

use std::fmt::{self, Write};
use std::mem;
use std::str::FromStr;

use anyhow::bail;
use itertools::Itertools;

#[allow(missing_docs)]
pub const BOARD_WIDTH: u8 = 8;
#[allow(missing_docs)]
pub const BOARD_SIZE: u8 = BOARD_WIDTH * BOARD_WIDTH;

/// Board squares: from left to right, from bottom to the top:
///
/// ```
/// use chessmaster::chess::core::Square;
///
/// assert_eq!(Square::A1 as u8, 0);
/// assert_eq!(Square::E1 as u8, 4);
/// assert_eq!(Square::H1 as u8, 7);
/// assert_eq!(Square::A4 as u8, 8 * 3);
/// assert_eq!(Square::H8 as u8, 63);
/// ```
///
/// Squares are parsed case-insensitively, so both the UI notation (`"E4"`)
/// and the FEN/UCI notation (`"e4"`) are accepted:
///
/// ```
/// use chessmaster::chess::core::Square;
///
/// assert_eq!("E4".parse::<Square>().unwrap(), Square::E4);
/// assert_eq!("e4".parse::<Square>().unwrap(), Square::E4);
/// assert_eq!(Square::E4.to_string(), "e4");
/// ```
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "String", try_from = "String")
)]
#[rustfmt::skip]
#[allow(missing_docs)]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// Connects file (column) and rank (row) to form a full square.
    #[must_use]
    pub const fn new(file: File, rank: Rank) -> Self {
        // File and Rank are both within 0..BOARD_WIDTH, so the index is always
        // a valid discriminant.
        unsafe { mem::transmute(file as u8 + (rank as u8) * BOARD_WIDTH) }
    }

    /// Returns file (column) on which the square is located.
    #[must_use]
    pub const fn file(self) -> File {
        unsafe { mem::transmute(self as u8 % BOARD_WIDTH) }
    }

    /// Returns rank (row) on which the square is located.
    #[must_use]
    pub const fn rank(self) -> Rank {
        unsafe { mem::transmute(self as u8 / BOARD_WIDTH) }
    }

    /// Returns the square `file_delta` columns to the right and `rank_delta`
    /// rows up from this one (from White's perspective) or [`None`] if it
    /// falls off the board.
    #[must_use]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        const WIDTH: i8 = BOARD_WIDTH as i8;
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if !(0..WIDTH).contains(&file) || !(0..WIDTH).contains(&rank) {
            return None;
        }
        Some(Self::new(
            File::try_from(file as u8).ok()?,
            Rank::try_from(rank as u8).ok()?,
        ))
    }

    /// Moves one step in the given direction.
    #[must_use]
    pub fn shift(self, direction: Direction) -> Option<Self> {
        let (file_delta, rank_delta) = direction.delta();
        self.offset(file_delta, rank_delta)
    }
}

impl TryFrom<u8> for Square {
    type Error = anyhow::Error;

    /// Creates a square given its position on the board.
    ///
    /// # Errors
    ///
    /// If given square index is outside 0..[`BOARD_SIZE`] range.
    fn try_from(square_index: u8) -> anyhow::Result<Self> {
        // Exclusive range patterns are not allowed:
        // https://github.com/rust-lang/rust/issues/37854
        const MAX_INDEX: u8 = BOARD_SIZE - 1;
        match square_index {
            0..=MAX_INDEX => Ok(unsafe { mem::transmute::<u8, Self>(square_index) }),
            _ => bail!("square index should be in 0..BOARD_SIZE, got {square_index}"),
        }
    }
}

impl TryFrom<&str> for Square {
    type Error = anyhow::Error;

    fn try_from(square: &str) -> anyhow::Result<Self> {
        let Some((file, rank)) = square.chars().collect_tuple() else {
            bail!(
                "square should be two-char, got {square} with {} chars",
                square.chars().count()
            )
        };
        Ok(Self::new(file.try_into()?, rank.try_into()?))
    }
}

impl TryFrom<String> for Square {
    type Error = anyhow::Error;

    fn try_from(square: String) -> anyhow::Result<Self> {
        Self::try_from(square.as_str())
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    fn from_str(square: &str) -> anyhow::Result<Self> {
        Self::try_from(square)
    }
}

/// Squares are exchanged with the board UI as uppercase locations (`"E4"`).
impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string().to_ascii_uppercase()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Represents a column (vertical row) of the chessboard. In chess notation, it
/// is normally represented with a lowercase letter.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char((b'a' + *self as u8) as char)
    }
}

impl TryFrom<char> for File {
    type Error = anyhow::Error;

    fn try_from(file: char) -> anyhow::Result<Self> {
        match file.to_ascii_lowercase() {
            lowercase @ 'a'..='h' => Ok(unsafe { mem::transmute::<u8, Self>(lowercase as u8 - b'a') }),
            _ => bail!("file should be within 'a'..='h', got '{file}'"),
        }
    }
}

impl TryFrom<u8> for File {
    type Error = anyhow::Error;

    fn try_from(column: u8) -> anyhow::Result<Self> {
        match column {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(column) }),
            _ => bail!("file should be within 0..BOARD_WIDTH, got {column}"),
        }
    }
}

/// Represents a horizontal row of the chessboard. In chess notation, it is
/// represented with a number. The implementation assumes zero-based values
/// (i.e. rank 1 would be 0).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Rank {
    One = 0,
    Two = 1,
    Three = 2,
    Four = 3,
    Five = 4,
    Six = 5,
    Seven = 6,
    Eight = 7,
}

impl Rank {
    /// The rank on which the player's king and rooks start.
    #[must_use]
    pub const fn backrank(player: Player) -> Self {
        match player {
            Player::White => Self::One,
            Player::Black => Self::Eight,
        }
    }

    /// The rank on which the player's pawns start and from which they may
    /// advance two squares.
    #[must_use]
    pub const fn pawns_starting(player: Player) -> Self {
        match player {
            Player::White => Self::Two,
            Player::Black => Self::Seven,
        }
    }

    /// The rank on which a pawn of the player promotes.
    #[must_use]
    pub const fn promotion(player: Player) -> Self {
        Self::backrank(player.opponent())
    }
}

impl TryFrom<char> for Rank {
    type Error = anyhow::Error;

    fn try_from(rank: char) -> anyhow::Result<Self> {
        match rank {
            '1'..='8' => Ok(unsafe { mem::transmute::<u8, Self>(rank as u8 - b'1') }),
            _ => bail!("rank should be within '1'..='8', got '{rank}'"),
        }
    }
}

impl TryFrom<u8> for Rank {
    type Error = anyhow::Error;

    fn try_from(row: u8) -> anyhow::Result<Self> {
        match row {
            0..=7 => Ok(unsafe { mem::transmute::<u8, Self>(row) }),
            _ => bail!("rank should be within 0..BOARD_WIDTH, got {row}"),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8 + 1)
    }
}

/// A standard game of chess is played between two players: White (having the
/// advantage of the first turn) and Black.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Player {
    White,
    Black,
}

impl Player {
    /// "Flips" the color.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Rank delta of a single pawn push.
    #[must_use]
    pub const fn push_direction(self) -> Direction {
        match self {
            Self::White => Direction::Up,
            Self::Black => Direction::Down,
        }
    }

    /// Material and evaluation sign: positive for White.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }
}

impl TryFrom<&str> for Player {
    type Error = anyhow::Error;

    fn try_from(player: &str) -> anyhow::Result<Self> {
        match player {
            "w" => Ok(Self::White),
            "b" => Ok(Self::Black),
            _ => bail!("player should be 'w' or 'b', got '{player}'"),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::White => 'w',
            Self::Black => 'b',
        })
    }
}

/// Standard [chess pieces].
///
/// [chess pieces]: https://en.wikipedia.org/wiki/Chess_piece
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum PieceKind {
    King = 1,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
}

impl From<Promotion> for PieceKind {
    fn from(promotion: Promotion) -> Self {
        match promotion {
            Promotion::Queen => Self::Queen,
            Promotion::Rook => Self::Rook,
            Promotion::Bishop => Self::Bishop,
            Promotion::Knight => Self::Knight,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(match &self {
            Self::King => 'k',
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
            Self::Pawn => 'p',
        })
    }
}

/// Represents a specific piece owned by a player. Pieces are exchanged as
/// their FEN symbol: uppercase for White, lowercase for Black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "char", try_from = "char")
)]
pub struct Piece {
    #[allow(missing_docs)]
    pub owner: Player,
    #[allow(missing_docs)]
    pub kind: PieceKind,
}

impl Piece {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn new(owner: Player, kind: PieceKind) -> Self {
        Self { owner, kind }
    }

    /// FEN symbol of the piece.
    #[must_use]
    pub fn symbol(self) -> char {
        let symbol = match self.kind {
            PieceKind::King => 'k',
            PieceKind::Queen => 'q',
            PieceKind::Rook => 'r',
            PieceKind::Bishop => 'b',
            PieceKind::Knight => 'n',
            PieceKind::Pawn => 'p',
        };
        match self.owner {
            Player::White => symbol.to_ascii_uppercase(),
            Player::Black => symbol,
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = anyhow::Error;

    fn try_from(symbol: char) -> anyhow::Result<Self> {
        let kind = match symbol.to_ascii_lowercase() {
            'k' => PieceKind::King,
            'q' => PieceKind::Queen,
            'r' => PieceKind::Rook,
            'b' => PieceKind::Bishop,
            'n' => PieceKind::Knight,
            'p' => PieceKind::Pawn,
            _ => bail!("piece symbol should be within \"KQRBNPkqrbnp\", got '{symbol}'"),
        };
        let owner = if symbol.is_ascii_uppercase() {
            Player::White
        } else {
            Player::Black
        };
        Ok(Self { owner, kind })
    }
}

impl From<Piece> for char {
    fn from(piece: Piece) -> Self {
        piece.symbol()
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.symbol())
    }
}

bitflags::bitflags! {
    /// Track the ability to [castle] each side (kingside is often referred to
    /// as O-O or h-side castle, queenside -- O-O-O or a-side castle). When the
    /// king moves, player loses ability to castle both sides. When the rook
    /// moves or is captured on its original square, player loses ability to
    /// castle its corresponding side.
    ///
    /// The rights only track whether the king and rooks are still "unmoved":
    /// whether castling is possible right now (no pieces in between, no
    /// attacked squares on the king's walk) is decided by the move generator.
    ///
    /// - When castling h-side (short), the king ends up on [`File::G`] and the
    ///   rook on [`File::F`]
    /// - When castling a-side (long), the king ends up on [`File::C`] and the
    ///   rook on [`File::D`]
    ///
    /// [castle]: https://www.chessprogramming.org/Castling
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CastleRights : u8 {
        #[allow(missing_docs)]
        const NONE = 0;
        #[allow(missing_docs)]
        const WHITE_SHORT = 0b1000;
        #[allow(missing_docs)]
        const WHITE_LONG = 0b0100;
        #[allow(missing_docs)]
        const WHITE_BOTH = Self::WHITE_SHORT.bits() | Self::WHITE_LONG.bits();
        #[allow(missing_docs)]
        const BLACK_SHORT = 0b0010;
        #[allow(missing_docs)]
        const BLACK_LONG = 0b0001;
        #[allow(missing_docs)]
        const BLACK_BOTH = Self::BLACK_SHORT.bits() | Self::BLACK_LONG.bits();
        #[allow(missing_docs)]
        const ALL = Self::WHITE_BOTH.bits() | Self::BLACK_BOTH.bits();
    }
}

impl CastleRights {
    /// Kingside right of the player.
    #[must_use]
    pub const fn short(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_SHORT,
            Player::Black => Self::BLACK_SHORT,
        }
    }

    /// Queenside right of the player.
    #[must_use]
    pub const fn long(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_LONG,
            Player::Black => Self::BLACK_LONG,
        }
    }

    /// Both rights of the player.
    #[must_use]
    pub const fn both(player: Player) -> Self {
        match player {
            Player::White => Self::WHITE_BOTH,
            Player::Black => Self::BLACK_BOTH,
        }
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn white_short(self) -> bool {
        self.contains(Self::WHITE_SHORT)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn white_long(self) -> bool {
        self.contains(Self::WHITE_LONG)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn black_short(self) -> bool {
        self.contains(Self::BLACK_SHORT)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn black_long(self) -> bool {
        self.contains(Self::BLACK_LONG)
    }
}

/// Serialized form of [`CastleRights`]: one flag per side and direction.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CastlingFlags {
    white_short: bool,
    white_long: bool,
    black_short: bool,
    black_long: bool,
}

#[cfg(feature = "serde")]
impl serde::Serialize for CastleRights {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        let flags = CastlingFlags {
            white_short: self.white_short(),
            white_long: self.white_long(),
            black_short: self.black_short(),
            black_long: self.black_long(),
        };
        serde::Serialize::serialize(&flags, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CastleRights {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let flags = <CastlingFlags as serde::Deserialize>::deserialize(deserializer)?;
        let mut rights = Self::NONE;
        rights.set(Self::WHITE_SHORT, flags.white_short);
        rights.set(Self::WHITE_LONG, flags.white_long);
        rights.set(Self::BLACK_SHORT, flags.black_short);
        rights.set(Self::BLACK_LONG, flags.black_long);
        Ok(rights)
    }
}

impl TryFrom<&str> for CastleRights {
    type Error = anyhow::Error;

    /// Parses [`CastleRights`] for both players from the FEN format. The user
    /// is responsible for providing valid input cleaned up from the actual FEN
    /// chunk.
    ///
    /// # Errors
    ///
    /// Returns [`anyhow::Error`] if given pattern does not match
    ///
    /// [`CastleRights`] := (K)? (Q)? (k)? (q)?
    ///
    /// Note that the letters have to appear in exactly this order.
    fn try_from(input: &str) -> anyhow::Result<Self> {
        // Enumerate all possibilities.
        match input.as_bytes() {
            // K Q k q
            // - - - -
            // 0 0 0 0
            b"-" => Ok(Self::NONE),
            // 0 0 0 1
            b"q" => Ok(Self::BLACK_LONG),
            // 0 0 1 0
            b"k" => Ok(Self::BLACK_SHORT),
            // 0 0 1 1
            b"kq" => Ok(Self::BLACK_BOTH),
            // 0 1 0 0
            b"Q" => Ok(Self::WHITE_LONG),
            // 0 1 0 1
            b"Qq" => Ok(Self::WHITE_LONG | Self::BLACK_LONG),
            // 0 1 1 0
            b"Qk" => Ok(Self::WHITE_LONG | Self::BLACK_SHORT),
            // 0 1 1 1
            b"Qkq" => Ok(Self::WHITE_LONG | Self::BLACK_BOTH),
            // 1 0 0 0
            b"K" => Ok(Self::WHITE_SHORT),
            // 1 0 0 1
            b"Kq" => Ok(Self::WHITE_SHORT | Self::BLACK_LONG),
            // 1 0 1 0
            b"Kk" => Ok(Self::WHITE_SHORT | Self::BLACK_SHORT),
            // 1 0 1 1
            b"Kkq" => Ok(Self::WHITE_SHORT | Self::BLACK_BOTH),
            // 1 1 0 0
            b"KQ" => Ok(Self::WHITE_BOTH),
            // 1 1 0 1
            b"KQq" => Ok(Self::WHITE_BOTH | Self::BLACK_LONG),
            // 1 1 1 0
            b"KQk" => Ok(Self::WHITE_BOTH | Self::BLACK_SHORT),
            // 1 1 1 1
            b"KQkq" => Ok(Self::ALL),
            _ => bail!("unknown castle rights: {input}"),
        }
    }
}

impl fmt::Display for CastleRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        if self.white_short() {
            f.write_char('K')?;
        }
        if self.white_long() {
            f.write_char('Q')?;
        }
        if self.black_short() {
            f.write_char('k')?;
        }
        if self.black_long() {
            f.write_char('q')?;
        }
        Ok(())
    }
}

/// A pawn can be promoted to a queen, rook, bishop or a knight.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    /// All promotion targets, strongest first.
    pub const ALL: [Self; 4] = [Self::Queen, Self::Rook, Self::Bishop, Self::Knight];
}

/// Directions on the board from a perspective of White player.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::EnumIter)]
#[allow(missing_docs)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Directions rooks slide in.
    pub const ORTHOGONAL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
    /// Directions bishops slide in.
    pub const DIAGONAL: [Self; 4] = [Self::UpLeft, Self::UpRight, Self::DownLeft, Self::DownRight];
    /// Directions queens slide in and kings step in.
    pub const ALL: [Self; 8] = [
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
    ];

    /// `(file, rank)` step of the direction.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::UpLeft => (-1, 1),
            Self::UpRight => (1, 1),
            Self::DownLeft => (-1, -1),
            Self::DownRight => (1, -1),
        }
    }
}

bitflags::bitflags! {
    /// More information about [`Move`] that makes it possible to make that move
    /// and dump it in human-readable format.
    ///
    /// Apart from the "regular" or "quiet" moves (simply moving a piece from
    /// one square to the other), there are few important rules:
    ///
    /// - [En passant] is a capture of opponent's pawn "in passing" (when it
    ///   advances two squares from its original position).
    /// - The [Castle] move that will involve a king and a rook "jumping" over
    ///   each other. Technically, castling is a king move, so `from` and `to`
    ///   move squares will correspond to the king.
    ///
    /// [Castle]: https://en.wikipedia.org/wiki/Castling
    /// [En passant]: https://en.wikipedia.org/wiki/En_passant
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        /// Moves that do not change the material balance.
        const QUIET = 0;
        /// Moves that change the material balance.
        const CAPTURE = 0b0000_0001;
        /// Pawn advancement by 2 squares from the original rank (second for
        /// white and seventh for black).
        const DOUBLE_PAWN_PUSH = 0b0000_0010;
        /// Capture of the pawn that just made a double push.
        const EN_PASSANT = 0b0000_0100;
        /// Short or long castle.
        const CASTLE = 0b0000_1000;
        /// Pawn move to the opponent's "home" rank.
        const PROMOTION = 0b0001_0000;
    }
}

/// Fully described move: where the piece moves, what it captures and which
/// special rules apply. Moves are produced by [`crate::chess::movegen`] and
/// applied by [`crate::chess::board::Board::make_move`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    #[allow(missing_docs)]
    pub from: Square,
    #[allow(missing_docs)]
    pub to: Square,
    /// The piece that moves.
    pub piece: Piece,
    /// The piece removed from the board (for en passant it does not stand on
    /// `to`).
    pub captured: Option<Piece>,
    #[allow(missing_docs)]
    pub promotion: Option<Promotion>,
    #[allow(missing_docs)]
    pub flags: MoveFlags,
}

impl Move {
    #[allow(missing_docs)]
    #[must_use]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_castle(&self) -> bool {
        self.flags.contains(MoveFlags::CASTLE)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_en_passant(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT)
    }

    #[allow(missing_docs)]
    #[must_use]
    pub fn is_double_pawn_push(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_PAWN_PUSH)
    }
}

impl fmt::Display for Move {
    /// Serializes a move in [UCI format].
    ///
    /// [UCI format]: http://wbec-ridderkerk.nl/html/UCIProtocol.html
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", PieceKind::from(promotion))?;
        }
        Ok(())
    }
}
