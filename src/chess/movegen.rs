//! Move generation.
//!
//! Candidates are produced per square by walking the piece's movement pattern
//! on the mailbox ([pseudo-legal] moves). A candidate becomes legal if the
//! mover's king is not attacked after applying it to a copy of the board.
//!
//! [pseudo-legal]: https://www.chessprogramming.org/Pseudo-Legal_Move

use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::chess::board::{ray, Board, KNIGHT_JUMPS};
use crate::chess::core::{
    CastleRights,
    Direction,
    File,
    Move,
    MoveFlags,
    Piece,
    PieceKind,
    Player,
    Promotion,
    Rank,
    Square,
};
use crate::error::Result;

/// A queen in the middle of an empty board has 27 moves; a pawn has at most
/// 12 once promotions are expanded.
const MAX_SQUARE_MOVES: usize = 32;

type SquareMoves = ArrayVec<Move, MAX_SQUARE_MOVES>;

/// Destinations of the piece on `square` by its movement rules, without
/// checking whether the move exposes its own king. Empty for an empty square.
#[must_use]
pub fn pseudo_legal_moves(board: &Board, square: Square) -> Vec<Square> {
    candidates(board, square)
        .iter()
        .map(|candidate| candidate.to)
        .dedup()
        .collect()
}

/// Destinations of the piece on `square` that do not leave its king in check.
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if the piece owner has no king.
pub fn legal_moves(board: &Board, square: Square) -> Result<Vec<Square>> {
    let mut destinations: Vec<Square> = Vec::new();
    for candidate in candidates(board, square) {
        // Promotions to the same square come in a row.
        if destinations.last() == Some(&candidate.to) {
            continue;
        }
        if is_safe(board, &candidate)? {
            destinations.push(candidate.to);
        }
    }
    Ok(destinations)
}

/// Returns `true` if the side to move may move from `from` to `to`.
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if the side to move has no king.
pub fn is_legal_move(board: &Board, from: Square, to: Square) -> Result<bool> {
    Ok(find_move(board, from, to, None)?.is_some())
}

/// Calculates a list of legal moves for the side to move: squares are visited
/// from A1 to H8 and each piece's moves follow its direction order. Promotions
/// are expanded to queen, rook, bishop and knight.
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if the side to move has no king.
pub fn generate_moves(board: &Board) -> Result<Vec<Move>> {
    // The average branching factor for chess is 35.
    let mut moves = Vec::with_capacity(50);
    for (square, piece) in board.configuration().pieces.iter() {
        if piece.owner != board.turn() {
            continue;
        }
        for candidate in candidates(board, square) {
            if is_safe(board, &candidate)? {
                moves.push(candidate);
            }
        }
    }
    Ok(moves)
}

/// Resolves a request coming from the outside into a fully described legal
/// move. `promotion` only matters for pawns reaching the last rank and
/// defaults to a queen.
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if the side to move has no king.
pub fn find_move(
    board: &Board,
    from: Square,
    to: Square,
    promotion: Option<Promotion>,
) -> Result<Option<Move>> {
    if !board
        .get(from)
        .is_some_and(|piece| piece.owner == board.turn())
    {
        return Ok(None);
    }
    let promotion = promotion.unwrap_or(Promotion::Queen);
    let Some(candidate) = candidates(board, from).into_iter().find(|candidate| {
        candidate.to == to && candidate.promotion.map_or(true, |kind| kind == promotion)
    }) else {
        return Ok(None);
    };
    Ok(is_safe(board, &candidate)?.then_some(candidate))
}

/// [Perft] (*per*formance *t*esting): counts the leaves of the legal move tree
/// of the given depth.
///
/// [Perft]: https://www.chessprogramming.org/Perft
///
/// # Errors
///
/// [`crate::error::Error::MissingKing`] if a king is missing on the way.
pub fn perft(board: &Board, depth: u8) -> Result<u64> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = generate_moves(board)?;
    if depth == 1 {
        return Ok(moves.len() as u64);
    }
    let mut nodes = 0;
    for next_move in &moves {
        let mut next = board.clone();
        next.make_move(next_move);
        nodes += perft(&next, depth - 1)?;
    }
    Ok(nodes)
}

fn is_safe(board: &Board, candidate: &Move) -> Result<bool> {
    let mut next = board.clone();
    next.make_move(candidate);
    Ok(!next.is_in_check(candidate.piece.owner)?)
}

fn candidates(board: &Board, from: Square) -> SquareMoves {
    let mut moves = SquareMoves::new();
    let Some(piece) = board.get(from) else {
        return moves;
    };
    match piece.kind {
        PieceKind::King => {
            steps(board, from, piece, Direction::ALL.map(Direction::delta), &mut moves);
            castles(board, from, piece, &mut moves);
        },
        PieceKind::Queen => slides(board, from, piece, &Direction::ALL, &mut moves),
        PieceKind::Rook => slides(board, from, piece, &Direction::ORTHOGONAL, &mut moves),
        PieceKind::Bishop => slides(board, from, piece, &Direction::DIAGONAL, &mut moves),
        PieceKind::Knight => steps(board, from, piece, KNIGHT_JUMPS, &mut moves),
        PieceKind::Pawn => pawn_moves(board, from, piece, &mut moves),
    }
    moves
}

/// Regular move or capture onto `to`, unless it is occupied by our own piece
/// or by a king.
fn reach(board: &Board, from: Square, to: Square, piece: Piece) -> Option<Move> {
    let captured = board.get(to);
    if captured.is_some_and(|other| !is_capturable(other, piece.owner)) {
        return None;
    }
    Some(Move {
        from,
        to,
        piece,
        captured,
        promotion: None,
        flags: if captured.is_some() {
            MoveFlags::CAPTURE
        } else {
            MoveFlags::QUIET
        },
    })
}

/// Kings are never captured, even when an imported position leaves the side
/// that is not to move in check.
fn is_capturable(victim: Piece, by: Player) -> bool {
    victim.owner != by && victim.kind != PieceKind::King
}

fn steps(
    board: &Board,
    from: Square,
    piece: Piece,
    offsets: [(i8, i8); 8],
    moves: &mut SquareMoves,
) {
    for (file, rank) in offsets {
        if let Some(next_move) = from
            .offset(file, rank)
            .and_then(|to| reach(board, from, to, piece))
        {
            moves.push(next_move);
        }
    }
}

fn slides(
    board: &Board,
    from: Square,
    piece: Piece,
    directions: &[Direction],
    moves: &mut SquareMoves,
) {
    for &direction in directions {
        for to in ray(from, direction) {
            if let Some(next_move) = reach(board, from, to, piece) {
                moves.push(next_move);
            }
            if board.get(to).is_some() {
                break;
            }
        }
    }
}

fn push_pawn_move(moves: &mut SquareMoves, next_move: Move) {
    if next_move.to.rank() == Rank::promotion(next_move.piece.owner) {
        for promotion in Promotion::ALL {
            moves.push(Move {
                promotion: Some(promotion),
                flags: next_move.flags | MoveFlags::PROMOTION,
                ..next_move
            });
        }
    } else {
        moves.push(next_move);
    }
}

fn pawn_moves(board: &Board, from: Square, pawn: Piece, moves: &mut SquareMoves) {
    let player = pawn.owner;
    let (_, forward) = player.push_direction().delta();
    let quiet = |to: Square, flags: MoveFlags| Move {
        from,
        to,
        piece: pawn,
        captured: None,
        promotion: None,
        flags,
    };
    if let Some(one) = from.offset(0, forward) {
        if board.get(one).is_none() {
            push_pawn_move(moves, quiet(one, MoveFlags::QUIET));
            if from.rank() == Rank::pawns_starting(player) {
                if let Some(two) = one.offset(0, forward) {
                    if board.get(two).is_none() {
                        moves.push(quiet(two, MoveFlags::DOUBLE_PAWN_PUSH));
                    }
                }
            }
        }
    }
    let their_pawn = Piece::new(player.opponent(), PieceKind::Pawn);
    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, forward) else {
            continue;
        };
        match board.get(to) {
            Some(victim) if is_capturable(victim, player) => push_pawn_move(
                moves,
                Move {
                    captured: Some(victim),
                    ..quiet(to, MoveFlags::CAPTURE)
                },
            ),
            Some(_) => {},
            None => {
                let en_passant = board.turn() == player
                    && board.configuration().en_passant == Some(to)
                    && board.get(Square::new(to.file(), from.rank())) == Some(their_pawn);
                if en_passant {
                    moves.push(Move {
                        captured: Some(their_pawn),
                        ..quiet(to, MoveFlags::CAPTURE | MoveFlags::EN_PASSANT)
                    });
                }
            },
        }
    }
}

/// Castling is possible when the right is still there, the king and the rook
/// stand on their original squares, nothing stands between them and the king
/// does not start, pass or land on an attacked square.
fn castles(board: &Board, from: Square, king: Piece, moves: &mut SquareMoves) {
    let player = king.owner;
    let backrank = Rank::backrank(player);
    let on_backrank = |file: File| Square::new(file, backrank);
    if from != on_backrank(File::E) {
        return;
    }
    let rook = Some(Piece::new(player, PieceKind::Rook));
    let sides: [(CastleRights, File, &[File], [File; 3]); 2] = [
        (
            CastleRights::short(player),
            File::H,
            &[File::F, File::G],
            [File::E, File::F, File::G],
        ),
        (
            CastleRights::long(player),
            File::A,
            &[File::B, File::C, File::D],
            [File::E, File::D, File::C],
        ),
    ];
    for (right, rook_file, between, king_walk) in sides {
        if !board.configuration().castling.contains(right)
            || board.get(on_backrank(rook_file)) != rook
            || between.iter().any(|&file| board.get(on_backrank(file)).is_some())
            || king_walk
                .iter()
                .any(|&file| board.is_square_attacked(on_backrank(file), player.opponent()))
        {
            continue;
        }
        moves.push(Move {
            from,
            to: on_backrank(king_walk[2]),
            piece: king,
            captured: None,
            promotion: None,
            flags: MoveFlags::CASTLE,
        });
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    fn from_fen(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    fn sorted(squares: Vec<Square>) -> Vec<Square> {
        squares.into_iter().sorted().collect()
    }

    #[test]
    fn starting_moves() {
        let board = Board::starting();
        assert_eq!(generate_moves(&board).unwrap().len(), 20);
        assert_eq!(
            legal_moves(&board, Square::E2).unwrap(),
            vec![Square::E3, Square::E4]
        );
        assert_eq!(
            sorted(legal_moves(&board, Square::G1).unwrap()),
            vec![Square::F3, Square::H3]
        );
        assert!(legal_moves(&board, Square::E1).unwrap().is_empty());
        assert!(legal_moves(&board, Square::E4).unwrap().is_empty());
    }

    #[test]
    fn pinned_piece() {
        // The knight on e2 is pinned by the rook on e8.
        let board = from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves(&board, Square::E2).len(), 6);
        assert!(legal_moves(&board, Square::E2).unwrap().is_empty());
        assert!(!is_legal_move(&board, Square::E2, Square::C3).unwrap());
    }

    #[test]
    fn promotions_are_expanded() {
        let board = from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let promotions: Vec<String> = generate_moves(&board)
            .unwrap()
            .iter()
            .filter(|next_move| next_move.from == Square::A7)
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            promotions,
            vec!["a7a8q", "a7a8r", "a7a8b", "a7a8n", "a7b8q", "a7b8r", "a7b8b", "a7b8n"]
        );
        assert_eq!(
            legal_moves(&board, Square::A7).unwrap(),
            vec![Square::A8, Square::B8]
        );
        let knight = find_move(&board, Square::A7, Square::B8, Some(Promotion::Knight))
            .unwrap()
            .unwrap();
        assert_eq!(knight.promotion, Some(Promotion::Knight));
        assert!(knight.is_capture());
        let queen = find_move(&board, Square::A7, Square::A8, None)
            .unwrap()
            .unwrap();
        assert_eq!(queen.promotion, Some(Promotion::Queen));
    }

    #[test]
    fn en_passant() {
        let board = from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let capture = find_move(&board, Square::E5, Square::D6, None)
            .unwrap()
            .unwrap();
        assert!(capture.is_en_passant());
        assert_eq!(capture.captured, Some(Piece::try_from('p').unwrap()));
        // No target without the pawn that was pushed.
        let board = board.to_string().replace("3pP3", "4P3");
        assert!(find_move(&board.parse().unwrap(), Square::E5, Square::D6, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn castling() {
        let board = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert_eq!(
            sorted(legal_moves(&board, Square::E1).unwrap()),
            vec![
                Square::C1,
                Square::D1,
                Square::F1,
                Square::G1,
                Square::D2,
                Square::E2,
                Square::F2
            ]
        );
        assert!(find_move(&board, Square::E1, Square::G1, None)
            .unwrap()
            .unwrap()
            .is_castle());
    }

    #[test]
    fn castling_through_attack() {
        // The rook on f8 attacks f1: short castling is not possible, long is.
        let board = from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!is_legal_move(&board, Square::E1, Square::G1).unwrap());
        assert!(is_legal_move(&board, Square::E1, Square::C1).unwrap());
        // Castling out of check is not allowed.
        let board = from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1");
        assert!(!is_legal_move(&board, Square::E1, Square::G1).unwrap());
        assert!(!is_legal_move(&board, Square::E1, Square::C1).unwrap());
        // The b1 square may be attacked for long castling, but must be empty.
        let board = from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(is_legal_move(&board, Square::E1, Square::C1).unwrap());
        let board = from_fen("4k3/8/8/8/8/8/8/RN2K3 w Q - 0 1");
        assert!(!is_legal_move(&board, Square::E1, Square::C1).unwrap());
    }

    #[test]
    fn castling_requires_rights_and_rook() {
        let board = from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(!is_legal_move(&board, Square::E1, Square::G1).unwrap());
        let board = from_fen("4k3/8/8/8/8/8/8/R3K3 w KQ - 0 1");
        assert!(!is_legal_move(&board, Square::E1, Square::G1).unwrap());
        assert!(is_legal_move(&board, Square::E1, Square::C1).unwrap());
    }

    #[test]
    fn king_is_not_a_target() {
        let board = from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1");
        assert!(!pseudo_legal_moves(&board, Square::E1).contains(&Square::E8));
        assert_eq!(find_move(&board, Square::E1, Square::E8, None).unwrap(), None);
        let board = from_fen("4k3/3P4/8/8/8/8/8/4K3 w - - 0 1");
        assert!(generate_moves(&board)
            .unwrap()
            .iter()
            .all(|next_move| next_move.to != Square::E8));
    }

    #[test]
    fn opponent_pieces_do_not_move() {
        let board = Board::starting();
        assert!(!is_legal_move(&board, Square::E7, Square::E5).unwrap());
        assert!(find_move(&board, Square::E3, Square::E4, None)
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_king() {
        let board = from_fen("8/8/8/8/8/8/4P3/8 w - - 0 1");
        assert!(matches!(
            generate_moves(&board),
            Err(Error::MissingKing(_))
        ));
        assert_eq!(pseudo_legal_moves(&board, Square::E2), vec![Square::E3, Square::E4]);
    }

    #[test]
    fn perft_starting() {
        let board = Board::starting();
        assert_eq!(perft(&board, 0).unwrap(), 1);
        assert_eq!(perft(&board, 1).unwrap(), 20);
        assert_eq!(perft(&board, 2).unwrap(), 400);
    }
}
