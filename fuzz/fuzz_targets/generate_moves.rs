#![no_main]
use chessmaster::chess::board::Board;
use chessmaster::chess::movegen;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use shakmaty::{CastlingMode, Chess, Position};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(board) = input.parse::<Board>() else {
        return;
    };
    // Positions shakmaty considers impossible (missing kings, stray castling
    // rights or en passant squares) are out of scope.
    let Ok(shakmaty_setup) = input.trim().parse::<shakmaty::fen::Fen>() else {
        return;
    };
    let Ok(shakmaty_position) = shakmaty_setup.into_position::<Chess>(CastlingMode::Standard)
    else {
        return;
    };
    assert_eq!(
        movegen::generate_moves(&board)
            .expect("shakmaty accepted the position, so both kings are present")
            .iter()
            .map(ToString::to_string)
            .sorted()
            .collect::<Vec<_>>(),
        shakmaty_position
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .sorted()
            .collect::<Vec<_>>()
    );
});
