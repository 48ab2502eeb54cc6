#![no_main]
use chessmaster::chess::fen;
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(configuration) = fen::import(input) else {
        return;
    };
    assert_eq!(fen::import(&configuration.to_string()).unwrap(), configuration);
});
