//! FEN import and export.

use std::time::Duration;

use chessmaster::chess::board::Board;
use chessmaster::chess::fen;
use chessmaster::Game;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "rnbqk1nr/p3bppp/1p2p3/2ppP3/3P4/P7/1PP1NPPP/R1BQKBNR w KQkq c6 0 7",
    "r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7",
    "8/8/8/8/2P5/3k4/8/KB6 b - c3 0 1",
];

fn import(c: &mut Criterion) {
    let mut group = c.benchmark_group("FEN");
    group.throughput(criterion::Throughput::Elements(POSITIONS.len() as u64));
    group.bench_with_input(
        BenchmarkId::new("import", format!("{} positions", POSITIONS.len())),
        POSITIONS,
        |b, positions| {
            b.iter(|| {
                for position in positions {
                    assert!(std::hint::black_box(fen::import(position)).is_ok());
                }
            });
        },
    );
    let boards: Vec<Board> = POSITIONS
        .iter()
        .map(|position| position.parse().unwrap())
        .collect();
    group.bench_with_input(
        BenchmarkId::new("export", format!("{} positions", boards.len())),
        &boards,
        |b, boards| {
            b.iter(|| {
                for board in boards {
                    let _ = std::hint::black_box(fen::export(board));
                }
            });
        },
    );
    group.finish();
}

fn game_replay(c: &mut Criterion) {
    c.bench_function("replay opening and export", |b| {
        b.iter(|| {
            let mut game = Game::new();
            for _ in 0..8 {
                let _ = game.ai_move(1).unwrap();
            }
            std::hint::black_box(game.export_fen())
        });
    });
}

criterion_group! {
    name = fen_benches;
    config = Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(10));
    targets = import, game_replay
}

criterion_main!(fen_benches);
