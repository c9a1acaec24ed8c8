use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uci::Decoder;

/// Typical engine output, from a short Stockfish analysis session.
const LINES: &[&str] = &[
    "info depth 1 seldepth 1 multipv 1 score cp 18 nodes 20 nps 10000 hashfull 0 tbhits 0 time 2 pv e2e4",
    "info depth 24 seldepth 33 multipv 1 score cp 31 wdl 64 913 23 nodes 2741239 nps 1370619 hashfull 843 tbhits 0 time 2000 pv e2e4 e7e5 g1f3 b8c6 f1b5 g8f6 e1g1 f6e4 f1e1 e4d6",
    "info depth 31 seldepth 12 multipv 1 score mate -6 upperbound nodes 98172 nps 200000 time 490 pv h7h8q g8h8",
    "info string NNUE evaluation using nn-1c0000000000.nnue enabled",
    "bestmove e2e4 ponder e7e5",
];

fn bench_decode(c: &mut Criterion) {
    let decoder = Decoder::new();
    let mut group = c.benchmark_group("decoder");

    for line in LINES {
        let label: String = line.chars().take(24).collect();

        group.bench_with_input(BenchmarkId::from_parameter(label), line, |b, line| {
            b.iter(|| black_box(decoder.decode(black_box(line))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
