//! Benchmarks for signal queries.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use signals_core::{Signal, Tier, TierTable};
use signals_query::{SignalQuery, SignalQueryEngine};
use std::sync::Arc;

const TYPES: [&str; 4] = ["NEW_BUY", "STOP_LOSS", "TRAILING_STOP", "MOMENTUM_ADD"];
const SYMBOLS: [&str; 5] = ["ELSA", "PEPE", "MOON", "WIF", "BONK"];

fn generate_signals(n: usize) -> Vec<Signal> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            Signal::new(
                TYPES[i % TYPES.len()],
                Some(SYMBOLS[i % SYMBOLS.len()]),
                base + Duration::seconds((i * 37 % 86_400) as i64),
            )
        })
        .collect()
}

fn benchmark_queries(c: &mut Criterion) {
    let engine = SignalQueryEngine::new(Arc::new(TierTable::default()));
    let now = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
    let mut group = c.benchmark_group("signal_query");

    for size in [1_000, 10_000, 100_000] {
        let signals = generate_signals(size);

        group.bench_with_input(BenchmarkId::new("unfiltered_free", size), &signals, |b, s| {
            let query = SignalQuery::new();
            b.iter(|| engine.execute(black_box(s), Tier::Free, &query, now))
        });

        group.bench_with_input(BenchmarkId::new("type_symbol_pro", size), &signals, |b, s| {
            let query = SignalQuery::new().with_type("NEW_BUY").with_symbol("elsa");
            b.iter(|| engine.execute(black_box(s), Tier::Pro, &query, now))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_queries);
criterion_main!(benches);
