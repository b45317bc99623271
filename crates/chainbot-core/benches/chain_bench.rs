//! # Chain Benchmarks
//!
//! Performance benchmarks for chainbot-core model operations.
//!
//! Run with: `cargo bench -p chainbot-core`

use chainbot_core::{Graph, Ingestor, Token};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

/// Deterministic pseudo-chat: `lines` lines over a `vocab`-word vocabulary.
fn corpus(lines: usize, vocab: usize) -> Vec<String> {
    (0..lines)
        .map(|i| {
            (0..8)
                .map(|j| format!("w{}", (i * 7 + j * 13) % vocab))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn learned_graph(lines: &[String]) -> Graph {
    let mut graph = Graph::new();
    for line in lines {
        let _ = Ingestor::ingest_line(&mut graph, line);
    }
    graph
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");

    for size in [100usize, 1000, 10000] {
        let lines = corpus(size, 500);
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| black_box(learned_graph(lines)));
        });
    }

    group.finish();
}

fn bench_retract(c: &mut Criterion) {
    let mut group = c.benchmark_group("retract_line");

    for size in [100usize, 1000, 10000] {
        let lines = corpus(size, 500);
        let graph = learned_graph(&lines);
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| {
                let mut g = graph.clone();
                Ingestor::retract_line(&mut g, &lines[0]);
                black_box(g)
            });
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for size in [100usize, 1000, 10000] {
        let mut graph = learned_graph(&corpus(size, 500));
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| black_box(graph.generate(10, 50, " ", &mut rng)));
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let graph = learned_graph(&corpus(1000, 500));
    c.bench_function("remove_word", |b| {
        b.iter(|| {
            let mut g = graph.clone();
            g.remove(&Token::word("w1"));
            black_box(g)
        });
    });
}

criterion_group!(
    benches,
    bench_ingest,
    bench_retract,
    bench_generate,
    bench_remove
);
criterion_main!(benches);
