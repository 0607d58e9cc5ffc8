//! Criterion micro-benchmarks for memory tier transitions.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use terrane_bench::{lattice_project, GRID, PROPERTY};
use terrane_store::page;
use terrane_test_utils::random_values;

/// Benchmark: encode and decode a 1M-value page in memory.
fn bench_page_codec_1m(c: &mut Criterion) {
    let values = random_values(1_000_000, 5, 0.1);

    c.bench_function("page_codec_1m", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(values.len() * 4 + 64);
            page::encode(&mut buf, &values).unwrap();
            let decoded = page::decode(&mut Cursor::new(&buf), values.len()).unwrap();
            black_box(decoded);
        });
    });
}

/// Benchmark: swap a 250K-node property to disk and back.
fn bench_swap_round_trip_250k(c: &mut Criterion) {
    let project = lattice_project(500, 9);
    let grid = project.grid(GRID).unwrap();

    c.bench_function("swap_round_trip_250k", |b| {
        b.iter(|| {
            let out = grid.properties().swap_to_disk(&[PROPERTY]);
            let back = grid.properties().swap_to_ram(&[PROPERTY]);
            black_box((out.swapped(), back.swapped()));
        });
    });
}

/// Benchmark: read one value from an on-disk property (transparent reload).
fn bench_transparent_reload_250k(c: &mut Criterion) {
    let project = lattice_project(500, 13);
    let grid = project.grid(GRID).unwrap();
    let property = grid.property(PROPERTY).unwrap();

    c.bench_function("transparent_reload_250k", |b| {
        b.iter(|| {
            grid.properties().swap_to_disk(&[PROPERTY]);
            black_box(property.value(terrane_core::NodeId(0)).unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_page_codec_1m,
    bench_swap_round_trip_250k,
    bench_transparent_reload_250k
);
criterion_main!(benches);
