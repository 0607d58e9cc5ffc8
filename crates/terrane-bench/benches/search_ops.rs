//! Criterion micro-benchmarks for neighborhood search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use terrane_bench::{lattice_project, scattered_project, GRID, PROPERTY};
use terrane_core::{CancelToken, NodeId};
use terrane_plugin::{run_algorithm, Parameters};
use terrane_plugins::MovingAverage;
use terrane_search::NeighborhoodParams;

/// Benchmark: find_neighbors() on all 10K nodes of a 100x100 lattice.
fn bench_neighbors_lattice_10k(c: &mut Criterion) {
    let project = lattice_project(100, 7);
    let grid = project.grid(GRID).unwrap();
    let params = NeighborhoodParams::new([3.0, 2.0, 1.0]).with_angles([30.0, 0.0, 0.0]);
    let mut hood = grid.neighborhood(params).unwrap();
    hood.select_property(PROPERTY).unwrap();

    c.bench_function("neighbors_lattice_10k", |b| {
        b.iter(|| {
            for i in 0..10_000u32 {
                hood.find_neighbors(NodeId(i)).unwrap();
                black_box(hood.size());
            }
        });
    });
}

/// Benchmark: find_neighbors() on 1K nodes of a 10K-point scattered set.
///
/// Includes building the spatial index once per iteration.
fn bench_neighbors_point_set_10k(c: &mut Criterion) {
    let project = scattered_project(10_000, 100.0, 11);
    let grid = project.grid(GRID).unwrap();

    c.bench_function("neighbors_point_set_10k", |b| {
        b.iter(|| {
            let params = NeighborhoodParams::new([5.0, 5.0, 2.0]).with_max_size(32);
            let mut hood = grid.neighborhood(params).unwrap();
            hood.select_property(PROPERTY).unwrap();
            for i in (0..10_000u32).step_by(10) {
                hood.find_neighbors(NodeId(i)).unwrap();
                black_box(hood.size());
            }
        });
    });
}

/// Benchmark: moving average over a 50x50 lattice, output re-created each run.
fn bench_moving_average_2500(c: &mut Criterion) {
    let mut project = lattice_project(50, 3);
    let params = Parameters::new()
        .with("grid", GRID)
        .with("property", PROPERTY)
        .with("output", "smooth")
        .with("ranges", "2 2 1");
    let cancel = CancelToken::new();

    c.bench_function("moving_average_2500", |b| {
        b.iter(|| {
            let mut algo = MovingAverage::default();
            let status = run_algorithm(&mut algo, &params, &mut project, &cancel).unwrap();
            black_box(status);
            project
                .grid_mut(GRID)
                .unwrap()
                .remove_property("smooth")
                .unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_neighbors_lattice_10k,
    bench_neighbors_point_set_10k,
    bench_moving_average_2500
);
criterion_main!(benches);
