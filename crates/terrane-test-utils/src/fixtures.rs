//! Reusable grid and property fixtures.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use terrane_core::{PropertyKind, NO_DATA_VALUE};
use terrane_space::Point3;
use terrane_store::{PropertyStore, SpillDir, StoreConfig};

/// Empty store for `node_count` nodes, spilling into a fresh temp dir.
pub fn scratch_store(node_count: usize) -> PropertyStore {
    let spill = Arc::new(SpillDir::temporary().expect("create spill dir"));
    PropertyStore::new(node_count, spill, StoreConfig::default()).expect("default config is valid")
}

/// Store pre-populated with numeric properties.
pub fn store_with(node_count: usize, properties: &[(&str, Vec<f32>)]) -> PropertyStore {
    let mut store = scratch_store(node_count);
    for (name, values) in properties {
        store
            .add(name, PropertyKind::Numeric)
            .expect("fixture names are unique")
            .replace_values(values.clone())
            .expect("fixture values match node count");
    }
    store
}

/// `0.0, 1.0, ..., (n - 1) as f32`.
pub fn ramp(n: usize) -> Vec<f32> {
    (0..n).map(|i| i as f32).collect()
}

/// `n` points uniformly drawn from `[0, extent)` on each axis.
///
/// Deterministic for a given seed.
pub fn random_points(n: usize, seed: u64, extent: [f64; 3]) -> Vec<Point3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let mut p = [0.0; 3];
            for axis in 0..3 {
                p[axis] = if extent[axis] > 0.0 {
                    rng.random_range(0.0..extent[axis])
                } else {
                    0.0
                };
            }
            p
        })
        .collect()
}

/// `n` values in `[-100, 100)`, each replaced by no-data with
/// probability `no_data_fraction`.
pub fn random_values(n: usize, seed: u64, no_data_fraction: f64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            if rng.random_bool(no_data_fraction) {
                NO_DATA_VALUE
            } else {
                rng.random_range(-100.0f32..100.0)
            }
        })
        .collect()
}
