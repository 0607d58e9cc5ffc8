//! Benchmark profiles for Terrane.
//!
//! - [`lattice_project`]: a project with one `n x n x 1` lattice and a
//!   random property
//! - [`scattered_project`]: a project with one random point set

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use terrane_model::{Project, ProjectConfig};
use terrane_space::{CartesianGrid, PointSet};
use terrane_test_utils::{random_points, random_values};

/// Grid name used by every profile.
pub const GRID: &str = "bench";

/// Property name used by every profile.
pub const PROPERTY: &str = "values";

/// Project with an `n x n x 1` unit lattice and a seeded property with
/// 10% no-data.
pub fn lattice_project(n: u32, seed: u64) -> Project {
    let mut project = Project::new(ProjectConfig::default()).unwrap();
    let grid = project
        .add_grid(GRID, CartesianGrid::with_unit_cells([n, n, 1]).unwrap())
        .unwrap();
    let values = random_values(grid.node_count(), seed, 0.1);
    grid.add_property(PROPERTY).unwrap().replace_values(values).unwrap();
    project
}

/// Project with `count` random points in a `extent x extent x extent / 10`
/// box and a seeded property with 10% no-data.
pub fn scattered_project(count: usize, extent: f64, seed: u64) -> Project {
    let mut project = Project::new(ProjectConfig::default()).unwrap();
    let points = PointSet::new(random_points(count, seed, [extent, extent, extent / 10.0])).unwrap();
    let grid = project.add_grid(GRID, points).unwrap();
    let values = random_values(count, seed ^ 0xfeed, 0.1);
    grid.add_property(PROPERTY).unwrap().replace_values(values).unwrap();
    project
}
