//! Terrane: the core of a geostatistical modeling workbench.
//!
//! This facade re-exports the public API of every Terrane sub-crate.
//!
//! # Quick start
//!
//! ```rust
//! use terrane::prelude::*;
//!
//! let mut project = Project::new(ProjectConfig::default()).unwrap();
//! let grid = project
//!     .add_grid("field", CartesianGrid::with_unit_cells([5, 5, 1]).unwrap())
//!     .unwrap();
//! let depth = grid.add_property("depth").unwrap();
//! depth.replace_values((0..25).map(|i| i as f32).collect()).unwrap();
//!
//! let mut algo = MovingAverage::default();
//! let params = Parameters::new()
//!     .with("grid", "field")
//!     .with("property", "depth")
//!     .with("output", "smooth")
//!     .with("ranges", "1 1 1");
//! let status = run_algorithm(&mut algo, &params, &mut project, &CancelToken::new()).unwrap();
//! assert_eq!(status, RunStatus::Completed { visited: 25 });
//!
//! let smooth = project.grid("field").unwrap().property("smooth").unwrap();
//! assert_eq!(smooth.value(NodeId(12)).unwrap(), 12.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `terrane-core` | Ids, property kinds, no-data marker, cancellation |
//! | [`space`] | `terrane-space` | Geometries and regions |
//! | [`store`] | `terrane-store` | Property store, tier transitions, swap worker |
//! | [`search`] | `terrane-search` | Anisotropic neighborhood search |
//! | [`model`] | `terrane-model` | Grids, projects, property copier |
//! | [`plugin`] | `terrane-plugin` | Registry, algorithm and action traits |
//! | [`plugins`] | `terrane-plugins` | Built-in algorithms and actions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Ids, property kinds, and cancellation (`terrane-core`).
pub use terrane_core as types;

/// Grid geometries and region masks (`terrane-space`).
///
/// Provides the [`space::Geometry`] trait with [`space::CartesianGrid`]
/// and [`space::PointSet`].
pub use terrane_space as space;

/// Property storage and memory tiering (`terrane-store`).
pub use terrane_store as store;

/// Anisotropic neighborhood search (`terrane-search`).
pub use terrane_search as search;

/// Grids, projects, and property copying (`terrane-model`).
pub use terrane_model as model;

/// Capability registry and plugin traits (`terrane-plugin`).
pub use terrane_plugin as plugin;

/// Built-in algorithms and actions (`terrane-plugins`).
pub use terrane_plugins as plugins;

/// Common imports for typical Terrane usage.
pub mod prelude {
    // Core
    pub use terrane_core::{CancelToken, NodeId, PropertyKind, NO_DATA_VALUE};

    // Space
    pub use terrane_space::{CartesianGrid, Geometry, PointSet, Region};

    // Store
    pub use terrane_store::{PropertyStore, Residency, StoreConfig, SwapReport};

    // Search
    pub use terrane_search::{BoundaryRule, Neighborhood, NeighborhoodParams};

    // Model
    pub use terrane_model::{CopyPolicy, Grid, ModelError, Project, ProjectConfig, PropertyCopier};

    // Plugins
    pub use terrane_plugin::{
        run_action, run_algorithm, Action, Algorithm, ErrorReport, Parameters, RunStatus,
    };
    pub use terrane_plugins::{builtin_registries, MovingAverage};
}
