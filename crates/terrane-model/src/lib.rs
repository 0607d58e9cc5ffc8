//! Grids, projects, and property copying for Terrane.
//!
//! A [`Project`] owns named [`Grid`]s. Each grid pairs a geometry with a
//! property store, a set of named regions, and the per-grid selection
//! state (current property, active region). The [`PropertyCopier`]
//! transfers values between grids whose geometries differ.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod copier;
pub mod error;
pub mod grid;
pub mod project;

pub use config::ProjectConfig;
pub use copier::{CopyPolicy, CopyReport, PropertyCopier};
pub use error::ModelError;
pub use grid::{ActiveNodes, Grid};
pub use project::Project;
