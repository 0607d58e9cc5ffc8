//! Grid geometry for Terrane.
//!
//! This crate defines the [`Geometry`] trait, the capability every grid
//! kind exposes to search and copy code ("report a node's coordinate and
//! enumerate nodes"), together with its two concrete variants and the
//! [`Region`] node mask.
//!
//! # Variants
//!
//! - [`CartesianGrid`]: regular `nx * ny * nz` lattice with spacing and origin
//! - [`PointSet`]: unstructured cloud with explicit coordinates
//!
//! Callers that need kind-specific information match on the closed
//! [`GeometryDescriptor`] enum rather than downcasting.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cartesian;
pub mod error;
pub mod geometry;
pub mod point_set;
pub mod region;

#[cfg(test)]
pub(crate) mod compliance;

pub use cartesian::CartesianGrid;
pub use error::SpaceError;
pub use geometry::{BoundingBox, Geometry, GeometryDescriptor, GeometryKind, Nodes, Point3};
pub use point_set::PointSet;
pub use region::{Region, RegionIter};
