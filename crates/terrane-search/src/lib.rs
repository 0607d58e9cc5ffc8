//! Anisotropic neighborhood search for Terrane grids.
//!
//! A [`Neighborhood`] finds, for a query node, the informed nodes of a
//! selected property inside a rotated, scaled search ellipsoid, ordered
//! by normalized ellipsoidal distance. Candidate generation is delegated
//! to a [`SpatialIndex`] chosen from the grid's geometry kind; results
//! never depend on which index was chosen.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod ellipsoid;
pub mod error;
pub mod index;
pub mod neighborhood;
pub mod params;

pub use ellipsoid::Ellipsoid;
pub use error::SearchError;
pub use index::SpatialIndex;
pub use neighborhood::{Neighbor, Neighborhood};
pub use params::{BoundaryRule, NeighborhoodParams};
