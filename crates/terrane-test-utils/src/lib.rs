//! Test fixtures and reference implementations for Terrane development.
//!
//! - [`fixtures`]: scratch property stores, seeded random point clouds
//!   and value arrays.
//! - [`reference`]: a brute-force neighbor scan that optimized searches
//!   are checked against.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod reference;

pub use fixtures::{random_points, random_values, ramp, scratch_store, store_with};
pub use reference::brute_force_neighbors;
