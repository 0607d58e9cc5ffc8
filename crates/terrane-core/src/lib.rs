//! Core types for the Terrane geostatistical modeling workbench.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers, property value conventions, and cancellation
//! primitive shared by the grid, store, search, and plugin crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancel;
pub mod id;
pub mod property;

pub use cancel::CancelToken;
pub use id::{GridInstanceId, NodeId, PropertyId};
pub use property::{is_informed, CategoryMap, PropertyKind, NO_DATA_VALUE};
