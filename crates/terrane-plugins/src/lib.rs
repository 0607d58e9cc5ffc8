//! Built-in algorithms and object-management actions for Terrane.
//!
//! [`builtin_registries`] bundles every capability in this crate for
//! installation as the process-wide registry.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actions;
pub mod builtin;
pub mod moving_average;

pub use builtin::{action_registry, algorithm_registry, builtin_registries};
pub use moving_average::MovingAverage;
