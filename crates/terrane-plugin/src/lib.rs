//! Capability registry and plugin traits for Terrane.
//!
//! Algorithms and actions are created by name from sealed
//! [`Registry`] instances. A [`Registries`] pair can be installed once
//! per process through [`global::install`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capability;
pub mod error;
pub mod global;
pub mod params;
pub mod registry;
pub mod report;

pub use capability::{run_action, run_algorithm, Action, ActionOutcome, Algorithm, RunStatus};
pub use error::{ActionError, AlgorithmError, RegistryError};
pub use global::Registries;
pub use params::{split_args, Parameters, ARG_SEPARATOR};
pub use registry::{CollisionPolicy, Factory, Registry, RegistryBuilder};
pub use report::ErrorReport;
