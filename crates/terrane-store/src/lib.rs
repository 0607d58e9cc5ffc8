//! Property storage and memory tier management for Terrane grids.
//!
//! A [`PropertyStore`] owns the named properties of one grid. Each
//! [`Property`] holds one `f32` per node and lives in exactly one tier:
//! resident in memory, or persisted to a page file in a [`SpillDir`].
//!
//! Transitions between tiers are explicit ([`PropertyStore::swap_to_disk`],
//! [`PropertyStore::swap_to_ram`]), driven by a [`MemoryBudget`]
//! ([`StoreConfig::memory_budget_bytes`]), or implicit: any value access
//! on a persisted property faults it back in. A [`SwapWorker`] can run
//! batches on a background thread. Removing a property releases its
//! storage immediately.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod budget;
pub mod config;
pub mod error;
pub mod page;
pub mod property;
pub mod spill;
pub mod stats;
pub mod store;
pub mod swap;
pub mod worker;

pub use budget::MemoryBudget;
pub use config::{StoreConfig, SwapPolicy};
pub use error::StoreError;
pub use property::{Property, Residency};
pub use spill::SpillDir;
pub use stats::PropertyStats;
pub use store::PropertyStore;
pub use swap::{SwapDirection, SwapItem, SwapReport};
pub use worker::{SwapTicket, SwapWorker};
