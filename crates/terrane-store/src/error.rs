//! Error types for property storage and tier transitions.

use std::fmt;
use std::io;

use terrane_core::PropertyId;

/// Errors arising from property storage, page I/O, or swap batches.
#[derive(Debug)]
pub enum StoreError {
    /// No property with this name exists in the store.
    UnknownProperty {
        /// The requested name.
        name: String,
    },
    /// A property with this name already exists.
    DuplicateProperty {
        /// The conflicting name.
        name: String,
    },
    /// The property is already persisted; nothing to swap out.
    NotResident {
        /// The property name.
        name: String,
    },
    /// The property is already resident; nothing to swap in.
    AlreadyResident {
        /// The property name.
        name: String,
    },
    /// Backing storage could not be read or written.
    Io(io::Error),
    /// A page file failed validation.
    CorruptPage {
        /// What was wrong with the page.
        detail: String,
    },
    /// A value array does not match the grid's node count.
    LengthMismatch {
        /// Expected number of values.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A node index is outside the property.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of values in the property.
        len: usize,
    },
    /// A property lock was poisoned by a panicking thread.
    LockPoisoned,
    /// A [`StoreConfig`](crate::StoreConfig) field is invalid.
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },
    /// The background swap worker has shut down.
    WorkerUnavailable,
    /// The property was removed from its store; its storage is gone.
    Deleted {
        /// Allocation id of the removed property.
        id: PropertyId,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProperty { name } => write!(f, "unknown property '{name}'"),
            Self::DuplicateProperty { name } => write!(f, "property '{name}' already exists"),
            Self::NotResident { name } => write!(f, "property '{name}' is not resident"),
            Self::AlreadyResident { name } => write!(f, "property '{name}' is already resident"),
            Self::Io(e) => write!(f, "page I/O error: {e}"),
            Self::CorruptPage { detail } => write!(f, "corrupt page: {detail}"),
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} values, got {actual}")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for {len} values")
            }
            Self::LockPoisoned => write!(f, "property lock poisoned"),
            Self::InvalidConfig { reason } => write!(f, "invalid store config: {reason}"),
            Self::WorkerUnavailable => write!(f, "swap worker has shut down"),
            Self::Deleted { id } => write!(f, "property {id} has been deleted"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
