//! Error types for the registry and capability execution.

use std::fmt;

use terrane_model::ModelError;

use crate::report::ErrorReport;

/// Errors from building or querying a registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// No factory is registered under this key.
    UnknownKey {
        /// The requested key.
        key: String,
    },
    /// A factory is already registered under this key and the registry
    /// rejects collisions.
    DuplicateKey {
        /// The conflicting key.
        key: String,
    },
    /// The process-wide registries were already installed.
    AlreadyInstalled,
    /// The process-wide registries have not been installed yet.
    NotInstalled,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey { key } => write!(f, "no entry registered under '{key}'"),
            Self::DuplicateKey { key } => write!(f, "an entry is already registered under '{key}'"),
            Self::AlreadyInstalled => write!(f, "registries are already installed"),
            Self::NotInstalled => write!(f, "registries have not been installed"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Errors from running an algorithm.
#[derive(Debug)]
pub enum AlgorithmError {
    /// `execute` was called without a successful `initialize`.
    NotInitialized {
        /// Algorithm name.
        name: String,
    },
    /// Parameters were rejected during initialization.
    InvalidParameters {
        /// Algorithm name.
        name: String,
        /// Every rejected field.
        report: ErrorReport,
    },
    /// Grid or property access failed mid-run.
    Model(ModelError),
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized { name } => write!(f, "algorithm '{name}' was not initialized"),
            Self::InvalidParameters { name, report } => {
                write!(f, "invalid parameters for '{name}':\n{report}")
            }
            Self::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for AlgorithmError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

/// Errors from running an action.
#[derive(Debug)]
pub enum ActionError {
    /// The action (or the algorithm it names) could not be resolved.
    Registry(RegistryError),
    /// Arguments were rejected during initialization.
    InvalidArguments {
        /// Action name.
        name: String,
        /// Every rejected argument.
        report: ErrorReport,
    },
    /// `exec` was called without a successful `init`.
    NotInitialized {
        /// Action name.
        name: String,
    },
    /// The underlying grid or project operation failed.
    Model(ModelError),
    /// An algorithm launched by the action failed.
    Algorithm(AlgorithmError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "{e}"),
            Self::InvalidArguments { name, report } => {
                write!(f, "invalid arguments for '{name}':\n{report}")
            }
            Self::NotInitialized { name } => write!(f, "action '{name}' was not initialized"),
            Self::Model(e) => write!(f, "{e}"),
            Self::Algorithm(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Model(e) => Some(e),
            Self::Algorithm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for ActionError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<ModelError> for ActionError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<AlgorithmError> for ActionError {
    fn from(e: AlgorithmError) -> Self {
        Self::Algorithm(e)
    }
}
