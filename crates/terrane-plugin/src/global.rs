//! Process-wide registries.
//!
//! Registries are installed once, before any lookup, and are read-only
//! afterwards. Lookups from any thread see the same sealed instances.

use std::sync::OnceLock;

use tracing::info;

use crate::capability::{Action, Algorithm};
use crate::error::RegistryError;
use crate::registry::Registry;

/// The sealed algorithm and action registries.
#[derive(Debug)]
pub struct Registries {
    /// Algorithm factories.
    pub algorithms: Registry<dyn Algorithm>,
    /// Action factories.
    pub actions: Registry<dyn Action>,
}

static INSTALLED: OnceLock<Registries> = OnceLock::new();

/// Install the process-wide registries. Fails if already installed.
pub fn install(registries: Registries) -> Result<(), RegistryError> {
    let algorithms = registries.algorithms.len();
    let actions = registries.actions.len();
    INSTALLED
        .set(registries)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    info!(algorithms, actions, "installed registries");
    Ok(())
}

/// Whether [`install`] has succeeded.
pub fn is_installed() -> bool {
    INSTALLED.get().is_some()
}

/// The installed algorithm registry.
pub fn algorithms() -> Result<&'static Registry<dyn Algorithm>, RegistryError> {
    INSTALLED
        .get()
        .map(|r| &r.algorithms)
        .ok_or(RegistryError::NotInstalled)
}

/// The installed action registry.
pub fn actions() -> Result<&'static Registry<dyn Action>, RegistryError> {
    INSTALLED
        .get()
        .map(|r| &r.actions)
        .ok_or(RegistryError::NotInstalled)
}
