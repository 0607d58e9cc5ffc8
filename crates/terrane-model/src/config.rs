//! Project configuration.

use std::path::PathBuf;

use terrane_store::StoreConfig;

use crate::error::ModelError;

/// Configuration shared by every grid of a [`Project`](crate::Project).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Store settings applied to each grid's property store.
    pub store: StoreConfig,
    /// Directory for page files. `None` (the default) uses a
    /// self-cleaning temporary directory.
    pub spill_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ModelError> {
        self.store.validate()?;
        Ok(())
    }
}
