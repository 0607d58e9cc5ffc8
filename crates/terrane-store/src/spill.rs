//! Directory holding page files for persisted properties.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use terrane_core::PropertyId;
use tracing::debug;

use crate::error::StoreError;

/// Where persisted properties are written.
///
/// Shared between a store and its properties as `Arc<SpillDir>`, so the
/// directory outlives every page written into it. A temporary spill
/// directory is deleted with its contents once the last handle drops.
#[derive(Debug)]
pub struct SpillDir {
    root: PathBuf,
    _temp: Option<TempDir>,
}

impl SpillDir {
    /// A fresh, self-cleaning directory under the system temp location.
    pub fn temporary() -> Result<Self, StoreError> {
        let temp = tempfile::Builder::new()
            .prefix("terrane-spill-")
            .tempdir()?;
        debug!(path = %temp.path().display(), "created temporary spill directory");
        Ok(Self {
            root: temp.path().to_path_buf(),
            _temp: Some(temp),
        })
    }

    /// Use (and create if needed) a caller-chosen directory.
    ///
    /// The directory itself is left in place on drop; page files inside
    /// it are still removed as their properties go away.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = path.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, _temp: None })
    }

    /// The directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Page file location for a property. Stable across renames.
    pub fn page_path(&self, id: PropertyId) -> PathBuf {
        self.root.join(format!("property-{:016x}.page", id.get()))
    }
}
