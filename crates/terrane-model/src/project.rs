//! The project: every grid of a modeling session.

use std::sync::Arc;

use indexmap::IndexMap;
use terrane_core::CancelToken;
use terrane_space::Geometry;
use terrane_store::SpillDir;
use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::copier::{CopyPolicy, CopyReport, PropertyCopier};
use crate::error::ModelError;
use crate::grid::Grid;

/// Named grids sharing one spill directory and store configuration.
///
/// Dropping the project drops every grid, which releases resident
/// arrays and removes page files.
///
/// The project owns the cancel token its algorithm runs observe, so a
/// clone handed to another thread can stop whichever run is in flight.
pub struct Project {
    grids: IndexMap<String, Grid>,
    spill: Arc<SpillDir>,
    config: ProjectConfig,
    cancel: CancelToken,
}

impl Project {
    /// Create an empty project.
    pub fn new(config: ProjectConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let spill = match &config.spill_dir {
            Some(path) => SpillDir::at(path)?,
            None => SpillDir::temporary()?,
        };
        debug!(spill_dir = %spill.path().display(), "created project");
        Ok(Self {
            grids: IndexMap::new(),
            spill: Arc::new(spill),
            config,
            cancel: CancelToken::new(),
        })
    }

    /// The configuration the project was created with.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Token observed by algorithm runs launched against this project.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// The directory holding every grid's page files.
    pub fn spill_dir(&self) -> &Arc<SpillDir> {
        &self.spill
    }

    /// Number of grids.
    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Whether the project has no grids.
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Whether a grid with this name exists.
    pub fn contains_grid(&self, name: &str) -> bool {
        self.grids.contains_key(name)
    }

    /// Grid names in creation order.
    pub fn grid_names(&self) -> impl Iterator<Item = &str> {
        self.grids.keys().map(String::as_str)
    }

    /// Add a grid over `geometry`. Fails if the name is taken.
    pub fn add_grid(
        &mut self,
        name: &str,
        geometry: impl Geometry,
    ) -> Result<&mut Grid, ModelError> {
        if self.grids.contains_key(name) {
            return Err(ModelError::DuplicateGrid { name: name.into() });
        }
        let grid = Grid::new(
            name,
            Box::new(geometry),
            Arc::clone(&self.spill),
            self.config.store.clone(),
        )?;
        info!(grid = %name, kind = ?grid.kind(), nodes = grid.node_count(), "added grid");
        let (idx, _) = self.grids.insert_full(name.to_owned(), grid);
        Ok(&mut self.grids[idx])
    }

    /// Look up a grid.
    pub fn grid(&self, name: &str) -> Result<&Grid, ModelError> {
        self.grids
            .get(name)
            .ok_or_else(|| ModelError::UnknownGrid { name: name.into() })
    }

    /// Look up a grid for modification.
    pub fn grid_mut(&mut self, name: &str) -> Result<&mut Grid, ModelError> {
        self.grids
            .get_mut(name)
            .ok_or_else(|| ModelError::UnknownGrid { name: name.into() })
    }

    /// Remove a grid, returning it.
    pub fn remove_grid(&mut self, name: &str) -> Result<Grid, ModelError> {
        let grid = self
            .grids
            .shift_remove(name)
            .ok_or_else(|| ModelError::UnknownGrid { name: name.into() })?;
        info!(grid = %name, "removed grid");
        Ok(grid)
    }

    /// Iterate over `(name, grid)` pairs in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Grid)> {
        self.grids.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy a property between two grids of this project (or within one).
    ///
    /// See [`PropertyCopier::copy`] for the mapping rules.
    pub fn copy_property(
        &mut self,
        source_grid: &str,
        source_property: &str,
        dest_grid: &str,
        dest_property: &str,
    ) -> Result<CopyReport, ModelError> {
        if source_grid == dest_grid {
            let grid = self.grid_mut(source_grid)?;
            return PropertyCopier::copy_within(grid, source_property, dest_property);
        }
        let (policy, src) = {
            let source = self.grid(source_grid)?;
            let dest = self.grid(dest_grid)?;
            let policy = CopyPolicy::between(source.geometry(), dest.geometry())?;
            (policy, source.property(source_property)?)
        };
        let dst =
            PropertyCopier::destination(self.grid_mut(dest_grid)?, dest_property, src.kind())?;
        let source = self.grid(source_grid)?;
        let dest = self.grid(dest_grid)?;
        PropertyCopier::transfer(policy, source.geometry(), &src, dest.geometry(), &dst)
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("grids", &self.grids.keys().collect::<Vec<_>>())
            .field("spill_dir", &self.spill.path())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_space::CartesianGrid;

    #[test]
    fn grid_names_are_unique() {
        let mut project = Project::new(ProjectConfig::default()).unwrap();
        project
            .add_grid("g", CartesianGrid::with_unit_cells([2, 2, 1]).unwrap())
            .unwrap();
        let err = project
            .add_grid("g", CartesianGrid::with_unit_cells([2, 2, 1]).unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateGrid { .. }));
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn cancel_token_clones_share_state() {
        let project = Project::new(ProjectConfig::default()).unwrap();
        let remote = project.cancel_token().clone();
        assert!(!project.cancel_token().is_cancelled());
        remote.cancel();
        assert!(project.cancel_token().is_cancelled());
        project.cancel_token().reset();
        assert!(!remote.is_cancelled());
    }

    #[test]
    fn removing_a_grid_forgets_it() {
        let mut project = Project::new(ProjectConfig::default()).unwrap();
        project
            .add_grid("a", CartesianGrid::with_unit_cells([2, 1, 1]).unwrap())
            .unwrap();
        project
            .add_grid("b", CartesianGrid::with_unit_cells([2, 1, 1]).unwrap())
            .unwrap();
        project.remove_grid("a").unwrap();
        assert_eq!(project.grid_names().collect::<Vec<_>>(), vec!["b"]);
        assert!(matches!(project.grid("a"), Err(ModelError::UnknownGrid { .. })));
        assert!(project.remove_grid("a").is_err());
    }

    #[test]
    fn explicit_spill_dir_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig {
            spill_dir: Some(dir.path().join("pages")),
            ..ProjectConfig::default()
        };
        let project = Project::new(config).unwrap();
        assert!(project.spill_dir().path().starts_with(dir.path()));
        assert!(dir.path().join("pages").is_dir());
    }
}
