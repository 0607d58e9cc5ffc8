//! Error types for grids, projects, and property copying.

use std::fmt;

use terrane_search::SearchError;
use terrane_space::{GeometryKind, SpaceError};
use terrane_store::StoreError;

/// Errors arising from grid or project operations.
#[derive(Debug)]
pub enum ModelError {
    /// No grid with this name exists in the project.
    UnknownGrid {
        /// The requested name.
        name: String,
    },
    /// A grid with this name already exists.
    DuplicateGrid {
        /// The conflicting name.
        name: String,
    },
    /// No region with this name exists on the grid.
    UnknownRegion {
        /// The requested name.
        name: String,
    },
    /// A region with this name already exists on the grid.
    DuplicateRegion {
        /// The conflicting name.
        name: String,
    },
    /// No copy policy maps between these two geometries.
    IncompatibleGeometry {
        /// Kind of the source grid.
        source: GeometryKind,
        /// Kind of the destination grid.
        dest: GeometryKind,
    },
    /// Property storage failed.
    Store(StoreError),
    /// Geometry or region construction failed.
    Space(SpaceError),
    /// Neighborhood setup or search failed.
    Search(SearchError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownGrid { name } => write!(f, "unknown grid '{name}'"),
            Self::DuplicateGrid { name } => write!(f, "grid '{name}' already exists"),
            Self::UnknownRegion { name } => write!(f, "unknown region '{name}'"),
            Self::DuplicateRegion { name } => write!(f, "region '{name}' already exists"),
            Self::IncompatibleGeometry { source, dest } => {
                write!(f, "cannot copy properties from a {source:?} grid to a different {dest:?} grid")
            }
            Self::Store(e) => write!(f, "{e}"),
            Self::Space(e) => write!(f, "{e}"),
            Self::Search(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Search(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<SpaceError> for ModelError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<SearchError> for ModelError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}
