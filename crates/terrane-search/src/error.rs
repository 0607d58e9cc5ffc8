//! Error types for neighborhood construction and queries.

use std::fmt;

use terrane_core::NodeId;
use terrane_store::StoreError;

/// Errors arising from neighborhood setup or search.
#[derive(Debug)]
pub enum SearchError {
    /// A search range is zero, negative, or not finite.
    InvalidRange {
        /// Axis index (0 = major, 1 = medium, 2 = minor).
        axis: usize,
        /// The offending range.
        value: f64,
    },
    /// A rotation angle is not finite.
    InvalidAngle {
        /// Angle index (0 = azimuth, 1 = dip, 2 = rake).
        axis: usize,
        /// The offending angle in degrees.
        value: f64,
    },
    /// `find_neighbors` was called before `select_property`.
    NoPropertySelected,
    /// The query node is outside the grid.
    NodeOutOfRange {
        /// The offending node.
        node: NodeId,
        /// Number of nodes in the grid.
        node_count: usize,
    },
    /// The grid and the property store disagree on node count.
    StoreMismatch {
        /// Nodes in the geometry.
        geometry: usize,
        /// Values per property in the store.
        store: usize,
    },
    /// Reading the selected property failed.
    Store(StoreError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { axis, value } => {
                write!(f, "range {axis} must be positive and finite, got {value}")
            }
            Self::InvalidAngle { axis, value } => {
                write!(f, "angle {axis} must be finite, got {value}")
            }
            Self::NoPropertySelected => write!(f, "no property selected for the search"),
            Self::NodeOutOfRange { node, node_count } => {
                write!(f, "node {node} out of range for {node_count} nodes")
            }
            Self::StoreMismatch { geometry, store } => {
                write!(f, "geometry has {geometry} nodes but store holds {store} values per property")
            }
            Self::Store(e) => write!(f, "property access failed: {e}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}
