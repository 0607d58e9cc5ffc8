//! Error types for geometry construction and region algebra.

use std::fmt;

use terrane_core::NodeId;

/// Errors arising from grid construction or region operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Attempted to construct a grid with zero nodes.
    EmptyGrid,
    /// The total node count does not fit in a `NodeId`.
    TooManyNodes {
        /// The requested node count.
        requested: u64,
    },
    /// A cell spacing is zero, negative, or not finite.
    InvalidSpacing {
        /// Axis index (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The offending spacing.
        value: f64,
    },
    /// An origin or point coordinate is NaN or infinite.
    NonFiniteCoordinate {
        /// Index of the offending point (0 for a grid origin).
        index: usize,
    },
    /// Two regions (or a region and a grid) disagree on node count.
    LengthMismatch {
        /// Node count on the left-hand side.
        left: usize,
        /// Node count on the right-hand side.
        right: usize,
    },
    /// A node id is outside the grid.
    NodeOutOfRange {
        /// The offending node.
        node: NodeId,
        /// Number of nodes in the grid.
        node_count: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "grid must have at least one node"),
            Self::TooManyNodes { requested } => {
                write!(f, "{requested} nodes exceed the maximum of {}", u32::MAX)
            }
            Self::InvalidSpacing { axis, value } => {
                write!(f, "spacing along axis {axis} must be positive, got {value}")
            }
            Self::NonFiniteCoordinate { index } => {
                write!(f, "coordinate {index} is not finite")
            }
            Self::LengthMismatch { left, right } => {
                write!(f, "node count mismatch: {left} vs {right}")
            }
            Self::NodeOutOfRange { node, node_count } => {
                write!(f, "node {node} out of range for {node_count} nodes")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
