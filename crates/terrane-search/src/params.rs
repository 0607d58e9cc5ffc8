//! Neighborhood configuration.

use crate::error::SearchError;

/// Whether points exactly on the ellipsoid surface belong to a
/// neighborhood.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryRule {
    /// Normalized squared distance `<= 1 + 1e-9`.
    #[default]
    Inclusive,
    /// Normalized squared distance `< 1 - 1e-9`.
    Exclusive,
}

impl BoundaryRule {
    /// Tolerance applied around the unit surface.
    pub const TOLERANCE: f64 = 1e-9;

    /// Whether a normalized squared distance falls inside the ellipsoid.
    #[inline]
    pub fn admits(self, normalized_sq: f64) -> bool {
        match self {
            Self::Inclusive => normalized_sq <= 1.0 + Self::TOLERANCE,
            Self::Exclusive => normalized_sq < 1.0 - Self::TOLERANCE,
        }
    }
}

/// Shape and limits of a neighborhood search.
///
/// `ranges` are the semi-axes of the search ellipsoid along its major,
/// medium, and minor directions. `angles` rotate those directions into
/// world space, in degrees: azimuth about z, then dip about y, then rake
/// about x.
///
/// # Examples
///
/// ```
/// use terrane_search::{BoundaryRule, NeighborhoodParams};
///
/// let params = NeighborhoodParams::new([20.0, 10.0, 2.0])
///     .with_angles([45.0, 0.0, 0.0])
///     .with_max_size(12)
///     .with_boundary(BoundaryRule::Exclusive);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NeighborhoodParams {
    /// Semi-axis lengths (major, medium, minor).
    pub ranges: [f64; 3],
    /// Rotation angles in degrees (azimuth, dip, rake).
    pub angles: [f64; 3],
    /// Maximum number of neighbors kept, closest first.
    pub max_size: usize,
    /// Whether the query node may be its own neighbor.
    pub includes_center: bool,
    /// Treatment of nodes on the ellipsoid surface.
    pub boundary: BoundaryRule,
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            ranges: [1.0; 3],
            angles: [0.0; 3],
            max_size: usize::MAX,
            includes_center: false,
            boundary: BoundaryRule::Inclusive,
        }
    }
}

impl NeighborhoodParams {
    /// Axis-aligned, unbounded search with the given ranges.
    pub fn new(ranges: [f64; 3]) -> Self {
        Self {
            ranges,
            ..Self::default()
        }
    }

    /// Set the rotation angles in degrees.
    pub fn with_angles(mut self, angles: [f64; 3]) -> Self {
        self.angles = angles;
        self
    }

    /// Set the maximum number of neighbors.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Include or exclude the query node.
    pub fn with_center(mut self, includes_center: bool) -> Self {
        self.includes_center = includes_center;
        self
    }

    /// Set the surface rule.
    pub fn with_boundary(mut self, boundary: BoundaryRule) -> Self {
        self.boundary = boundary;
        self
    }

    /// Reject non-positive or non-finite ranges and non-finite angles.
    pub fn validate(&self) -> Result<(), SearchError> {
        for (axis, &value) in self.ranges.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(SearchError::InvalidRange { axis, value });
            }
        }
        for (axis, &value) in self.angles.iter().enumerate() {
            if !value.is_finite() {
                return Err(SearchError::InvalidAngle { axis, value });
            }
        }
        Ok(())
    }
}
