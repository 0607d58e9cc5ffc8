//! Regular 3D lattice with constant spacing.

use crate::error::SpaceError;
use crate::geometry::{BoundingBox, Geometry, GeometryDescriptor, Point3};
use terrane_core::{GridInstanceId, NodeId};

/// A regular `nx * ny * nz` lattice.
///
/// Node `(i, j, k)` has id `i + nx * (j + ny * k)` (x fastest) and sits at
/// `origin + (i * sx, j * sy, k * sz)`. Each node owns the cell of size
/// `spacing` centered on it; [`cell_containing`](Self::cell_containing)
/// maps a world point back to that cell.
#[derive(Debug, Clone)]
pub struct CartesianGrid {
    dims: [u32; 3],
    spacing: [f64; 3],
    origin: Point3,
    instance_id: GridInstanceId,
}

impl CartesianGrid {
    /// Create a lattice with the given node counts, spacing, and origin.
    ///
    /// Returns `Err(SpaceError::EmptyGrid)` if any dimension is 0,
    /// `Err(SpaceError::InvalidSpacing)` for a non-positive or non-finite
    /// spacing, and `Err(SpaceError::TooManyNodes)` if the node count does
    /// not fit in a `u32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use terrane_space::{CartesianGrid, Geometry};
    /// use terrane_core::NodeId;
    ///
    /// let grid = CartesianGrid::new([5, 5, 1], [1.0, 1.0, 1.0], [0.0, 0.0, 0.0]).unwrap();
    /// assert_eq!(grid.node_count(), 25);
    /// assert_eq!(grid.coordinate_of(NodeId(12)), Some([2.0, 2.0, 0.0]));
    /// ```
    pub fn new(dims: [u32; 3], spacing: [f64; 3], origin: Point3) -> Result<Self, SpaceError> {
        if dims.contains(&0) {
            return Err(SpaceError::EmptyGrid);
        }
        let total = dims.iter().map(|&d| d as u64).product::<u64>();
        if total > u32::MAX as u64 {
            return Err(SpaceError::TooManyNodes { requested: total });
        }
        for (axis, &value) in spacing.iter().enumerate() {
            if !(value.is_finite() && value > 0.0) {
                return Err(SpaceError::InvalidSpacing { axis, value });
            }
        }
        if origin.iter().any(|v| !v.is_finite()) {
            return Err(SpaceError::NonFiniteCoordinate { index: 0 });
        }
        Ok(Self {
            dims,
            spacing,
            origin,
            instance_id: GridInstanceId::next(),
        })
    }

    /// Unit-spacing lattice anchored at the world origin.
    pub fn with_unit_cells(dims: [u32; 3]) -> Result<Self, SpaceError> {
        Self::new(dims, [1.0; 3], [0.0; 3])
    }

    /// Node counts along x, y, z.
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Spacing along x, y, z.
    pub fn spacing(&self) -> [f64; 3] {
        self.spacing
    }

    /// Coordinate of node `(0, 0, 0)`.
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Lattice indices of a node, or `None` if out of range.
    pub fn ijk_of(&self, node: NodeId) -> Option<[u32; 3]> {
        if node.index() >= self.node_count() {
            return None;
        }
        let [nx, ny, _] = self.dims;
        let n = node.0;
        Some([n % nx, (n / nx) % ny, n / (nx * ny)])
    }

    /// Node id at lattice indices, or `None` if out of range.
    pub fn node_at(&self, ijk: [u32; 3]) -> Option<NodeId> {
        let [nx, ny, nz] = self.dims;
        if ijk[0] >= nx || ijk[1] >= ny || ijk[2] >= nz {
            return None;
        }
        Some(NodeId(ijk[0] + nx * (ijk[1] + ny * ijk[2])))
    }

    /// Node whose cell contains `point`.
    ///
    /// Cell `i` spans `[origin + (i - 0.5) * s, origin + (i + 0.5) * s)` on
    /// each axis. Returns `None` for points outside every cell.
    pub fn cell_containing(&self, point: &Point3) -> Option<NodeId> {
        let mut ijk = [0u32; 3];
        for axis in 0..3 {
            let t = (point[axis] - self.origin[axis]) / self.spacing[axis] + 0.5;
            if !t.is_finite() || t < 0.0 {
                return None;
            }
            let idx = t.floor();
            if idx >= self.dims[axis] as f64 {
                return None;
            }
            ijk[axis] = idx as u32;
        }
        self.node_at(ijk)
    }

    /// World-space extent of all cells (node bounding box grown by half a cell).
    pub fn cell_bounds(&self) -> BoundingBox {
        let nodes = self.bounding_box();
        let mut min = nodes.min;
        let mut max = nodes.max;
        for axis in 0..3 {
            min[axis] -= 0.5 * self.spacing[axis];
            max[axis] += 0.5 * self.spacing[axis];
        }
        BoundingBox { min, max }
    }
}

impl Geometry for CartesianGrid {
    fn node_count(&self) -> usize {
        self.dims.iter().map(|&d| d as usize).product()
    }

    fn coordinate_of(&self, node: NodeId) -> Option<Point3> {
        let ijk = self.ijk_of(node)?;
        Some([
            self.origin[0] + ijk[0] as f64 * self.spacing[0],
            self.origin[1] + ijk[1] as f64 * self.spacing[1],
            self.origin[2] + ijk[2] as f64 * self.spacing[2],
        ])
    }

    fn descriptor(&self) -> GeometryDescriptor<'_> {
        GeometryDescriptor::Cartesian {
            dims: self.dims,
            spacing: self.spacing,
            origin: self.origin,
        }
    }

    fn locate(&self, point: &Point3) -> Option<NodeId> {
        self.cell_containing(point)
    }

    fn bounding_box(&self) -> BoundingBox {
        let mut max = self.origin;
        for axis in 0..3 {
            max[axis] += (self.dims[axis] - 1) as f64 * self.spacing[axis];
        }
        BoundingBox {
            min: self.origin,
            max,
        }
    }

    fn instance_id(&self) -> GridInstanceId {
        self.instance_id
    }

    fn topology_eq(&self, other: &dyn Geometry) -> bool {
        other.downcast_ref::<Self>().is_some_and(|o| {
            self.dims == o.dims && self.spacing == o.spacing && self.origin == o.origin
        })
    }
}
