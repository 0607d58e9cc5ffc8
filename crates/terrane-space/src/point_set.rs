//! Unstructured point cloud geometry.

use crate::error::SpaceError;
use crate::geometry::{BoundingBox, Geometry, GeometryDescriptor, Point3};
use terrane_core::{GridInstanceId, NodeId};

/// A set of points with explicit coordinates.
///
/// `NodeId(n)` is the `n`-th point passed to [`PointSet::new`]. Points
/// may coincide; each still gets its own node.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<Point3>,
    bbox: BoundingBox,
    instance_id: GridInstanceId,
}

impl PointSet {
    /// Create a point set.
    ///
    /// Returns `Err(SpaceError::EmptyGrid)` for an empty list and
    /// `Err(SpaceError::NonFiniteCoordinate)` if any coordinate is NaN or
    /// infinite.
    pub fn new(points: Vec<Point3>) -> Result<Self, SpaceError> {
        if points.len() as u64 > u32::MAX as u64 {
            return Err(SpaceError::TooManyNodes {
                requested: points.len() as u64,
            });
        }
        if let Some(index) = points
            .iter()
            .position(|p| p.iter().any(|v| !v.is_finite()))
        {
            return Err(SpaceError::NonFiniteCoordinate { index });
        }
        let bbox = BoundingBox::of_points(&points).ok_or(SpaceError::EmptyGrid)?;
        Ok(Self {
            points,
            bbox,
            instance_id: GridInstanceId::next(),
        })
    }

    /// All point coordinates, indexed by node id.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }
}

impl Geometry for PointSet {
    fn node_count(&self) -> usize {
        self.points.len()
    }

    fn coordinate_of(&self, node: NodeId) -> Option<Point3> {
        self.points.get(node.index()).copied()
    }

    fn descriptor(&self) -> GeometryDescriptor<'_> {
        GeometryDescriptor::PointSet {
            points: &self.points,
        }
    }

    fn locate(&self, point: &Point3) -> Option<NodeId> {
        self.points
            .iter()
            .position(|p| p == point)
            .map(|n| NodeId(n as u32))
    }

    fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    fn instance_id(&self) -> GridInstanceId {
        self.instance_id
    }

    fn topology_eq(&self, other: &dyn Geometry) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.points == o.points)
    }
}
