//! The core `Geometry` trait and `dyn Geometry` downcast support.

use std::any::Any;
use std::iter::FusedIterator;

use terrane_core::{GridInstanceId, NodeId};

/// A location in world coordinates `[x, y, z]`.
pub type Point3 = [f64; 3];

/// Central geometric abstraction for Terrane grids.
///
/// Neighborhood search, property copying, and algorithms all reach grid
/// geometry through this trait. The two concrete kinds
/// ([`CartesianGrid`](crate::CartesianGrid) and [`PointSet`](crate::PointSet))
/// describe themselves through the closed [`GeometryDescriptor`] enum, so
/// code that needs kind-specific data matches on it instead of
/// depending on concrete types.
///
/// # Thread Safety
///
/// `Sync` is required because grids are read concurrently by searches
/// running on different threads.
pub trait Geometry: Any + Send + Sync + 'static {
    /// Total number of nodes.
    fn node_count(&self) -> usize;

    /// World coordinate of a node, or `None` if the node is out of range.
    fn coordinate_of(&self, node: NodeId) -> Option<Point3>;

    /// Kind-specific description of this geometry.
    fn descriptor(&self) -> GeometryDescriptor<'_>;

    /// Node associated with a world point, if any.
    ///
    /// Lattices return the node whose cell contains the point; point sets
    /// return the first node sitting exactly at it.
    fn locate(&self, point: &Point3) -> Option<NodeId>;

    /// Axis-aligned bounding box of all node coordinates.
    fn bounding_box(&self) -> BoundingBox;

    /// Unique instance identifier for this geometry object.
    fn instance_id(&self) -> GridInstanceId;

    /// Returns `true` if `self` and `other` describe the same nodes at the
    /// same coordinates in the same order.
    ///
    /// Implementors downcast `other` to `Self` and compare every
    /// behavior-relevant field. Returns `false` for different kinds.
    fn topology_eq(&self, other: &dyn Geometry) -> bool;

    /// All nodes in ascending id order.
    ///
    /// The sequence is lazy, finite, and identical on every call for an
    /// unmodified geometry; calling `nodes()` again restarts it.
    fn nodes(&self) -> Nodes {
        Nodes::new(self.node_count())
    }

    /// The kind of this geometry.
    fn kind(&self) -> GeometryKind {
        match self.descriptor() {
            GeometryDescriptor::Cartesian { .. } => GeometryKind::Cartesian,
            GeometryDescriptor::PointSet { .. } => GeometryKind::PointSet,
        }
    }
}

impl dyn Geometry {
    /// Attempt to downcast a trait object to a concrete geometry type.
    pub fn downcast_ref<T: Geometry>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

/// Kind tag of a geometry, without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    /// Regular lattice.
    Cartesian,
    /// Unstructured point cloud.
    PointSet,
}

/// Borrowed, kind-specific view of a geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeometryDescriptor<'a> {
    /// Regular lattice. Node `(i, j, k)` sits at `origin + (i, j, k) * spacing`.
    Cartesian {
        /// Node counts along x, y, z.
        dims: [u32; 3],
        /// Distance between adjacent node centers along x, y, z.
        spacing: [f64; 3],
        /// Coordinate of node `(0, 0, 0)`.
        origin: Point3,
    },
    /// Unstructured points, indexed by node id.
    PointSet {
        /// Coordinates; `points[n]` belongs to `NodeId(n)`.
        points: &'a [Point3],
    },
}

/// Axis-aligned box in world coordinates (inclusive bounds).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl BoundingBox {
    /// Smallest box containing every point, or `None` for no points.
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self {
            min: first,
            max: first,
        };
        for p in iter {
            for axis in 0..3 {
                bbox.min[axis] = bbox.min[axis].min(p[axis]);
                bbox.max[axis] = bbox.max[axis].max(p[axis]);
            }
        }
        Some(bbox)
    }

    /// Whether `p` lies inside the box (bounds inclusive).
    pub fn contains(&self, p: &Point3) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    /// Edge lengths along x, y, z.
    pub fn extent(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// Iterator over the nodes of a geometry, in ascending id order.
#[derive(Clone, Debug)]
pub struct Nodes {
    next: u32,
    end: u32,
}

impl Nodes {
    /// Iterate `NodeId(0)..NodeId(count)`.
    pub fn new(count: usize) -> Self {
        Self {
            next: 0,
            end: count as u32,
        }
    }
}

impl Iterator for Nodes {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.next >= self.end {
            return None;
        }
        let id = NodeId(self.next);
        self.next += 1;
        Some(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Nodes {}
impl FusedIterator for Nodes {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_of_points() {
        let pts = [[1.0, 5.0, -1.0], [3.0, 2.0, 0.0], [2.0, 4.0, 4.0]];
        let bbox = BoundingBox::of_points(&pts).unwrap();
        assert_eq!(bbox.min, [1.0, 2.0, -1.0]);
        assert_eq!(bbox.max, [3.0, 5.0, 4.0]);
        assert_eq!(bbox.extent(), [2.0, 3.0, 5.0]);
        assert!(bbox.contains(&[3.0, 5.0, 4.0]));
        assert!(!bbox.contains(&[3.1, 5.0, 4.0]));
    }

    #[test]
    fn bounding_box_of_nothing_is_none() {
        let pts: [Point3; 0] = [];
        assert!(BoundingBox::of_points(&pts).is_none());
    }

    #[test]
    fn nodes_iterator_is_exact_and_restartable() {
        let nodes = Nodes::new(3);
        assert_eq!(nodes.len(), 3);
        let first: Vec<_> = nodes.clone().collect();
        let second: Vec<_> = nodes.collect();
        assert_eq!(first, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(first, second);
    }
}
