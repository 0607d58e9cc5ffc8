//! Candidate generation for neighborhood queries.
//!
//! An index only narrows the set of nodes worth testing against the
//! ellipsoid; it never decides membership. Every variant yields a
//! superset of the nodes inside the query box, so searches return the
//! same neighbors as a brute-force scan.

use smallvec::SmallVec;
use terrane_core::NodeId;
use terrane_space::{BoundingBox, Geometry, GeometryDescriptor, Point3};

/// Point sets at or below this size are scanned linearly.
pub const BRUTE_FORCE_LIMIT: usize = 64;

/// Target mean number of points per bucket.
const POINTS_PER_BUCKET: f64 = 4.0;

/// Spatial index over a grid's node coordinates.
#[derive(Debug)]
pub enum SpatialIndex {
    /// Regular lattice: candidates are an index window.
    Lattice {
        /// Node counts along x, y, z.
        dims: [u32; 3],
        /// Node spacing along x, y, z.
        spacing: [f64; 3],
        /// Coordinate of node `(0, 0, 0)`.
        origin: Point3,
    },
    /// Larger point sets: uniform bucket grid.
    Buckets(BucketGrid),
    /// Small point sets: every point is a candidate.
    Linear {
        /// Number of points.
        len: usize,
    },
}

impl SpatialIndex {
    /// Choose and build the index for a geometry.
    pub fn build(geometry: &dyn Geometry) -> Self {
        match geometry.descriptor() {
            GeometryDescriptor::Cartesian {
                dims,
                spacing,
                origin,
            } => Self::Lattice {
                dims,
                spacing,
                origin,
            },
            GeometryDescriptor::PointSet { points } if points.len() > BRUTE_FORCE_LIMIT => {
                Self::Buckets(BucketGrid::new(points, geometry.bounding_box()))
            }
            GeometryDescriptor::PointSet { points } => Self::Linear { len: points.len() },
        }
    }

    /// Call `visit` for every node that may lie within `half` of `center`
    /// on each axis. Nodes may be visited that lie outside the box.
    pub fn for_each_candidate(&self, center: &Point3, half: &[f64; 3], mut visit: impl FnMut(NodeId)) {
        match self {
            Self::Lattice {
                dims,
                spacing,
                origin,
            } => {
                let mut lo = [0u32; 3];
                let mut hi = [0u32; 3];
                for axis in 0..3 {
                    let min = (center[axis] - half[axis] - origin[axis]) / spacing[axis];
                    let max = (center[axis] + half[axis] - origin[axis]) / spacing[axis];
                    let last = dims[axis] as f64 - 1.0;
                    if max < -1.0 || min > last + 1.0 {
                        return;
                    }
                    // One node of slack on each side absorbs rounding.
                    let min = (min.floor() - 1.0).clamp(0.0, last);
                    let max = (max.ceil() + 1.0).clamp(0.0, last);
                    lo[axis] = min as u32;
                    hi[axis] = max as u32;
                }
                let [nx, ny, _] = *dims;
                for k in lo[2]..=hi[2] {
                    for j in lo[1]..=hi[1] {
                        let row = nx * (j + ny * k);
                        for i in lo[0]..=hi[0] {
                            visit(NodeId(row + i));
                        }
                    }
                }
            }
            Self::Buckets(grid) => grid.for_each_candidate(center, half, visit),
            Self::Linear { len, .. } => {
                for n in 0..*len {
                    visit(NodeId(n as u32));
                }
            }
        }
    }
}

/// Uniform grid of buckets over a point set's bounding box.
#[derive(Debug)]
pub struct BucketGrid {
    min: Point3,
    cell: [f64; 3],
    dims: [usize; 3],
    buckets: Vec<SmallVec<[u32; 8]>>,
}

impl BucketGrid {
    /// Bucket `points` (whose bounding box is `bbox`).
    pub fn new(points: &[Point3], bbox: BoundingBox) -> Self {
        let extent = bbox.extent();
        let occupied_axes = extent.iter().filter(|&&e| e > 0.0).count().max(1);
        let per_axis = (points.len() as f64 / POINTS_PER_BUCKET)
            .powf(1.0 / occupied_axes as f64)
            .ceil()
            .max(1.0);
        let mut dims = [1usize; 3];
        let mut cell = [1.0; 3];
        for axis in 0..3 {
            if extent[axis] > 0.0 {
                dims[axis] = per_axis as usize;
                cell[axis] = extent[axis] / per_axis;
            }
        }
        let mut grid = Self {
            min: bbox.min,
            cell,
            dims,
            buckets: vec![SmallVec::new(); dims[0] * dims[1] * dims[2]],
        };
        for (n, p) in points.iter().enumerate() {
            let b = grid.bucket_of(p);
            grid.buckets[b].push(n as u32);
        }
        grid
    }

    /// Number of buckets along x, y, z.
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    fn axis_slot(&self, axis: usize, v: f64) -> usize {
        let t = ((v - self.min[axis]) / self.cell[axis]).floor();
        if t.is_nan() || t < 0.0 {
            0
        } else {
            (t as usize).min(self.dims[axis] - 1)
        }
    }

    fn bucket_of(&self, p: &Point3) -> usize {
        let i = self.axis_slot(0, p[0]);
        let j = self.axis_slot(1, p[1]);
        let k = self.axis_slot(2, p[2]);
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    fn for_each_candidate(&self, center: &Point3, half: &[f64; 3], mut visit: impl FnMut(NodeId)) {
        let mut lo = [0usize; 3];
        let mut hi = [0usize; 3];
        for axis in 0..3 {
            lo[axis] = self.axis_slot(axis, center[axis] - half[axis]);
            hi[axis] = self.axis_slot(axis, center[axis] + half[axis]);
        }
        for k in lo[2]..=hi[2] {
            for j in lo[1]..=hi[1] {
                for i in lo[0]..=hi[0] {
                    let b = i + self.dims[0] * (j + self.dims[1] * k);
                    for &n in &self.buckets[b] {
                        visit(NodeId(n));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_space::{CartesianGrid, PointSet};

    fn candidates(index: &SpatialIndex, center: Point3, half: [f64; 3]) -> Vec<NodeId> {
        let mut out = Vec::new();
        index.for_each_candidate(&center, &half, |n| out.push(n));
        out.sort();
        out
    }

    #[test]
    fn lattice_window_is_clamped_to_grid() {
        let grid = CartesianGrid::with_unit_cells([10, 10, 1]).unwrap();
        let index = SpatialIndex::build(&grid);
        assert!(matches!(index, SpatialIndex::Lattice { .. }));
        let found = candidates(&index, [0.0, 0.0, 0.0], [1.0, 1.0, 0.5]);
        // Window x, y in 0..=2 with slack.
        assert_eq!(found.len(), 9);
        assert!(found.contains(&NodeId(0)));
        assert!(found.contains(&NodeId(22)));
    }

    #[test]
    fn lattice_window_outside_grid_is_empty() {
        let grid = CartesianGrid::with_unit_cells([4, 4, 1]).unwrap();
        let index = SpatialIndex::build(&grid);
        assert!(candidates(&index, [100.0, 100.0, 0.0], [1.0; 3]).is_empty());
        assert!(candidates(&index, [-3.0, 1.0, 0.0], [1.0; 3]).is_empty());
        assert!(!candidates(&index, [4.5, 1.0, 0.0], [1.0; 3]).is_empty());
    }

    #[test]
    fn small_point_sets_use_linear_scan() {
        let ps = PointSet::new((0..10).map(|i| [i as f64, 0.0, 0.0]).collect()).unwrap();
        let index = SpatialIndex::build(&ps);
        assert!(matches!(index, SpatialIndex::Linear { len: 10, .. }));
        assert_eq!(candidates(&index, [0.0; 3], [0.1; 3]).len(), 10);
    }

    #[test]
    fn buckets_cover_the_query_box() {
        let points: Vec<Point3> = (0..400)
            .map(|i| [(i % 20) as f64, (i / 20) as f64, 0.0])
            .collect();
        let ps = PointSet::new(points.clone()).unwrap();
        let index = SpatialIndex::build(&ps);
        let SpatialIndex::Buckets(grid) = &index else {
            panic!("expected bucket index");
        };
        assert_eq!(grid.dims()[2], 1);

        let center = [7.3, 11.8, 0.0];
        let half = [2.5, 1.5, 1.0];
        let found = candidates(&index, center, half);
        for (n, p) in points.iter().enumerate() {
            let inside = (0..3).all(|a| (p[a] - center[a]).abs() <= half[a]);
            if inside {
                assert!(found.contains(&NodeId(n as u32)), "missed point {n} at {p:?}");
            }
        }
        assert!(found.len() < points.len());
    }
}
