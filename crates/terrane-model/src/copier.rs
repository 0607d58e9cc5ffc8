//! Copying property values between grids.
//!
//! The mapping from source nodes to destination nodes depends only on the
//! pair of geometries:
//!
//! | Source      | Destination            | Policy                |
//! |-------------|------------------------|-----------------------|
//! | any         | identical (`topology_eq`) | `Direct`           |
//! | Cartesian   | Cartesian or point set | `CellContainment`     |
//! | point set   | Cartesian              | `NearestPointInCell`  |
//! | point set   | different point set    | incompatible          |
//!
//! Destination nodes that receive nothing are set to no-data.

use std::sync::Arc;

use terrane_core::{is_informed, PropertyKind, NO_DATA_VALUE};
use terrane_space::{Geometry, GeometryKind};
use terrane_store::{Property, StoreError};
use tracing::debug;

use crate::error::ModelError;
use crate::grid::Grid;

/// How source nodes are mapped onto destination nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyPolicy {
    /// Same nodes in the same order: copy index to index.
    Direct,
    /// Each destination node takes the value of the source lattice cell
    /// containing its coordinate.
    CellContainment,
    /// Each informed source point is assigned to the destination cell
    /// containing it; within a cell the point closest to the cell center
    /// wins, ties going to the lower source id.
    NearestPointInCell,
}

impl CopyPolicy {
    /// The policy mapping `source` onto `dest`.
    pub fn between(source: &dyn Geometry, dest: &dyn Geometry) -> Result<Self, ModelError> {
        if source.topology_eq(dest) {
            return Ok(Self::Direct);
        }
        match (source.kind(), dest.kind()) {
            (GeometryKind::Cartesian, _) => Ok(Self::CellContainment),
            (GeometryKind::PointSet, GeometryKind::Cartesian) => Ok(Self::NearestPointInCell),
            (GeometryKind::PointSet, GeometryKind::PointSet) => {
                Err(ModelError::IncompatibleGeometry {
                    source: GeometryKind::PointSet,
                    dest: GeometryKind::PointSet,
                })
            }
        }
    }
}

/// Outcome of a property copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyReport {
    /// Policy used.
    pub policy: CopyPolicy,
    /// Destination nodes that received a source value (possibly no-data).
    pub mapped: usize,
    /// Destination nodes with no source counterpart, now no-data.
    pub unmapped: usize,
}

/// Copies property values between grids.
pub struct PropertyCopier;

impl PropertyCopier {
    /// Copy `source_property` of `source` into `dest_property` of `dest`,
    /// creating the destination property (with the source's kind) when
    /// missing.
    ///
    /// Nothing is modified if the geometries are incompatible or the
    /// source property does not exist.
    pub fn copy(
        source: &Grid,
        source_property: &str,
        dest: &mut Grid,
        dest_property: &str,
    ) -> Result<CopyReport, ModelError> {
        let policy = CopyPolicy::between(source.geometry(), dest.geometry())?;
        let src = source.property(source_property)?;
        let dst = Self::destination(dest, dest_property, src.kind())?;
        Self::transfer(policy, source.geometry(), &src, dest.geometry(), &dst)
    }

    /// Copy between two properties of the same grid.
    pub fn copy_within(
        grid: &mut Grid,
        source_property: &str,
        dest_property: &str,
    ) -> Result<CopyReport, ModelError> {
        let src = grid.property(source_property)?;
        let dst = Self::destination(grid, dest_property, src.kind())?;
        Self::transfer(CopyPolicy::Direct, grid.geometry(), &src, grid.geometry(), &dst)
    }

    /// Fetch the destination property, adding it when missing.
    pub(crate) fn destination(
        grid: &mut Grid,
        name: &str,
        kind: &PropertyKind,
    ) -> Result<Arc<Property>, ModelError> {
        match grid.properties().get(name) {
            Ok(property) => Ok(property),
            Err(StoreError::UnknownProperty { .. }) => {
                Ok(grid.properties_mut().add(name, kind.clone())?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write `source` mapped through `policy` into `dest`.
    pub fn transfer(
        policy: CopyPolicy,
        source_geometry: &dyn Geometry,
        source: &Property,
        dest_geometry: &dyn Geometry,
        dest: &Property,
    ) -> Result<CopyReport, ModelError> {
        let values = source.to_vec()?;
        let n = dest_geometry.node_count();
        let mut out = vec![NO_DATA_VALUE; n];
        let mut mapped = 0;

        match policy {
            CopyPolicy::Direct => {
                for (slot, v) in out.iter_mut().zip(&values) {
                    *slot = *v;
                    mapped += 1;
                }
            }
            CopyPolicy::CellContainment => {
                for node in dest_geometry.nodes() {
                    let hit = dest_geometry
                        .coordinate_of(node)
                        .and_then(|p| source_geometry.locate(&p))
                        .and_then(|cell| values.get(cell.index()));
                    if let Some(&v) = hit {
                        out[node.index()] = v;
                        mapped += 1;
                    }
                }
            }
            CopyPolicy::NearestPointInCell => {
                // (squared distance to cell center, value) per destination cell
                let mut best: Vec<Option<(f64, f32)>> = vec![None; n];
                for node in source_geometry.nodes() {
                    let Some(&v) = values.get(node.index()) else {
                        continue;
                    };
                    if !is_informed(v) {
                        continue;
                    }
                    let Some(p) = source_geometry.coordinate_of(node) else {
                        continue;
                    };
                    let Some(cell) = dest_geometry.locate(&p) else {
                        continue;
                    };
                    let Some(center) = dest_geometry.coordinate_of(cell) else {
                        continue;
                    };
                    let d2: f64 = (0..3).map(|a| (p[a] - center[a]).powi(2)).sum();
                    let slot = &mut best[cell.index()];
                    // Strictly closer only: earlier (lower id) points win ties.
                    if slot.is_none_or(|(current, _)| d2 < current) {
                        *slot = Some((d2, v));
                    }
                }
                for (slot, winner) in out.iter_mut().zip(&best) {
                    if let Some((_, v)) = winner {
                        *slot = *v;
                        mapped += 1;
                    }
                }
            }
        }

        dest.replace_values(out)?;
        let report = CopyReport {
            policy,
            mapped,
            unmapped: n - mapped,
        };
        debug!(policy = ?report.policy, mapped = report.mapped, unmapped = report.unmapped, "copied property");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_core::NodeId;
    use terrane_space::{CartesianGrid, PointSet};
    use terrane_store::{SpillDir, StoreConfig};

    fn grid(name: &str, geometry: impl Geometry) -> Grid {
        Grid::new(
            name,
            Box::new(geometry),
            Arc::new(SpillDir::temporary().unwrap()),
            StoreConfig::default(),
        )
        .unwrap()
    }

    fn line(n: usize) -> PointSet {
        PointSet::new((0..n).map(|i| [i as f64, 0.0, 0.0]).collect()).unwrap()
    }

    #[test]
    fn identical_point_sets_copy_directly() {
        let mut src = grid("a", line(10));
        let mut dst = grid("b", line(10));
        let values: Vec<f32> = (0..10).map(|i| i as f32 * 1.5).collect();
        src.add_property("p").unwrap().replace_values(values.clone()).unwrap();

        let report = PropertyCopier::copy(&src, "p", &mut dst, "q").unwrap();
        assert_eq!(report.policy, CopyPolicy::Direct);
        assert_eq!((report.mapped, report.unmapped), (10, 0));
        assert_eq!(dst.property("q").unwrap().to_vec().unwrap(), values);
    }

    #[test]
    fn different_point_sets_are_incompatible_and_untouched() {
        let mut src = grid("a", line(10));
        src.add_property("p").unwrap().fill(1.0).unwrap();
        let mut dst = grid("b", line(8));

        let err = PropertyCopier::copy(&src, "p", &mut dst, "q").unwrap_err();
        assert!(matches!(err, ModelError::IncompatibleGeometry { .. }));
        assert!(!dst.properties().contains("q"));
    }

    #[test]
    fn coarse_lattice_fills_fine_lattice_by_containment() {
        // Coarse 2x1 cells of width 2 centered at x = 1, 3.
        let coarse = CartesianGrid::new([2, 1, 1], [2.0, 1.0, 1.0], [1.0, 0.0, 0.0]).unwrap();
        let fine = CartesianGrid::with_unit_cells([5, 1, 1]).unwrap();
        let mut src = grid("coarse", coarse);
        src.add_property("p").unwrap().replace_values(vec![10.0, 20.0]).unwrap();
        let mut dst = grid("fine", fine);

        let report = PropertyCopier::copy(&src, "p", &mut dst, "p").unwrap();
        assert_eq!(report.policy, CopyPolicy::CellContainment);
        // Fine node x = 0..4; coarse cells span [0, 2) and [2, 4).
        assert_eq!(
            dst.property("p").unwrap().to_vec().unwrap(),
            vec![10.0, 10.0, 20.0, 20.0, NO_DATA_VALUE]
        );
        assert_eq!((report.mapped, report.unmapped), (4, 1));
    }

    #[test]
    fn points_land_in_cells_closest_first() {
        let points = PointSet::new(vec![
            [0.4, 0.0, 0.0],
            [0.1, 0.0, 0.0],
            [-0.1, 0.0, 0.0],
            [2.0, 0.0, 0.0],
            [9.0, 0.0, 0.0],
        ])
        .unwrap();
        let mut src = grid("wells", points);
        src.add_property("p")
            .unwrap()
            .replace_values(vec![1.0, 2.0, 3.0, NO_DATA_VALUE, 5.0])
            .unwrap();
        let mut dst = grid("cells", CartesianGrid::with_unit_cells([3, 1, 1]).unwrap());

        let report = PropertyCopier::copy(&src, "p", &mut dst, "p").unwrap();
        assert_eq!(report.policy, CopyPolicy::NearestPointInCell);
        // Points 1 and 2 tie at 0.1 from node 0; the lower id wins.
        // Point 3 is no-data and point 4 lies outside the grid.
        assert_eq!(
            dst.property("p").unwrap().to_vec().unwrap(),
            vec![2.0, NO_DATA_VALUE, NO_DATA_VALUE]
        );
        assert_eq!((report.mapped, report.unmapped), (1, 2));
    }

    #[test]
    fn lattice_to_points_uses_containing_cell() {
        let mut src = grid("cells", CartesianGrid::with_unit_cells([2, 2, 1]).unwrap());
        src.add_property("p")
            .unwrap()
            .replace_values(vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let points = PointSet::new(vec![[1.2, 0.9, 0.0], [5.0, 5.0, 0.0]]).unwrap();
        let mut dst = grid("wells", points);

        let report = PropertyCopier::copy(&src, "p", &mut dst, "p").unwrap();
        assert_eq!(report.policy, CopyPolicy::CellContainment);
        let got = dst.property("p").unwrap().to_vec().unwrap();
        assert_eq!(got, vec![4.0, NO_DATA_VALUE]);
        assert_eq!(dst.property("p").unwrap().value(NodeId(0)).unwrap(), 4.0);
    }

    #[test]
    fn destination_inherits_source_kind() {
        let mut src = grid("a", line(3));
        let mut categories = terrane_core::CategoryMap::new();
        categories.insert("sand");
        src.properties_mut()
            .add("facies", PropertyKind::Categorical(categories.clone()))
            .unwrap();
        let mut dst = grid("b", line(3));
        PropertyCopier::copy(&src, "facies", &mut dst, "facies").unwrap();
        assert_eq!(
            dst.property("facies").unwrap().kind(),
            &PropertyKind::Categorical(categories)
        );
    }

    #[test]
    fn copy_within_a_grid_duplicates_values() {
        let mut g = grid("g", line(4));
        g.add_property("p").unwrap().replace_values(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let report = PropertyCopier::copy_within(&mut g, "p", "p_copy").unwrap();
        assert_eq!(report.mapped, 4);
        assert_eq!(
            g.property("p_copy").unwrap().to_vec().unwrap(),
            g.property("p").unwrap().to_vec().unwrap()
        );
    }
}
