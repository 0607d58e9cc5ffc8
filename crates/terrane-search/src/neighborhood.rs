//! Ellipsoidal neighborhood queries over one grid.

use std::sync::Arc;

use terrane_core::{is_informed, NodeId};
use terrane_space::Geometry;
use terrane_store::{Property, PropertyStore};

use crate::ellipsoid::Ellipsoid;
use crate::error::SearchError;
use crate::index::SpatialIndex;
use crate::params::NeighborhoodParams;

/// One node found by a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// The neighboring node.
    pub node: NodeId,
    /// Its value on the selected property.
    pub value: f32,
    /// Normalized ellipsoidal distance from the query node (1 on the
    /// surface).
    pub distance: f64,
}

/// Reusable search handle bound to a grid and its property store.
///
/// Each [`find_neighbors`](Self::find_neighbors) call replaces the
/// previous result. Neighbors are the informed nodes of the selected
/// property inside the search ellipsoid, closest first with ties broken
/// by ascending node id, truncated to `max_size`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use terrane_core::{NodeId, PropertyKind};
/// use terrane_search::{Neighborhood, NeighborhoodParams};
/// use terrane_space::CartesianGrid;
/// use terrane_store::{PropertyStore, SpillDir, StoreConfig};
///
/// let grid = CartesianGrid::with_unit_cells([5, 5, 1]).unwrap();
/// let spill = Arc::new(SpillDir::temporary().unwrap());
/// let mut store = PropertyStore::new(25, spill, StoreConfig::default()).unwrap();
/// store.add("z", PropertyKind::Numeric).unwrap().fill(1.0).unwrap();
///
/// let params = NeighborhoodParams::new([2.0, 2.0, 1.0]).with_max_size(4);
/// let mut hood = Neighborhood::new(&grid, &store, params).unwrap();
/// hood.select_property("z").unwrap();
/// hood.find_neighbors(NodeId(12)).unwrap();
/// assert_eq!(hood.nodes().collect::<Vec<_>>(), [7, 11, 13, 17].map(NodeId));
/// ```
pub struct Neighborhood<'a> {
    geometry: &'a dyn Geometry,
    store: &'a PropertyStore,
    params: NeighborhoodParams,
    ellipsoid: Ellipsoid,
    half_extents: [f64; 3],
    index: SpatialIndex,
    property: Option<(String, Arc<Property>)>,
    center: Option<NodeId>,
    neighbors: Vec<Neighbor>,
}

impl<'a> Neighborhood<'a> {
    /// Create a search handle.
    ///
    /// Fails with `InvalidRange` / `InvalidAngle` for bad params and
    /// `StoreMismatch` if the store was built for a different node count.
    pub fn new(
        geometry: &'a dyn Geometry,
        store: &'a PropertyStore,
        params: NeighborhoodParams,
    ) -> Result<Self, SearchError> {
        params.validate()?;
        if geometry.node_count() != store.node_count() {
            return Err(SearchError::StoreMismatch {
                geometry: geometry.node_count(),
                store: store.node_count(),
            });
        }
        let ellipsoid = Ellipsoid::new(&params);
        // Widened so nodes admitted by the inclusive tolerance are never
        // outside the candidate box.
        let half_extents = ellipsoid.half_extents().map(|h| h * (1.0 + 1e-6));
        Ok(Self {
            geometry,
            store,
            params,
            ellipsoid,
            half_extents,
            index: SpatialIndex::build(geometry),
            property: None,
            center: None,
            neighbors: Vec::new(),
        })
    }

    /// Choose the property whose values (and no-data mask) the search uses.
    pub fn select_property(&mut self, name: &str) -> Result<(), SearchError> {
        let property = self.store.get(name)?;
        self.property = Some((name.to_owned(), property));
        Ok(())
    }

    /// Name of the selected property, if any.
    pub fn selected_property(&self) -> Option<&str> {
        self.property.as_ref().map(|(name, _)| name.as_str())
    }

    /// The search parameters.
    pub fn params(&self) -> &NeighborhoodParams {
        &self.params
    }

    /// Search around `node`, replacing the previous result.
    ///
    /// On error the result is left empty.
    pub fn find_neighbors(&mut self, node: NodeId) -> Result<(), SearchError> {
        self.neighbors.clear();
        self.center = None;

        let (_, property) = self
            .property
            .as_ref()
            .ok_or(SearchError::NoPropertySelected)?;
        let origin = self
            .geometry
            .coordinate_of(node)
            .ok_or(SearchError::NodeOutOfRange {
                node,
                node_count: self.geometry.node_count(),
            })?;

        let geometry = self.geometry;
        let ellipsoid = &self.ellipsoid;
        let index = &self.index;
        let half = &self.half_extents;
        let boundary = self.params.boundary;
        let includes_center = self.params.includes_center;
        let neighbors = &mut self.neighbors;

        property.with_values(|values| {
            index.for_each_candidate(&origin, half, |candidate| {
                if candidate == node && !includes_center {
                    return;
                }
                let Some(&value) = values.get(candidate.index()) else {
                    return;
                };
                if !is_informed(value) {
                    return;
                }
                let Some(p) = geometry.coordinate_of(candidate) else {
                    return;
                };
                let q = ellipsoid.normalized_sq(&origin, &p);
                if boundary.admits(q) {
                    neighbors.push(Neighbor {
                        node: candidate,
                        value,
                        distance: q.sqrt(),
                    });
                }
            });
        })?;

        self.neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.node.cmp(&b.node))
        });
        self.neighbors.truncate(self.params.max_size);
        self.center = Some(node);
        Ok(())
    }

    /// Number of neighbors found by the last search.
    pub fn size(&self) -> usize {
        self.neighbors.len()
    }

    /// Whether the last search found nothing.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    /// Neighbors of the last search, closest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor> {
        self.neighbors.iter()
    }

    /// Neighbor nodes of the last search, closest first.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.neighbors.iter().map(|n| n.node)
    }

    /// The node of the last successful search.
    pub fn center(&self) -> Option<NodeId> {
        self.center
    }
}

impl<'n> IntoIterator for &'n Neighborhood<'_> {
    type Item = &'n Neighbor;
    type IntoIter = std::slice::Iter<'n, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for Neighborhood<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neighborhood")
            .field("params", &self.params)
            .field("property", &self.selected_property())
            .field("center", &self.center)
            .field("size", &self.neighbors.len())
            .finish()
    }
}
