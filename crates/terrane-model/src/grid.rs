//! A named grid: geometry, property store, regions, and selections.

use std::sync::Arc;

use indexmap::IndexMap;
use terrane_core::{is_informed, NodeId, PropertyKind};
use terrane_search::{Neighborhood, NeighborhoodParams};
use terrane_space::{Geometry, GeometryKind, Nodes, Region, RegionIter, SpaceError};
use terrane_store::{
    Property, PropertyStats, PropertyStore, SpillDir, StoreConfig, StoreError, SwapReport,
};
use tracing::debug;

use crate::error::ModelError;

/// A geometry together with the properties and regions defined on it.
///
/// The grid owns its property store; every property holds exactly one
/// value per node. At most one region is *active* at a time, and
/// [`active_nodes`](Self::active_nodes) restricts iteration to it.
pub struct Grid {
    name: String,
    geometry: Box<dyn Geometry>,
    store: PropertyStore,
    regions: IndexMap<String, Region>,
    selected_property: Option<String>,
    selected_region: Option<String>,
}

impl Grid {
    /// Create a grid with an empty property store spilling into `spill`.
    pub fn new(
        name: impl Into<String>,
        geometry: Box<dyn Geometry>,
        spill: Arc<SpillDir>,
        config: StoreConfig,
    ) -> Result<Self, ModelError> {
        let store = PropertyStore::new(geometry.node_count(), spill, config)?;
        Ok(Self {
            name: name.into(),
            geometry,
            store,
            regions: IndexMap::new(),
            selected_property: None,
            selected_region: None,
        })
    }

    /// The grid's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The grid's geometry.
    pub fn geometry(&self) -> &dyn Geometry {
        self.geometry.as_ref()
    }

    /// Kind of the underlying geometry.
    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.geometry.node_count()
    }

    /// Every node in ascending id order, ignoring the active region.
    pub fn nodes(&self) -> Nodes {
        self.geometry.nodes()
    }

    /// Nodes of the active region in ascending order, or every node when
    /// no region is active.
    pub fn active_nodes(&self) -> ActiveNodes<'_> {
        match self.active_region() {
            Some(region) => ActiveNodes::Region(region.iter()),
            None => ActiveNodes::All(self.nodes()),
        }
    }

    // ── Properties ──────────────────────────────────────────────

    /// The grid's property store.
    pub fn properties(&self) -> &PropertyStore {
        &self.store
    }

    /// Mutable access to the property store.
    pub fn properties_mut(&mut self) -> &mut PropertyStore {
        &mut self.store
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Result<Arc<Property>, ModelError> {
        Ok(self.store.get(name)?)
    }

    /// Add a numeric property filled with no-data.
    pub fn add_property(&mut self, name: &str) -> Result<Arc<Property>, ModelError> {
        Ok(self.store.add(name, PropertyKind::Numeric)?)
    }

    /// Remove a property, clearing the selection if it pointed there.
    pub fn remove_property(&mut self, name: &str) -> Result<(), ModelError> {
        self.store.remove(name)?;
        if self.selected_property.as_deref() == Some(name) {
            self.selected_property = None;
        }
        Ok(())
    }

    /// Make `name` the selected property.
    pub fn select_property(&mut self, name: &str) -> Result<(), ModelError> {
        if !self.store.contains(name) {
            return Err(StoreError::UnknownProperty { name: name.into() }.into());
        }
        self.selected_property = Some(name.to_owned());
        Ok(())
    }

    /// Name of the selected property, if any.
    pub fn selected_property(&self) -> Option<&str> {
        self.selected_property.as_deref()
    }

    /// Statistics of a property over the active nodes.
    pub fn stats(&self, property: &str) -> Result<PropertyStats, ModelError> {
        let property = self.store.get(property)?;
        let stats = match self.active_region() {
            Some(region) => property.with_values(|v| PropertyStats::of_selected(v, region))?,
            None => property.stats()?,
        };
        Ok(stats)
    }

    /// Page the named properties out to disk.
    pub fn swap_to_disk<S: AsRef<str>>(&self, names: &[S]) -> SwapReport {
        self.store.swap_to_disk(names)
    }

    /// Bring the named properties back into memory.
    pub fn swap_to_ram<S: AsRef<str>>(&self, names: &[S]) -> SwapReport {
        self.store.swap_to_ram(names)
    }

    // ── Regions ─────────────────────────────────────────────────

    /// Add a new region. Fails if the name is taken or the region was
    /// built for a different node count.
    pub fn add_region(&mut self, name: &str, region: Region) -> Result<(), ModelError> {
        if self.regions.contains_key(name) {
            return Err(ModelError::DuplicateRegion { name: name.into() });
        }
        self.set_region(name, region)
    }

    /// Insert or replace a region.
    pub fn set_region(&mut self, name: &str, region: Region) -> Result<(), ModelError> {
        if region.node_count() != self.node_count() {
            return Err(SpaceError::LengthMismatch {
                left: self.node_count(),
                right: region.node_count(),
            }
            .into());
        }
        debug!(grid = %self.name, region = %name, members = region.count(), "set region");
        self.regions.insert(name.to_owned(), region);
        Ok(())
    }

    /// Look up a region by name.
    pub fn region(&self, name: &str) -> Result<&Region, ModelError> {
        self.regions
            .get(name)
            .ok_or_else(|| ModelError::UnknownRegion { name: name.into() })
    }

    /// Remove a region, deactivating it if it was active.
    pub fn remove_region(&mut self, name: &str) -> Result<Region, ModelError> {
        let region = self
            .regions
            .shift_remove(name)
            .ok_or_else(|| ModelError::UnknownRegion { name: name.into() })?;
        if self.selected_region.as_deref() == Some(name) {
            self.selected_region = None;
        }
        Ok(region)
    }

    /// Region names in insertion order.
    pub fn region_names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    /// Make `name` the active region.
    pub fn select_region(&mut self, name: &str) -> Result<(), ModelError> {
        if !self.regions.contains_key(name) {
            return Err(ModelError::UnknownRegion { name: name.into() });
        }
        self.selected_region = Some(name.to_owned());
        Ok(())
    }

    /// Deactivate the active region so every node is active.
    pub fn clear_region_selection(&mut self) {
        self.selected_region = None;
    }

    /// Name of the active region, if any.
    pub fn selected_region(&self) -> Option<&str> {
        self.selected_region.as_deref()
    }

    /// The active region, if any.
    pub fn active_region(&self) -> Option<&Region> {
        self.selected_region
            .as_deref()
            .and_then(|name| self.regions.get(name))
    }

    /// Region of the nodes whose informed value lies in `min..=max`.
    pub fn region_from_property(
        &self,
        property: &str,
        min: f32,
        max: f32,
    ) -> Result<Region, ModelError> {
        let property = self.store.get(property)?;
        let mask = property.with_values(|values| {
            values
                .iter()
                .map(|&v| is_informed(v) && v >= min && v <= max)
                .collect::<Vec<_>>()
        })?;
        Ok(Region::from_mask(&mask))
    }

    /// Region of the nodes whose informed value equals one of `categories`.
    pub fn region_from_categories(
        &self,
        property: &str,
        categories: &[u32],
    ) -> Result<Region, ModelError> {
        let property = self.store.get(property)?;
        let mask = property.with_values(|values| {
            values
                .iter()
                .map(|&v| is_informed(v) && categories.iter().any(|&c| c as f32 == v))
                .collect::<Vec<_>>()
        })?;
        Ok(Region::from_mask(&mask))
    }

    // ── Search ──────────────────────────────────────────────────

    /// Create a neighborhood over this grid, preselecting the grid's
    /// selected property if there is one.
    pub fn neighborhood(&self, params: NeighborhoodParams) -> Result<Neighborhood<'_>, ModelError> {
        let mut hood = Neighborhood::new(self.geometry.as_ref(), &self.store, params)?;
        if let Some(name) = &self.selected_property {
            hood.select_property(name)?;
        }
        Ok(hood)
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("node_count", &self.node_count())
            .field("properties", &self.store.len())
            .field("regions", &self.regions.len())
            .field("selected_property", &self.selected_property)
            .field("selected_region", &self.selected_region)
            .finish()
    }
}

/// Iterator over a grid's active nodes.
#[derive(Clone, Debug)]
pub enum ActiveNodes<'a> {
    /// No active region: every node.
    All(Nodes),
    /// Members of the active region.
    Region(RegionIter<'a>),
}

impl Iterator for ActiveNodes<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        match self {
            Self::All(nodes) => nodes.next(),
            Self::Region(members) => members.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_core::NO_DATA_VALUE;
    use terrane_space::CartesianGrid;

    fn grid(dims: [u32; 3]) -> Grid {
        let geometry = CartesianGrid::with_unit_cells(dims).unwrap();
        Grid::new(
            "g",
            Box::new(geometry),
            Arc::new(SpillDir::temporary().unwrap()),
            StoreConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn active_nodes_follow_region_selection() {
        let mut g = grid([4, 1, 1]);
        assert_eq!(g.active_nodes().count(), 4);
        let region = Region::from_nodes(4, [NodeId(1), NodeId(3)]).unwrap();
        g.add_region("r", region).unwrap();
        g.select_region("r").unwrap();
        assert_eq!(g.active_nodes().collect::<Vec<_>>(), vec![NodeId(1), NodeId(3)]);
        g.clear_region_selection();
        assert_eq!(g.active_nodes().count(), 4);
    }

    #[test]
    fn removing_active_region_deactivates_it() {
        let mut g = grid([3, 1, 1]);
        g.add_region("r", Region::full(3)).unwrap();
        g.select_region("r").unwrap();
        g.remove_region("r").unwrap();
        assert_eq!(g.selected_region(), None);
        assert!(matches!(g.select_region("r"), Err(ModelError::UnknownRegion { .. })));
    }

    #[test]
    fn region_must_match_node_count() {
        let mut g = grid([3, 1, 1]);
        let err = g.add_region("r", Region::full(4)).unwrap_err();
        assert!(matches!(err, ModelError::Space(SpaceError::LengthMismatch { .. })));
        g.add_region("r", Region::full(3)).unwrap();
        assert!(matches!(
            g.add_region("r", Region::new(3)),
            Err(ModelError::DuplicateRegion { .. })
        ));
    }

    #[test]
    fn region_from_property_skips_no_data() {
        let mut g = grid([5, 1, 1]);
        let p = g.add_property("p").unwrap();
        p.replace_values(vec![0.0, 1.0, NO_DATA_VALUE, 2.0, 5.0]).unwrap();
        let region = g.region_from_property("p", 1.0, 2.0).unwrap();
        assert_eq!(region.iter().collect::<Vec<_>>(), vec![NodeId(1), NodeId(3)]);
        let region = g.region_from_property("p", f32::MIN, f32::MAX).unwrap();
        assert_eq!(region.count(), 4);
    }

    #[test]
    fn region_from_categories_matches_ids() {
        let mut g = grid([5, 1, 1]);
        let p = g.add_property("facies").unwrap();
        p.replace_values(vec![0.0, 1.0, 2.0, 1.0, NO_DATA_VALUE]).unwrap();
        let region = g.region_from_categories("facies", &[1, 2]).unwrap();
        assert_eq!(
            region.iter().collect::<Vec<_>>(),
            vec![NodeId(1), NodeId(2), NodeId(3)]
        );
    }

    #[test]
    fn stats_respect_active_region() {
        let mut g = grid([4, 1, 1]);
        let p = g.add_property("p").unwrap();
        p.replace_values(vec![1.0, 2.0, 3.0, 10.0]).unwrap();
        assert_eq!(g.stats("p").unwrap().max, Some(10.0));
        g.add_region("low", Region::from_nodes(4, [NodeId(0), NodeId(1)]).unwrap())
            .unwrap();
        g.select_region("low").unwrap();
        let stats = g.stats("p").unwrap();
        assert_eq!(stats.informed, 2);
        assert_eq!(stats.mean, Some(1.5));
    }

    #[test]
    fn removing_selected_property_clears_selection() {
        let mut g = grid([2, 1, 1]);
        g.add_property("p").unwrap();
        g.select_property("p").unwrap();
        g.remove_property("p").unwrap();
        assert_eq!(g.selected_property(), None);
        assert!(g.select_property("p").is_err());
    }

    #[test]
    fn neighborhood_uses_selected_property() {
        let mut g = grid([5, 5, 1]);
        let p = g.add_property("p").unwrap();
        p.fill(1.0).unwrap();
        g.select_property("p").unwrap();
        let mut hood = g.neighborhood(NeighborhoodParams::new([1.0, 1.0, 1.0])).unwrap();
        assert_eq!(hood.selected_property(), Some("p"));
        hood.find_neighbors(NodeId(12)).unwrap();
        assert_eq!(hood.size(), 4);
    }
}
