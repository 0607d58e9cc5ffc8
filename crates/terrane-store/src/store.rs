//! Named properties of one grid, with memory-budget enforcement.

use std::sync::Arc;

use indexmap::IndexMap;
use terrane_core::PropertyKind;
use tracing::debug;

use crate::budget::MemoryBudget;
use crate::config::{StoreConfig, SwapPolicy};
use crate::error::StoreError;
use crate::property::Property;
use crate::spill::SpillDir;
use crate::swap::{run_batch, SwapDirection, SwapReport, SwapTarget};

/// The properties of one grid, keyed by unique name.
///
/// Every property has exactly `node_count` values. Names keep their
/// insertion order. Handles returned by [`get`](Self::get) follow a
/// property across renames. Removing a property, or dropping the store,
/// releases its array and page file at once; outstanding handles then
/// fail with [`StoreError::Deleted`].
#[derive(Debug)]
pub struct PropertyStore {
    node_count: usize,
    properties: IndexMap<String, Arc<Property>>,
    spill: Arc<SpillDir>,
    budget: Arc<MemoryBudget>,
    config: StoreConfig,
}

impl PropertyStore {
    /// Create an empty store for a grid with `node_count` nodes.
    pub fn new(
        node_count: usize,
        spill: Arc<SpillDir>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self {
            node_count,
            properties: IndexMap::new(),
            spill,
            budget: Arc::new(MemoryBudget::new(config.memory_budget_bytes)),
            config,
        })
    }

    /// Number of values in every property.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Directory receiving page files.
    pub fn spill_dir(&self) -> &Arc<SpillDir> {
        &self.spill
    }

    /// Memory budget shared by every property of the store.
    pub fn budget(&self) -> &Arc<MemoryBudget> {
        &self.budget
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the store has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Property names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// `(name, property)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Property>)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a property with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Add a resident property with all values set to no-data.
    pub fn add(&mut self, name: &str, kind: PropertyKind) -> Result<Arc<Property>, StoreError> {
        if self.properties.contains_key(name) {
            return Err(StoreError::DuplicateProperty { name: name.into() });
        }
        let property = Arc::new(Property::new(
            self.node_count,
            kind,
            Arc::clone(&self.spill),
            Arc::clone(&self.budget),
        ));
        self.budget.register(&property);
        self.properties.insert(name.to_owned(), Arc::clone(&property));
        debug!(property = %name, id = %property.id(), values = self.node_count, "added property");
        self.budget.enforce(&[property.id()]);
        Ok(property)
    }

    /// Add a property under `base`, or `base_1`, `base_2`, ... if taken.
    ///
    /// Returns the name actually used with the new property.
    pub fn add_unique(
        &mut self,
        base: &str,
        kind: PropertyKind,
    ) -> Result<(String, Arc<Property>), StoreError> {
        let name = self.unique_name(base);
        let property = self.add(&name, kind)?;
        Ok((name, property))
    }

    /// First free name among `base`, `base_1`, `base_2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_owned();
        }
        (1u64..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_owned())
    }

    /// Look up a property regardless of its residency.
    pub fn get(&self, name: &str) -> Result<Arc<Property>, StoreError> {
        self.properties
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownProperty { name: name.into() })
    }

    /// Remove a property and release its array or page file now.
    ///
    /// Handles still held elsewhere (a search, a queued swap) see
    /// [`StoreError::Deleted`] from then on.
    pub fn remove(&mut self, name: &str) -> Result<(), StoreError> {
        let property = self
            .properties
            .shift_remove(name)
            .ok_or_else(|| StoreError::UnknownProperty { name: name.into() })?;
        property.release();
        debug!(property = %name, id = %property.id(), "removed property");
        Ok(())
    }

    /// Rename a property in place, keeping its position.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), StoreError> {
        if old == new {
            return self.get(old).map(|_| ());
        }
        if self.properties.contains_key(new) {
            return Err(StoreError::DuplicateProperty { name: new.into() });
        }
        let index = self
            .properties
            .get_index_of(old)
            .ok_or_else(|| StoreError::UnknownProperty { name: old.into() })?;
        let property = self
            .properties
            .shift_remove(old)
            .ok_or_else(|| StoreError::UnknownProperty { name: old.into() })?;
        self.properties.shift_insert(index, new.to_owned(), property);
        debug!(from = %old, to = %new, "renamed property");
        Ok(())
    }

    // ── Value access ────────────────────────────────────────────

    /// Read a property's values, faulting them in if needed.
    pub fn with_values<R>(
        &self,
        name: &str,
        f: impl FnOnce(&[f32]) -> R,
    ) -> Result<R, StoreError> {
        self.get(name)?.with_values(f)
    }

    /// Write a property's values, faulting them in if needed.
    pub fn with_values_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut [f32]) -> R,
    ) -> Result<R, StoreError> {
        self.get(name)?.with_values_mut(f)
    }

    // ── Tier transitions ────────────────────────────────────────

    /// Persist the named resident properties using the configured policy.
    ///
    /// Already-persisted names are reported as `NotResident` and unknown
    /// names as `UnknownProperty`; neither stops the batch unless the
    /// policy is [`SwapPolicy::FailFast`].
    pub fn swap_to_disk<S: AsRef<str>>(&self, names: &[S]) -> SwapReport {
        self.swap_with(SwapDirection::ToDisk, names, self.config.swap_policy)
    }

    /// Fault the named persisted properties back into memory.
    ///
    /// Already-resident names are reported as `AlreadyResident`. The
    /// memory budget is then enforced against the other properties only:
    /// everything this batch loaded stays resident, even when the batch
    /// alone exceeds the budget.
    pub fn swap_to_ram<S: AsRef<str>>(&self, names: &[S]) -> SwapReport {
        self.swap_with(SwapDirection::ToRam, names, self.config.swap_policy)
    }

    /// Run a swap batch with an explicit failure policy.
    pub fn swap_with<S: AsRef<str>>(
        &self,
        direction: SwapDirection,
        names: &[S],
        policy: SwapPolicy,
    ) -> SwapReport {
        run_batch(direction, self.resolve(names), policy, &self.budget)
    }

    pub(crate) fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Vec<SwapTarget> {
        names
            .iter()
            .map(|n| {
                let name = n.as_ref();
                (name.to_owned(), self.properties.get(name).cloned())
            })
            .collect()
    }

    /// Bytes held by resident arrays. Properties locked by another thread
    /// are counted as resident.
    pub fn resident_bytes(&self) -> u64 {
        self.properties
            .values()
            .filter(|p| p.probably_resident())
            .map(|p| p.resident_size_bytes())
            .sum()
    }
}

impl Drop for PropertyStore {
    fn drop(&mut self) {
        for property in self.properties.values() {
            property.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Residency;
    use proptest::prelude::*;
    use terrane_core::{NodeId, NO_DATA_VALUE};

    fn store(node_count: usize) -> PropertyStore {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        PropertyStore::new(node_count, spill, StoreConfig::default()).unwrap()
    }

    #[test]
    fn add_get_remove() {
        let mut s = store(4);
        s.add("porosity", PropertyKind::Numeric).unwrap();
        assert!(matches!(
            s.add("porosity", PropertyKind::Numeric),
            Err(StoreError::DuplicateProperty { .. })
        ));
        assert_eq!(s.get("porosity").unwrap().len(), 4);
        s.remove("porosity").unwrap();
        assert!(matches!(
            s.get("porosity"),
            Err(StoreError::UnknownProperty { .. })
        ));
        assert!(s.remove("porosity").is_err());
    }

    #[test]
    fn add_unique_appends_suffix() {
        let mut s = store(1);
        let (a, _) = s.add_unique("out", PropertyKind::Numeric).unwrap();
        let (b, _) = s.add_unique("out", PropertyKind::Numeric).unwrap();
        let (c, _) = s.add_unique("out", PropertyKind::Numeric).unwrap();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("out", "out_1", "out_2"));
    }

    #[test]
    fn rename_keeps_order_and_handle() {
        let mut s = store(2);
        s.add("a", PropertyKind::Numeric).unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        s.add("c", PropertyKind::Numeric).unwrap();
        s.rename("b", "beta").unwrap();
        assert_eq!(s.names().collect::<Vec<_>>(), vec!["a", "beta", "c"]);
        assert_eq!(s.get("beta").unwrap().id(), b.id());
        assert!(matches!(
            s.rename("a", "c"),
            Err(StoreError::DuplicateProperty { .. })
        ));
        assert!(s.rename("zzz", "y").is_err());
    }

    #[test]
    fn swap_round_trip_is_bit_exact() {
        let mut s = store(6);
        let p = s.add("perm", PropertyKind::Numeric).unwrap();
        let original = vec![0.0, -0.0, NO_DATA_VALUE, f32::from_bits(0x7fc0_0001), 1e-38, 3.25];
        p.replace_values(original.clone()).unwrap();

        let report = s.swap_to_disk(&["perm"]);
        assert!(report.is_clean());
        assert_eq!(p.residency().unwrap(), Residency::Persisted);

        let report = s.swap_to_ram(&["perm"]);
        assert!(report.is_clean());
        let back = p.to_vec().unwrap();
        let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&back), bits(&original));
    }

    #[test]
    fn swapping_twice_reports_not_resident_and_keeps_data() {
        let mut s = store(3);
        let p = s.add("p", PropertyKind::Numeric).unwrap();
        p.fill(2.0).unwrap();
        assert_eq!(s.swap_to_disk(&["p"]).swapped(), 1);

        let again = s.swap_to_disk(&["p"]);
        assert_eq!(again.swapped(), 0);
        let failures: Vec<_> = again.failures().collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0].1, StoreError::NotResident { .. }));
        assert_eq!(p.to_vec().unwrap(), vec![2.0; 3]);

        let ram = s.swap_to_ram(&["p"]);
        assert!(matches!(
            ram.items[0].outcome,
            Err(StoreError::AlreadyResident { .. })
        ));
    }

    #[test]
    fn batch_continues_past_unknown_names() {
        let mut s = store(2);
        s.add("a", PropertyKind::Numeric).unwrap();
        s.add("b", PropertyKind::Numeric).unwrap();
        let report = s.swap_to_disk(&["a", "missing", "b"]);
        assert_eq!(report.swapped(), 2);
        assert!(matches!(
            report.items[1].outcome,
            Err(StoreError::UnknownProperty { .. })
        ));
        assert!(!report.is_clean());
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let mut s = store(2);
        s.add("a", PropertyKind::Numeric).unwrap();
        s.add("b", PropertyKind::Numeric).unwrap();
        let report = s.swap_with(SwapDirection::ToDisk, &["missing", "a", "b"], SwapPolicy::FailFast);
        assert_eq!(report.items.len(), 1);
        assert_eq!(report.skipped, vec!["a".to_owned(), "b".to_owned()]);
        assert!(s.get("a").unwrap().is_resident().unwrap());
    }

    #[test]
    fn removing_persisted_property_deletes_page_despite_live_handle() {
        let mut s = store(2);
        let p = s.add("gone", PropertyKind::Numeric).unwrap();
        s.swap_to_disk(&["gone"]);
        let page = s.spill_dir().page_path(p.id());
        assert!(page.exists());

        s.remove("gone").unwrap();
        assert!(!page.exists());
        assert!(matches!(p.to_vec(), Err(StoreError::Deleted { .. })));
        assert!(matches!(p.fill(1.0), Err(StoreError::Deleted { .. })));
    }

    #[test]
    fn removing_resident_property_frees_budget() {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        let mut s = PropertyStore::new(10, spill, StoreConfig::with_budget(40)).unwrap();
        let a = s.add("a", PropertyKind::Numeric).unwrap();
        s.remove("a").unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        assert!(b.is_resident().unwrap());
        assert!(a.is_deleted());
        assert_eq!(s.budget().resident_bytes(), 40);
    }

    #[test]
    fn dropping_the_store_releases_every_property() {
        let mut s = store(2);
        let p = s.add("p", PropertyKind::Numeric).unwrap();
        s.swap_to_disk(&["p"]);
        let page = s.spill_dir().page_path(p.id());
        drop(s);
        assert!(!page.exists());
        assert!(p.is_deleted());
    }

    #[test]
    fn batch_to_ram_keeps_everything_it_loaded() {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        // Room for one 10-value property.
        let mut s = PropertyStore::new(10, spill, StoreConfig::with_budget(40)).unwrap();
        let a = s.add("a", PropertyKind::Numeric).unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        assert!(!a.is_resident().unwrap());
        s.swap_to_disk(&["b"]);

        let report = s.swap_to_ram(&["a", "b"]);
        assert_eq!(report.swapped(), 2);
        assert!(a.is_resident().unwrap());
        assert!(b.is_resident().unwrap());
    }

    #[test]
    fn batch_to_ram_evicts_properties_outside_the_batch() {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        // Room for two 10-value properties.
        let mut s = PropertyStore::new(10, spill, StoreConfig::with_budget(80)).unwrap();
        let a = s.add("a", PropertyKind::Numeric).unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        let c = s.add("c", PropertyKind::Numeric).unwrap();
        assert!(!a.is_resident().unwrap());

        let report = s.swap_to_ram(&["a"]);
        assert_eq!(report.swapped(), 1);
        assert!(a.is_resident().unwrap());
        assert!(!b.is_resident().unwrap());
        assert!(c.is_resident().unwrap());
        assert!(s.resident_bytes() <= 80);
    }

    #[test]
    fn handle_fault_in_respects_budget() {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        let mut s = PropertyStore::new(10, spill, StoreConfig::with_budget(40)).unwrap();
        let a = s.add("a", PropertyKind::Numeric).unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        assert!(!a.is_resident().unwrap());

        // Reached through the handle, not the store.
        a.set_value(NodeId(0), 3.0).unwrap();
        assert!(a.is_resident().unwrap());
        assert!(!b.is_resident().unwrap());
        b.to_vec().unwrap();
        assert!(!a.is_resident().unwrap());
        assert!(s.resident_bytes() <= 40);
        assert_eq!(a.value(NodeId(0)).unwrap(), 3.0);
    }

    #[test]
    fn memory_budget_evicts_least_recently_used() {
        let spill = Arc::new(SpillDir::temporary().unwrap());
        // Room for two 10-value properties.
        let mut s = PropertyStore::new(10, spill, StoreConfig::with_budget(80)).unwrap();
        let a = s.add("a", PropertyKind::Numeric).unwrap();
        let b = s.add("b", PropertyKind::Numeric).unwrap();
        s.with_values("a", |_| ()).unwrap();
        let c = s.add("c", PropertyKind::Numeric).unwrap();

        assert!(a.is_resident().unwrap());
        assert!(!b.is_resident().unwrap());
        assert!(c.is_resident().unwrap());
        assert!(s.resident_bytes() <= 80);

        s.with_values_mut("b", |v| v[0] = 1.0).unwrap();
        assert!(b.is_resident().unwrap());
        assert!(!a.is_resident().unwrap());
        assert_eq!(b.value(NodeId(0)).unwrap(), 1.0);
    }

    proptest! {
        #[test]
        fn length_invariant_survives_any_operation_sequence(
            ops in prop::collection::vec(0u8..5, 1..40),
            len in 1usize..50,
        ) {
            let mut s = store(len);
            let p = s.add("p", PropertyKind::Numeric).unwrap();
            for (i, op) in ops.iter().enumerate() {
                match op {
                    0 => { s.swap_to_disk(&["p"]); }
                    1 => { s.swap_to_ram(&["p"]); }
                    2 => p.fill(i as f32).unwrap(),
                    3 => { p.set_value(NodeId((i % len) as u32), 1.0).unwrap(); }
                    _ => { p.clear_if(0.0, 10.0).unwrap(); }
                }
                prop_assert_eq!(p.len(), len);
                prop_assert_eq!(p.to_vec().unwrap().len(), len);
            }
        }
    }
}
