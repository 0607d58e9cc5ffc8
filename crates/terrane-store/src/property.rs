//! A single property and its residency state machine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use terrane_core::{is_informed, NodeId, PropertyId, PropertyKind, NO_DATA_VALUE};
use tracing::debug;

use crate::budget::MemoryBudget;
use crate::error::StoreError;
use crate::page::PageFile;
use crate::spill::SpillDir;
use crate::stats::PropertyStats;

/// Monotonic access clock shared by every property, used for LRU eviction.
static ACCESS_CLOCK: AtomicU64 = AtomicU64::new(1);

/// Where a property's single authoritative copy lives.
#[derive(Debug)]
enum Tier {
    Resident(Vec<f32>),
    Persisted(PageFile),
    /// Removed from its store; the array or page is gone.
    Deleted,
}

/// Residency of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Residency {
    /// Values are held in memory.
    Resident,
    /// Values live in a page file; the next access faults them back in.
    Persisted,
}

/// One `f32` per grid node, resident in memory or persisted to disk.
///
/// Properties are shared as `Arc<Property>`. Every tier transition
/// happens under the property's write lock, so a reader observes either
/// the complete resident array or waits for the transition to finish.
/// Reading or writing a persisted property transparently faults it
/// back in, after which the store's [`MemoryBudget`] may evict other
/// properties. Once the property is removed from its store, every
/// access fails with [`StoreError::Deleted`].
///
/// The number of values is fixed at creation and equals the owning
/// grid's node count. Mutable access hands out `&mut [f32]`, never the
/// backing `Vec`, so the length cannot change.
#[derive(Debug)]
pub struct Property {
    id: PropertyId,
    kind: PropertyKind,
    len: usize,
    tier: RwLock<Tier>,
    last_access: AtomicU64,
    spill: Arc<SpillDir>,
    budget: Arc<MemoryBudget>,
}

impl Property {
    /// A resident property with every value set to no-data.
    pub(crate) fn new(
        len: usize,
        kind: PropertyKind,
        spill: Arc<SpillDir>,
        budget: Arc<MemoryBudget>,
    ) -> Self {
        Self {
            id: PropertyId::next(),
            kind,
            len,
            tier: RwLock::new(Tier::Resident(vec![NO_DATA_VALUE; len])),
            last_access: AtomicU64::new(ACCESS_CLOCK.fetch_add(1, Ordering::Relaxed)),
            spill,
            budget,
        }
    }

    /// Unique allocation id (stable across renames).
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Value kind.
    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    /// Number of values (the grid's node count).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the property has no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes the array occupies while resident.
    pub fn resident_size_bytes(&self) -> u64 {
        (self.len * std::mem::size_of::<f32>()) as u64
    }

    /// Current residency. Blocks while a transition is in progress.
    pub fn residency(&self) -> Result<Residency, StoreError> {
        match &*self.read_tier()? {
            Tier::Resident(_) => Ok(Residency::Resident),
            Tier::Persisted(_) => Ok(Residency::Persisted),
            Tier::Deleted => Err(self.deleted()),
        }
    }

    /// Whether the property was removed from its store.
    pub fn is_deleted(&self) -> bool {
        let tier = self.tier.read().unwrap_or_else(PoisonError::into_inner);
        matches!(*tier, Tier::Deleted)
    }

    /// Whether the values are in memory.
    pub fn is_resident(&self) -> Result<bool, StoreError> {
        Ok(self.residency()? == Residency::Resident)
    }

    /// Access clock reading at the last value access.
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }

    // ── Value access ────────────────────────────────────────────

    /// Run `f` over the values, faulting them in if persisted.
    pub fn with_values<R>(&self, f: impl FnOnce(&[f32]) -> R) -> Result<R, StoreError> {
        self.touch();
        {
            let tier = self.read_tier()?;
            match &*tier {
                Tier::Resident(values) => return Ok(f(values)),
                Tier::Deleted => return Err(self.deleted()),
                Tier::Persisted(_) => {}
            }
        }
        let out = {
            let mut tier = self.write_tier()?;
            let values = self.fault_in(&mut tier)?;
            f(values)
        };
        self.budget.enforce(&[self.id]);
        Ok(out)
    }

    /// Run `f` over mutable values, faulting them in if persisted.
    pub fn with_values_mut<R>(&self, f: impl FnOnce(&mut [f32]) -> R) -> Result<R, StoreError> {
        self.touch();
        let (out, faulted) = {
            let mut tier = self.write_tier()?;
            let faulted = matches!(*tier, Tier::Persisted(_));
            let values = self.fault_in(&mut tier)?;
            (f(values), faulted)
        };
        if faulted {
            self.budget.enforce(&[self.id]);
        }
        Ok(out)
    }

    /// Copy of all values.
    pub fn to_vec(&self) -> Result<Vec<f32>, StoreError> {
        self.with_values(<[f32]>::to_vec)
    }

    /// Value at one node.
    pub fn value(&self, node: NodeId) -> Result<f32, StoreError> {
        let index = node.index();
        let len = self.len;
        self.with_values(|v| v.get(index).copied())?
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    /// Set the value at one node.
    pub fn set_value(&self, node: NodeId, value: f32) -> Result<(), StoreError> {
        let index = node.index();
        let len = self.len;
        let written = self.with_values_mut(|v| match v.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        })?;
        if !written {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
        Ok(())
    }

    /// Set every value.
    pub fn fill(&self, value: f32) -> Result<(), StoreError> {
        self.with_values_mut(|v| v.fill(value))
    }

    /// Replace the whole array. Fails with `LengthMismatch` unless
    /// `values.len()` equals the property length.
    pub fn replace_values(&self, values: Vec<f32>) -> Result<(), StoreError> {
        if values.len() != self.len {
            return Err(StoreError::LengthMismatch {
                expected: self.len,
                actual: values.len(),
            });
        }
        self.touch();
        let faulted = {
            let mut tier = self.write_tier()?;
            let faulted = match &*tier {
                Tier::Deleted => return Err(self.deleted()),
                Tier::Persisted(_) => true,
                Tier::Resident(_) => false,
            };
            // Dropping the old tier also removes a stale page file.
            *tier = Tier::Resident(values);
            faulted
        };
        if faulted {
            self.budget.enforce(&[self.id]);
        }
        Ok(())
    }

    /// Set no-data wherever `min <= value <= max`. Returns how many
    /// values were cleared.
    pub fn clear_if(&self, min: f32, max: f32) -> Result<usize, StoreError> {
        self.with_values_mut(|values| {
            let mut cleared = 0;
            for v in values.iter_mut().filter(|v| is_informed(**v)) {
                if min <= *v && *v <= max {
                    *v = NO_DATA_VALUE;
                    cleared += 1;
                }
            }
            cleared
        })
    }

    /// Number of informed (non no-data) values.
    pub fn informed_count(&self) -> Result<usize, StoreError> {
        self.with_values(|v| v.iter().filter(|x| is_informed(**x)).count())
    }

    /// Summary statistics over all values.
    pub fn stats(&self) -> Result<PropertyStats, StoreError> {
        self.with_values(PropertyStats::of)
    }

    // ── Tier transitions ────────────────────────────────────────

    /// Write the values to a page and drop the array.
    ///
    /// Returns `Ok(false)` if already persisted. On failure the property
    /// stays resident.
    pub(crate) fn persist(&self) -> Result<bool, StoreError> {
        let mut tier = self.write_tier()?;
        self.persist_locked(&mut tier)
    }

    /// Like [`persist`](Self::persist) but never waits for the lock.
    /// Returns `Ok(false)` if the property is busy or already persisted.
    pub(crate) fn try_persist(&self) -> Result<bool, StoreError> {
        let mut tier = match self.tier.try_write() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Ok(false),
            Err(TryLockError::Poisoned(_)) => return Err(StoreError::LockPoisoned),
        };
        self.persist_locked(&mut tier)
    }

    /// Read the page back into memory and delete it.
    ///
    /// Returns `Ok(false)` if already resident. The caller is responsible
    /// for enforcing the memory budget afterwards.
    pub(crate) fn load(&self) -> Result<bool, StoreError> {
        let mut tier = self.write_tier()?;
        if matches!(*tier, Tier::Resident(_)) {
            return Ok(false);
        }
        self.touch();
        self.fault_in(&mut tier)?;
        Ok(true)
    }

    /// Drop the array or page file now and refuse every later access.
    ///
    /// Returns `false` if the property was already released.
    pub(crate) fn release(&self) -> bool {
        let mut tier = self.tier.write().unwrap_or_else(PoisonError::into_inner);
        let was_live = !matches!(*tier, Tier::Deleted);
        *tier = Tier::Deleted;
        was_live
    }

    /// Non-blocking residency check used for eviction accounting.
    /// A property locked by another thread counts as resident.
    pub(crate) fn probably_resident(&self) -> bool {
        match self.tier.try_read() {
            Ok(tier) => matches!(*tier, Tier::Resident(_)),
            Err(_) => true,
        }
    }

    fn persist_locked(&self, tier: &mut Tier) -> Result<bool, StoreError> {
        let values = match &*tier {
            Tier::Resident(values) => values,
            Tier::Persisted(_) => return Ok(false),
            Tier::Deleted => return Err(self.deleted()),
        };
        let page = PageFile::create(self.spill.page_path(self.id), values)?;
        debug!(property = %self.id, path = %page.path().display(), values = self.len, "persisted property");
        *tier = Tier::Persisted(page);
        Ok(true)
    }

    fn fault_in<'a>(&self, tier: &'a mut Tier) -> Result<&'a mut [f32], StoreError> {
        if let Tier::Persisted(page) = tier {
            let values = page.load(self.len)?;
            debug!(property = %self.id, "faulted property into memory");
            // Replacing the tier drops the page, deleting the file.
            *tier = Tier::Resident(values);
        }
        match tier {
            Tier::Resident(values) => Ok(values.as_mut_slice()),
            Tier::Deleted => Err(self.deleted()),
            Tier::Persisted(_) => Err(StoreError::CorruptPage {
                detail: format!("property {} still persisted after fault-in", self.id),
            }),
        }
    }

    fn deleted(&self) -> StoreError {
        StoreError::Deleted { id: self.id }
    }

    fn touch(&self) {
        self.last_access.store(
            ACCESS_CLOCK.fetch_add(1, Ordering::Relaxed),
            Ordering::Relaxed,
        );
    }

    fn read_tier(&self) -> Result<RwLockReadGuard<'_, Tier>, StoreError> {
        self.tier.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_tier(&self) -> Result<RwLockWriteGuard<'_, Tier>, StoreError> {
        self.tier.write().map_err(|_| StoreError::LockPoisoned)
    }
}
