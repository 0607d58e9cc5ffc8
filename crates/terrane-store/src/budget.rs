//! Resident-memory budget shared by the properties of one store.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use terrane_core::PropertyId;
use tracing::{debug, info, warn};

use crate::property::Property;

/// Upper bound on bytes held by the resident arrays of a set of
/// properties.
///
/// Every property of a [`PropertyStore`](crate::PropertyStore) holds the
/// store's budget and consults it after faulting itself back in, so the
/// bound also holds when values are reached through a bare
/// [`Property`] handle. Enforcement persists the least recently accessed
/// members first, never blocks on a member another thread has locked,
/// and never evicts the properties it was asked to keep.
pub struct MemoryBudget {
    limit: Option<u64>,
    members: Mutex<Vec<Weak<Property>>>,
}

impl MemoryBudget {
    /// A budget of `limit` bytes; `None` never evicts.
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            members: Mutex::new(Vec::new()),
        }
    }

    /// The configured limit.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Bytes held by resident members. Members locked by another thread
    /// count as resident.
    pub fn resident_bytes(&self) -> u64 {
        self.live()
            .iter()
            .filter(|p| p.probably_resident())
            .map(|p| p.resident_size_bytes())
            .sum()
    }

    pub(crate) fn register(&self, property: &Arc<Property>) {
        let mut members = self.lock();
        members.retain(|m| m.strong_count() > 0);
        members.push(Arc::downgrade(property));
    }

    /// Persist least-recently-used members until the resident set fits,
    /// skipping every id in `keep`.
    pub(crate) fn enforce(&self, keep: &[PropertyId]) {
        let Some(limit) = self.limit else {
            return;
        };
        let members = self.live();
        let mut resident: u64 = members
            .iter()
            .filter(|p| p.probably_resident())
            .map(|p| p.resident_size_bytes())
            .sum();
        if resident <= limit {
            return;
        }
        let mut candidates: Vec<&Arc<Property>> = members
            .iter()
            .filter(|p| !keep.contains(&p.id()) && p.probably_resident())
            .collect();
        candidates.sort_by_key(|p| p.last_access());

        let mut evicted = 0usize;
        for p in candidates {
            if resident <= limit {
                break;
            }
            match p.try_persist() {
                Ok(true) => {
                    resident = resident.saturating_sub(p.resident_size_bytes());
                    evicted += 1;
                    debug!(property = %p.id(), "evicted property under memory pressure");
                }
                Ok(false) => {}
                Err(e) => warn!(property = %p.id(), error = %e, "eviction failed"),
            }
        }
        if evicted > 0 {
            info!(evicted, resident_bytes = resident, limit, "memory budget enforced");
        }
        if resident > limit {
            warn!(resident_bytes = resident, limit, kept = keep.len(), "resident properties exceed memory budget");
        }
    }

    fn live(&self) -> Vec<Arc<Property>> {
        self.lock().iter().filter_map(Weak::upgrade).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Weak<Property>>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for MemoryBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBudget")
            .field("limit", &self.limit)
            .field("members", &self.lock().len())
            .finish()
    }
}
