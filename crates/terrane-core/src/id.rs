//! Strongly-typed identifiers for nodes, properties, and grid instances.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a node within a grid.
///
/// On Cartesian grids this is the row-major index `i + nx * (j + ny * k)`;
/// on point sets it is the insertion index of the point. Node ids are
/// dense: a grid with `n` nodes uses exactly `NodeId(0)..NodeId(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The node id as an array index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`PropertyId`] allocation.
static PROPERTY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-process identifier for a property allocation.
///
/// Unlike a property's name, the id survives renames and is never
/// reused, so it is safe to derive page file names from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(u64);

impl PropertyId {
    /// Allocate a fresh, unique property id. Thread-safe.
    pub fn next() -> Self {
        Self(PROPERTY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value of the id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for unique [`GridInstanceId`] allocation.
static GRID_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a geometry object.
///
/// Allocated from a monotonic atomic counter. Two distinct geometry
/// instances always have different ids, even when their topology is
/// identical; use `Geometry::topology_eq` for structural comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridInstanceId(u64);

impl GridInstanceId {
    /// Allocate a fresh, unique instance id. Thread-safe.
    pub fn next() -> Self {
        Self(GRID_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GridInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_ids_are_unique() {
        let a = PropertyId::next();
        let b = PropertyId::next();
        assert_ne!(a, b);
        assert!(b.get() > a.get());
    }

    #[test]
    fn node_id_orders_by_index() {
        let mut ids = vec![NodeId(4), NodeId(1), NodeId(3)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(1), NodeId(3), NodeId(4)]);
        assert_eq!(NodeId(7).index(), 7);
    }
}
