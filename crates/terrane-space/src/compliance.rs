//! Geometry trait compliance test helpers.
//!
//! These functions verify that a Geometry implementation satisfies the
//! invariants required by the trait contract. Reused by the
//! CartesianGrid and PointSet test modules.

use crate::geometry::Geometry;
use indexmap::IndexSet;

/// Assert that two calls to `nodes()` yield the same sequence.
pub fn assert_nodes_deterministic(geometry: &dyn Geometry) {
    let a: Vec<_> = geometry.nodes().collect();
    let b: Vec<_> = geometry.nodes().collect();
    assert_eq!(a, b, "nodes() is non-deterministic");
}

/// Assert that `nodes()` yields exactly `node_count` unique ids in
/// ascending order.
pub fn assert_nodes_complete(geometry: &dyn Geometry) {
    let nodes: Vec<_> = geometry.nodes().collect();
    assert_eq!(
        nodes.len(),
        geometry.node_count(),
        "nodes() length ({}) != node_count ({})",
        nodes.len(),
        geometry.node_count()
    );
    let unique: IndexSet<_> = nodes.iter().collect();
    assert_eq!(unique.len(), nodes.len(), "nodes() has duplicates");
    assert!(
        nodes.windows(2).all(|w| w[0] < w[1]),
        "nodes() is not ascending"
    );
}

/// Assert that every node has a finite coordinate inside the bounding box.
pub fn assert_coordinates_in_bounds(geometry: &dyn Geometry) {
    let bbox = geometry.bounding_box();
    for node in geometry.nodes() {
        let p = geometry
            .coordinate_of(node)
            .unwrap_or_else(|| panic!("no coordinate for {node}"));
        assert!(p.iter().all(|v| v.is_finite()), "{node} at {p:?} not finite");
        assert!(bbox.contains(&p), "{node} at {p:?} outside {bbox:?}");
    }
}

/// Assert that `locate(coordinate_of(n))` finds a node at that coordinate.
pub fn assert_locate_finds_nodes(geometry: &dyn Geometry) {
    for node in geometry.nodes() {
        let p = geometry.coordinate_of(node).unwrap();
        let found = geometry
            .locate(&p)
            .unwrap_or_else(|| panic!("locate({p:?}) found nothing for {node}"));
        assert_eq!(geometry.coordinate_of(found), Some(p));
    }
}

/// Assert that `topology_eq` is reflexive.
pub fn assert_topology_eq_reflexive(geometry: &dyn Geometry) {
    assert!(geometry.topology_eq(geometry), "topology_eq is not reflexive");
}

/// Run all compliance checks on a geometry.
pub fn run_full_compliance(geometry: &dyn Geometry) {
    assert_nodes_deterministic(geometry);
    assert_nodes_complete(geometry);
    assert_coordinates_in_bounds(geometry);
    assert_locate_finds_nodes(geometry);
    assert_topology_eq_reflexive(geometry);
}
