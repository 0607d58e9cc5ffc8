//! Brute-force reference search.

use terrane_core::{is_informed, NodeId};
use terrane_space::{Geometry, Point3};

/// Scan every node and return `(node, distance)` pairs, closest first
/// (ties by ascending node id), truncated to `max_size`.
///
/// `metric(center, p)` returns the normalized distance of `p` when it lies
/// inside the search volume and `None` otherwise. No-data nodes are
/// skipped; the center is skipped unless `includes_center`.
pub fn brute_force_neighbors(
    geometry: &dyn Geometry,
    values: &[f32],
    center: NodeId,
    includes_center: bool,
    max_size: usize,
    metric: impl Fn(&Point3, &Point3) -> Option<f64>,
) -> Vec<(NodeId, f64)> {
    let Some(origin) = geometry.coordinate_of(center) else {
        return Vec::new();
    };
    let mut found: Vec<(NodeId, f64)> = geometry
        .nodes()
        .filter(|&n| includes_center || n != center)
        .filter(|n| is_informed(values[n.index()]))
        .filter_map(|n| {
            let p = geometry.coordinate_of(n)?;
            metric(&origin, &p).map(|d| (n, d))
        })
        .collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    found.truncate(max_size);
    found
}
