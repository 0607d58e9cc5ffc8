//! Summary statistics over informed property values.

use terrane_core::{is_informed, NodeId};

/// Summary of a property's informed values.
///
/// No-data values are counted but excluded from every moment. With no
/// informed values, `min`, `max`, `mean`, and `variance` are `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyStats {
    /// Number of informed values considered.
    pub informed: usize,
    /// Number of no-data values considered.
    pub no_data: usize,
    /// Smallest informed value.
    pub min: Option<f32>,
    /// Largest informed value.
    pub max: Option<f32>,
    /// Mean of informed values.
    pub mean: Option<f64>,
    /// Population variance of informed values.
    pub variance: Option<f64>,
}

impl PropertyStats {
    /// Statistics over every value.
    pub fn of(values: &[f32]) -> Self {
        Self::accumulate(values.iter().copied())
    }

    /// Statistics over the values at `nodes` only. Out-of-range nodes are
    /// ignored.
    pub fn of_selected(values: &[f32], nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self::accumulate(nodes.into_iter().filter_map(|n| values.get(n.index()).copied()))
    }

    fn accumulate(values: impl Iterator<Item = f32>) -> Self {
        let mut stats = Self {
            informed: 0,
            no_data: 0,
            min: None,
            max: None,
            mean: None,
            variance: None,
        };
        // Welford's running mean/variance.
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;
        for v in values {
            if !is_informed(v) {
                stats.no_data += 1;
                continue;
            }
            stats.informed += 1;
            stats.min = Some(stats.min.map_or(v, |m| m.min(v)));
            stats.max = Some(stats.max.map_or(v, |m| m.max(v)));
            let x = v as f64;
            let delta = x - mean;
            mean += delta / stats.informed as f64;
            m2 += delta * (x - mean);
        }
        if stats.informed > 0 {
            stats.mean = Some(mean);
            stats.variance = Some(m2 / stats.informed as f64);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_core::NO_DATA_VALUE;

    #[test]
    fn skips_no_data() {
        let stats = PropertyStats::of(&[1.0, NO_DATA_VALUE, 3.0, 5.0]);
        assert_eq!(stats.informed, 3);
        assert_eq!(stats.no_data, 1);
        assert_eq!(stats.min, Some(1.0));
        assert_eq!(stats.max, Some(5.0));
        assert!((stats.mean.unwrap() - 3.0).abs() < 1e-12);
        assert!((stats.variance.unwrap() - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn all_no_data_has_no_moments() {
        let stats = PropertyStats::of(&[NO_DATA_VALUE; 4]);
        assert_eq!(stats.informed, 0);
        assert_eq!(stats.no_data, 4);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.min, None);
    }

    #[test]
    fn selection_restricts_values() {
        let values = [10.0, 20.0, 30.0, 40.0];
        let stats = PropertyStats::of_selected(&values, [NodeId(1), NodeId(3), NodeId(9)]);
        assert_eq!(stats.informed, 2);
        assert_eq!(stats.mean, Some(30.0));
    }
}
