//! Property value conventions and value kinds.

use indexmap::IndexSet;

/// Marker stored in a property for a node that carries no value.
///
/// The marker is an ordinary finite `f32`, distinct from zero, so that
/// values compare with `==` and survive any bit-exact persistence.
pub const NO_DATA_VALUE: f32 = -9_966_699.0;

/// Whether `value` carries data (is not the no-data marker).
#[inline]
pub fn is_informed(value: f32) -> bool {
    value != NO_DATA_VALUE
}

/// Classification of the values held by a property.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum PropertyKind {
    /// Continuous numeric values.
    #[default]
    Numeric,
    /// Discrete categories stored as `f32` category ids.
    Categorical(CategoryMap),
}

impl PropertyKind {
    /// Whether this is a categorical property.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical(_))
    }
}

/// Bidirectional mapping between category ids and labels.
///
/// Ids are dense and assigned in insertion order: the first label added
/// has id 0.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CategoryMap {
    labels: IndexSet<String>,
}

impl CategoryMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label, returning its id. Adding an existing label returns
    /// the id it already has.
    pub fn insert(&mut self, label: impl Into<String>) -> u32 {
        let (idx, _) = self.labels.insert_full(label.into());
        idx as u32
    }

    /// Id of a label, if present.
    pub fn id_of(&self, label: &str) -> Option<u32> {
        self.labels.get_index_of(label).map(|i| i as u32)
    }

    /// Label of an id, if present.
    pub fn label_of(&self, id: u32) -> Option<&str> {
        self.labels.get_index(id as usize).map(String::as_str)
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the mapping has no categories.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(id, label)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, l)| (i as u32, l.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut map = Self::new();
        for label in iter {
            map.insert(label);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn no_data_is_not_zero() {
        assert!(is_informed(0.0));
        assert!(!is_informed(NO_DATA_VALUE));
    }

    #[test]
    fn category_ids_follow_insertion_order() {
        let map: CategoryMap = ["sand", "shale", "carbonate"].into_iter().collect();
        assert_eq!(map.id_of("sand"), Some(0));
        assert_eq!(map.id_of("carbonate"), Some(2));
        assert_eq!(map.label_of(1), Some("shale"));
        assert_eq!(map.label_of(3), None);
    }

    #[test]
    fn reinserting_label_keeps_id() {
        let mut map = CategoryMap::new();
        assert_eq!(map.insert("a"), 0);
        assert_eq!(map.insert("b"), 1);
        assert_eq!(map.insert("a"), 0);
        assert_eq!(map.len(), 2);
    }

    proptest! {
        #[test]
        fn id_label_mapping_is_bijective(labels in prop::collection::hash_set("[a-z]{1,6}", 0..20)) {
            let map: CategoryMap = labels.iter().cloned().collect();
            for (id, label) in map.iter() {
                prop_assert_eq!(map.id_of(label), Some(id));
                prop_assert_eq!(map.label_of(id), Some(label));
            }
            prop_assert_eq!(map.len(), labels.len());
        }
    }
}
