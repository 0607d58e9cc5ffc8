//! String-keyed factories for dynamically created capabilities.
//!
//! Registration happens on a [`RegistryBuilder`]; sealing it with
//! [`build`](RegistryBuilder::build) yields an immutable [`Registry`]
//! that can be shared freely and queried from any thread.

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::RegistryError;

/// Constructs a fresh instance from opaque init arguments.
///
/// Most factories ignore the argument.
pub type Factory<T> = fn(&str) -> Box<T>;

/// What registering an existing key does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail with [`RegistryError::DuplicateKey`].
    #[default]
    Reject,
    /// The new factory replaces the old one (keeping its position).
    Replace,
}

/// Mutable registry under construction.
///
/// # Examples
///
/// ```
/// use terrane_plugin::{CollisionPolicy, RegistryBuilder, RegistryError};
///
/// trait Greeter {
///     fn greet(&self) -> String;
/// }
///
/// struct Hello;
/// impl Greeter for Hello {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// fn hello(_: &str) -> Box<dyn Greeter> {
///     Box::new(Hello)
/// }
///
/// let mut builder = RegistryBuilder::<dyn Greeter>::new(CollisionPolicy::Reject);
/// builder.register("hello", hello).unwrap();
/// assert_eq!(
///     builder.register("hello", hello),
///     Err(RegistryError::DuplicateKey { key: "hello".into() })
/// );
///
/// let registry = builder.build();
/// assert_eq!(registry.create("hello", "").unwrap().greet(), "hello");
/// assert!(registry.create("bye", "").is_err());
/// ```
pub struct RegistryBuilder<T: ?Sized> {
    policy: CollisionPolicy,
    entries: IndexMap<String, Factory<T>>,
}

impl<T: ?Sized> RegistryBuilder<T> {
    /// An empty builder with a fixed collision policy.
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            entries: IndexMap::new(),
        }
    }

    /// The collision policy chosen at construction.
    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Register `factory` under `key`.
    pub fn register(&mut self, key: &str, factory: Factory<T>) -> Result<(), RegistryError> {
        if self.entries.contains_key(key) {
            match self.policy {
                CollisionPolicy::Reject => {
                    return Err(RegistryError::DuplicateKey { key: key.into() });
                }
                CollisionPolicy::Replace => debug!(key, "replacing registry entry"),
            }
        } else {
            debug!(key, "registered entry");
        }
        self.entries.insert(key.to_owned(), factory);
        Ok(())
    }

    /// Seal the builder.
    pub fn build(self) -> Registry<T> {
        Registry {
            entries: self.entries,
        }
    }
}

impl<T: ?Sized> fmt::Debug for RegistryBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("policy", &self.policy)
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Sealed, read-only map from keys to factories.
pub struct Registry<T: ?Sized> {
    entries: IndexMap<String, Factory<T>>,
}

impl<T: ?Sized> Registry<T> {
    /// Construct a fresh instance registered under `key`.
    pub fn create(&self, key: &str, init_args: &str) -> Result<Box<T>, RegistryError> {
        let factory = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::UnknownKey { key: key.into() })?;
        Ok(factory(init_args))
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape {
        fn sides(&self) -> u32;
    }

    struct Triangle;
    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    struct Polygon(u32);
    impl Shape for Polygon {
        fn sides(&self) -> u32 {
            self.0
        }
    }

    fn triangle(_: &str) -> Box<dyn Shape> {
        Box::new(Triangle)
    }

    fn square(_: &str) -> Box<dyn Shape> {
        Box::new(Polygon(4))
    }

    fn polygon(args: &str) -> Box<dyn Shape> {
        Box::new(Polygon(args.parse().unwrap_or(0)))
    }

    #[test]
    fn unknown_key_is_an_error() {
        let registry = RegistryBuilder::<dyn Shape>::new(CollisionPolicy::Reject).build();
        assert!(registry.is_empty());
        assert_eq!(
            registry.create("triangle", "").err(),
            Some(RegistryError::UnknownKey {
                key: "triangle".into()
            })
        );
    }

    #[test]
    fn reject_keeps_the_first_factory() {
        let mut builder = RegistryBuilder::<dyn Shape>::new(CollisionPolicy::Reject);
        builder.register("shape", triangle).unwrap();
        assert!(builder.register("shape", square).is_err());
        let registry = builder.build();
        assert_eq!(registry.create("shape", "").unwrap().sides(), 3);
    }

    #[test]
    fn replace_swaps_factory_in_place() {
        let mut builder = RegistryBuilder::<dyn Shape>::new(CollisionPolicy::Replace);
        builder.register("a", triangle).unwrap();
        builder.register("b", triangle).unwrap();
        builder.register("a", square).unwrap();
        let registry = builder.build();
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(registry.create("a", "").unwrap().sides(), 4);
    }

    #[test]
    fn init_args_reach_the_factory() {
        let mut builder = RegistryBuilder::<dyn Shape>::new(CollisionPolicy::Reject);
        builder.register("polygon", polygon).unwrap();
        let registry = builder.build();
        assert_eq!(registry.create("polygon", "7").unwrap().sides(), 7);
        assert_eq!(registry.create("polygon", "").unwrap().sides(), 0);
        assert!(registry.contains("polygon"));
        assert_eq!(registry.len(), 1);
    }
}
