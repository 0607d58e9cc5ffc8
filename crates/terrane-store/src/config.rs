//! Store configuration.

use crate::error::StoreError;

/// How a swap batch reacts to a per-item failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwapPolicy {
    /// Record the failure in the report and move on to the next name.
    #[default]
    Continue,
    /// Stop at the first failure; later names are not attempted.
    FailFast,
}

/// Configuration for a [`PropertyStore`](crate::PropertyStore).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on bytes held by resident property arrays.
    ///
    /// When exceeded, least-recently-accessed properties are persisted
    /// until the store fits again. `None` (the default) disables
    /// eviction.
    pub memory_budget_bytes: Option<u64>,
    /// Failure handling for `swap_to_disk` / `swap_to_ram` batches.
    pub swap_policy: SwapPolicy,
}

impl StoreConfig {
    /// Check the configuration for internal consistency.
    ///
    /// A budget of zero bytes is rejected: it would evict every property
    /// as soon as it was touched.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.memory_budget_bytes == Some(0) {
            return Err(StoreError::InvalidConfig {
                reason: "memory_budget_bytes must be positive".into(),
            });
        }
        Ok(())
    }

    /// Config with a memory budget and default swap policy.
    pub fn with_budget(bytes: u64) -> Self {
        Self {
            memory_budget_bytes: Some(bytes),
            ..Self::default()
        }
    }
}
