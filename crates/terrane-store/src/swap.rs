//! Batched tier transitions and their per-item reports.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::budget::MemoryBudget;
use crate::config::SwapPolicy;
use crate::error::StoreError;
use crate::property::Property;

/// Direction of a tier transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapDirection {
    /// Resident to persisted.
    ToDisk,
    /// Persisted to resident.
    ToRam,
}

impl fmt::Display for SwapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToDisk => write!(f, "disk"),
            Self::ToRam => write!(f, "ram"),
        }
    }
}

/// Outcome for one name in a swap batch.
#[derive(Debug)]
pub struct SwapItem {
    /// The property name as requested.
    pub name: String,
    /// `Ok(())` if the property changed tier.
    pub outcome: Result<(), StoreError>,
}

/// Per-item results of a swap batch, in request order.
#[derive(Debug)]
pub struct SwapReport {
    /// Which way the batch moved properties.
    pub direction: SwapDirection,
    /// One entry per attempted name.
    pub items: Vec<SwapItem>,
    /// Names not attempted because a fail-fast batch stopped early.
    pub skipped: Vec<String>,
}

impl SwapReport {
    /// Number of properties that changed tier.
    pub fn swapped(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_ok()).count()
    }

    /// Items that did not change tier, with the reason.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &StoreError)> {
        self.items
            .iter()
            .filter_map(|i| i.outcome.as_ref().err().map(|e| (i.name.as_str(), e)))
    }

    /// Whether every requested name changed tier.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.items.iter().all(|i| i.outcome.is_ok())
    }
}

/// A name resolved (or not) against a store.
pub(crate) type SwapTarget = (String, Option<Arc<Property>>);

/// Move each target to the requested tier, recording one item per name.
///
/// After a batch into memory the budget is enforced once, with every
/// property the batch loaded pinned, so nothing reported as swapped is
/// evicted again by its own batch.
pub(crate) fn run_batch(
    direction: SwapDirection,
    targets: Vec<SwapTarget>,
    policy: SwapPolicy,
    budget: &MemoryBudget,
) -> SwapReport {
    let mut report = SwapReport {
        direction,
        items: Vec::with_capacity(targets.len()),
        skipped: Vec::new(),
    };
    let mut loaded = Vec::new();
    let mut targets = targets.into_iter();
    for (name, property) in targets.by_ref() {
        let outcome = match property {
            None => Err(StoreError::UnknownProperty { name: name.clone() }),
            Some(p) => {
                let outcome = transition(&name, &p, direction);
                if outcome.is_ok() && direction == SwapDirection::ToRam {
                    loaded.push(p.id());
                }
                outcome
            }
        };
        match &outcome {
            Ok(()) => debug!(property = %name, to = %direction, "swapped property"),
            Err(e) => warn!(property = %name, to = %direction, error = %e, "property not swapped"),
        }
        let failed = outcome.is_err();
        report.items.push(SwapItem { name, outcome });
        if failed && policy == SwapPolicy::FailFast {
            break;
        }
    }
    report.skipped.extend(targets.map(|(name, _)| name));
    if !loaded.is_empty() {
        budget.enforce(&loaded);
    }
    info!(
        to = %direction,
        swapped = report.swapped(),
        failed = report.items.len() - report.swapped(),
        skipped = report.skipped.len(),
        "swap batch finished"
    );
    report
}

fn transition(name: &str, property: &Property, direction: SwapDirection) -> Result<(), StoreError> {
    let changed = match direction {
        SwapDirection::ToDisk => property.persist()?,
        SwapDirection::ToRam => property.load()?,
    };
    match (changed, direction) {
        (true, _) => Ok(()),
        (false, SwapDirection::ToDisk) => Err(StoreError::NotResident { name: name.into() }),
        (false, SwapDirection::ToRam) => Err(StoreError::AlreadyResident { name: name.into() }),
    }
}
