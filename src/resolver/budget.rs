//! Shared, shrink-only filename length budget.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::core::config::{DEFAULT_MAX_SAFE_FILENAME_BYTES, DEFAULT_MIN_PREFIX_BYTES, NamingConfig};

/// Current best-known maximum filename length, in bytes.
///
/// Clones share one counter: the pipeline owner creates a budget once and
/// hands clones to every resolver, so a limit discovered by one resolution
/// applies to all later ones. The value only ever decreases.
#[derive(Debug, Clone)]
pub struct SafeLengthBudget {
    max_bytes: Arc<AtomicUsize>,
    floor: usize,
}

impl SafeLengthBudget {
    #[must_use]
    pub fn new(max_bytes: usize, floor: usize) -> Self {
        Self {
            max_bytes: Arc::new(AtomicUsize::new(max_bytes)),
            floor,
        }
    }

    #[must_use]
    pub fn from_config(naming: &NamingConfig) -> Self {
        Self::new(naming.max_safe_filename_bytes, naming.min_prefix_bytes)
    }

    /// Current budget.
    #[must_use]
    pub fn current(&self) -> usize {
        self.max_bytes.load(Ordering::Acquire)
    }

    /// Minimum prefix length below which a length failure is fatal.
    #[must_use]
    pub const fn floor(&self) -> usize {
        self.floor
    }

    /// Shrink to one byte below `observed`, unless another holder already
    /// shrank further. Returns the budget in effect afterwards.
    pub fn shrink_below(&self, observed: usize) -> usize {
        let target = observed.saturating_sub(1);
        let previous = self.max_bytes.fetch_min(target, Ordering::AcqRel);
        previous.min(target)
    }
}

impl Default for SafeLengthBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAFE_FILENAME_BYTES, DEFAULT_MIN_PREFIX_BYTES)
    }
}
