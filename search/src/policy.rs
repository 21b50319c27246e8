//! Search policy: budgets, parallelism and check combination.

use std::time::Duration;

use crate::error::SearchError;
use crate::scorer::CheckCombine;

/// Upper bound on the worker pool size.
pub const MAX_WORKERS: usize = 64;

/// Search budget and scheduling configuration.
///
/// Every run is bounded by `max_depth` and `max_expansions`; `timeout`
/// and the caller's cancel token add wall-clock bounds on top.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    /// Longest decode chain considered (root = 0).
    pub max_depth: u32,
    /// Hard cap on committed node expansions.
    pub max_expansions: u64,
    /// Frontier prune threshold.
    pub max_frontier_size: u64,
    /// Candidate cap per expanded node (across all crackers).
    pub max_candidates_per_node: u64,
    /// Worker threads used for speculative expansion.
    pub workers: usize,
    /// Wall-clock budget. `None` means no timeout.
    pub timeout: Option<Duration>,
    /// Whether the ciphertext itself may be accepted (empty path).
    pub accept_root: bool,
    /// How multiple checker outcomes combine into a verdict.
    pub combine: CheckCombine,
}

impl SearchPolicy {
    /// Validate that every field is in its usable domain.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidPolicy`] naming the offending field.
    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |detail: &str| {
            Err(SearchError::InvalidPolicy {
                detail: detail.to_string(),
            })
        };
        if self.max_depth == 0 {
            return invalid("max_depth must be at least 1");
        }
        if self.max_expansions == 0 {
            return invalid("max_expansions must be at least 1");
        }
        if self.max_frontier_size == 0 {
            return invalid("max_frontier_size must be at least 1");
        }
        if self.max_candidates_per_node == 0 {
            return invalid("max_candidates_per_node must be at least 1");
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return invalid("workers must be in 1..=64");
        }
        if self.timeout == Some(Duration::ZERO) {
            return invalid("timeout must be positive when set");
        }
        Ok(())
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_expansions: 10_000,
            max_frontier_size: 100_000,
            max_candidates_per_node: 1_000,
            workers: 1,
            timeout: None,
            accept_root: true,
            combine: CheckCombine::Max,
        }
    }
}
