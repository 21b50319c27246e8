//! Search outcome, result path model, and replay verification.

use std::sync::Arc;
use std::time::Duration;

use unravel_kernel::carrier::value::Value;
use unravel_kernel::proof::canon::{canonical_json_bytes, canonical_json_digest, CanonError};
use unravel_kernel::proof::hash::{ContentHash, DOMAIN_SEARCH_RESULT};

use crate::contract::{CrackerError, Cracker};
use crate::scorer::quantize;

/// One applied decode operation. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeStep {
    /// Name of the cracker that produced `output`.
    pub operation: String,
    pub input: Value,
    pub output: Value,
    pub confidence: Option<f64>,
    pub key_info: Option<String>,
}

impl DecodeStep {
    fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "operation": self.operation,
            "input": self.input.to_json_value(),
            "output": self.output.to_json_value(),
            "confidence_ppm": self.confidence.map(quantize),
            "key_info": self.key_info,
        })
    }
}

/// `schema_version` of the canonical JSON form.
pub const SEARCH_RESULT_SCHEMA: &str = "search_result.v1";

/// An accepted decoding chain.
///
/// Invariant: `path[0].input` is the ciphertext, each step's input is the
/// previous step's output, and the last output is `final_value`. An empty
/// path means the ciphertext itself was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultV1 {
    /// Steps in application order.
    pub path: Vec<DecodeStep>,
    pub final_value: Value,
    /// Name of the checker that accepted `final_value`.
    pub accepted_by: String,
}

/// Why a replay did not reproduce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("step {step}: input does not match the previous output")]
    InputMismatch { step: usize },
    #[error("step {step}: no cracker named `{operation}`")]
    UnknownOperation { step: usize, operation: String },
    #[error("step {step}: {source}")]
    CrackerFailed {
        step: usize,
        #[source]
        source: CrackerError,
    },
    #[error("step {step}: recorded output not among the cracker's candidates")]
    OutputNotReproduced { step: usize },
    #[error("replayed chain does not end at the final value")]
    FinalValueMismatch,
}

impl SearchResultV1 {
    /// Number of decode steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Operation names in application order.
    #[must_use]
    pub fn operations(&self) -> Vec<&str> {
        self.path.iter().map(|s| s.operation.as_str()).collect()
    }

    /// Re-apply every step from `ciphertext` and confirm the chain.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReplayError`] encountered.
    pub fn replay(
        &self,
        ciphertext: &Value,
        crackers: &[Arc<dyn Cracker>],
    ) -> Result<(), ReplayError> {
        let mut current = ciphertext;
        for (step, s) in self.path.iter().enumerate() {
            if &s.input != current {
                return Err(ReplayError::InputMismatch { step });
            }
            let cracker = crackers
                .iter()
                .find(|c| c.name() == s.operation)
                .ok_or_else(|| ReplayError::UnknownOperation {
                    step,
                    operation: s.operation.clone(),
                })?;
            let outputs = cracker
                .apply(current)
                .map_err(|source| ReplayError::CrackerFailed { step, source })?;
            if !outputs.iter().any(|o| o.value == s.output) {
                return Err(ReplayError::OutputNotReproduced { step });
            }
            current = &s.output;
        }
        if current != &self.final_value {
            return Err(ReplayError::FinalValueMismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "schema_version": SEARCH_RESULT_SCHEMA,
            "path": self.path.iter().map(DecodeStep::to_json_value).collect::<Vec<_>>(),
            "final_value": self.final_value.to_json_value(),
            "accepted_by": self.accepted_by,
        })
    }

    /// Canonical JSON bytes; identical runs produce identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    /// Content digest of the canonical JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn digest(&self) -> Result<ContentHash, CanonError> {
        canonical_json_digest(DOMAIN_SEARCH_RESULT, &self.to_json_value())
    }
}

/// The search ran out of options without an accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustionReason {
    /// No unexpanded nodes remained.
    FrontierExhausted,
    /// `max_expansions` was reached.
    ExpansionBudgetExceeded,
}

/// The search gave up early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's [`crate::control::CancelToken`] fired.
    Signal,
    /// The policy timeout elapsed.
    Timeout,
}

/// How the search ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(SearchResultV1),
    Exhausted(ExhaustionReason),
    Cancelled(CancelReason),
}

impl SearchOutcome {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Found(_) => "found",
            Self::Exhausted(ExhaustionReason::FrontierExhausted) => "frontier_exhausted",
            Self::Exhausted(ExhaustionReason::ExpansionBudgetExceeded) => {
                "expansion_budget_exceeded"
            }
            Self::Cancelled(CancelReason::Signal) => "cancelled",
            Self::Cancelled(CancelReason::Timeout) => "timed_out",
        }
    }
}

/// Aggregate counters for one search call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatsV1 {
    pub expansions: u64,
    pub candidates_generated: u64,
    pub duplicates_suppressed: u64,
    pub cycles_suppressed: u64,
    /// Popped nodes whose value had since been reached by a shorter path.
    pub superseded_skipped: u64,
    /// Children at `max_depth` that were checked but not enqueued.
    pub depth_limited: u64,
    /// Candidates whose value was not in the run format.
    pub format_dropped: u64,
    /// Candidates dropped by `max_candidates_per_node`.
    pub candidates_truncated: u64,
    pub cracker_failures: u64,
    pub frontier_high_water: u64,
    pub frontier_pruned: u64,
    /// Speculative pops returned to the frontier unexpanded.
    pub speculative_requeues: u64,
    /// Not part of the canonical JSON form.
    pub elapsed: Duration,
}

impl SearchStatsV1 {
    /// Deterministic counters only, for canonical comparison.
    ///
    /// `speculative_requeues` and `elapsed` depend on scheduling and are
    /// omitted.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "expansions": self.expansions,
            "candidates_generated": self.candidates_generated,
            "duplicates_suppressed": self.duplicates_suppressed,
            "cycles_suppressed": self.cycles_suppressed,
            "superseded_skipped": self.superseded_skipped,
            "depth_limited": self.depth_limited,
            "format_dropped": self.format_dropped,
            "candidates_truncated": self.candidates_truncated,
            "cracker_failures": self.cracker_failures,
            "frontier_pruned": self.frontier_pruned,
        })
    }
}

/// Everything a searcher returns.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStatsV1,
}

impl SearchReport {
    #[must_use]
    pub fn result(&self) -> Option<&SearchResultV1> {
        match &self.outcome {
            SearchOutcome::Found(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_result(self) -> Option<SearchResultV1> {
        match self.outcome {
            SearchOutcome::Found(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Cancelled(_))
    }
}
