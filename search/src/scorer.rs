//! Combining checker outcomes into a node verdict and frontier priority.
//!
//! Scores are real numbers in `[0, 1]`, quantized to integer parts per
//! million before they enter the frontier key so that ordering is total
//! and bit-reproducible across platforms.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;
use unravel_kernel::carrier::value::Value;

use crate::contract::{CheckOutcome, Checker};

/// Scale of quantized priorities: `1.0` maps to `PPM`.
pub const PPM: i64 = 1_000_000;

/// Priority of a node for which no checker reported a score.
pub const NO_SCORE_PRIORITY: i64 = -1;

/// How outcomes from several checkers combine.
///
/// Every rule accepts as soon as any checker accepts; they differ in how
/// scores become a priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckCombine {
    /// Priority is the highest reported score.
    #[default]
    Max,
    /// Priority is the mean of reported scores (rejections do not count).
    Mean,
}

impl CheckCombine {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Mean => "mean",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "max" => Some(Self::Max),
            "mean" => Some(Self::Mean),
            _ => None,
        }
    }
}

/// The combined verdict for one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Name of the first checker that accepted, if any.
    pub accepted_by: Option<String>,
    /// Quantized priority; [`NO_SCORE_PRIORITY`] if no checker scored.
    pub priority: i64,
}

impl Evaluation {
    #[must_use]
    pub fn is_accept(&self) -> bool {
        self.accepted_by.is_some()
    }
}

/// Quantize a score to parts per million, clamping to `[0, 1]`.
///
/// NaN maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(score: f64) -> i64 {
    if score.is_nan() {
        return 0;
    }
    (score.clamp(0.0, 1.0) * PPM as f64).round() as i64
}

/// Run `checkers` in order against `value` and combine their outcomes.
///
/// A panicking checker is logged and counted as `Reject`.
#[must_use]
pub fn evaluate(checkers: &[Arc<dyn Checker>], value: &Value, combine: CheckCombine) -> Evaluation {
    let mut scores: Vec<i64> = Vec::new();
    for checker in checkers {
        let outcome = catch_unwind(AssertUnwindSafe(|| checker.check(value))).unwrap_or_else(|_| {
            warn!(checker = checker.name(), "checker panicked; treating as reject");
            CheckOutcome::Reject
        });
        match outcome {
            CheckOutcome::Accept => {
                return Evaluation {
                    accepted_by: Some(checker.name().to_string()),
                    priority: PPM,
                };
            }
            CheckOutcome::Reject => {}
            CheckOutcome::Score(s) => scores.push(quantize(s)),
        }
    }
    let priority = match (combine, scores.is_empty()) {
        (_, true) => NO_SCORE_PRIORITY,
        (CheckCombine::Max, false) => scores.iter().copied().max().unwrap_or(NO_SCORE_PRIORITY),
        (CheckCombine::Mean, false) => {
            let sum: i64 = scores.iter().sum();
            let n = i64::try_from(scores.len()).unwrap_or(i64::MAX);
            sum / n
        }
    };
    Evaluation {
        accepted_by: None,
        priority,
    }
}
