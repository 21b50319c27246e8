//! Plugin contracts: decode operations, plausibility oracles and searchers.
//!
//! # Contract
//!
//! - [`Cracker::apply`] and [`Checker::check`] must be pure functions of
//!   their input and the instance's construction parameters. The engine
//!   calls them from several worker threads at once.
//! - Both must terminate in bounded time for arbitrary input. The engine
//!   treats a single call as atomic and cannot preempt it.
//! - "Not my format" is an empty `Vec` from `apply`, never an error.
//!   [`CrackerError`] is reserved for input the cracker was asked to
//!   interpret and could not.

use std::fmt;
use std::sync::Arc;

use unravel_kernel::carrier::value::{Format, Value};

use crate::control::SearchControl;
use crate::error::SearchError;
use crate::result::SearchReport;

/// Both representations. Default for [`Cracker::formats`].
pub const ALL_FORMATS: &[Format] = &[Format::Text, Format::Bytes];

/// One candidate produced by a cracker.
#[derive(Debug, Clone, PartialEq)]
pub struct CrackOutput {
    /// Decoded value, in the same format as the input.
    pub value: Value,
    /// Optional cracker-side confidence in `[0, 1]`. Recorded, not ranked on.
    pub confidence: Option<f64>,
    /// Human-readable key material (e.g. `shift=3`).
    pub key_info: Option<String>,
}

impl CrackOutput {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            confidence: None,
            key_info: None,
        }
    }

    #[must_use]
    pub fn with_key(mut self, key_info: impl Into<String>) -> Self {
        self.key_info = Some(key_info.into());
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// A single cracker invocation failed on malformed input.
///
/// Isolated per node: the engine counts it and treats the call as having
/// produced no children.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cracker `{cracker}` failed: {detail}")]
pub struct CrackerError {
    pub cracker: String,
    pub detail: String,
}

impl CrackerError {
    #[must_use]
    pub fn new(cracker: &str, detail: impl Into<String>) -> Self {
        Self {
            cracker: cracker.to_string(),
            detail: detail.into(),
        }
    }
}

/// A decode operation.
pub trait Cracker: Send + Sync {
    /// Registry name; recorded in every [`crate::result::DecodeStep`] it produces.
    fn name(&self) -> &str;

    /// Formats this cracker can consume and produce.
    fn formats(&self) -> &[Format] {
        ALL_FORMATS
    }

    /// Cheap pre-filter. `false` skips `apply` for this value.
    fn can_apply(&self, _value: &Value) -> bool {
        true
    }

    /// Produce zero or more candidate decodings of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CrackerError`] only for input the cracker recognised but
    /// could not interpret.
    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError>;
}

/// Verdict of a single checker on a single value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckOutcome {
    /// This value is the final plaintext.
    Accept,
    /// Not plaintext; contributes no score.
    Reject,
    /// Not accepted, but this likely. Clamped to `[0, 1]`.
    Score(f64),
}

/// A plausibility oracle.
pub trait Checker: Send + Sync {
    fn name(&self) -> &str;

    /// Judge `value`. Runs on the hot path for every candidate; no I/O.
    fn check(&self, value: &Value) -> CheckOutcome;
}

/// A search algorithm that can be selected by name.
pub trait Searcher: Send + Sync {
    fn name(&self) -> &str;

    /// Search for a decoding chain that turns `ciphertext` into accepted plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] for pre-flight failures only.
    fn search(
        &self,
        ciphertext: &Value,
        plugins: &PluginSet,
        control: &SearchControl,
    ) -> Result<SearchReport, SearchError>;
}

/// The instantiated plugins a search runs with.
///
/// Immutable for the duration of a search; shared by all workers without locking.
#[derive(Clone)]
pub struct PluginSet {
    pub format: Format,
    /// Applied in this order when expanding a node.
    pub crackers: Vec<Arc<dyn Cracker>>,
    /// Consulted in this order; the first `Accept` short-circuits.
    pub checkers: Vec<Arc<dyn Checker>>,
}

impl PluginSet {
    #[must_use]
    pub fn new(
        format: Format,
        crackers: Vec<Arc<dyn Cracker>>,
        checkers: Vec<Arc<dyn Checker>>,
    ) -> Self {
        Self {
            format,
            crackers,
            checkers,
        }
    }

    /// Look up a cracker by name.
    #[must_use]
    pub fn cracker(&self, name: &str) -> Option<&Arc<dyn Cracker>> {
        self.crackers.iter().find(|c| c.name() == name)
    }

    /// Pre-flight checks: non-empty roles and format agreement.
    ///
    /// # Errors
    ///
    /// See [`SearchError`].
    pub fn validate(&self, ciphertext: &Value) -> Result<(), SearchError> {
        if self.crackers.is_empty() {
            return Err(SearchError::NoCrackers);
        }
        if self.checkers.is_empty() {
            return Err(SearchError::NoCheckers);
        }
        if let Some(c) = self
            .crackers
            .iter()
            .find(|c| !c.formats().contains(&self.format))
        {
            return Err(SearchError::CrackerFormatMismatch {
                cracker: c.name().to_string(),
                format: self.format,
            });
        }
        if ciphertext.format() != self.format {
            return Err(SearchError::InputFormatMismatch {
                expected: self.format,
                actual: ciphertext.format(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSet")
            .field("format", &self.format)
            .field(
                "crackers",
                &self.crackers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "checkers",
                &self.checkers.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
