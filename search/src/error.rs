//! Typed search errors.
//!
//! `SearchError` represents pre-flight failures only. Runtime terminations
//! (no solution, budget exhaustion, cancellation) are expressed via
//! [`crate::result::SearchOutcome`] and never surface as errors. Per-call
//! cracker failures are [`crate::contract::CrackerError`] and stay inside
//! the engine.

use unravel_kernel::carrier::value::Format;

/// Typed failure for pre-flight search validation.
///
/// These errors are returned before the first expansion. No search state
/// exists when one of them is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// A configured cracker cannot operate on the run format.
    #[error("cracker `{cracker}` does not support the {format} format")]
    CrackerFormatMismatch { cracker: String, format: Format },
    /// The ciphertext is not in the run format.
    #[error("ciphertext is {actual} but the run format is {expected}")]
    InputFormatMismatch { expected: Format, actual: Format },
    /// No crackers configured.
    #[error("no crackers configured")]
    NoCrackers,
    /// No checkers configured; nothing could ever be accepted.
    #[error("no checkers configured")]
    NoCheckers,
    /// A policy field is outside its usable domain.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },
}
