//! Harness runner: one ciphertext through a resolved configuration.
//!
//! # Pipeline
//!
//! ```text
//! coerce_input() → searcher.search() → replay() → render()
//! ```
//!
//! The runner owns no search logic. It adapts the input to the run
//! format, delegates to the configured searcher, and re-applies a found
//! chain before reporting it. A chain that does not replay is a runner
//! error, never a result.

use std::fmt::Write as _;

use tracing::{info, warn};
use unravel_kernel::carrier::value::{Format, Value};
use unravel_search::control::SearchControl;
use unravel_search::error::SearchError;
use unravel_search::result::{
    CancelReason, ExhaustionReason, ReplayError, SearchOutcome, SearchReport, SearchResultV1,
};

use crate::config::{ConfigError, Configuration};

/// Shown when no chain was accepted.
pub const FAILED_TO_CRACK: &str = "Failed to crack";

/// Error during a harness run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Search(#[from] SearchError),
    /// The searcher reported a chain that does not re-apply.
    #[error("reported chain failed replay: {0}")]
    ReplayDivergence(#[from] ReplayError),
}

/// Outcome of [`decrypt`], ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Decryption {
    Solved {
        /// Output of [`render`] at the configured verbosity.
        rendered: String,
        result: SearchResultV1,
    },
    NotFound(ExhaustionReason),
    Cancelled(CancelReason),
}

impl Decryption {
    /// Text for the user: the rendered result, or a failure line.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Solved { rendered, .. } => rendered,
            Self::NotFound(_) => FAILED_TO_CRACK,
            Self::Cancelled(CancelReason::Signal) => "Cancelled",
            Self::Cancelled(CancelReason::Timeout) => "Timed out",
        }
    }

    #[must_use]
    pub fn result(&self) -> Option<&SearchResultV1> {
        match self {
            Self::Solved { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// Re-express `input` in the run format.
///
/// Text input for a bytes run is taken as its UTF-8 encoding; bytes input
/// for a text run must be valid UTF-8.
///
/// # Errors
///
/// Returns [`ConfigError::FormatMismatch`] for non-UTF-8 bytes in a text run.
pub fn coerce_input(input: &Value, format: Format) -> Result<Value, ConfigError> {
    input
        .clone()
        .into_format(format)
        .ok_or_else(|| ConfigError::FormatMismatch {
            expected: format,
            detail: "bytes are not valid UTF-8".to_string(),
        })
}

/// Human-readable rendering of an accepted chain.
///
/// Negative verbosity prints the plaintext alone. Otherwise one line per
/// step is printed, followed by the plaintext.
#[must_use]
pub fn render(result: &SearchResultV1, verbosity: i32) -> String {
    if verbosity < 0 {
        return result.final_value.to_string();
    }
    let mut out = String::new();
    if result.path.is_empty() {
        let _ = writeln!(out, "Accepted as given by {}", result.accepted_by);
    } else {
        let _ = writeln!(out, "Formats used:");
        for step in &result.path {
            match &step.key_info {
                Some(key) => {
                    let _ = writeln!(out, "    {}: {key}", step.operation);
                }
                None => {
                    let _ = writeln!(out, "    {}", step.operation);
                }
            }
        }
    }
    if verbosity > 0 {
        let _ = writeln!(out, "Accepted by: {}", result.accepted_by);
    }
    let _ = write!(out, "Final result: [{}]", result.final_value);
    out
}

/// Search with default control. See [`decrypt_with`].
///
/// # Errors
///
/// See [`decrypt_with`].
pub fn decrypt(config: &Configuration, input: &Value) -> Result<Decryption, RunError> {
    decrypt_with(config, input, &SearchControl::new())
}

/// Coerce, search, replay and render.
///
/// # Errors
///
/// Returns [`RunError::Config`] if the input cannot be coerced,
/// [`RunError::Search`] for pre-flight failures, and
/// [`RunError::ReplayDivergence`] if a reported chain does not replay.
pub fn decrypt_with(
    config: &Configuration,
    input: &Value,
    control: &SearchControl,
) -> Result<Decryption, RunError> {
    let report = search_report(config, input, control)?;
    let decryption = match report.outcome {
        SearchOutcome::Found(result) => Decryption::Solved {
            rendered: render(&result, config.verbosity),
            result,
        },
        SearchOutcome::Exhausted(reason) => Decryption::NotFound(reason),
        SearchOutcome::Cancelled(reason) => Decryption::Cancelled(reason),
    };
    Ok(decryption)
}

/// The full [`SearchReport`] for `input`, with a found chain replayed.
///
/// # Errors
///
/// See [`decrypt_with`].
pub fn search_report(
    config: &Configuration,
    input: &Value,
    control: &SearchControl,
) -> Result<SearchReport, RunError> {
    let ciphertext = coerce_input(input, config.format)?;
    let plugins = config.plugin_set();
    let report = config
        .searcher
        .instance
        .search(&ciphertext, &plugins, control)?;

    if let Some(result) = report.result() {
        if let Err(e) = result.replay(&ciphertext, &plugins.crackers) {
            warn!(error = %e, "reported chain does not replay");
            return Err(e.into());
        }
    }
    info!(
        outcome = report.outcome.kind(),
        expansions = report.stats.expansions,
        elapsed_ms = u64::try_from(report.stats.elapsed.as_millis()).unwrap_or(u64::MAX),
        "decrypt finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PluginCatalog;
    use crate::config::ConfigBuilder;
    use unravel_search::result::DecodeStep;

    fn config(tokens: &[&str]) -> Configuration {
        let mut builder = ConfigBuilder::new();
        builder.apply_tokens(tokens.iter().copied()).unwrap();
        builder.build(&PluginCatalog::builtin().unwrap()).unwrap()
    }

    fn sample() -> SearchResultV1 {
        SearchResultV1 {
            path: vec![
                DecodeStep {
                    operation: "base64".into(),
                    input: Value::from("S2hvb3IGWnJ1b2c="),
                    output: Value::from("Khoor Zruog"),
                    confidence: None,
                    key_info: None,
                },
                DecodeStep {
                    operation: "caesar".into(),
                    input: Value::from("Khoor Zruog"),
                    output: Value::from("Hello World"),
                    confidence: None,
                    key_info: Some("shift=3".into()),
                },
            ],
            final_value: Value::from("Hello World"),
            accepted_by: "wordlist".into(),
        }
    }

    #[test]
    fn render_lists_steps_then_plaintext() {
        let text = render(&sample(), 0);
        assert_eq!(
            text,
            "Formats used:\n    base64\n    caesar: shift=3\nFinal result: [Hello World]"
        );
        assert!(render(&sample(), 1).contains("Accepted by: wordlist"));
    }

    #[test]
    fn quiet_render_is_plaintext_only() {
        assert_eq!(render(&sample(), -1), "Hello World");
    }

    #[test]
    fn coerce_follows_run_format() {
        assert_eq!(
            coerce_input(&Value::from("hi"), Format::Bytes).unwrap(),
            Value::Bytes(b"hi".to_vec())
        );
        assert_eq!(
            coerce_input(&Value::Bytes(b"hi".to_vec()), Format::Text).unwrap(),
            Value::from("hi")
        );
        assert!(matches!(
            coerce_input(&Value::Bytes(vec![0xff, 0xfe]), Format::Text),
            Err(ConfigError::FormatMismatch { .. })
        ));
    }

    #[test]
    fn decrypts_hex_encoded_english() {
        let config = config(&[]);
        let input = Value::from(hex_of("hello world"));
        let decryption = decrypt(&config, &input).unwrap();
        let result = decryption.result().expect("solved");
        assert_eq!(result.final_value, Value::from("hello world"));
        assert_eq!(result.operations(), vec!["hex"]);
        assert!(decryption.message().starts_with("Formats used:"));
    }

    #[test]
    fn plaintext_input_is_accepted_as_given() {
        let config = config(&["best_first.accept_root=true"]);
        let decryption = decrypt(&config, &Value::from("the quick brown fox")).unwrap();
        assert!(decryption.result().expect("solved").is_empty());
    }

    #[test]
    fn unsolvable_input_reports_failure() {
        let config = config(&["best_first.max_depth=2"]);
        let decryption = decrypt(&config, &Value::from("%%%%")).unwrap();
        assert!(matches!(decryption, Decryption::NotFound(_)));
        assert_eq!(decryption.message(), FAILED_TO_CRACK);
    }

    #[test]
    fn caller_cancellation_surfaces() {
        let config = config(&[]);
        let control = SearchControl::new();
        control.cancel.cancel();
        let decryption = decrypt_with(&config, &Value::from("SGVsbG8="), &control).unwrap();
        assert_eq!(decryption, Decryption::Cancelled(CancelReason::Signal));
    }

    fn hex_of(text: &str) -> String {
        text.bytes().map(|b| format!("{b:02x}")).collect()
    }
}
