//! Ciphertext builders and configuration shortcuts.
//!
//! Ciphertexts are built in code from their plaintext so every test states
//! the chain it expects to be recovered.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use unravel_harness::catalog::PluginCatalog;
use unravel_harness::config::{ConfigBuilder, Configuration};
use unravel_harness::runner::search_report;
use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::ParamSchema;
use unravel_search::contract::{CheckOutcome, Checker, CrackOutput, Cracker, CrackerError};
use unravel_search::control::SearchControl;
use unravel_search::result::SearchReport;

/// Plaintext of the two-step chain scenario.
pub const PLAINTEXT: &str = "hello world";

/// Shift every ASCII letter forward by `shift` places.
#[must_use]
pub fn caesar_encrypt(text: &str, shift: u8) -> String {
    text.chars()
        .map(|c| {
            let base = match c {
                'a'..='z' => b'a',
                'A'..='Z' => b'A',
                _ => return c,
            };
            let offset = (c as u8 - base + shift % 26) % 26;
            char::from(base + offset)
        })
        .collect()
}

#[must_use]
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// `base64(caesar_3(PLAINTEXT))`.
#[must_use]
pub fn two_step_ciphertext() -> String {
    base64_encode(caesar_encrypt(PLAINTEXT, 3).as_bytes())
}

/// Deterministic pseudo-random bytes (64-bit LCG, high byte of each state).
#[must_use]
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state.to_be_bytes()[0]
        })
        .collect()
}

/// Checker that never accepts and never scores.
#[derive(Debug, Clone, Copy)]
pub struct Never;

impl Checker for Never {
    fn name(&self) -> &str {
        "never"
    }

    fn check(&self, _value: &Value) -> CheckOutcome {
        CheckOutcome::Reject
    }
}

/// Cracker that fails on every input.
#[derive(Debug, Clone, Copy)]
pub struct Brittle;

impl Cracker for Brittle {
    fn name(&self) -> &str {
        "brittle"
    }

    fn apply(&self, _value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        Err(CrackerError::new("brittle", "cannot interpret input"))
    }
}

/// Cracker that panics on every input.
#[derive(Debug, Clone, Copy)]
pub struct Explosive;

impl Cracker for Explosive {
    fn name(&self) -> &str {
        "explosive"
    }

    fn apply(&self, _value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        panic!("explosive cracker");
    }
}

/// Built-ins plus the `never` checker and the `brittle` and `explosive`
/// crackers, sealed.
///
/// # Panics
///
/// Panics if the catalog cannot be built.
#[must_use]
pub fn catalog() -> PluginCatalog {
    let mut catalog = PluginCatalog::with_builtins().expect("built-ins register");
    catalog
        .register_checker("never", "Reject everything", ParamSchema::empty(), |_| {
            Ok(Arc::new(Never) as Arc<dyn Checker>)
        })
        .expect("`never` is free");
    catalog
        .register_cracker("brittle", "Fail on every input", ParamSchema::empty(), |_| {
            Ok(Arc::new(Brittle) as Arc<dyn Cracker>)
        })
        .expect("`brittle` is free");
    catalog
        .register_cracker("explosive", "Panic on every input", ParamSchema::empty(), |_| {
            Ok(Arc::new(Explosive) as Arc<dyn Cracker>)
        })
        .expect("`explosive` is free");
    catalog.seal();
    catalog
}

/// Resolve a configuration from role selections and `plugin.name=value` tokens.
///
/// # Panics
///
/// Panics if the configuration is invalid.
#[must_use]
pub fn config(crackers: &[&str], checkers: &[&str], tokens: &[&str]) -> Configuration {
    let mut builder = ConfigBuilder::new();
    if !crackers.is_empty() {
        builder.crackers(crackers.iter().copied());
    }
    if !checkers.is_empty() {
        builder.checkers(checkers.iter().copied());
    }
    builder
        .apply_tokens(tokens.iter().copied())
        .expect("well-formed tokens");
    builder.build(&catalog()).expect("valid configuration")
}

/// Run a search with default control.
///
/// # Panics
///
/// Panics on pre-flight or replay failure.
#[must_use]
pub fn run(config: &Configuration, input: &Value) -> SearchReport {
    search_report(config, input, &SearchControl::new()).expect("search runs")
}

/// Canonical description of a report: outcome, result digest and stats.
///
/// # Panics
///
/// Panics if the result cannot be canonicalised.
#[must_use]
pub fn report_digest_lines(report: &SearchReport) -> String {
    let result = report
        .result()
        .map_or_else(|| "none".to_string(), |r| r.digest().expect("canonical").to_string());
    format!(
        "outcome={}\nresult_digest={}\nstats={}\n",
        report.outcome.kind(),
        result,
        report.stats.to_json_value()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caesar_encrypt_shifts_letters_only() {
        assert_eq!(caesar_encrypt("Hello, xyz!", 3), "Khoor, abc!");
    }

    #[test]
    fn two_step_ciphertext_is_base64_of_shifted_text() {
        assert_eq!(two_step_ciphertext(), "a2hvb3IgenJ1b2c=");
    }

    #[test]
    fn noise_is_reproducible() {
        assert_eq!(noise(32, 7), noise(32, 7));
        assert_ne!(noise(32, 7), noise(32, 8));
    }
}
