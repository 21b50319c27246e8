//! Shared inputs for the unravel benchmark suites.

use unravel_harness::catalog::PluginCatalog;
use unravel_harness::config::{ConfigBuilder, Configuration};

/// `base64(caesar_3("hello world"))`.
pub const TWO_STEP: &str = "a2hvb3IgenJ1b2c=";

/// `hex("the quick brown fox jumps over the lazy dog")`.
pub const HEX_PANGRAM: &str =
    "74686520717569636b2062726f776e20666f78206a756d7073206f76657220746865206c617a7920646f67";

/// Built-in configuration with `tokens` applied.
///
/// # Panics
///
/// Panics if the catalog or configuration is invalid. Benchmark setup
/// failures are fatal.
#[must_use]
pub fn configuration(crackers: &[&str], tokens: &[&str]) -> Configuration {
    let catalog = PluginCatalog::builtin().expect("built-in catalog");
    let mut builder = ConfigBuilder::new();
    if !crackers.is_empty() {
        builder.crackers(crackers.iter().copied());
    }
    builder
        .apply_tokens(tokens.iter().copied())
        .expect("well-formed tokens");
    builder.build(&catalog).expect("valid configuration")
}
