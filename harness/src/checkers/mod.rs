//! Built-in checkers.

use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::Checker;

pub mod frequency;
pub mod pattern;
pub mod words;

/// Register every built-in checker.
///
/// # Errors
///
/// Returns [`RegistryError`] if a name is already taken or the registry is sealed.
pub fn register_builtins(registry: &mut PluginRegistry<dyn Checker>) -> Result<(), RegistryError> {
    words::register(registry)?;
    frequency::register(registry)?;
    pattern::register(registry)
}

/// Text view used by every checker: text values as-is, UTF-8 bytes decoded.
fn readable(value: &Value) -> Option<&str> {
    value.to_str_lossless()
}

/// Fraction of characters that are not control characters (whitespace counts as printable).
#[allow(clippy::cast_precision_loss)]
fn printable_ratio(value: &Value) -> f64 {
    match readable(value) {
        Some(text) => {
            let total = text.chars().count();
            if total == 0 {
                return 0.0;
            }
            let printable = text
                .chars()
                .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
                .count();
            printable as f64 / total as f64
        }
        None => {
            let bytes = value.as_bytes();
            if bytes.is_empty() {
                return 0.0;
            }
            let printable = bytes
                .iter()
                .filter(|b| b.is_ascii_graphic() || matches!(b, b' ' | b'\n' | b'\r' | b'\t'))
                .count();
            printable as f64 / bytes.len() as f64
        }
    }
}
