//! Built-in crackers.
//!
//! Every cracker is a pure function of its input and the parameters it
//! was built with. "Not my format" is an empty candidate list, never an
//! error.

use unravel_kernel::carrier::value::{Format, Value};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::Cracker;

pub mod classic;
pub mod encoding;

/// Register every built-in cracker.
///
/// # Errors
///
/// Returns [`RegistryError`] if a name is already taken or the registry is sealed.
pub fn register_builtins(registry: &mut PluginRegistry<dyn Cracker>) -> Result<(), RegistryError> {
    encoding::register(registry)?;
    classic::register(registry)
}

/// Wrap decoder output in the input's format.
///
/// In text mode, output that is not UTF-8 comes back as bytes so the
/// engine can drop it as out-of-format.
pub(crate) fn decoded(input: &Value, bytes: Vec<u8>) -> Value {
    match input.format() {
        Format::Bytes => Value::Bytes(bytes),
        Format::Text => match String::from_utf8(bytes) {
            Ok(text) => Value::Text(text),
            Err(err) => Value::Bytes(err.into_bytes()),
        },
    }
}

/// Map every byte of `input` and keep the input's format.
///
/// `f` must map ASCII to ASCII and leave non-ASCII bytes alone, which
/// keeps text valid UTF-8.
pub(crate) fn map_ascii(input: &Value, f: impl Fn(u8) -> u8) -> Value {
    let mapped: Vec<u8> = input.as_bytes().iter().map(|&b| f(b)).collect();
    decoded(input, mapped)
}
