//! Classical substitution and transposition ciphers.

use std::sync::Arc;

use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::{ParamError, ParamSchema, ParamSpec};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{CrackOutput, Cracker, CrackerError};

use super::{decoded, map_ascii};

/// Register the ciphers in this module.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register(registry: &mut PluginRegistry<dyn Cracker>) -> Result<(), RegistryError> {
    registry.register(
        "caesar",
        "Every Caesar shift of the ASCII letters",
        ParamSchema::new(vec![ParamSpec::int(
            "max_shift",
            25,
            1,
            25,
            "largest shift tried",
        )]),
        |params| {
            let max_shift = params
                .get_int("max_shift")
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| ParamError::Missing {
                    name: "max_shift".into(),
                })?;
            Ok(Arc::new(Caesar { max_shift }) as Arc<dyn Cracker>)
        },
    )?;
    registry.register(
        "atbash",
        "Mirror the alphabet (a <-> z)",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Atbash) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "reverse",
        "Reverse characters (text) or bytes",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Reverse) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "rot47",
        "Rotate printable ASCII by 47",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Rot47) as Arc<dyn Cracker>),
    )
}

fn has_letters(value: &Value) -> bool {
    value.as_bytes().iter().any(u8::is_ascii_alphabetic)
}

fn rotate_letter(b: u8, by: u8) -> u8 {
    let base = match b {
        b'a'..=b'z' => b'a',
        b'A'..=b'Z' => b'A',
        _ => return b,
    };
    base + (b - base + by) % 26
}

/// Caesar shift `N` maps each letter back by `N` positions.
#[derive(Debug, Clone, Copy)]
pub struct Caesar {
    max_shift: u8,
}

impl Caesar {
    #[must_use]
    pub fn new(max_shift: u8) -> Self {
        Self {
            max_shift: max_shift.clamp(1, 25),
        }
    }
}

impl Cracker for Caesar {
    fn name(&self) -> &str {
        "caesar"
    }

    fn can_apply(&self, value: &Value) -> bool {
        has_letters(value)
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        Ok((1..=self.max_shift)
            .map(|shift| {
                let out = map_ascii(value, |b| rotate_letter(b, 26 - shift));
                CrackOutput::new(out).with_key(format!("shift={shift}"))
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Atbash;

impl Cracker for Atbash {
    fn name(&self) -> &str {
        "atbash"
    }

    fn can_apply(&self, value: &Value) -> bool {
        has_letters(value)
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let out = map_ascii(value, |b| match b {
            b'a'..=b'z' => b'z' - (b - b'a'),
            b'A'..=b'Z' => b'Z' - (b - b'A'),
            _ => b,
        });
        Ok(vec![CrackOutput::new(out)])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reverse;

impl Cracker for Reverse {
    fn name(&self) -> &str {
        "reverse"
    }

    fn can_apply(&self, value: &Value) -> bool {
        value.len() > 1
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let out = match value {
            Value::Text(s) => Value::Text(s.chars().rev().collect()),
            Value::Bytes(b) => decoded(value, b.iter().rev().copied().collect()),
        };
        Ok(vec![CrackOutput::new(out)])
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rot47;

impl Cracker for Rot47 {
    fn name(&self) -> &str {
        "rot47"
    }

    fn can_apply(&self, value: &Value) -> bool {
        value.as_bytes().iter().any(|b| (33..=126).contains(b))
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let out = map_ascii(value, |b| match b {
            33..=126 => 33 + (b - 33 + 47) % 94,
            _ => b,
        });
        Ok(vec![CrackOutput::new(out)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(outputs: Vec<CrackOutput>) -> Vec<String> {
        outputs
            .into_iter()
            .map(|o| o.value.as_text().unwrap().to_string())
            .collect()
    }

    #[test]
    fn caesar_yields_every_shift_in_order() {
        let out = Caesar::new(25).apply(&Value::from("Khoor")).unwrap();
        assert_eq!(out.len(), 25);
        assert_eq!(out[2].value, Value::from("Hello"));
        assert_eq!(out[2].key_info.as_deref(), Some("shift=3"));
        assert_eq!(out[0].key_info.as_deref(), Some("shift=1"));
    }

    #[test]
    fn caesar_respects_max_shift_and_leaves_non_letters() {
        let out = Caesar::new(2).apply(&Value::from("b-1")).unwrap();
        assert_eq!(texts(out), vec!["a-1", "z-1"]);
    }

    #[test]
    fn caesar_needs_letters() {
        assert!(!Caesar::new(25).can_apply(&Value::from("1234")));
    }

    #[test]
    fn atbash_mirrors() {
        let out = Atbash.apply(&Value::from("Hello, World")).unwrap();
        assert_eq!(texts(out), vec!["Svool, Dliow"]);
    }

    #[test]
    fn reverse_handles_text_and_bytes() {
        assert_eq!(texts(Reverse.apply(&Value::from("héllo")).unwrap()), vec!["olléh"]);
        let out = Reverse.apply(&Value::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(out[0].value, Value::Bytes(vec![3, 2, 1]));
    }

    #[test]
    fn rot47_is_an_involution() {
        let once = Rot47.apply(&Value::from("Hello!")).unwrap();
        assert_eq!(once[0].value, Value::from("w6==@P"));
        let twice = Rot47.apply(&once[0].value).unwrap();
        assert_eq!(twice[0].value, Value::from("Hello!"));
    }
}
