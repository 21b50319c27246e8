//! Fixed-alphabet decoders: base64, base32, hex, binary, decimal, url.
//!
//! Each decoder reads the input as text (bytes input must be UTF-8) and
//! returns at most one candidate per alphabet.

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use percent_encoding::percent_decode_str;
use unravel_kernel::carrier::value::Value;
use unravel_kernel::plugin::params::{ParamSchema, ParamSpec};
use unravel_kernel::plugin::registry::{PluginRegistry, RegistryError};
use unravel_search::contract::{CrackOutput, Cracker, CrackerError};

use super::decoded;

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const BASE64_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);
const BASE64_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Register the decoders in this module.
///
/// # Errors
///
/// Returns [`RegistryError`] on a name clash or a sealed registry.
pub fn register(registry: &mut PluginRegistry<dyn Cracker>) -> Result<(), RegistryError> {
    registry.register(
        "base64",
        "Base64 decoding, padded or unpadded",
        ParamSchema::new(vec![ParamSpec::bool(
            "url_safe",
            true,
            "also try the URL-safe alphabet (`-` and `_`)",
        )]),
        |params| {
            let url_safe = params.get_bool("url_safe").unwrap_or(true);
            Ok(Arc::new(Base64 { url_safe }) as Arc<dyn Cracker>)
        },
    )?;
    registry.register(
        "base32",
        "RFC 4648 base32 decoding, case-insensitive",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Base32) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "hex",
        "Hexadecimal decoding, optional 0x prefix and separators",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Hex) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "binary",
        "Groups of eight binary digits",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Binary) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "decimal",
        "Byte values 0-255 separated by spaces or commas",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Decimal) as Arc<dyn Cracker>),
    )?;
    registry.register(
        "url",
        "Percent decoding",
        ParamSchema::empty(),
        |_| Ok(Arc::new(Url) as Arc<dyn Cracker>),
    )
}

/// Text view of the input, or `None` for non-UTF-8 bytes.
fn text_of(value: &Value) -> Option<&str> {
    value.to_str_lossless().map(str::trim).filter(|s| !s.is_empty())
}

fn single(input: &Value, bytes: Vec<u8>) -> Vec<CrackOutput> {
    if bytes.is_empty() {
        return Vec::new();
    }
    vec![CrackOutput::new(decoded(input, bytes))]
}

// ---------------------------------------------------------------------------
// base64
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Base64 {
    url_safe: bool,
}

impl Cracker for Base64 {
    fn name(&self) -> &str {
        "base64"
    }

    fn can_apply(&self, value: &Value) -> bool {
        text_of(value).is_some_and(|s| {
            s.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '-' | '_' | '=' | '\n' | '\r'))
        })
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let Some(text) = text_of(value) else {
            return Ok(Vec::new());
        };
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let url_chars = compact.contains(['-', '_']);
        let engine = if url_chars {
            if !self.url_safe {
                return Ok(Vec::new());
            }
            &BASE64_URL_SAFE
        } else {
            &BASE64_STANDARD
        };
        Ok(engine
            .decode(compact.as_bytes())
            .map(|bytes| single(value, bytes))
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// base32
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Base32;

fn base32_decode(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .trim_end_matches('=')
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if !matches!(digits.len() % 8, 0 | 2 | 4 | 5 | 7) {
        return None;
    }
    let mut out = Vec::with_capacity(digits.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for digit in digits {
        let index = BASE32_ALPHABET.iter().position(|&a| a == digit)?;
        buffer = (buffer << 5) | u32::try_from(index).ok()?;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push(u8::try_from((buffer >> bits) & 0xff).ok()?);
        }
    }
    Some(out)
}

impl Cracker for Base32 {
    fn name(&self) -> &str {
        "base32"
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        Ok(text_of(value)
            .and_then(base32_decode)
            .map(|bytes| single(value, bytes))
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// hex
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Hex;

impl Cracker for Hex {
    fn name(&self) -> &str {
        "hex"
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let Some(text) = text_of(value) else {
            return Ok(Vec::new());
        };
        let body = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        let digits: String = body
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && !matches!(c, ':' | ','))
            .collect();
        Ok(hex::decode(digits)
            .map(|bytes| single(value, bytes))
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// binary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Binary;

impl Cracker for Binary {
    fn name(&self) -> &str {
        "binary"
    }

    fn can_apply(&self, value: &Value) -> bool {
        text_of(value).is_some_and(|s| s.bytes().all(|b| matches!(b, b'0' | b'1') || b.is_ascii_whitespace()))
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let Some(text) = text_of(value) else {
            return Ok(Vec::new());
        };
        let bits: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
        if bits.len() % 8 != 0 || bits.iter().any(|b| !matches!(b, b'0' | b'1')) {
            return Ok(Vec::new());
        }
        let bytes = bits
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0')))
            .collect();
        Ok(single(value, bytes))
    }
}

// ---------------------------------------------------------------------------
// decimal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Decimal;

impl Cracker for Decimal {
    fn name(&self) -> &str {
        "decimal"
    }

    fn can_apply(&self, value: &Value) -> bool {
        text_of(value).is_some_and(|s| {
            s.bytes()
                .all(|b| b.is_ascii_digit() || b == b',' || b.is_ascii_whitespace())
        })
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let Some(text) = text_of(value) else {
            return Ok(Vec::new());
        };
        let parsed: Option<Vec<u8>> = text
            .split(|c: char| c == ',' || c.is_ascii_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<u8>().ok())
            .collect();
        Ok(parsed.map(|bytes| single(value, bytes)).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// url
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Url;

impl Cracker for Url {
    fn name(&self) -> &str {
        "url"
    }

    fn can_apply(&self, value: &Value) -> bool {
        text_of(value).is_some_and(|s| s.contains(['%', '+']))
    }

    fn apply(&self, value: &Value) -> Result<Vec<CrackOutput>, CrackerError> {
        let Some(text) = value.to_str_lossless() else {
            return Ok(Vec::new());
        };
        let spaced = text.replace('+', " ");
        let bytes: Vec<u8> = percent_decode_str(&spaced).collect();
        if bytes == value.as_bytes() {
            return Ok(Vec::new());
        }
        Ok(single(value, bytes))
    }
}
