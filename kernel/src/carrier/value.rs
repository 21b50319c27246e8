//! `Value`: the payload flowing through a decoding search.
//!
//! A run fixes one representation ([`Format`]) for every value it touches.
//! Decoders keep their input's format where the output allows it. Output
//! that cannot be represented (non-UTF-8 bytes in a text run) stays as
//! [`Value::Bytes`] and is dropped by the engine, never turned into a
//! lossy string.

use std::fmt;

use crate::proof::hash::{canonical_hash, ContentHash, DOMAIN_VALUE};

/// Process-wide representation toggle for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Format {
    /// Values are UTF-8 strings.
    Text,
    /// Values are raw byte sequences.
    Bytes,
}

impl Format {
    /// Canonical string for configuration and JSON.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bytes => "bytes",
        }
    }

    /// Parse from canonical string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" | "str" => Some(Self::Text),
            "bytes" | "binary" => Some(Self::Bytes),
            _ => None,
        }
    }

    const fn tag(self) -> u8 {
        match self {
            Self::Text => 0x01,
            Self::Bytes => 0x02,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A textual or binary payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// The representation of this value.
    #[must_use]
    pub fn format(&self) -> Format {
        match self {
            Self::Text(_) => Format::Text,
            Self::Bytes(_) => Format::Bytes,
        }
    }

    /// Raw byte view (UTF-8 bytes for text).
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Bytes(b) => b,
        }
    }

    /// Text view, if this value is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bytes(_) => None,
        }
    }

    /// Best-effort text view: text as-is, bytes only when they are valid UTF-8.
    #[must_use]
    pub fn to_str_lossless(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bytes(b) => std::str::from_utf8(b).ok(),
        }
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Re-express this value in `format`.
    ///
    /// Text to bytes always succeeds; bytes to text requires valid UTF-8.
    #[must_use]
    pub fn into_format(self, format: Format) -> Option<Self> {
        match (self, format) {
            (v @ Self::Text(_), Format::Text) | (v @ Self::Bytes(_), Format::Bytes) => Some(v),
            (Self::Text(s), Format::Bytes) => Some(Self::Bytes(s.into_bytes())),
            (Self::Bytes(b), Format::Text) => String::from_utf8(b).ok().map(Self::Text),
        }
    }

    /// Domain-separated fingerprint of `(format, payload)`.
    ///
    /// Text `"ab"` and bytes `b"ab"` have different fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        let payload = self.as_bytes();
        let mut data = Vec::with_capacity(1 + payload.len());
        data.push(self.format().tag());
        data.extend_from_slice(payload);
        canonical_hash(DOMAIN_VALUE, &data)
    }

    /// JSON form used in canonical artifacts.
    ///
    /// Text serializes as `{"text": ...}`, bytes as `{"bytes_hex": ...}`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::json!({ "text": s }),
            Self::Bytes(b) => serde_json::json!({ "bytes_hex": hex::encode(b) }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{s:?}"),
                Err(_) => write!(f, "0x{}", hex::encode(b)),
            },
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}
