//! Canonical JSON bytes for everything compared or hashed byte-for-byte
//! (search results, configuration snapshots).
//!
//! Rules: object keys in byte order, no whitespace, integers only. String
//! escaping is `serde_json`'s, so any canonical document is also valid JSON.
//! Scores are stored upstream as integer parts per million because floats
//! have no single textual form.

use crate::proof::hash::{canonical_hash, ContentHash};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
}

/// Serialize `value` canonically.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] for any number that is neither
/// `i64` nor `u64`.
pub fn canonical_json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CanonError> {
    let mut out = Vec::with_capacity(128);
    emit(&mut out, value)?;
    Ok(out)
}

/// [`canonical_json_bytes`] hashed under `domain`.
///
/// # Errors
///
/// See [`canonical_json_bytes`].
pub fn canonical_json_digest(
    domain: &[u8],
    value: &serde_json::Value,
) -> Result<ContentHash, CanonError> {
    canonical_json_bytes(value).map(|bytes| canonical_hash(domain, &bytes))
}

fn emit(out: &mut Vec<u8>, value: &serde_json::Value) -> Result<(), CanonError> {
    use serde_json::Value as J;
    match value {
        J::Null | J::Bool(_) | J::String(_) => emit_scalar(out, value),
        J::Number(n) if n.is_i64() || n.is_u64() => emit_scalar(out, value),
        J::Number(n) => {
            return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
        }
        J::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit(out, item)?;
            }
            out.push(b']');
        }
        J::Object(map) => {
            let mut entries: Vec<(&String, &J)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                emit_scalar(out, &J::String(key.clone()));
                out.push(b':');
                emit(out, item)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// Scalars have exactly one compact `serde_json` rendering.
fn emit_scalar(out: &mut Vec<u8>, value: &serde_json::Value) {
    // Writing a scalar into a Vec cannot fail.
    let _ = serde_json::to_writer(&mut *out, value);
}
