//! Domain-separated SHA-256 digests.
//!
//! Every fingerprint in the workspace is `SHA-256(domain || data)`. The
//! textual form is `"sha256:<64 lowercase hex digits>"`.

use std::fmt;

use sha2::{Digest, Sha256};

const PREFIX: &str = "sha256:";

/// A SHA-256 digest. Cheap to copy and compare; used directly as the
/// visited-set key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Parse the textual form. Anything other than `sha256:` followed by
    /// 64 hex digits is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix(PREFIX)?;
        let mut raw = [0u8; 32];
        hex::decode_to_slice(digits, &mut raw).ok()?;
        Some(Self(raw))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn hex_digest(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.hex_digest())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({self})")
    }
}

// Each prefix is null-terminated.

/// Value fingerprints (visited-set keys).
pub const DOMAIN_VALUE: &[u8] = b"UNRAVEL::VALUE::V1\0";

/// Canonical search results.
pub const DOMAIN_SEARCH_RESULT: &[u8] = b"UNRAVEL::SEARCH_RESULT::V1\0";

/// Resolved configuration snapshots.
pub const DOMAIN_CONFIG_SNAPSHOT: &[u8] = b"UNRAVEL::CONFIG_SNAPSHOT::V1\0";

#[must_use]
pub fn canonical_hash(domain: &[u8], data: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    let mut raw = [0u8; 32];
    raw.copy_from_slice(&hasher.finalize());
    ContentHash(raw)
}
