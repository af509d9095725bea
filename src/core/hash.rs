//! Hash and Key Derivation Primitives
//!
//! SHA-256 and HMAC-SHA-256 over UTF-8 strings, with lowercase hex output.
//! Every pre-image in the protocol is built by [`encode_preimage`], so the
//! byte layout that published audits were hashed with lives in one place.

use std::fmt;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Separator placed between pre-image components.
pub const PREIMAGE_SEPARATOR: char = ',';

/// Hex-encoded hash output.
///
/// Digests read from documents are kept verbatim: they are compared and
/// re-hashed exactly as published, never normalized.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Wrap an existing hex string.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Hex encode raw hash bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// The hex text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Digest {
    fn from(hex: String) -> Self {
        Self(hex)
    }
}

impl From<&str> for Digest {
    fn from(hex: &str) -> Self {
        Self(hex.to_owned())
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join pre-image components with a single comma, no escaping.
pub fn encode_preimage(parts: &[&str]) -> String {
    let capacity = parts.iter().map(|p| p.len() + 1).sum();
    let mut out = String::with_capacity(capacity);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(PREIMAGE_SEPARATOR);
        }
        out.push_str(part);
    }
    out
}

/// SHA-256 of arbitrary bytes.
pub fn hash(input: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(input);
    Digest::from_bytes(&hasher.finalize())
}

/// SHA-256 of the comma-joined components.
pub fn hash_parts(parts: &[&str]) -> Digest {
    hash(encode_preimage(parts).as_bytes())
}

/// HMAC-SHA-256 keyed by `key`, over `context`.
pub fn kdf(key: &str, context: &str) -> Digest {
    // HMAC pads or hashes the key as needed, so any length is accepted.
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(context.as_bytes());
    Digest::from_bytes(&mac.finalize().into_bytes())
}

/// HMAC-SHA-256 over the comma-joined components.
pub fn kdf_parts(key: &str, parts: &[&str]) -> Digest {
    kdf(key, &encode_preimage(parts))
}

// =============================================================================
// TESTS
// =============================================================================
