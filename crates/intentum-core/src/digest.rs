//! # Content Digests
//!
//! SHA-256 helpers shared by sanitization (masking actor/action values) and
//! result caching (keying intents by their behavior vector).

use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Hash arbitrary bytes.
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Render the first `len` hex characters in uppercase.
    ///
    /// Used for masked identifiers, where a short stable token is enough.
    pub fn to_upper_hex_prefix(&self, len: usize) -> String {
        let mut hex: String = self.bytes.iter().map(|b| format!("{b:02X}")).collect();
        hex.truncate(len.min(64));
        hex
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a lowercase SHA-256 hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    ContentDigest::of(data).to_hex()
}
