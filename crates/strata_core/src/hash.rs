//! Content digests for asset fingerprints and manifest checksums.
//!
//! Uses BLAKE3 for all hashing operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A BLAKE3 digest (256 bits / 32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Digest([u8; 32]);

impl Digest {
    /// The number of bytes in a digest
    pub const LEN: usize = 32;

    /// Compute BLAKE3 digest of data
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Compute the digest of a value's canonical JSON encoding
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be encoded
    pub fn of_json<T: Serialize>(value: &T) -> Result<Self, HashError> {
        let bytes = serde_json::to_vec(value).map_err(|_| HashError::Encoding)?;
        Ok(Self::compute(&bytes))
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short form used inside resource names and asset keys
    #[must_use]
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Parse from hex string
    ///
    /// # Errors
    ///
    /// Returns error if hex is invalid or not 32 bytes
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(hex).map_err(|_| HashError::InvalidHex)?;
        if bytes.len() != Self::LEN {
            return Err(HashError::InvalidLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Digest-related errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Invalid hex encoding
    InvalidHex,
    /// Invalid length (not 32 bytes)
    InvalidLength(usize),
    /// Value could not be encoded before hashing
    Encoding,
}

impl std::error::Error for HashError {}

impl fmt::Display for HashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidHex => write!(f, "Invalid hex encoding"),
            Self::InvalidLength(len) => write!(f, "Invalid hash length: {} (expected 32)", len),
            Self::Encoding => write!(f, "Value could not be encoded for hashing"),
        }
    }
}

impl From<HashError> for crate::CoreError {
    fn from(err: HashError) -> Self {
        crate::CoreError::InvalidHash {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_compute() {
        let a = Digest::compute(b"layers/common");
        let b = Digest::compute(b"layers/common");
        assert_eq!(a, b);
        assert_ne!(a, Digest::compute(b"layers/other"));
    }

    #[test]
    fn test_digest_from_to_hex() {
        let digest = Digest::compute(b"hello");
        let hex = digest.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Digest::from_hex(&hex).unwrap(), digest);
    }

    #[test]
    fn test_digest_short_hex() {
        let digest = Digest::compute(b"hello");
        assert_eq!(digest.short_hex().len(), 16);
        assert!(digest.to_hex().starts_with(&digest.short_hex()));
    }

    #[test]
    fn test_digest_from_hex_rejects_bad_input() {
        assert_eq!(Digest::from_hex("zz"), Err(HashError::InvalidHex));
        assert_eq!(Digest::from_hex("abcd"), Err(HashError::InvalidLength(2)));
    }

    #[test]
    fn test_digest_of_json_is_stable() {
        let value = serde_json::json!({"b": 1, "a": [1, 2, 3]});
        assert_eq!(
            Digest::of_json(&value).unwrap(),
            Digest::of_json(&value.clone()).unwrap()
        );
    }
}
