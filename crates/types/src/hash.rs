//! Content hashes.

use sbor::prelude::*;
use std::fmt;

/// A 32-byte blake3 content hash.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BasicSbor, Default,
)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The all-zero hash, used as the transaction root of an empty body.
    pub const ZERO: Hash = Hash([0u8; 32]);

    /// Hash arbitrary bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Hash(*blake3::hash(data).as_bytes())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex encoding, as carried in inventory and data requests.
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hash from its hex encoding.
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let bytes = hex::decode(s)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| HashParseError::Length(v.len()))?;
        Ok(Hash(bytes))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

/// Errors from parsing a hex-encoded hash.
#[derive(Debug, thiserror::Error)]
pub enum HashParseError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = Hash::from_bytes(b"block");
        let b = Hash::from_bytes(b"block");
        assert_eq!(a, b);
        assert_ne!(a, Hash::from_bytes(b"other"));
    }

    #[test]
    fn test_hex_round_trip() {
        let hash = Hash::from_bytes(b"block");
        let parsed = Hash::from_hex(&hash.hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(Hash::from_hex("zz").is_err());
        assert!(Hash::from_hex("abcd").is_err());
    }
}
