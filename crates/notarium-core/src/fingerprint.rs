//! Canonicalization and SHA-256 fingerprints.
//!
//! The canonical form is the RFC 8785 (JCS) rendering of the value's serde
//! representation. Anchoring and verification both go through
//! [`fingerprint`], so the two paths cannot drift apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;

use crate::error::CoreError;

/// SHA-256 digest of canonical credential bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Hash arbitrary bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Sha256::digest(bytes).into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a hex digest, with or without a `0x` prefix.
    pub fn from_hex(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(trimmed).map_err(|e| CoreError::InvalidDigest(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::InvalidDigest(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// Canonical bytes together with their digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub canonical: Vec<u8>,
    pub digest: Digest,
}

/// Serialize a value to its canonical JCS bytes.
pub fn canonicalize<T>(value: &T) -> Result<Vec<u8>, CoreError>
where
    T: ?Sized + Serialize,
{
    let value = serde_json::to_value(value)?;
    Ok(serde_jcs::to_string(&value)?.into_bytes())
}

/// Canonicalize a value and hash the result.
pub fn fingerprint<T>(value: &T) -> Result<Fingerprint, CoreError>
where
    T: ?Sized + Serialize,
{
    let canonical = canonicalize(value)?;
    let digest = Digest::of(&canonical);
    Ok(Fingerprint { canonical, digest })
}
