use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use zeroize::Zeroizing;

use crate::error::LedgerError;

/// A 20-byte ledger account or contract address, stored as `0x` + lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse an address, with or without `0x`, in any letter case.
    pub fn parse(raw: &str) -> Result<Self, LedgerError> {
        let body = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .unwrap_or(raw);
        if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LedgerError::InvalidAddress(format!(
                "expected 40 hex characters, got: {}",
                raw
            )));
        }
        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// Build an address from its raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// Reference to a submitted transaction (its hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxRef(pub String);

impl TxRef {
    pub fn from_hash(hash: [u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Evidence that a transaction was included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx: TxRef,
    pub block_number: u64,
    pub timestamp: DateTime<Utc>,
}

/// Key material and the account it controls.
///
/// The secret is wiped on drop and never printed.
#[derive(Clone)]
pub struct SigningContext {
    account: Address,
    secret: Zeroizing<Vec<u8>>,
}

impl SigningContext {
    /// Derive a context from a hex-encoded 32-byte private key.
    ///
    /// The account is the last 20 bytes of SHA-256 over the key.
    pub fn from_hex_key(private_key: &str) -> Result<Self, LedgerError> {
        let body = private_key.trim();
        let body = body.strip_prefix("0x").unwrap_or(body);
        let secret = Zeroizing::new(
            hex::decode(body).map_err(|e| LedgerError::Key(format!("not hex: {}", e)))?,
        );
        if secret.len() != 32 {
            return Err(LedgerError::Key(format!(
                "expected 32 bytes, got {}",
                secret.len()
            )));
        }
        let hash: [u8; 32] = Sha256::digest(secret.as_slice()).into();
        let mut account = [0u8; 20];
        account.copy_from_slice(&hash[12..]);
        Ok(Self {
            account: Address::from_bytes(account),
            secret,
        })
    }

    /// The account that signs with this context.
    pub fn account(&self) -> &Address {
        &self.account
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningContext")
            .field("account", &self.account)
            .field("secret", &"<redacted>")
            .finish()
    }
}
