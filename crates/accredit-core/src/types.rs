use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Length of an account address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Length of a digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Account identity on the ledger.
/// Format: `0x<40 hex characters>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// Parse an address from its `0x`-prefixed hex form.
    pub fn new(s: &str) -> Result<Self, CoreError> {
        let body = s.strip_prefix("0x").ok_or_else(|| {
            CoreError::InvalidAddress(format!("address must start with '0x', got: {}", s))
        })?;
        if body.len() != ADDRESS_LEN * 2 {
            return Err(CoreError::InvalidAddress(format!(
                "address must have {} hex characters, got {}",
                ADDRESS_LEN * 2,
                body.len()
            )));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|e| CoreError::InvalidAddress(format!("{}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    /// Create an address from raw bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex form.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_hex()
    }
}

/// A 256-bit digest (Merkle roots, leaves, sibling hashes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Digest(#[serde(with = "hex::serde")] pub [u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest. An access root equal to this is uninitialized.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    /// Parse a digest from 64 hex characters (an optional `0x` prefix is accepted).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(body, &mut bytes)
            .map_err(|e| CoreError::InvalidDigest(format!("{}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Whether this is the zero digest.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; DIGEST_LEN]
    }

    /// Lowercase hex form without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

/// Sequential credential identifier, allocated densely from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(pub u64);

impl CredentialId {
    /// The numeric value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Index into a dense arena. `None` when the id doesn't fit in `usize`.
    pub fn index(&self) -> Option<usize> {
        usize::try_from(self.0).ok()
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CredentialId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
