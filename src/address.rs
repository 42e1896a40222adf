//! Principal and destination identifiers.
//!
//! Owners, proposal destinations and the wallet itself are all named by a
//! 20-byte [`Address`]. The all-zero address is the null sentinel and is
//! never admitted as an owner or a destination.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Address length in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Address parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte principal identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null sentinel.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    /// Create from exactly 20 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(AddressError::InvalidLength(bytes.len()));
        }
        let mut addr = [0u8; ADDRESS_LEN];
        addr.copy_from_slice(bytes);
        Ok(Self(addr))
    }

    /// Derive an address from a human-readable label.
    ///
    /// Takes the last 20 bytes of `SHA-256("concord-address" || label)`, so
    /// the same label always maps to the same address.
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"concord-address");
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();

        let mut addr = [0u8; ADDRESS_LEN];
        addr.copy_from_slice(&digest[digest.len() - ADDRESS_LEN..]);
        Self(addr)
    }

    /// Parse `0x`-prefixed hex, or fall back to [`Address::from_label`].
    pub fn parse_or_derive(input: &str) -> Result<Self, AddressError> {
        if input.starts_with("0x") || input.starts_with("0X") {
            input.parse()
        } else {
            Ok(Self::from_label(input))
        }
    }

    /// Get bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Whether this is the null sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    /// Abbreviated form for log lines: `0x1234…abcd`.
    pub fn short(&self) -> String {
        let full = hex::encode(self.0);
        format!("0x{}…{}", &full[..4], &full[full.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}
