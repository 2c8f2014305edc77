// crates/accrue-core/src/account.rs

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AccrueError;

/// Identity key of a ledger account.
///
/// 20 bytes, rendered as `0x`-prefixed lowercase hex. The all-zero id is the
/// zero address: it never holds a balance and appears only as the
/// counterparty of mint/burn events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// The zero address.
    pub const ZERO: AccountId = AccountId([0u8; 20]);

    /// Create an account id whose bytes are all `byte`. Handy for fixtures.
    pub fn repeat_byte(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Returns `true` for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for AccountId {
    type Err = AccrueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits)
            .map_err(|e| AccrueError::Serialization(format!("Invalid account id {}: {}", s, e)))?;
        let array: [u8; 20] = bytes.try_into().map_err(|_| {
            AccrueError::Serialization(format!("Account id {} must be exactly 20 bytes", s))
        })?;
        Ok(Self(array))
    }
}

// Serialized as a hex string so account ids can key JSON maps.
impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Identity of the chain a ledger instance runs on.
///
/// Frozen at construction. Only the instance whose chain id equals the
/// configured main chain grows the index and mints rebase fees; other
/// instances mirror the index they are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
