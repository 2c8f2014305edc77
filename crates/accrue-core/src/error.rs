use primitive_types::U256;
use thiserror::Error;

/// Ledger-wide error types.
///
/// Every error aborts the whole operation that raised it; no state from a
/// failed operation is retained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccrueError {
    /// Caller lacks the role required for the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Debit exceeds the account's displayed balance.
    #[error("Insufficient balance: requested {requested} but only {available} available")]
    InsufficientBalance { requested: U256, available: U256 },

    /// Spend exceeds the owner's approval for the spender.
    #[error("Insufficient allowance: requested {requested} but only {available} approved")]
    InsufficientAllowance { requested: U256, available: U256 },

    /// Mint, transfer or approval names the zero account.
    #[error("Zero address: {0}")]
    ZeroAddress(String),

    /// Mint would push total supply above the configured ceiling.
    #[error("Supply limit exceeded: resulting supply {resulting} is above limit {limit}")]
    SupplyLimitExceeded { resulting: U256, limit: U256 },

    /// Index increase is below the caller's minimum delta.
    #[error("Rebase too small: {0}")]
    RebaseTooSmall(String),

    /// Index value is not usable (zero).
    #[error("Invalid index: {0}")]
    InvalidIndex(String),

    /// Index decrease requested while decreases are disabled.
    #[error("Index decrease rejected: current {current}, requested {requested}")]
    IndexDecrease { current: U256, requested: U256 },

    /// 256-bit arithmetic overflowed.
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),

    /// Configuration failed validation.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Persisted snapshot has a schema version this build cannot read.
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(u32),

    /// State store error (file I/O, inconsistent snapshot).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AccrueError {
    fn from(e: serde_json::Error) -> Self {
        AccrueError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for AccrueError {
    fn from(e: std::io::Error) -> Self {
        AccrueError::Storage(e.to_string())
    }
}
