// crates/accrue-ledger/src/token.rs
//
// Token amount helpers and display.
//
// The smallest unit is the "wei". 1 token = 10^18 wei. All internal
// accounting uses wei (and shares at the same scale) as 256-bit integers.

use accrue_core::fixed::{format_units, INDEX_ONE};
use accrue_core::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of wei in one whole token.
pub const WEI_PER_TOKEN: U256 = INDEX_ONE;

/// Default display symbol.
pub const DEFAULT_SYMBOL: &str = "USDA";

/// Whole tokens expressed in wei.
///
/// # Example
/// ```
/// use accrue_ledger::token::{tokens, WEI_PER_TOKEN};
/// assert_eq!(tokens(3), WEI_PER_TOKEN * 3u64);
/// ```
pub fn tokens(whole: u64) -> U256 {
    WEI_PER_TOKEN * U256::from(whole)
}

/// A displayed token amount, in wei.
///
/// Formats as a trimmed decimal with the symbol, e.g. `1.5 USDA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tokens(pub U256);

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_units(self.0), DEFAULT_SYMBOL)
    }
}
