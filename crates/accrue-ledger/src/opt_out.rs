// crates/accrue-ledger/src/opt_out.rs
//
// Opt-out registry transitions.
//
// The flag itself is the `Holding` variant. This module owns the two
// conversions that move an account between variants:
//
//   rebasing -> frozen:  balance = floor(shares * index / 1e18)
//   frozen -> rebasing:  shares  = largest s with floor(s * index / 1e18) <= balance
//
// The restore side is exact whenever the frozen amount is itself a
// reachable balance, which it always is right after a snapshot. A round
// trip with no index change in between therefore returns the same
// displayed balance, and no toggle sequence can ever raise it.

use accrue_core::fixed::{checked_add, shares_to_amount, INDEX_ONE};
use accrue_core::{AccrueError, U256, U512};

use crate::shares::Holding;

/// Largest share amount whose displayed balance at `index` does not exceed
/// `balance`.
///
/// `floor(s * i / E) <= b  <=>  s * i <= (b + 1) * E - 1`, so the answer is
/// `((b + 1) * E - 1) / i` with truncating division.
pub fn restore_shares(balance: U256, index: U256) -> Result<U256, AccrueError> {
    if index.is_zero() {
        return Err(AccrueError::InvalidIndex("index must be non-zero".to_string()));
    }
    let bound = checked_add(balance, U256::one(), "frozen balance")?;
    // (b + 1) * E - 1 can exceed 256 bits; divide the 512-bit product first.
    let numerator = bound.full_mul(INDEX_ONE) - U512::one();
    let shares = numerator / U512::from(index);
    U256::try_from(shares)
        .map_err(|_| {
            AccrueError::Overflow(format!("restored shares for {} exceed 256 bits", balance))
        })
}

/// Holding after setting the opt-out flag to `disabled`.
///
/// Returns the holding unchanged when it is already in the requested state.
pub fn toggle(holding: &Holding, disabled: bool, index: U256) -> Result<Holding, AccrueError> {
    match (*holding, disabled) {
        (Holding::Rebasing { shares }, true) => Ok(Holding::Frozen {
            balance: shares_to_amount(shares, index)?,
        }),
        (Holding::Frozen { balance }, false) => Ok(Holding::Rebasing {
            shares: restore_shares(balance, index)?,
        }),
        _ => Ok(*holding),
    }
}
