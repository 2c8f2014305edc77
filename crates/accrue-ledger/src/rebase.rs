// crates/accrue-ledger/src/rebase.rs
//
// Rebase index controller: plans an index change and the fee it mints.
//
// On the main chain an index increase from `old` to `requested` grows the
// rebasing supply by
//
//   gross = total_shares * requested / 1e18 - total_shares * old / 1e18
//
// Frozen balances never contribute to growth and never pay fees. The
// protocol takes `fee = gross * fee_rate / 1e18` of that growth. Holders
// receive the rest by committing a slightly lower index
//
//   committed = (total_shares * requested - fee * 1e18) / total_shares
//
// and `fee` is minted to the collector at `committed`. Every division
// truncates, so the post-rebase supply never exceeds what `requested`
// implies.
//
// Side-chain instances mirror the index they are handed: no fee, no minimum
// delta.

use accrue_core::fixed::{checked_sub, mul_div, shares_to_amount, INDEX_ONE};
use accrue_core::{AccrueError, U256, U512};
use serde::{Deserialize, Serialize};

/// Fee and direction policy applied to every index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebasePolicy {
    /// Fraction of rebase growth taken as protocol fee, 18-decimal
    /// (`0.1e18` = 10%). Must be below 1.0.
    pub fee_rate: U256,
    /// Whether a lower index may be committed (deflationary correction).
    pub allow_index_decrease: bool,
}

impl Default for RebasePolicy {
    fn default() -> Self {
        Self {
            fee_rate: U256::zero(),
            allow_index_decrease: false,
        }
    }
}

/// The outcome of a planned index change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebasePlan {
    /// Index before the change.
    pub previous_index: U256,
    /// Index the caller asked for.
    pub requested_index: U256,
    /// Index actually committed (net of fee on the main chain).
    pub committed_index: U256,
    /// Tokens to mint to the fee collector at `committed_index`.
    pub fee_amount: U256,
}

impl RebasePlan {
    fn unchanged(current: U256, requested: U256) -> Self {
        Self {
            previous_index: current,
            requested_index: requested,
            committed_index: current,
            fee_amount: U256::zero(),
        }
    }

    fn plain(current: U256, requested: U256) -> Self {
        Self {
            previous_index: current,
            requested_index: requested,
            committed_index: requested,
            fee_amount: U256::zero(),
        }
    }

    /// `true` when applying the plan changes nothing.
    pub fn is_noop(&self) -> bool {
        self.committed_index == self.previous_index && self.fee_amount.is_zero()
    }
}

/// Plan a move of the index from `current` to `requested`.
///
/// # Errors
/// - `InvalidIndex` if `requested` is zero.
/// - `IndexDecrease` if `requested < current` and the policy forbids it.
/// - `RebaseTooSmall` if the increase is below `min_index_delta`, or the fee
///   would consume all of the holders' growth.
pub fn plan_rebase(
    policy: &RebasePolicy,
    total_shares: U256,
    current: U256,
    requested: U256,
    min_index_delta: U256,
    main_chain: bool,
) -> Result<RebasePlan, AccrueError> {
    if requested.is_zero() {
        return Err(AccrueError::InvalidIndex("rebase index must be non-zero".to_string()));
    }

    if requested < current {
        if !policy.allow_index_decrease {
            return Err(AccrueError::IndexDecrease { current, requested });
        }
        return Ok(RebasePlan::plain(current, requested));
    }

    if !main_chain {
        return Ok(RebasePlan::plain(current, requested));
    }

    let delta = requested - current;
    if delta < min_index_delta {
        return Err(AccrueError::RebaseTooSmall(format!(
            "index delta {} is below minimum {}",
            delta, min_index_delta
        )));
    }
    if delta.is_zero() {
        return Ok(RebasePlan::unchanged(current, requested));
    }

    let gross = checked_sub(
        shares_to_amount(total_shares, requested)?,
        shares_to_amount(total_shares, current)?,
        "rebase growth",
    )?;
    let fee = mul_div(gross, policy.fee_rate, INDEX_ONE)?;
    if fee.is_zero() {
        return Ok(RebasePlan::plain(current, requested));
    }

    // fee > 0 implies total_shares > 0.
    let numerator = total_shares.full_mul(requested) - fee.full_mul(INDEX_ONE);
    let committed = U256::try_from(numerator / U512::from(total_shares))
        .map_err(|_| AccrueError::Overflow("committed index exceeds 256 bits".to_string()))?;
    if committed <= current {
        return Err(AccrueError::RebaseTooSmall(format!(
            "fee {} leaves no growth for holders at index {}",
            fee, requested
        )));
    }

    Ok(RebasePlan {
        previous_index: current,
        requested_index: requested,
        committed_index: committed,
        fee_amount: fee,
    })
}
