// crates/accrue-ledger/src/supply.rs
//
// Supply accounting: running aggregates over all holdings.
//
//   total_supply = total_shares * index / 1e18 + total_frozen_balance
//
// The aggregates are adjusted incrementally from the before/after holdings of
// every touched account. `audit` recomputes them from scratch and is meant
// for invariant checks, never for the hot path.

use accrue_core::fixed::{checked_add, checked_sub, shares_to_amount};
use accrue_core::{AccountId, AccrueError, U256};
use serde::{Deserialize, Serialize};

use crate::shares::Holding;

/// Aggregate shares of rebasing accounts and frozen balance of opted-out ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyTotals {
    /// Sum of shares over all rebasing accounts.
    pub total_shares: U256,
    /// Sum of frozen balances over all opted-out accounts.
    pub total_frozen_balance: U256,
}

impl SupplyTotals {
    /// Empty aggregates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total displayed supply at `index`.
    pub fn total_supply(&self, index: U256) -> Result<U256, AccrueError> {
        let rebasing = shares_to_amount(self.total_shares, index)?;
        checked_add(rebasing, self.total_frozen_balance, "total supply")
    }

    /// Aggregates after one account moves from `before` to `after`.
    ///
    /// Handles every kind of change uniformly, including opt-out toggles that
    /// move an account between the two aggregates.
    pub fn adjusted(&self, before: &Holding, after: &Holding) -> Result<Self, AccrueError> {
        let shares = checked_sub(self.total_shares, before.rebasing_shares(), "total shares")?;
        let shares = checked_add(shares, after.rebasing_shares(), "total shares")?;

        let frozen = checked_sub(
            self.total_frozen_balance,
            before.frozen_balance(),
            "total frozen balance",
        )?;
        let frozen = checked_add(frozen, after.frozen_balance(), "total frozen balance")?;

        Ok(Self {
            total_shares: shares,
            total_frozen_balance: frozen,
        })
    }

    /// Recompute aggregates from every holding. O(n).
    pub fn audit<'a, I>(holdings: I) -> Result<Self, AccrueError>
    where
        I: IntoIterator<Item = (&'a AccountId, &'a Holding)>,
    {
        let mut totals = Self::new();
        for (_, holding) in holdings {
            totals = totals.adjusted(&Holding::default(), holding)?;
        }
        Ok(totals)
    }
}

/// Reject a mint whose resulting supply would exceed `limit`.
///
/// The ceiling applies to minting only; burns, transfers, toggles and
/// rebases ignore it.
pub fn check_supply_limit(resulting: U256, limit: U256) -> Result<(), AccrueError> {
    if resulting > limit {
        return Err(AccrueError::SupplyLimitExceeded { resulting, limit });
    }
    Ok(())
}
