// crates/accrue-ledger/src/shares.rs
//
// Share ledger: per-account holdings and share <-> token conversion.
//
// A rebasing account holds shares; its displayed balance is
// `shares * index / 1e18`, truncated. An opted-out account holds a literal
// frozen token balance that the index never touches. The two are mutually
// exclusive, which the `Holding` enum enforces by construction.

use std::collections::BTreeMap;

use accrue_core::fixed::{
    amount_to_shares, amount_to_shares_up, checked_add, checked_sub, shares_to_amount,
};
use accrue_core::{AccountId, AccrueError, U256};
use serde::{Deserialize, Serialize};

/// What an account holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Holding {
    /// Rebasing holder: balance follows the index.
    Rebasing { shares: U256 },
    /// Opted-out holder: balance pinned at a literal amount.
    Frozen { balance: U256 },
}

impl Default for Holding {
    fn default() -> Self {
        Holding::Rebasing {
            shares: U256::zero(),
        }
    }
}

/// Result of debiting a holding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debit {
    /// The holding after the debit.
    pub holding: Holding,
    /// Shares removed, if the debited account was rebasing.
    pub shares: Option<U256>,
}

impl Holding {
    /// Displayed balance at `index`.
    pub fn balance(&self, index: U256) -> Result<U256, AccrueError> {
        match *self {
            Holding::Rebasing { shares } => shares_to_amount(shares, index),
            Holding::Frozen { balance } => Ok(balance),
        }
    }

    /// Raw internal amount. Frozen balances are pinned 1:1 as shares.
    pub fn shares(&self) -> U256 {
        match *self {
            Holding::Rebasing { shares } => shares,
            Holding::Frozen { balance } => balance,
        }
    }

    /// Shares counted in the rebasing aggregate (zero when frozen).
    pub fn rebasing_shares(&self) -> U256 {
        match *self {
            Holding::Rebasing { shares } => shares,
            Holding::Frozen { .. } => U256::zero(),
        }
    }

    /// Balance counted in the frozen aggregate (zero when rebasing).
    pub fn frozen_balance(&self) -> U256 {
        match *self {
            Holding::Rebasing { .. } => U256::zero(),
            Holding::Frozen { balance } => balance,
        }
    }

    pub fn is_opted_out(&self) -> bool {
        matches!(self, Holding::Frozen { .. })
    }

    /// Remove `amount` tokens at `index`.
    ///
    /// A rebasing debit equal to the whole displayed balance removes every
    /// share so no unspendable share dust is left behind.
    ///
    /// # Errors
    /// `InsufficientBalance` if `amount` exceeds the displayed balance.
    pub fn debit(&self, amount: U256, index: U256) -> Result<Debit, AccrueError> {
        let available = self.balance(index)?;
        if amount > available {
            return Err(AccrueError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        match *self {
            Holding::Frozen { balance } => Ok(Debit {
                holding: Holding::Frozen {
                    balance: balance - amount,
                },
                shares: None,
            }),
            Holding::Rebasing { shares } => {
                let removed = if amount == available {
                    shares
                } else {
                    amount_to_shares_up(amount, index)?
                };
                Ok(Debit {
                    holding: Holding::Rebasing {
                        shares: checked_sub(shares, removed, "account shares")?,
                    },
                    shares: Some(removed),
                })
            }
        }
    }

    /// Add `amount` tokens at `index`: literally when frozen, as shares when
    /// rebasing.
    pub fn credit(&self, amount: U256, index: U256) -> Result<Holding, AccrueError> {
        match *self {
            Holding::Frozen { balance } => Ok(Holding::Frozen {
                balance: checked_add(balance, amount, "frozen balance")?,
            }),
            Holding::Rebasing { .. } => self.credit_shares(amount_to_shares(amount, index)?),
        }
    }

    /// Add an exact share quantity to a rebasing holding.
    ///
    /// Used for rebasing-to-rebasing transfers so both sides move the same
    /// number of shares. Frozen holdings are credited the shares 1:1, which
    /// callers avoid by using `credit` for them.
    pub fn credit_shares(&self, moved: U256) -> Result<Holding, AccrueError> {
        match *self {
            Holding::Rebasing { shares } => Ok(Holding::Rebasing {
                shares: checked_add(shares, moved, "account shares")?,
            }),
            Holding::Frozen { balance } => Ok(Holding::Frozen {
                balance: checked_add(balance, moved, "frozen balance")?,
            }),
        }
    }
}

/// Per-account holdings keyed by account id.
///
/// Entries are created lazily on first credit and never removed; a zero
/// holding is a valid resting state.
#[derive(Debug, Clone, Default)]
pub struct ShareLedger {
    holdings: BTreeMap<AccountId, Holding>,
}

impl ShareLedger {
    /// Create an empty share ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing holdings map (snapshot restore).
    pub fn from_holdings(holdings: BTreeMap<AccountId, Holding>) -> Self {
        Self { holdings }
    }

    /// Holding for `account`, or an empty rebasing holding if unknown.
    pub fn holding(&self, account: &AccountId) -> Holding {
        self.holdings.get(account).copied().unwrap_or_default()
    }

    /// Whether the account has ever been touched.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.holdings.contains_key(account)
    }

    /// Store a holding.
    pub fn insert(&mut self, account: AccountId, holding: Holding) {
        self.holdings.insert(account, holding);
    }

    /// Iterate all known accounts in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &Holding)> {
        self.holdings.iter()
    }

    /// Number of known accounts.
    pub(crate) fn len(&self) -> usize {
        self.holdings.len()
    }

    /// Clone of the underlying map, for snapshots.
    pub fn to_map(&self) -> BTreeMap<AccountId, Holding> {
        self.holdings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokens;
    use accrue_core::fixed::parse_units;

    fn index(s: &str) -> U256 {
        parse_units(s).unwrap()
    }

    #[test]
    fn test_default_holding_is_empty_rebasing() {
        let holding = Holding::default();
        assert!(!holding.is_opted_out());
        assert_eq!(holding.balance(index("1.5")).unwrap(), U256::zero());
    }

    #[test]
    fn test_rebasing_balance_follows_index() {
        let holding = Holding::Rebasing {
            shares: tokens(100),
        };
        assert_eq!(holding.balance(index("1")).unwrap(), tokens(100));
        assert_eq!(holding.balance(index("1.1")).unwrap(), tokens(110));
    }

    #[test]
    fn test_frozen_balance_ignores_index() {
        let holding = Holding::Frozen {
            balance: tokens(5),
        };
        assert_eq!(holding.balance(index("3")).unwrap(), tokens(5));
        assert_eq!(holding.shares(), tokens(5));
        assert_eq!(holding.rebasing_shares(), U256::zero());
    }

    #[test]
    fn test_debit_insufficient() {
        let holding = Holding::Rebasing {
            shares: tokens(10),
        };
        let err = holding.debit(tokens(11), index("1")).unwrap_err();
        assert!(matches!(err, AccrueError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_debit_full_balance_sweeps_dust() {
        // 11 shares at 1.5 display as 16 wei; the remaining half wei is dust.
        let holding = Holding::Rebasing {
            shares: U256::from(11),
        };
        let idx = index("1.5");
        let available = holding.balance(idx).unwrap();
        assert_eq!(available, U256::from(16));

        let debit = holding.debit(available, idx).unwrap();
        assert_eq!(debit.holding.shares(), U256::zero());
        assert_eq!(debit.shares, Some(U256::from(11)));
    }

    #[test]
    fn test_partial_debit_rounds_shares_up() {
        let holding = Holding::Rebasing {
            shares: U256::from(100),
        };
        let debit = holding.debit(U256::from(10), index("1.5")).unwrap();
        // 10 / 1.5 = 6.66 -> 7 shares
        assert_eq!(debit.shares, Some(U256::from(7)));
        assert_eq!(debit.holding.shares(), U256::from(93));
    }

    #[test]
    fn test_credit_frozen_is_literal() {
        let holding = Holding::Frozen {
            balance: tokens(1),
        };
        let credited = holding.credit(tokens(2), index("2")).unwrap();
        assert_eq!(credited, Holding::Frozen { balance: tokens(3) });
    }

    #[test]
    fn test_credit_rebasing_converts_at_index() {
        let credited = Holding::default().credit(tokens(2), index("2")).unwrap();
        assert_eq!(credited, Holding::Rebasing { shares: tokens(1) });
    }

    #[test]
    fn test_ledger_lazy_entries() {
        let mut ledger = ShareLedger::new();
        let id = AccountId::repeat_byte(1);
        assert!(!ledger.contains(&id));
        assert_eq!(ledger.holding(&id), Holding::default());

        ledger.insert(id, Holding::Frozen { balance: tokens(1) });
        assert!(ledger.contains(&id));
        assert_eq!(ledger.len(), 1);
    }
}
