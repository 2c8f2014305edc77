// crates/accrue-ledger/src/ledger.rs
//
// RebasingLedger: the public face of the accounting core.
//
// Every mutation follows the same shape:
//   1. capability check against the injected `AccessControl`
//   2. argument checks (zero address, allowance)
//   3. stage the new holdings and aggregates in a `Pending` set, where any
//      arithmetic or balance failure returns early
//   4. commit the staged values, the index, and the events in one step
//
// Nothing is written before step 4, so a failed operation leaves no trace.

use std::collections::BTreeMap;
use std::sync::Arc;

use accrue_core::{AccessControl, AccountId, AccrueError, ChainId, U256};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::events::LedgerEvent;
use crate::opt_out;
use crate::rebase::{plan_rebase, RebasePlan};
use crate::shares::{Holding, ShareLedger};
use crate::supply::{check_supply_limit, SupplyTotals};
use crate::INITIAL_INDEX;

/// Staged writes of a single operation.
struct Pending<'a> {
    ledger: &'a RebasingLedger,
    holdings: BTreeMap<AccountId, Holding>,
    totals: SupplyTotals,
}

impl<'a> Pending<'a> {
    fn new(ledger: &'a RebasingLedger) -> Self {
        Self {
            ledger,
            holdings: BTreeMap::new(),
            totals: ledger.supply,
        }
    }

    /// Holding as seen by this operation so far.
    fn holding(&self, account: &AccountId) -> Holding {
        self.holdings
            .get(account)
            .copied()
            .unwrap_or_else(|| self.ledger.shares.holding(account))
    }

    fn stage(&mut self, account: AccountId, after: Holding) -> Result<(), AccrueError> {
        let before = self.holding(&account);
        self.totals = self.totals.adjusted(&before, &after)?;
        self.holdings.insert(account, after);
        Ok(())
    }

    /// Debit `from` and credit `to` with `amount` at `index`.
    fn move_tokens(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
        index: U256,
    ) -> Result<(), AccrueError> {
        let debit = self.holding(from).debit(amount, index)?;
        self.stage(*from, debit.holding)?;

        // Read after staging the debit so self-transfers see their own debit.
        let receiver = self.holding(to);
        let credited = match (debit.shares, receiver) {
            (Some(shares), Holding::Rebasing { .. }) => receiver.credit_shares(shares)?,
            _ => receiver.credit(amount, index)?,
        };
        self.stage(*to, credited)
    }

    fn finish(self) -> (BTreeMap<AccountId, Holding>, SupplyTotals) {
        (self.holdings, self.totals)
    }
}

/// Result of recomputing the aggregates from every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Aggregates maintained incrementally.
    pub recorded: SupplyTotals,
    /// Aggregates recomputed from every holding.
    pub recomputed: SupplyTotals,
    /// `total_supply()` from the recorded aggregates.
    pub total_supply: U256,
    /// Sum of every account's displayed balance.
    pub sum_of_balances: U256,
    /// Number of accounts inspected.
    pub accounts: usize,
}

impl AuditReport {
    /// Aggregates match and the balance sum is within one wei per account
    /// of total supply (per-account truncation).
    pub fn is_consistent(&self) -> bool {
        if self.recorded != self.recomputed || self.sum_of_balances > self.total_supply {
            return false;
        }
        self.total_supply - self.sum_of_balances <= U256::from(self.accounts)
    }
}

/// The rebasing token ledger.
///
/// Construct one per chain instance with injected configuration and an
/// access-control collaborator. Wrap it in `SharedLedger` for concurrent
/// async callers.
#[derive(Clone)]
pub struct RebasingLedger {
    pub(crate) config: LedgerConfig,
    pub(crate) access: Arc<dyn AccessControl>,
    pub(crate) index: U256,
    pub(crate) shares: ShareLedger,
    pub(crate) supply: SupplyTotals,
    pub(crate) allowances: BTreeMap<(AccountId, AccountId), U256>,
    pub(crate) events: Vec<LedgerEvent>,
}

impl RebasingLedger {
    /// Create an empty ledger at index 1.0.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration fails validation.
    pub fn new(config: LedgerConfig, access: Arc<dyn AccessControl>) -> Result<Self, AccrueError> {
        config.validate()?;
        tracing::info!(
            "Ledger created on chain {} (main chain: {}), fee collector {}",
            config.chain_id,
            config.is_main_chain(),
            config.fee_collector
        );
        Ok(Self {
            config,
            access,
            index: INITIAL_INDEX,
            shares: ShareLedger::new(),
            supply: SupplyTotals::new(),
            allowances: BTreeMap::new(),
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Displayed balance: frozen amount, or `shares * index / 1e18`.
    pub fn balance_of(&self, account: &AccountId) -> Result<U256, AccrueError> {
        self.shares.holding(account).balance(self.index)
    }

    /// Raw internal amount (frozen balance for opted-out accounts).
    pub fn shares_of(&self, account: &AccountId) -> U256 {
        self.shares.holding(account).shares()
    }

    /// Holding of an account (empty rebasing holding if never touched).
    pub fn holding(&self, account: &AccountId) -> Holding {
        self.shares.holding(account)
    }

    /// `total_shares * index / 1e18 + total_frozen_balance`.
    pub fn total_supply(&self) -> Result<U256, AccrueError> {
        self.supply.total_supply(self.index)
    }

    pub fn total_shares(&self) -> U256 {
        self.supply.total_shares
    }

    pub fn total_frozen_balance(&self) -> U256 {
        self.supply.total_frozen_balance
    }

    pub fn rebase_index(&self) -> U256 {
        self.index
    }

    pub fn is_opted_out(&self, account: &AccountId) -> bool {
        self.shares.holding(account).is_opted_out()
    }

    pub fn supply_limit(&self) -> U256 {
        self.config.supply_limit
    }

    pub fn fee_collector(&self) -> AccountId {
        self.config.fee_collector
    }

    pub fn chain_id(&self) -> ChainId {
        self.config.chain()
    }

    /// Whether this instance grows the index and mints rebase fees.
    pub fn is_main_chain(&self) -> bool {
        self.config.is_main_chain()
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Remaining amount `spender` may move on behalf of `owner`.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// All known accounts in id order.
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &Holding)> {
        self.shares.iter()
    }

    /// Recompute aggregates and the balance sum from scratch. O(n).
    pub fn audit(&self) -> Result<AuditReport, AccrueError> {
        let recomputed = SupplyTotals::audit(self.shares.iter())?;
        let mut sum = U256::zero();
        for (_, holding) in self.shares.iter() {
            let balance = holding.balance(self.index)?;
            sum = accrue_core::fixed::checked_add(sum, balance, "balance sum")?;
        }
        Ok(AuditReport {
            recorded: self.supply,
            recomputed,
            total_supply: self.total_supply()?,
            sum_of_balances: sum,
            accounts: self.shares.len(),
        })
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Mint `amount` tokens to `to`.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is a minter, `ZeroAddress` for the zero
    /// recipient, `SupplyLimitExceeded` if the resulting supply is above the
    /// ceiling.
    pub fn mint(
        &mut self,
        caller: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        self.require_minter(caller, "mint")?;
        if to.is_zero() {
            return Err(AccrueError::ZeroAddress("cannot mint to the zero address".to_string()));
        }

        let index = self.index;
        let mut pending = Pending::new(self);
        let credited = pending.holding(to).credit(amount, index)?;
        pending.stage(*to, credited)?;
        check_supply_limit(pending.totals.total_supply(index)?, self.config.supply_limit)?;

        let (holdings, totals) = pending.finish();
        self.commit(
            holdings,
            totals,
            vec![LedgerEvent::Transfer {
                from: AccountId::ZERO,
                to: *to,
                amount,
            }],
        );
        tracing::debug!("Minted {} wei to {}", amount, to);
        Ok(())
    }

    /// Burn `amount` tokens from `from`.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is a minter, `InsufficientBalance` if
    /// `amount` exceeds the balance.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        self.require_minter(caller, "burn")?;
        if from.is_zero() {
            return Err(AccrueError::ZeroAddress("cannot burn from the zero address".to_string()));
        }

        let mut pending = Pending::new(self);
        let debit = pending.holding(from).debit(amount, self.index)?;
        pending.stage(*from, debit.holding)?;

        let (holdings, totals) = pending.finish();
        self.commit(
            holdings,
            totals,
            vec![LedgerEvent::Transfer {
                from: *from,
                to: AccountId::ZERO,
                amount,
            }],
        );
        tracing::debug!("Burned {} wei from {}", amount, from);
        Ok(())
    }

    /// Move `amount` tokens from `from` to `to`.
    ///
    /// Sender and receiver are converted independently: a frozen side moves
    /// the literal amount, a rebasing side moves shares at the current index.
    /// Between two rebasing accounts the same share quantity leaves one and
    /// enters the other.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        Self::require_counterparties(from, to)?;

        let mut pending = Pending::new(self);
        pending.move_tokens(from, to, amount, self.index)?;

        let (holdings, totals) = pending.finish();
        self.commit(
            holdings,
            totals,
            vec![LedgerEvent::Transfer {
                from: *from,
                to: *to,
                amount,
            }],
        );
        tracing::debug!("Transferred {} wei from {} to {}", amount, from, to);
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s tokens. `U256::MAX` is
    /// unlimited.
    pub fn approve(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        if owner.is_zero() || spender.is_zero() {
            return Err(AccrueError::ZeroAddress("cannot approve the zero address".to_string()));
        }
        self.allowances.insert((*owner, *spender), amount);
        self.events.push(LedgerEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    /// Move `amount` from `from` to `to` on `spender`'s allowance.
    ///
    /// # Errors
    /// `InsufficientAllowance` if the allowance is too small, plus every
    /// error `transfer` can return.
    pub fn transfer_from(
        &mut self,
        spender: &AccountId,
        from: &AccountId,
        to: &AccountId,
        amount: U256,
    ) -> Result<(), AccrueError> {
        Self::require_counterparties(from, to)?;

        let current = self.allowance(from, spender);
        let remaining = if current == U256::MAX {
            current
        } else if amount > current {
            return Err(AccrueError::InsufficientAllowance {
                requested: amount,
                available: current,
            });
        } else {
            current - amount
        };

        let mut pending = Pending::new(self);
        pending.move_tokens(from, to, amount, self.index)?;

        let (holdings, totals) = pending.finish();
        self.commit(
            holdings,
            totals,
            vec![LedgerEvent::Transfer {
                from: *from,
                to: *to,
                amount,
            }],
        );
        self.allowances.insert((*from, *spender), remaining);
        Ok(())
    }

    /// Opt `account` out of rebasing (`disabled = true`) or back in.
    ///
    /// Allowed for the account itself or an opt-out manager. Setting the
    /// current state again is a no-op.
    pub fn disable_rebase(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
        disabled: bool,
    ) -> Result<(), AccrueError> {
        if account.is_zero() {
            return Err(AccrueError::ZeroAddress(
                "cannot toggle rebasing for the zero address".to_string(),
            ));
        }
        if caller != account && !self.access.is_opt_out_manager(caller) {
            tracing::warn!("Rejected rebase toggle for {} by {}", account, caller);
            return Err(AccrueError::Unauthorized(format!(
                "{} may not toggle rebasing for {}",
                caller, account
            )));
        }

        let before = self.shares.holding(account);
        if before.is_opted_out() == disabled {
            return Ok(());
        }

        let mut pending = Pending::new(self);
        let after = opt_out::toggle(&before, disabled, self.index)?;
        pending.stage(*account, after)?;
        let balance = after.balance(self.index)?;

        let (holdings, totals) = pending.finish();
        self.commit(
            holdings,
            totals,
            vec![LedgerEvent::RebaseDisabled {
                account: *account,
                disabled,
                balance,
            }],
        );
        tracing::info!(
            "Rebasing {} for {} at balance {}",
            if disabled { "disabled" } else { "enabled" },
            account,
            balance
        );
        Ok(())
    }

    /// Move the rebase index to `new_index`, minting the fee share of the
    /// growth to the fee collector in the same step.
    ///
    /// Returns the applied plan; `committed_index` is what `rebase_index()`
    /// reports afterwards.
    ///
    /// # Errors
    /// `Unauthorized` unless `caller` is a rebase manager, plus the planning
    /// errors of [`plan_rebase`].
    pub fn set_rebase_index(
        &mut self,
        caller: &AccountId,
        new_index: U256,
        min_index_delta: U256,
    ) -> Result<RebasePlan, AccrueError> {
        self.require_rebase_manager(caller, "set the rebase index")?;

        let plan = plan_rebase(
            &self.config.rebase_policy(),
            self.supply.total_shares,
            self.index,
            new_index,
            min_index_delta,
            self.is_main_chain(),
        )?;
        if plan.is_noop() {
            tracing::debug!("Rebase index unchanged at {}", self.index);
            return Ok(plan);
        }

        let mut pending = Pending::new(self);
        let mut events = vec![LedgerEvent::RebaseIndexUpdated {
            previous: plan.previous_index,
            requested: plan.requested_index,
            committed: plan.committed_index,
        }];

        if !plan.fee_amount.is_zero() {
            let collector = self.config.fee_collector;
            let credited = pending
                .holding(&collector)
                .credit(plan.fee_amount, plan.committed_index)?;
            pending.stage(collector, credited)?;
            events.push(LedgerEvent::RebaseFeeMinted {
                collector,
                amount: plan.fee_amount,
            });
            events.push(LedgerEvent::Transfer {
                from: AccountId::ZERO,
                to: collector,
                amount: plan.fee_amount,
            });
        }
        // The new supply must stay representable.
        pending.totals.total_supply(plan.committed_index)?;

        let (holdings, totals) = pending.finish();
        self.index = plan.committed_index;
        self.commit(holdings, totals, events);
        tracing::info!(
            "Rebase index {} -> {} (requested {}), fee {} wei",
            plan.previous_index,
            plan.committed_index,
            plan.requested_index,
            plan.fee_amount
        );
        Ok(plan)
    }

    /// Change the supply ceiling. Lowering it below current supply only
    /// blocks further minting.
    pub fn set_supply_limit(&mut self, caller: &AccountId, limit: U256) -> Result<(), AccrueError> {
        self.require_rebase_manager(caller, "set the supply limit")?;
        let previous = self.config.supply_limit;
        self.config.supply_limit = limit;
        self.events.push(LedgerEvent::SupplyLimitUpdated { previous, limit });
        tracing::info!("Supply limit {} -> {}", previous, limit);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn commit(
        &mut self,
        holdings: BTreeMap<AccountId, Holding>,
        totals: SupplyTotals,
        events: Vec<LedgerEvent>,
    ) {
        for (account, holding) in holdings {
            self.shares.insert(account, holding);
        }
        self.supply = totals;
        self.events.extend(events);
    }

    fn require_minter(&self, caller: &AccountId, action: &str) -> Result<(), AccrueError> {
        if !self.access.is_minter(caller) {
            tracing::warn!("Rejected {} by non-minter {}", action, caller);
            return Err(AccrueError::Unauthorized(format!("{} is not a minter", caller)));
        }
        Ok(())
    }

    fn require_rebase_manager(&self, caller: &AccountId, action: &str) -> Result<(), AccrueError> {
        if !self.access.is_rebase_manager(caller) {
            tracing::warn!("Rejected attempt to {} by {}", action, caller);
            return Err(AccrueError::Unauthorized(format!(
                "{} is not a rebase manager",
                caller
            )));
        }
        Ok(())
    }

    fn require_counterparties(from: &AccountId, to: &AccountId) -> Result<(), AccrueError> {
        if from.is_zero() {
            return Err(AccrueError::ZeroAddress(
                "cannot transfer from the zero address".to_string(),
            ));
        }
        if to.is_zero() {
            return Err(AccrueError::ZeroAddress("cannot transfer to the zero address".to_string()));
        }
        Ok(())
    }
}
