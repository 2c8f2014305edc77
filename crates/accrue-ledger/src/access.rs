// crates/accrue-ledger/src/access.rs
//
// Configuration-driven role sets implementing `AccessControl`.

use std::collections::BTreeSet;

use accrue_core::{AccessControl, AccountId};
use serde::{Deserialize, Serialize};

/// Fixed role assignments, typically loaded from the `[roles]` config table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRoles {
    /// Accounts allowed to set the rebase index and supply limit.
    #[serde(default)]
    pub rebase_managers: BTreeSet<AccountId>,
    /// Accounts allowed to mint and burn.
    #[serde(default)]
    pub minters: BTreeSet<AccountId>,
    /// Accounts allowed to toggle rebasing for others.
    #[serde(default)]
    pub opt_out_managers: BTreeSet<AccountId>,
}

impl StaticRoles {
    /// No roles granted.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rebase_manager(mut self, account: AccountId) -> Self {
        self.rebase_managers.insert(account);
        self
    }

    pub fn with_minter(mut self, account: AccountId) -> Self {
        self.minters.insert(account);
        self
    }

    pub fn with_opt_out_manager(mut self, account: AccountId) -> Self {
        self.opt_out_managers.insert(account);
        self
    }
}

impl AccessControl for StaticRoles {
    fn is_rebase_manager(&self, caller: &AccountId) -> bool {
        self.rebase_managers.contains(caller)
    }

    fn is_minter(&self, caller: &AccountId) -> bool {
        self.minters.contains(caller)
    }

    fn is_opt_out_manager(&self, caller: &AccountId) -> bool {
        self.opt_out_managers.contains(caller)
    }
}
