// crates/accrue-core/src/traits.rs

use crate::account::AccountId;

/// Role checks consulted at the top of every privileged ledger operation.
///
/// Implemented by the role-administration collaborator; the ledger never
/// stores roles itself. `accrue-ledger` ships `StaticRoles` for
/// configuration-driven deployments and tests.
pub trait AccessControl: Send + Sync {
    /// May `caller` set the rebase index and the supply limit?
    fn is_rebase_manager(&self, caller: &AccountId) -> bool;

    /// May `caller` mint and burn?
    fn is_minter(&self, caller: &AccountId) -> bool;

    /// May `caller` toggle rebasing on accounts other than its own?
    ///
    /// This is the external disabled-accounts policy. Accounts can always
    /// toggle themselves.
    fn is_opt_out_manager(&self, _caller: &AccountId) -> bool {
        false
    }
}
