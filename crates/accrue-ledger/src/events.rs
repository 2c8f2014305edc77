// crates/accrue-ledger/src/events.rs
//
// Events appended by successful ledger mutations.
//
// Collaborators (a tax manager redistributing fees, a bridge relaying index
// updates, an indexer) drain them after each operation. A failed operation
// appends nothing.

use accrue_core::{AccountId, U256};
use serde::{Deserialize, Serialize};

/// A state change recorded by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Tokens moved. Mints come from and burns go to the zero address.
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: U256,
    },
    /// An owner set a spender's allowance.
    Approval {
        owner: AccountId,
        spender: AccountId,
        amount: U256,
    },
    /// The rebase index changed.
    RebaseIndexUpdated {
        previous: U256,
        requested: U256,
        committed: U256,
    },
    /// The fee share of a rebase was minted to the collector.
    RebaseFeeMinted { collector: AccountId, amount: U256 },
    /// An account opted out of (`disabled = true`) or back into rebasing.
    RebaseDisabled {
        account: AccountId,
        disabled: bool,
        balance: U256,
    },
    /// The supply ceiling changed.
    SupplyLimitUpdated { previous: U256, limit: U256 },
}
