// crates/accrue-ledger/src/lib.rs
//
// accrue-ledger: share-based accounting for a rebasing stablecoin.
//
// Holders own shares; their displayed balance is `shares * index / 1e18`.
// Raising the index grows every rebasing balance at once. Accounts may opt
// out and hold a frozen balance instead. Each index increase on the main
// chain mints a fee share of the growth to a collector.
//
// All amounts are wei (18 decimals). The index is an 18-decimal fixed-point
// value starting at 1.0.

pub mod access;
pub mod config;
pub mod events;
pub mod handle;
pub mod ledger;
pub mod opt_out;
pub mod rebase;
pub mod shares;
pub mod snapshot;
pub mod store;
pub mod supply;
pub mod token;

use accrue_core::U256;

/// Index of a freshly created ledger (1.0).
pub const INITIAL_INDEX: U256 = accrue_core::INDEX_ONE;

// Re-export key types for ergonomic access from downstream crates.
pub use access::StaticRoles;
pub use config::LedgerConfig;
pub use events::LedgerEvent;
pub use handle::SharedLedger;
pub use ledger::{AuditReport, RebasingLedger};
pub use rebase::{plan_rebase, RebasePlan, RebasePolicy};
pub use shares::{Holding, ShareLedger};
pub use snapshot::{migrate, AllowanceEntry, LedgerSnapshot, SCHEMA_VERSION};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use supply::SupplyTotals;
pub use token::{tokens, Tokens, DEFAULT_SYMBOL, WEI_PER_TOKEN};
