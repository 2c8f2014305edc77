// crates/accrue-ledger/src/snapshot.rs
//
// Versioned, serializable ledger state.
//
// Schema history:
//   v1  every account stored `{shares, opted_out}`; opted-out accounts kept
//       their balance in `shares`, pinned 1:1.
//   v2  accounts store a tagged `Holding`, so a frozen balance can no longer
//       be mistaken for shares.
//
// Aggregates are not stored; they are recomputed from the accounts on
// restore.

use std::collections::BTreeMap;
use std::sync::Arc;

use accrue_core::{AccessControl, AccountId, AccrueError, U256};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::ledger::RebasingLedger;
use crate::shares::{Holding, ShareLedger};
use crate::supply::SupplyTotals;

/// Current snapshot schema.
pub const SCHEMA_VERSION: u32 = 2;

/// One `(owner, spender)` allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    pub owner: AccountId,
    pub spender: AccountId,
    pub amount: U256,
}

/// Full ledger state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub schema_version: u32,
    pub config: LedgerConfig,
    pub rebase_index: U256,
    pub accounts: BTreeMap<AccountId, Holding>,
    #[serde(default)]
    pub allowances: Vec<AllowanceEntry>,
}

#[derive(Debug, Deserialize)]
struct LegacyAccount {
    shares: U256,
    #[serde(default)]
    opted_out: bool,
}

#[derive(Debug, Deserialize)]
struct LegacySnapshotV1 {
    config: LedgerConfig,
    rebase_index: U256,
    accounts: BTreeMap<AccountId, LegacyAccount>,
    #[serde(default)]
    allowances: Vec<AllowanceEntry>,
}

impl LegacySnapshotV1 {
    fn upgrade(self) -> LedgerSnapshot {
        let accounts = self
            .accounts
            .into_iter()
            .map(|(account, legacy)| {
                let holding = if legacy.opted_out {
                    Holding::Frozen {
                        balance: legacy.shares,
                    }
                } else {
                    Holding::Rebasing {
                        shares: legacy.shares,
                    }
                };
                (account, holding)
            })
            .collect();
        LedgerSnapshot {
            schema_version: SCHEMA_VERSION,
            config: self.config,
            rebase_index: self.rebase_index,
            accounts,
            allowances: self.allowances,
        }
    }
}

/// Parse a snapshot of any known schema version into the current one.
///
/// A missing `schema_version` is read as v1.
///
/// # Errors
/// `UnsupportedSchema` for unknown versions, `Serialization` for malformed
/// documents.
pub fn migrate(value: serde_json::Value) -> Result<LedgerSnapshot, AccrueError> {
    let version = match value.get("schema_version") {
        None => 1,
        Some(v) => v
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| AccrueError::Serialization(format!("invalid schema_version: {}", v)))?,
    };

    match version {
        1 => {
            let legacy: LegacySnapshotV1 = serde_json::from_value(value)?;
            tracing::info!(
                "Migrating snapshot from schema v1 ({} accounts)",
                legacy.accounts.len()
            );
            Ok(legacy.upgrade())
        }
        SCHEMA_VERSION => Ok(serde_json::from_value(value)?),
        other => Err(AccrueError::UnsupportedSchema(other)),
    }
}

impl RebasingLedger {
    /// Capture the current state. Pending events are not included.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            schema_version: SCHEMA_VERSION,
            config: self.config.clone(),
            rebase_index: self.index,
            accounts: self.shares.to_map(),
            allowances: self
                .allowances
                .iter()
                .map(|(&(owner, spender), &amount)| AllowanceEntry {
                    owner,
                    spender,
                    amount,
                })
                .collect(),
        }
    }

    /// Rebuild a ledger from a snapshot, recomputing the aggregates.
    ///
    /// # Errors
    /// `UnsupportedSchema` if the snapshot is not the current version (run
    /// it through [`migrate`] first), `InvalidConfig` or `InvalidIndex` for
    /// unusable contents.
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        access: Arc<dyn AccessControl>,
    ) -> Result<Self, AccrueError> {
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(AccrueError::UnsupportedSchema(snapshot.schema_version));
        }
        snapshot.config.validate()?;
        if snapshot.rebase_index.is_zero() {
            return Err(AccrueError::InvalidIndex("snapshot rebase index is zero".to_string()));
        }

        let shares = ShareLedger::from_holdings(snapshot.accounts);
        let supply = SupplyTotals::audit(shares.iter())?;
        supply.total_supply(snapshot.rebase_index)?;

        let allowances = snapshot
            .allowances
            .into_iter()
            .map(|entry| ((entry.owner, entry.spender), entry.amount))
            .collect();

        tracing::debug!(
            "Restored ledger with {} accounts at index {}",
            shares.len(),
            snapshot.rebase_index
        );
        Ok(Self {
            config: snapshot.config,
            access,
            index: snapshot.rebase_index,
            shares,
            supply,
            allowances,
            events: Vec::new(),
        })
    }
}
