// crates/accrue-cli/src/context.rs
//
// Per-invocation state shared by every command: loaded configuration, the
// acting account, the output mode, and access to the persisted ledger.

use std::sync::Arc;

use accrue_core::{AccountId, U256};
use accrue_ledger::{
    JsonFileStore, LedgerConfig, LedgerEvent, RebasingLedger, SharedLedger, StateStore,
};

use crate::config::CliConfig;
use crate::output::{self, OutputFormat};

pub struct Context {
    pub config: CliConfig,
    pub caller: Option<AccountId>,
    pub format: OutputFormat,
}

impl Context {
    /// The `--caller` account, required by every mutating command.
    pub fn caller(&self) -> Result<AccountId, Box<dyn std::error::Error>> {
        self.caller
            .ok_or_else(|| "this command needs --caller <ACCOUNT>".into())
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(self.config.state_path())
    }

    /// Open the ledger from the state file, persisting after each mutation.
    ///
    /// Fails if `accrue init` has not created the state file yet.
    pub fn open_ledger(&self) -> Result<SharedLedger, Box<dyn std::error::Error>> {
        let store = self.store();
        let snapshot = store.load()?.ok_or_else(|| {
            format!(
                "no ledger state at {}; run `accrue init` first",
                store.path().display()
            )
        })?;
        if let Some(fields) = ledger_config_drift(&self.config.ledger, &snapshot.config) {
            tracing::warn!(
                "Config [ledger] keys {} differ from the state at {}; using stored values",
                fields.join(", "),
                store.path().display()
            );
        }
        let access = Arc::new(self.config.roles.clone());
        let ledger = RebasingLedger::from_snapshot(snapshot, access)?;
        tracing::debug!("Opened ledger state at {}", store.path().display());
        Ok(SharedLedger::new(ledger).with_store(Arc::new(store)))
    }

    /// Print the events a mutation produced.
    pub async fn report(&self, ledger: &SharedLedger) {
        let events = ledger.drain_events().await;
        match self.format {
            OutputFormat::Json => println!("{}", output::format_json(&events)),
            OutputFormat::Table => {
                for event in &events {
                    println!("{}", describe(event));
                }
            }
        }
    }
}

/// Names of the `[ledger]` keys whose configured value differs from the
/// stored one. An unset `[ledger]` table never counts as drift.
fn ledger_config_drift(
    configured: &LedgerConfig,
    stored: &LedgerConfig,
) -> Option<Vec<&'static str>> {
    if configured == stored || *configured == LedgerConfig::default() {
        return None;
    }
    let checks = [
        ("chain_id", configured.chain_id != stored.chain_id),
        ("main_chain_id", configured.main_chain_id != stored.main_chain_id),
        ("supply_limit", configured.supply_limit != stored.supply_limit),
        ("fee_collector", configured.fee_collector != stored.fee_collector),
        ("rebase_fee_rate", configured.rebase_fee_rate != stored.rebase_fee_rate),
        (
            "allow_index_decrease",
            configured.allow_index_decrease != stored.allow_index_decrease,
        ),
    ];
    Some(checks.iter().filter(|(_, differs)| *differs).map(|(name, _)| *name).collect())
}

/// Parse a decimal token amount ("12.5", "max") into wei.
pub fn parse_amount(s: &str) -> Result<U256, String> {
    accrue_core::parse_units(s).map_err(|e| e.to_string())
}

fn describe(event: &LedgerEvent) -> String {
    let fmt = |v: &U256| accrue_core::format_units(*v);
    match event {
        LedgerEvent::Transfer { from, to, amount } if from.is_zero() => {
            format!("Minted {} to {}", fmt(amount), to)
        }
        LedgerEvent::Transfer { from, to, amount } if to.is_zero() => {
            format!("Burned {} from {}", fmt(amount), from)
        }
        LedgerEvent::Transfer { from, to, amount } => {
            format!("Transferred {} from {} to {}", fmt(amount), from, to)
        }
        LedgerEvent::Approval {
            owner,
            spender,
            amount,
        } => format!("Approved {} to spend {} of {}", spender, fmt(amount), owner),
        LedgerEvent::RebaseIndexUpdated {
            previous,
            requested,
            committed,
        } => format!(
            "Rebase index {} -> {} (requested {})",
            fmt(previous),
            fmt(committed),
            fmt(requested)
        ),
        LedgerEvent::RebaseFeeMinted { collector, amount } => {
            format!("Rebase fee {} minted to {}", fmt(amount), collector)
        }
        LedgerEvent::RebaseDisabled {
            account,
            disabled,
            balance,
        } => format!(
            "Rebasing {} for {} at balance {}",
            if *disabled { "disabled" } else { "enabled" },
            account,
            fmt(balance)
        ),
        LedgerEvent::SupplyLimitUpdated { previous, limit } => {
            format!("Supply limit {} -> {}", fmt(previous), fmt(limit))
        }
    }
}
