// crates/accrue-cli/src/commands/init.rs
//
// `accrue init`: write a starter config and an empty ledger state file.

use std::sync::Arc;

use accrue_core::AccountId;
use accrue_ledger::{RebasingLedger, StateStore};
use clap::Args;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct InitCmd {
    /// Account receiving rebase fees.
    #[arg(long)]
    pub fee_collector: AccountId,

    /// Grant the minter and rebase-manager roles to this account.
    #[arg(long)]
    pub admin: Option<AccountId>,

    /// Overwrite existing config and state.
    #[arg(long)]
    pub force: bool,
}

/// Run the init subcommand.
pub async fn run(
    cmd: &InitCmd,
    config_path: &str,
    mut ctx: Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = ctx.store();
    if !cmd.force && store.load()?.is_some() {
        return Err(format!(
            "ledger state already exists at {}; pass --force to replace it",
            store.path().display()
        )
        .into());
    }

    ctx.config.ledger.fee_collector = cmd.fee_collector;
    if let Some(admin) = cmd.admin {
        ctx.config.roles.minters.insert(admin);
        ctx.config.roles.rebase_managers.insert(admin);
    }

    let roles = Arc::new(ctx.config.roles.clone());
    let ledger = RebasingLedger::new(ctx.config.ledger.clone(), roles)?;
    ctx.config.save(config_path)?;
    store.save(&ledger.snapshot())?;

    tracing::info!("Initialized ledger state at {}", store.path().display());
    println!("Accrue ledger initialized.");
    println!("  Config: {}", config_path);
    println!("  State:  {}", store.path().display());
    println!("  Fee collector: {}", cmd.fee_collector);
    Ok(())
}
