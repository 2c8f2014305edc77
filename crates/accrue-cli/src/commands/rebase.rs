// crates/accrue-cli/src/commands/rebase.rs
//
// `accrue rebase {set-index, disable, enable, set-supply-limit}`.

use accrue_core::{format_units, AccountId, U256};
use accrue_ledger::RebasePlan;
use clap::Subcommand;

use crate::context::{parse_amount, Context};
use crate::output::{print_fields, FieldRow};

#[derive(Debug, Subcommand)]
pub enum RebaseCmd {
    /// Move the rebase index (rebase-manager role).
    SetIndex {
        /// New index as a decimal, e.g. "1.05".
        #[arg(long, value_parser = parse_amount)]
        index: U256,
        /// Smallest accepted increase.
        #[arg(long, value_parser = parse_amount, default_value = "0")]
        min_delta: U256,
    },
    /// Opt an account out of rebasing (defaults to the caller).
    Disable {
        #[arg(long)]
        account: Option<AccountId>,
    },
    /// Opt an account back into rebasing (defaults to the caller).
    Enable {
        #[arg(long)]
        account: Option<AccountId>,
    },
    /// Change the supply ceiling (rebase-manager role).
    SetSupplyLimit {
        #[arg(long, value_parser = parse_amount)]
        limit: U256,
    },
}

/// Run the rebase subcommand.
pub async fn run(cmd: &RebaseCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    let ledger = ctx.open_ledger()?;

    match cmd {
        RebaseCmd::SetIndex { index, min_delta } => {
            let plan = ledger.set_rebase_index(caller, *index, *min_delta).await?;
            print_fields(ctx.format, &plan_rows(&plan));
            // Events repeat the plan.
            ledger.drain_events().await;
            return Ok(());
        }
        RebaseCmd::Disable { account } => {
            ledger
                .disable_rebase(caller, account.unwrap_or(caller), true)
                .await?
        }
        RebaseCmd::Enable { account } => {
            ledger
                .disable_rebase(caller, account.unwrap_or(caller), false)
                .await?
        }
        RebaseCmd::SetSupplyLimit { limit } => {
            ledger
                .write(|l| l.set_supply_limit(&caller, *limit))
                .await?
        }
    }

    ctx.report(&ledger).await;
    Ok(())
}

fn plan_rows(plan: &RebasePlan) -> Vec<FieldRow> {
    vec![
        FieldRow::new("Changed", !plan.is_noop()),
        FieldRow::new("Previous index", format_units(plan.previous_index)),
        FieldRow::new("Requested index", format_units(plan.requested_index)),
        FieldRow::new("Committed index", format_units(plan.committed_index)),
        FieldRow::new("Fee minted", format_units(plan.fee_amount)),
    ]
}
