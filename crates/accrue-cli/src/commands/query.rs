// crates/accrue-cli/src/commands/query.rs
//
// Read-only commands: `balance`, `supply`, `accounts`, `audit`.

use accrue_core::{format_units, AccountId};
use accrue_ledger::{SharedLedger, Tokens};

use crate::context::Context;
use crate::output::{format_json, format_table, print_fields, AccountRow, FieldRow, OutputFormat};

/// `accrue balance <ACCOUNT>`
pub async fn balance(account: &AccountId, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = ctx.open_ledger()?;
    let rows = ledger
        .read(|l| -> Result<Vec<FieldRow>, accrue_core::AccrueError> {
            Ok(vec![
                FieldRow::new("Account", account),
                FieldRow::new("Balance", Tokens(l.balance_of(account)?)),
                FieldRow::new("Shares", format_units(l.shares_of(account))),
                FieldRow::new("Opted out", l.is_opted_out(account)),
            ])
        })
        .await?;
    print_fields(ctx.format, &rows);
    Ok(())
}

/// `accrue supply`
pub async fn supply(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = ctx.open_ledger()?;
    let rows = ledger
        .read(|l| -> Result<Vec<FieldRow>, accrue_core::AccrueError> {
            Ok(vec![
                FieldRow::new("Chain", l.chain_id()),
                FieldRow::new("Main chain", l.is_main_chain()),
                FieldRow::new("Rebase index", format_units(l.rebase_index())),
                FieldRow::new("Total supply", Tokens(l.total_supply()?)),
                FieldRow::new("Total shares", format_units(l.total_shares())),
                FieldRow::new("Frozen balance", format_units(l.total_frozen_balance())),
                FieldRow::new("Supply limit", format_units(l.supply_limit())),
                FieldRow::new("Fee collector", l.fee_collector()),
            ])
        })
        .await?;
    print_fields(ctx.format, &rows);
    Ok(())
}

/// `accrue accounts`
pub async fn accounts(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = ctx.open_ledger()?;
    let rows = account_rows(&ledger).await?;
    match ctx.format {
        OutputFormat::Table if rows.is_empty() => println!("No accounts."),
        OutputFormat::Table => println!("{}", format_table(&rows)),
        OutputFormat::Json => println!("{}", format_json(&rows)),
    }
    Ok(())
}

/// `accrue audit`: exits with an error if the aggregates have drifted.
pub async fn audit(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = ctx.open_ledger()?;
    let report = ledger.read(|l| l.audit()).await?;

    match ctx.format {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => print_fields(
            OutputFormat::Table,
            &[
                FieldRow::new("Accounts", report.accounts),
                FieldRow::new("Total supply", format_units(report.total_supply)),
                FieldRow::new("Sum of balances", format_units(report.sum_of_balances)),
                FieldRow::new("Recorded shares", format_units(report.recorded.total_shares)),
                FieldRow::new("Recomputed shares", format_units(report.recomputed.total_shares)),
                FieldRow::new(
                    "Recorded frozen",
                    format_units(report.recorded.total_frozen_balance),
                ),
                FieldRow::new(
                    "Recomputed frozen",
                    format_units(report.recomputed.total_frozen_balance),
                ),
                FieldRow::new("Consistent", report.is_consistent()),
            ],
        ),
    }

    if !report.is_consistent() {
        tracing::error!("Ledger audit failed: {:?}", report);
        return Err("ledger aggregates are inconsistent".into());
    }
    Ok(())
}

async fn account_rows(ledger: &SharedLedger) -> Result<Vec<AccountRow>, accrue_core::AccrueError> {
    ledger
        .read(|l| {
            l.accounts()
                .map(|(account, holding)| -> Result<AccountRow, accrue_core::AccrueError> {
                    let balance = holding.balance(l.rebase_index())?;
                    Ok(AccountRow::new(account, holding, balance))
                })
                .collect()
        })
        .await
}
