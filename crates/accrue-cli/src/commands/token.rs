// crates/accrue-cli/src/commands/token.rs
//
// `accrue token {mint, burn, transfer, approve, transfer-from}`.
//
// Every subcommand acts as `--caller`. Amounts are decimal tokens.

use accrue_core::{AccountId, U256};
use clap::Subcommand;

use crate::context::{parse_amount, Context};

#[derive(Debug, Subcommand)]
pub enum TokenCmd {
    /// Mint tokens (minter role).
    Mint {
        #[arg(long)]
        to: AccountId,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
    },
    /// Burn tokens from an account (minter role).
    Burn {
        #[arg(long)]
        from: AccountId,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
    },
    /// Transfer the caller's tokens.
    Transfer {
        #[arg(long)]
        to: AccountId,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
    },
    /// Let a spender move the caller's tokens ("max" for unlimited).
    Approve {
        #[arg(long)]
        spender: AccountId,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
    },
    /// Move tokens on an allowance granted to the caller.
    TransferFrom {
        #[arg(long)]
        from: AccountId,
        #[arg(long)]
        to: AccountId,
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
    },
}

/// Run the token subcommand.
pub async fn run(cmd: &TokenCmd, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let caller = ctx.caller()?;
    let ledger = ctx.open_ledger()?;

    match cmd {
        TokenCmd::Mint { to, amount } => ledger.mint(caller, *to, *amount).await?,
        TokenCmd::Burn { from, amount } => ledger.burn(caller, *from, *amount).await?,
        TokenCmd::Transfer { to, amount } => ledger.transfer(caller, *to, *amount).await?,
        TokenCmd::Approve { spender, amount } => {
            ledger
                .write(|l| l.approve(&caller, spender, *amount))
                .await?
        }
        TokenCmd::TransferFrom { from, to, amount } => {
            ledger
                .write(|l| l.transfer_from(&caller, from, to, *amount))
                .await?
        }
    }

    ctx.report(&ledger).await;
    Ok(())
}
