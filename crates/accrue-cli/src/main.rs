// crates/accrue-cli/src/main.rs
//
// CLI entrypoint for the Accrue rebasing ledger.
//
// Each invocation loads the config, opens the ledger state file, runs one
// operation, and persists the result.

mod commands;
mod config;
mod context;
mod output;

use accrue_core::AccountId;
use clap::{Parser, Subcommand};
use commands::init::InitCmd;
use commands::rebase::RebaseCmd;
use commands::token::TokenCmd;

use crate::config::{default_config_path, CliConfig};
use crate::context::Context;
use crate::output::OutputFormat;

/// Accrue CLI: operator tools for a rebasing stablecoin ledger.
#[derive(Parser, Debug)]
#[command(
    name = "accrue",
    version = "0.1.0",
    about = "Accrue CLI for a share-based rebasing stablecoin ledger"
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value_t = default_config_path())]
    config: String,

    /// Override the ledger state file from the config.
    #[arg(long, global = true)]
    state: Option<String>,

    /// Account performing the operation.
    #[arg(long, global = true)]
    caller: Option<AccountId>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a starter config and an empty ledger state.
    Init(InitCmd),

    /// Token operations: mint, burn, transfer, approve, transfer-from.
    #[command(subcommand)]
    Token(TokenCmd),

    /// Rebase operations: set-index, disable, enable, set-supply-limit.
    #[command(subcommand)]
    Rebase(RebaseCmd),

    /// Show an account's balance and shares.
    Balance {
        account: AccountId,
    },

    /// Show the rebase index and supply aggregates.
    Supply,

    /// List every account.
    Accounts,

    /// Recompute aggregates from every account and compare.
    Audit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = CliConfig::load(&cli.config);
    let level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => "warn".to_string(),
    };

    // Logs go to stderr so command output stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match loaded {
        Ok(cfg) => {
            tracing::debug!("Loaded configuration from {}", cli.config);
            cfg
        }
        Err(e) => {
            if !matches!(cli.command, Commands::Init(_)) {
                tracing::warn!(
                    "Could not load config from {}: {}. Using defaults.",
                    cli.config,
                    e
                );
            }
            CliConfig::default()
        }
    };
    if let Some(state) = &cli.state {
        config.state_path = state.clone();
    }

    let ctx = Context {
        config,
        caller: cli.caller,
        format: if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        },
    };

    match &cli.command {
        Commands::Init(cmd) => commands::init::run(cmd, &cli.config, ctx).await?,
        Commands::Token(cmd) => commands::token::run(cmd, &ctx).await?,
        Commands::Rebase(cmd) => commands::rebase::run(cmd, &ctx).await?,
        Commands::Balance { account } => commands::query::balance(account, &ctx).await?,
        Commands::Supply => commands::query::supply(&ctx).await?,
        Commands::Accounts => commands::query::accounts(&ctx).await?,
        Commands::Audit => commands::query::audit(&ctx).await?,
    }

    Ok(())
}
