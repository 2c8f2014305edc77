// crates/accrue-cli/src/output.rs
//
// Output formatting utilities for the Accrue CLI.
// Supports table and JSON output modes.

use accrue_core::{format_units, AccountId, U256};
use accrue_ledger::Holding;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// One row of `accrue accounts`.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct AccountRow {
    #[tabled(rename = "Account")]
    pub account: String,
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[tabled(rename = "Shares")]
    pub shares: String,
    #[tabled(rename = "Balance")]
    pub balance: String,
}

impl AccountRow {
    pub fn new(account: &AccountId, holding: &Holding, balance: U256) -> Self {
        let (mode, shares) = match holding {
            Holding::Rebasing { shares } => ("rebasing", format_units(*shares)),
            Holding::Frozen { .. } => ("frozen", "-".to_string()),
        };
        Self {
            account: account.to_string(),
            mode: mode.to_string(),
            shares,
            balance: format_units(balance),
        }
    }
}

/// A labelled value, for key/value summaries.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    pub fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data)
        .unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print key/value rows as a table or as a JSON object.
pub fn print_fields(format: OutputFormat, rows: &[FieldRow]) {
    match format {
        OutputFormat::Table => println!("{}", format_table(rows)),
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|row| (row.field.clone(), serde_json::Value::String(row.value.clone())))
                .collect();
            println!("{}", format_json(&object));
        }
    }
}
