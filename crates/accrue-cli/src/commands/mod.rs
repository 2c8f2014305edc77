// crates/accrue-cli/src/commands/mod.rs
//
// Command module declarations for the Accrue CLI.

pub mod init;
pub mod query;
pub mod rebase;
pub mod token;
