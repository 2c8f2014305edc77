// crates/accrue-cli/src/config.rs
//
// CLI configuration, loaded from a TOML file.
//
//   log_level  = "warn"
//   state_path = "~/.accrue/ledger.json"
//
//   [ledger]
//   fee_collector   = "0x..."
//   rebase_fee_rate = "0.1"
//   supply_limit    = "1000000000"
//
// `[ledger]` seeds the state file on `accrue init`. After that the stored
// ledger config is authoritative; edits to this table only trigger a
// warning when the state is opened.
//
//   [roles]
//   minters         = ["0x..."]
//   rebase_managers = ["0x..."]

use std::fs;
use std::path::PathBuf;

use accrue_ledger::{LedgerConfig, StaticRoles};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level when `RUST_LOG` is unset: "trace" through "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Snapshot file. A leading `~/` expands to the home directory.
    #[serde(default = "default_state_path")]
    pub state_path: String,

    #[serde(default)]
    pub ledger: LedgerConfig,

    #[serde(default)]
    pub roles: StaticRoles,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_state_path() -> String {
    "~/.accrue/ledger.json".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            state_path: default_state_path(),
            ledger: LedgerConfig::default(),
            roles: StaticRoles::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(expand_home(path))?;
        let config: CliConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Write this configuration as TOML, creating parent directories.
    pub fn save(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let path = expand_home(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        expand_home(&self.state_path)
    }
}

/// Default config location: `~/.accrue/config.toml`.
pub fn default_config_path() -> String {
    match dirs::home_dir() {
        Some(home) => home.join(".accrue").join("config.toml").to_string_lossy().to_string(),
        None => "accrue.toml".to_string(),
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accrue_core::{AccessControl, AccountId};
    use uuid::Uuid;

    /// Create a temporary config path using UUID to avoid conflicts.
    fn temp_config_path() -> String {
        std::env::temp_dir()
            .join(format!("accrue_cli_{}", Uuid::now_v7()))
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }

    #[test]
    fn test_parse_full_config() {
        let collector = AccountId::repeat_byte(0xfe);
        let minter = AccountId::repeat_byte(0xaa);
        let toml_src = format!(
            r#"
log_level = "debug"
state_path = "/tmp/ledger.json"

[ledger]
fee_collector = "{}"
rebase_fee_rate = "0.1"
supply_limit = "1000000"

[roles]
minters = ["{}"]
"#,
            collector, minter
        );
        let config: CliConfig = toml::from_str(&toml_src).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.state_path(), PathBuf::from("/tmp/ledger.json"));
        assert_eq!(config.ledger.fee_collector, collector);
        assert!(config.ledger.validate().is_ok());
        assert!(config.roles.is_minter(&minter));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.state_path, "~/.accrue/ledger.json");
        assert!(config.ledger.fee_collector.is_zero());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_config_path();
        let admin = AccountId::repeat_byte(0xaa);
        let mut config = CliConfig::default();
        config.log_level = "info".to_string();
        config.ledger = LedgerConfig::new(AccountId::repeat_byte(0xfe))
            .with_supply_limit(accrue_core::parse_units("5000").unwrap());
        config.roles.minters.insert(admin);

        config.save(&path).unwrap();
        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded.log_level, "info");
        assert_eq!(loaded.ledger, config.ledger);
        assert_eq!(loaded.roles, config.roles);

        let _ = fs::remove_dir_all(PathBuf::from(&path).parent().unwrap());
    }

    #[test]
    fn test_expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/lib/accrue.json"), PathBuf::from("/var/lib/accrue.json"));
    }
}
