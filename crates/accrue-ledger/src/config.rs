// crates/accrue-ledger/src/config.rs
//
// Ledger configuration injected at construction.
// Deserializable from the `[ledger]` table of the CLI's TOML file; amounts
// and rates are written as decimal strings ("1000000", "0.1").

use accrue_core::fixed::{units, INDEX_ONE};
use accrue_core::{AccountId, AccrueError, ChainId, U256};
use serde::{Deserialize, Serialize};

use crate::rebase::RebasePolicy;

/// Construction-time configuration of a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Chain this instance runs on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Chain that owns index growth and fee minting.
    #[serde(default = "default_chain_id")]
    pub main_chain_id: u64,

    /// Ceiling on total supply, enforced on mint. "max" for no ceiling.
    #[serde(default = "default_supply_limit", with = "units")]
    pub supply_limit: U256,

    /// Recipient of the fee minted on every main-chain rebase.
    #[serde(default)]
    pub fee_collector: AccountId,

    /// Fraction of rebase growth minted to the fee collector ("0.1" = 10%).
    #[serde(default = "default_rebase_fee_rate", with = "units")]
    pub rebase_fee_rate: U256,

    /// Permit committing a lower index than the current one.
    #[serde(default)]
    pub allow_index_decrease: bool,
}

fn default_chain_id() -> u64 {
    1
}

fn default_supply_limit() -> U256 {
    U256::MAX
}

fn default_rebase_fee_rate() -> U256 {
    U256::zero()
}

impl Default for LedgerConfig {
    /// Defaults with no fee collector; fails `validate` until one is set.
    fn default() -> Self {
        Self::new(AccountId::ZERO)
    }
}

impl LedgerConfig {
    /// Main-chain configuration with no ceiling and no fee.
    pub fn new(fee_collector: AccountId) -> Self {
        Self {
            chain_id: default_chain_id(),
            main_chain_id: default_chain_id(),
            supply_limit: default_supply_limit(),
            fee_collector,
            rebase_fee_rate: default_rebase_fee_rate(),
            allow_index_decrease: false,
        }
    }

    /// Set the supply ceiling.
    pub fn with_supply_limit(mut self, limit: U256) -> Self {
        self.supply_limit = limit;
        self
    }

    /// Set the rebase fee rate (18-decimal fraction).
    pub fn with_fee_rate(mut self, rate: U256) -> Self {
        self.rebase_fee_rate = rate;
        self
    }

    /// Set this instance's chain and the main chain.
    pub fn with_chains(mut self, chain_id: u64, main_chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self.main_chain_id = main_chain_id;
        self
    }

    /// Allow or forbid index decreases.
    pub fn with_index_decrease(mut self, allowed: bool) -> Self {
        self.allow_index_decrease = allowed;
        self
    }

    pub fn chain(&self) -> ChainId {
        ChainId(self.chain_id)
    }

    pub fn is_main_chain(&self) -> bool {
        self.chain_id == self.main_chain_id
    }

    pub fn rebase_policy(&self) -> RebasePolicy {
        RebasePolicy {
            fee_rate: self.rebase_fee_rate,
            allow_index_decrease: self.allow_index_decrease,
        }
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    /// `InvalidConfig` if the fee collector is the zero address or the fee
    /// rate is not below 1.0.
    pub fn validate(&self) -> Result<(), AccrueError> {
        if self.fee_collector.is_zero() {
            return Err(AccrueError::InvalidConfig(
                "fee_collector must not be the zero address".to_string(),
            ));
        }
        if self.rebase_fee_rate >= INDEX_ONE {
            return Err(AccrueError::InvalidConfig(format!(
                "rebase_fee_rate must be below 1.0, got {}",
                accrue_core::format_units(self.rebase_fee_rate)
            )));
        }
        Ok(())
    }
}
