// SPDX-License-Identifier: MIT
use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use soltest_types::amount::parse_amount;
use soltest_types::constants::{
    DEFAULT_BALANCE_ETHER, DEFAULT_BLOCK_TIME, DEFAULT_CHAIN_ID, DEFAULT_KEYS,
    DEFAULT_TX_GAS_LIMIT, GENESIS_GAS_LIMIT, MAX_BLOCK_TIME,
};
use soltest_logic::hardfork::spec_id_from_name;

/// Settings for building a test chain and its accounts.
///
/// Every field has a default, so a TOML document only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub chain_id: u64,
    /// Hardfork name, e.g. `"cancun"` or `"berlin"`.
    pub hardfork: String,
    /// Block gas limit; 0 selects the genesis default.
    pub gas_limit: u64,
    /// Seconds between committed block timestamps.
    pub block_time: u64,
    /// Gas limit on transactions built by account transactors.
    pub tx_gas_limit: u64,
    /// Starting balance of every account, e.g. `"1000000ETH"`.
    pub initial_balance: String,
    /// Hex private keys, one account per key.
    pub keys: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            chain_id: DEFAULT_CHAIN_ID,
            hardfork: "cancun".to_string(),
            gas_limit: 0,
            block_time: DEFAULT_BLOCK_TIME,
            tx_gas_limit: DEFAULT_TX_GAS_LIMIT,
            initial_balance: format!("{DEFAULT_BALANCE_ETHER}ETH"),
            keys: DEFAULT_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl ChainConfig {
    /// Parse and validate a TOML config document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ChainConfig =
            toml::from_str(contents).context("failed to parse chain config")?;
        config.validate()?;
        Ok(config)
    }

    /// Block gas limit the chain runs with.
    pub fn block_gas_limit(&self) -> u64 {
        if self.gas_limit == 0 {
            GENESIS_GAS_LIMIT
        } else {
            self.gas_limit
        }
    }

    /// Check the settings that would otherwise fail later, during chain construction.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.chain_id != 0, "chain_id must be non-zero");
        ensure!(!self.keys.is_empty(), "at least one test key is required");
        ensure!(self.tx_gas_limit > 0, "tx_gas_limit must be non-zero");
        ensure!(
            self.block_time <= MAX_BLOCK_TIME,
            "block_time {} exceeds {} seconds",
            self.block_time,
            MAX_BLOCK_TIME
        );
        ensure!(
            self.tx_gas_limit <= self.block_gas_limit(),
            "tx_gas_limit {} exceeds block gas limit {}",
            self.tx_gas_limit,
            self.block_gas_limit()
        );
        spec_id_from_name(&self.hardfork)?;
        let balance = parse_amount(&self.initial_balance)
            .with_context(|| format!("initial_balance '{}'", self.initial_balance))?;
        ensure!(!balance.is_zero(), "initial_balance must be non-zero");
        Ok(())
    }
}
