// SPDX-License-Identifier: MIT
use std::fmt::Display;

use anyhow::{Context, Result};
use tracing::{debug, info};

use soltest_logic::hardfork::spec_id_from_name;
use soltest_types::amount::parse_amount;

use crate::account::{build_accounts, genesis_alloc, TestAccount};
use crate::backend::Backend;
use crate::config::ChainConfig;
use crate::simulated::{BackendOptions, SimulatedBackend};
use crate::transactor::SignedTx;

/// A simulated chain plus the helpers contract tests lean on.
///
/// The chain owns its backend and nothing else; accounts are handed back
/// to the caller at construction.
#[derive(Debug)]
pub struct TestChain<B = SimulatedBackend> {
    backend: B,
}

impl TestChain<SimulatedBackend> {
    /// Chain with the 15 default accounts, each funded with 1,000,000 ETH.
    pub fn new() -> Result<(Self, Vec<TestAccount>)> {
        Self::with_config(&ChainConfig::default())
    }

    pub fn with_config(config: &ChainConfig) -> Result<(Self, Vec<TestAccount>)> {
        config.validate().context("invalid chain config")?;
        let spec_id = spec_id_from_name(&config.hardfork)?;
        let balance = parse_amount(&config.initial_balance)?;

        let mut accounts = build_accounts(&config.keys, config.chain_id, config.tx_gas_limit)
            .context("failed to build test accounts")?;
        let alloc = genesis_alloc(&accounts, balance);

        let backend = SimulatedBackend::new(
            &alloc,
            BackendOptions {
                chain_id: config.chain_id,
                spec_id,
                gas_limit: config.block_gas_limit(),
                block_time: config.block_time,
            },
        );
        let chain = TestChain { backend };
        chain.apply_suggested_gas_price(&mut accounts)?;

        info!(
            chain_id = config.chain_id,
            hardfork = %config.hardfork,
            accounts = accounts.len(),
            "Test chain ready"
        );
        Ok((chain, accounts))
    }
}

impl<B: Backend> TestChain<B> {
    pub fn from_backend(backend: B) -> Self {
        TestChain { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Set the backend's suggested gas price on every account's transactor.
    ///
    /// Base-fee rules reject the transactor's initial zero gas price.
    pub fn apply_suggested_gas_price(&self, accounts: &mut [TestAccount]) -> Result<()> {
        let price = self
            .backend
            .suggest_gas_price()
            .context("failed to query suggested gas price")?;
        for account in accounts.iter_mut() {
            account.auth.set_gas_price(price);
        }
        debug!(gas_price = price, "Applied suggested gas price");
        Ok(())
    }

    /// Commit the pending block and report whether `submitted` succeeded.
    ///
    /// A submission error returns false without sealing a block.
    pub fn succeed<E: Display>(&mut self, submitted: Result<SignedTx, E>) -> bool {
        let tx = match submitted {
            Ok(tx) => tx,
            Err(e) => {
                debug!(error = %e, "Transaction was not submitted");
                return false;
            }
        };

        self.backend.commit();
        match self.backend.transaction_receipt(*tx.hash()) {
            Ok(receipt) => receipt.succeeded(),
            Err(e) => {
                debug!(hash = %tx.hash(), error = %e, "No receipt for transaction");
                false
            }
        }
    }

    /// Gas used by the most recently committed block.
    pub fn last_gas(&self) -> u64 {
        self.backend.head().gas_used
    }
}
