// SPDX-License-Identifier: MIT
use alloy_consensus::TxLegacy;
use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::{Context, Result};
use revm::primitives::{
    BlobExcessGasAndPrice, BlockEnv, CfgEnv, CfgEnvWithHandlerCfg, EnvWithHandlerCfg,
    ResultAndState, SpecId, TxEnv, TxKind,
};
use revm::{DatabaseRef, Evm};

use soltest_types::conversions::fee_to_u256;

/// Block-level values a transaction executes under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockContext {
    pub number: u64,
    pub timestamp: u64,
    pub coinbase: Address,
    pub gas_limit: u64,
    pub base_fee: u64,
    pub prevrandao: B256,
}

impl BlockContext {
    fn block_env(&self, spec_id: SpecId) -> BlockEnv {
        BlockEnv {
            number: U256::from(self.number),
            coinbase: self.coinbase,
            timestamp: U256::from(self.timestamp),
            gas_limit: U256::from(self.gas_limit),
            basefee: U256::from(self.base_fee),
            difficulty: U256::ZERO,
            prevrandao: Some(self.prevrandao),
            blob_excess_gas_and_price: Some(BlobExcessGasAndPrice::new(
                0,
                SpecId::enabled(spec_id, SpecId::PRAGUE),
            )),
        }
    }
}

/// Build the revm transaction env for a signed legacy transaction sent by `caller`.
///
/// The nonce is set, so revm enforces it against the sender's account.
pub fn tx_env_from_legacy(tx: &TxLegacy, caller: Address) -> TxEnv {
    TxEnv {
        caller,
        gas_limit: tx.gas_limit,
        gas_price: fee_to_u256(tx.gas_price),
        transact_to: tx.to,
        value: tx.value,
        data: tx.input.clone(),
        nonce: Some(tx.nonce),
        chain_id: tx.chain_id,
        ..Default::default()
    }
}

/// Build the revm transaction env for a read-only call.
///
/// No nonce and a zero gas price, so the call is never rejected for
/// ordering or fee reasons.
pub fn tx_env_for_call(
    caller: Address,
    to: Address,
    value: U256,
    data: Bytes,
    gas_limit: u64,
) -> TxEnv {
    TxEnv {
        caller,
        gas_limit,
        gas_price: U256::ZERO,
        transact_to: TxKind::Call(to),
        value,
        data,
        nonce: None,
        ..Default::default()
    }
}

/// Execute one transaction against `db` without committing.
///
/// Returns the full `ResultAndState` from revm; the caller decides whether
/// to commit the state changes. An `Err` means revm refused the transaction
/// (bad nonce, insufficient funds, fee below base fee, ...) and nothing ran.
pub fn execute_tx<DB: DatabaseRef>(
    db: DB,
    block: &BlockContext,
    tx_env: TxEnv,
    chain_id: u64,
    spec_id: SpecId,
) -> Result<ResultAndState>
where
    DB::Error: std::fmt::Debug,
{
    let mut cfg = CfgEnv::default();
    cfg.chain_id = chain_id;

    let cfg_with_handler = CfgEnvWithHandlerCfg::new_with_spec_id(cfg, spec_id);
    let env_with_handler =
        EnvWithHandlerCfg::new_with_cfg_env(cfg_with_handler, block.block_env(spec_id), tx_env);

    let mut evm = Evm::builder()
        .with_ref_db(db)
        .with_env_with_handler_cfg(env_with_handler)
        .build();

    let result = evm
        .transact()
        .map_err(|e| anyhow::anyhow!("EVM execution failed: {:?}", e))
        .context("execute_tx transact")?;

    Ok(result)
}
