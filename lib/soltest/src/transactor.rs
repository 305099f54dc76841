// SPDX-License-Identifier: MIT
use alloy_consensus::{SignableTransaction, Signed, TxLegacy};
use alloy_primitives::{Address, Bytes, PrimitiveSignature, TxKind, U256};
use anyhow::{Context, Result};
use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature};
use tracing::debug;

use soltest_types::key::TestKey;

use crate::backend::Backend;

/// A signed legacy (EIP-155) transaction.
pub type SignedTx = Signed<TxLegacy>;

/// Authorization handle: signs and submits transactions for one key.
///
/// Built transactions carry this handle's chain id, gas price and gas
/// limit. The nonce is read from the backend's pending state unless
/// `nonce` overrides it.
#[derive(Debug, Clone)]
pub struct Transactor {
    pub from: Address,
    key: TestKey,
    pub chain_id: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub nonce: Option<u64>,
}

impl Transactor {
    /// A transactor for `key` with a zero gas price.
    pub fn new(key: TestKey, chain_id: u64, gas_limit: u64) -> Self {
        Transactor {
            from: key.address(),
            key,
            chain_id,
            gas_price: 0,
            gas_limit,
            nonce: None,
        }
    }

    pub fn set_gas_price(&mut self, gas_price: u128) {
        self.gas_price = gas_price;
    }

    /// Sign `tx` as-is with this handle's key.
    pub fn sign(&self, tx: TxLegacy) -> Result<SignedTx> {
        let hash = tx.signature_hash();
        let (sig, recovery_id): (Signature, RecoveryId) = self
            .key
            .signing_key()
            .sign_prehash(hash.as_ref())
            .context("failed to sign transaction hash")?;

        let r = U256::from_be_slice(&sig.r().to_bytes());
        let s = U256::from_be_slice(&sig.s().to_bytes());
        let signature = PrimitiveSignature::new(r, s, recovery_id.is_y_odd());

        Ok(tx.into_signed(signature))
    }

    /// Send `value` wei to `to`.
    pub fn transfer<B: Backend>(&self, backend: &mut B, to: Address, value: U256) -> Result<SignedTx> {
        self.send(backend, TxKind::Call(to), value, Bytes::new())
    }

    /// Call `to` with calldata `data`, attaching `value` wei.
    pub fn transact<B: Backend>(
        &self,
        backend: &mut B,
        to: Address,
        value: U256,
        data: Bytes,
    ) -> Result<SignedTx> {
        self.send(backend, TxKind::Call(to), value, data)
    }

    /// Create a contract from `init_code`.
    pub fn deploy<B: Backend>(&self, backend: &mut B, init_code: Bytes) -> Result<SignedTx> {
        self.send(backend, TxKind::Create, U256::ZERO, init_code)
    }

    fn send<B: Backend>(
        &self,
        backend: &mut B,
        to: TxKind,
        value: U256,
        input: Bytes,
    ) -> Result<SignedTx> {
        let nonce = match self.nonce {
            Some(nonce) => nonce,
            None => backend
                .pending_nonce_at(self.from)
                .context("failed to read pending nonce")?,
        };

        let tx = TxLegacy {
            chain_id: Some(self.chain_id),
            nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to,
            value,
            input,
        };
        let signed = self.sign(tx)?;

        backend
            .send_transaction(signed.clone())
            .with_context(|| format!("failed to send transaction from {}", self.from))?;
        debug!(hash = %signed.hash(), from = %self.from, nonce, "Submitted transaction");

        Ok(signed)
    }
}
