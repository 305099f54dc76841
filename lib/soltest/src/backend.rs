// SPDX-License-Identifier: MIT
use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, Log, B256, U256};

use soltest_types::constants::RECEIPT_STATUS_SUCCESSFUL;

use crate::transactor::SignedTx;

/// The chain operations a test chain needs from its backend.
///
/// Execution semantics live behind this seam; `TestChain` and the
/// transactor only submit, seal and inspect.
pub trait Backend {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gas price acceptable for inclusion in the pending block.
    fn suggest_gas_price(&self) -> Result<u128, Self::Error>;

    /// Next nonce for `address`, counting pending transactions.
    fn pending_nonce_at(&self, address: Address) -> Result<u64, Self::Error>;

    /// Validate and execute `tx` into the pending block.
    fn send_transaction(&mut self, tx: SignedTx) -> Result<B256, Self::Error>;

    /// Seal all pending transactions into a new block and return its hash.
    fn commit(&mut self) -> B256;

    /// Receipt of a committed transaction.
    fn transaction_receipt(&self, hash: B256) -> Result<Receipt, Self::Error>;

    /// Header of the current head block.
    fn head(&self) -> &Header;
}

/// Outcome of a transaction included in a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub transaction_index: u64,
    pub block_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    /// Address of the created contract, for contract-creation transactions.
    pub contract_address: Option<Address>,
    /// 1 on success, 0 on revert or halt.
    pub status: u64,
    pub gas_used: u64,
    pub cumulative_gas_used: u64,
    pub effective_gas_price: u128,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        self.status == RECEIPT_STATUS_SUCCESSFUL
    }
}

/// A read-only message call against head state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    /// Defaults to the head block gas limit.
    pub gas_limit: Option<u64>,
}

/// Errors returned by the simulated backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("transaction {0} not found")]
    UnknownTransaction(B256),

    #[error("block {0} not found")]
    UnknownBlock(u64),

    #[error("transaction {0} already known")]
    AlreadyKnown(B256),

    #[error("invalid transaction signature: {0}")]
    InvalidSignature(String),

    #[error("transaction chain id {got} does not match chain {expected}")]
    WrongChainId { expected: u64, got: u64 },

    #[error("transaction gas limit {gas_limit} exceeds remaining block gas {remaining}")]
    GasLimitReached { gas_limit: u64, remaining: u64 },

    #[error("transaction {hash} rejected: {reason}")]
    Rejected { hash: B256, reason: String },

    #[error("call failed: {0}")]
    CallFailed(String),

    #[error("call reverted with output {output:?}")]
    CallReverted { output: Bytes },

    #[error("call halted: {reason}")]
    CallHalted { reason: String },

    #[error("cannot adjust time while {0} transactions are pending")]
    PendingNotEmpty(usize),

    #[error("advancing timestamp {timestamp} by {seconds}s overflows")]
    TimestampOverflow { timestamp: u64, seconds: u64 },
}
