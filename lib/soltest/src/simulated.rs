// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

use alloy_consensus::Header;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use revm::primitives::{ExecutionResult, ResultAndState, SpecId};
use revm::DatabaseCommit;
use tracing::debug;

use soltest_logic::db::MemDB;
use soltest_logic::executor::{execute_tx, tx_env_for_call, tx_env_from_legacy, BlockContext};
use soltest_logic::hardfork::{genesis_base_fee, has_base_fee, next_base_fee, suggested_gas_price};
use soltest_types::constants::{RECEIPT_STATUS_FAILED, RECEIPT_STATUS_SUCCESSFUL};
use soltest_types::genesis::GenesisAlloc;

use crate::backend::{Backend, BackendError, CallRequest, Receipt};
use crate::transactor::SignedTx;

/// Chain parameters of a simulated backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOptions {
    pub chain_id: u64,
    pub spec_id: SpecId,
    pub gas_limit: u64,
    pub block_time: u64,
}

/// A sealed block.
#[derive(Debug, Clone)]
pub struct Block {
    pub header: Header,
    pub hash: B256,
    pub transactions: Vec<B256>,
}

/// Transactions executed on top of head state but not yet sealed.
#[derive(Debug, Default)]
struct PendingBlock {
    context: BlockContext,
    state: MemDB,
    transactions: Vec<SignedTx>,
    receipts: Vec<Receipt>,
    gas_used: u64,
}

/// In-memory chain that produces a block only when `commit` is called.
///
/// Transactions are executed by revm into a pending block as they are
/// sent; `commit` seals that block and `rollback` discards it.
#[derive(Debug)]
pub struct SimulatedBackend {
    options: BackendOptions,
    blocks: Vec<Block>,
    state: MemDB,
    pending: PendingBlock,
    receipts: BTreeMap<B256, Receipt>,
    transactions: BTreeMap<B256, SignedTx>,
}

impl SimulatedBackend {
    /// Create a chain whose genesis block holds `alloc`.
    pub fn new(alloc: &GenesisAlloc, options: BackendOptions) -> Self {
        let header = Header {
            number: 0,
            gas_limit: options.gas_limit,
            gas_used: 0,
            timestamp: 0,
            base_fee_per_gas: has_base_fee(options.spec_id)
                .then(|| genesis_base_fee(options.spec_id)),
            ..Default::default()
        };
        let hash = header.hash_slow();

        let mut state = MemDB::from_genesis(alloc);
        state.insert_block_hash(0, hash);

        let genesis = Block {
            header,
            hash,
            transactions: Vec::new(),
        };
        let pending = PendingBlock {
            context: child_context(&genesis, &options),
            state: state.clone(),
            ..Default::default()
        };

        debug!(
            chain_id = options.chain_id,
            spec_id = ?options.spec_id,
            accounts = alloc.len(),
            genesis = %hash,
            "Created simulated backend"
        );

        SimulatedBackend {
            options,
            blocks: vec![genesis],
            state,
            pending,
            receipts: BTreeMap::new(),
            transactions: BTreeMap::new(),
        }
    }

    pub fn head_block(&self) -> &Block {
        // The genesis block is always present.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn block_by_number(&self, number: u64) -> Result<&Block, BackendError> {
        usize::try_from(number)
            .ok()
            .and_then(|index| self.blocks.get(index))
            .ok_or(BackendError::UnknownBlock(number))
    }

    /// Committed or pending transaction by hash.
    pub fn transaction_by_hash(&self, hash: B256) -> Result<&SignedTx, BackendError> {
        self.transactions
            .get(&hash)
            .or_else(|| self.pending.transactions.iter().find(|tx| *tx.hash() == hash))
            .ok_or(BackendError::UnknownTransaction(hash))
    }

    /// Number of transactions waiting in the pending block.
    pub fn pending_count(&self) -> usize {
        self.pending.transactions.len()
    }

    pub fn balance_at(&self, address: Address) -> U256 {
        self.state.balance(address)
    }

    pub fn nonce_at(&self, address: Address) -> u64 {
        self.state.nonce(address)
    }

    pub fn code_at(&self, address: Address) -> Bytes {
        self.state.code(address)
    }

    pub fn storage_at(&self, address: Address, index: U256) -> U256 {
        self.state.storage_at(address, index)
    }

    /// Execute a message call against head state without changing it.
    ///
    /// Base-fee rules are not applied, so calls need no gas price.
    pub fn call_contract(&self, call: &CallRequest) -> Result<Bytes, BackendError> {
        let head = &self.head_block().header;
        let context = BlockContext {
            number: head.number,
            timestamp: head.timestamp,
            coinbase: head.beneficiary,
            gas_limit: head.gas_limit,
            base_fee: 0,
            prevrandao: head.mix_hash,
        };
        let tx_env = tx_env_for_call(
            call.from,
            call.to,
            call.value,
            call.data.clone(),
            call.gas_limit.unwrap_or(head.gas_limit),
        );

        let ResultAndState { result, .. } = execute_tx(
            &self.state,
            &context,
            tx_env,
            self.options.chain_id,
            self.options.spec_id,
        )
        .map_err(|e| BackendError::CallFailed(format!("{e:#}")))?;

        match result {
            ExecutionResult::Success { output, .. } => Ok(output.into_data()),
            ExecutionResult::Revert { output, .. } => Err(BackendError::CallReverted { output }),
            ExecutionResult::Halt { reason, .. } => Err(BackendError::CallHalted {
                reason: format!("{reason:?}"),
            }),
        }
    }

    /// Drop every pending transaction and restart the pending block from head.
    pub fn rollback(&mut self) {
        let dropped = self.pending.transactions.len();
        self.reset_pending();
        debug!(dropped, "Rolled back pending block");
    }

    /// Move the pending block's timestamp forward by `seconds`.
    ///
    /// Only allowed while the pending block is empty, since its
    /// transactions already executed under the old timestamp.
    pub fn adjust_time(&mut self, seconds: u64) -> Result<(), BackendError> {
        if !self.pending.transactions.is_empty() {
            return Err(BackendError::PendingNotEmpty(
                self.pending.transactions.len(),
            ));
        }
        let context = &mut self.pending.context;
        context.timestamp = context
            .timestamp
            .checked_add(seconds)
            .ok_or(BackendError::TimestampOverflow {
                timestamp: context.timestamp,
                seconds,
            })?;
        Ok(())
    }

    fn reset_pending(&mut self) {
        self.pending = PendingBlock {
            context: child_context(self.head_block(), &self.options),
            state: self.state.clone(),
            ..Default::default()
        };
    }
}

impl Backend for SimulatedBackend {
    type Error = BackendError;

    fn suggest_gas_price(&self) -> Result<u128, BackendError> {
        Ok(suggested_gas_price(
            self.options.spec_id,
            self.pending.context.base_fee,
        ))
    }

    fn pending_nonce_at(&self, address: Address) -> Result<u64, BackendError> {
        Ok(self.pending.state.nonce(address))
    }

    fn send_transaction(&mut self, tx: SignedTx) -> Result<B256, BackendError> {
        let hash = *tx.hash();
        if self.transaction_by_hash(hash).is_ok() {
            return Err(BackendError::AlreadyKnown(hash));
        }

        let from = tx
            .recover_signer()
            .map_err(|e| BackendError::InvalidSignature(e.to_string()))?;

        let legacy = tx.tx();
        if let Some(got) = legacy.chain_id {
            if got != self.options.chain_id {
                return Err(BackendError::WrongChainId {
                    expected: self.options.chain_id,
                    got,
                });
            }
        }

        let remaining = self.pending.context.gas_limit - self.pending.gas_used;
        if legacy.gas_limit > remaining {
            return Err(BackendError::GasLimitReached {
                gas_limit: legacy.gas_limit,
                remaining,
            });
        }

        let ResultAndState { result, state } = execute_tx(
            &self.pending.state,
            &self.pending.context,
            tx_env_from_legacy(legacy, from),
            self.options.chain_id,
            self.options.spec_id,
        )
        .map_err(|e| BackendError::Rejected {
            hash,
            reason: format!("{e:#}"),
        })?;
        self.pending.state.commit(state);

        let gas_used = result.gas_used();
        self.pending.gas_used += gas_used;

        let (to, contract_address) = match legacy.to {
            TxKind::Call(to) => (Some(to), None),
            TxKind::Create => (None, Some(from.create(legacy.nonce))),
        };
        let status = if result.is_success() {
            RECEIPT_STATUS_SUCCESSFUL
        } else {
            RECEIPT_STATUS_FAILED
        };

        let receipt = Receipt {
            transaction_hash: hash,
            transaction_index: self.pending.transactions.len() as u64,
            block_hash: B256::ZERO,
            block_number: self.pending.context.number,
            from,
            to,
            contract_address,
            status,
            gas_used,
            cumulative_gas_used: self.pending.gas_used,
            effective_gas_price: legacy.gas_price,
            logs: result.logs().to_vec(),
        };
        debug!(%hash, %from, gas_used, status, "Added transaction to pending block");

        self.pending.receipts.push(receipt);
        self.pending.transactions.push(tx);

        Ok(hash)
    }

    fn commit(&mut self) -> B256 {
        let pending = std::mem::take(&mut self.pending);
        let parent_hash = self.head_block().hash;
        let context = pending.context;

        let header = Header {
            parent_hash,
            beneficiary: context.coinbase,
            number: context.number,
            gas_limit: context.gas_limit,
            gas_used: pending.gas_used,
            timestamp: context.timestamp,
            mix_hash: context.prevrandao,
            base_fee_per_gas: has_base_fee(self.options.spec_id).then_some(context.base_fee),
            ..Default::default()
        };
        let hash = header.hash_slow();

        let mut hashes = Vec::with_capacity(pending.transactions.len());
        for (tx, mut receipt) in pending.transactions.into_iter().zip(pending.receipts) {
            let tx_hash = *tx.hash();
            receipt.block_hash = hash;
            self.receipts.insert(tx_hash, receipt);
            self.transactions.insert(tx_hash, tx);
            hashes.push(tx_hash);
        }

        debug!(
            number = header.number,
            %hash,
            transactions = hashes.len(),
            gas_used = header.gas_used,
            "Committed block"
        );

        self.state = pending.state;
        self.state.insert_block_hash(header.number, hash);
        self.blocks.push(Block {
            header,
            hash,
            transactions: hashes,
        });
        self.reset_pending();

        hash
    }

    fn transaction_receipt(&self, hash: B256) -> Result<Receipt, BackendError> {
        self.receipts
            .get(&hash)
            .cloned()
            .ok_or(BackendError::UnknownTransaction(hash))
    }

    fn head(&self) -> &Header {
        &self.head_block().header
    }
}

/// Execution context of the block that would follow `parent`.
fn child_context(parent: &Block, options: &BackendOptions) -> BlockContext {
    let header = &parent.header;
    BlockContext {
        number: header.number + 1,
        timestamp: header.timestamp.saturating_add(options.block_time),
        coinbase: Address::ZERO,
        gas_limit: header.gas_limit,
        base_fee: next_base_fee(
            options.spec_id,
            header.gas_used,
            header.gas_limit,
            header.base_fee_per_gas.unwrap_or_default(),
        ),
        prevrandao: parent.hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{build_accounts, genesis_alloc, TestAccount};
    use crate::test_utils::{counter_init_code, reverter_init_code};
    use soltest_types::constants::{DEFAULT_KEYS, GENESIS_GAS_LIMIT};
    use soltest_types::conversions::{ether, gas_cost};

    fn make_backend() -> (SimulatedBackend, Vec<TestAccount>) {
        let mut accounts = build_accounts(&DEFAULT_KEYS[..3], 1337, 1_000_000).unwrap();
        let backend = SimulatedBackend::new(
            &genesis_alloc(&accounts, ether(100)),
            BackendOptions {
                chain_id: 1337,
                spec_id: SpecId::CANCUN,
                gas_limit: GENESIS_GAS_LIMIT,
                block_time: 10,
            },
        );
        let price = backend.suggest_gas_price().unwrap();
        for account in &mut accounts {
            account.auth.set_gas_price(price);
        }
        (backend, accounts)
    }

    #[test]
    fn test_genesis_block() {
        let (backend, accounts) = make_backend();
        let head = backend.head();

        assert_eq!(head.number, 0);
        assert_eq!(head.gas_used, 0);
        assert_eq!(head.gas_limit, GENESIS_GAS_LIMIT);
        assert_eq!(head.base_fee_per_gas, Some(1_000_000_000));
        assert_eq!(backend.balance_at(accounts[0].addr), ether(100));
        assert_eq!(backend.nonce_at(accounts[0].addr), 0);
    }

    #[test]
    fn test_suggested_price_is_pending_base_fee() {
        let (backend, _) = make_backend();
        // Child of an empty genesis block: base fee drops by 1/8.
        assert_eq!(backend.suggest_gas_price().unwrap(), 875_000_000);
    }

    #[test]
    fn test_pending_until_commit() {
        let (mut backend, accounts) = make_backend();
        let to = accounts[1].addr;

        let tx = accounts[0]
            .auth
            .transfer(&mut backend, to, ether(1))
            .unwrap();
        let hash = *tx.hash();

        assert_eq!(backend.pending_count(), 1);
        assert_eq!(backend.pending_nonce_at(accounts[0].addr).unwrap(), 1);
        assert_eq!(backend.nonce_at(accounts[0].addr), 0);
        assert_eq!(backend.balance_at(to), ether(100));
        assert!(matches!(
            backend.transaction_receipt(hash),
            Err(BackendError::UnknownTransaction(_))
        ));
        assert!(backend.transaction_by_hash(hash).is_ok());

        let block_hash = backend.commit();

        let receipt = backend.transaction_receipt(hash).unwrap();
        assert!(receipt.succeeded());
        assert_eq!(receipt.block_hash, block_hash);
        assert_eq!(receipt.block_number, 1);
        assert_eq!(receipt.gas_used, 21_000);
        assert_eq!(receipt.to, Some(to));
        assert_eq!(backend.head().number, 1);
        assert_eq!(backend.head().gas_used, 21_000);
        assert_eq!(backend.balance_at(to), ether(101));
        assert_eq!(
            backend.balance_at(accounts[0].addr),
            ether(99) - gas_cost(21_000, accounts[0].auth.gas_price)
        );
    }

    #[test]
    fn test_nonces_advance_within_pending_block() {
        let (mut backend, accounts) = make_backend();
        let to = accounts[1].addr;

        let first = accounts[0].auth.transfer(&mut backend, to, U256::from(1u64)).unwrap();
        let second = accounts[0].auth.transfer(&mut backend, to, U256::from(2u64)).unwrap();
        assert_eq!(first.tx().nonce, 0);
        assert_eq!(second.tx().nonce, 1);

        backend.commit();

        let block = backend.block_by_number(1).unwrap();
        assert_eq!(block.transactions, vec![*first.hash(), *second.hash()]);
        let receipt = backend.transaction_receipt(*second.hash()).unwrap();
        assert_eq!(receipt.transaction_index, 1);
        assert_eq!(receipt.cumulative_gas_used, 42_000);
    }

    #[test]
    fn test_zero_gas_price_rejected_after_london() {
        let (mut backend, accounts) = make_backend();
        let mut auth = accounts[0].auth.clone();
        auth.set_gas_price(0);

        let err = auth
            .transfer(&mut backend, accounts[1].addr, U256::from(1u64))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::Rejected { .. })
        ));
        assert_eq!(backend.pending_count(), 0);
    }

    #[test]
    fn test_wrong_chain_id_rejected() {
        let (mut backend, accounts) = make_backend();
        let mut auth = accounts[0].auth.clone();
        auth.chain_id = 1;

        let err = auth
            .transfer(&mut backend, accounts[1].addr, U256::from(1u64))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::WrongChainId { expected: 1337, got: 1 })
        ));
    }

    #[test]
    fn test_stale_nonce_rejected() {
        let (mut backend, accounts) = make_backend();
        let to = accounts[1].addr;
        accounts[0].auth.transfer(&mut backend, to, U256::from(1u64)).unwrap();

        let mut auth = accounts[0].auth.clone();
        auth.nonce = Some(0);
        let err = auth
            .transact(&mut backend, to, U256::from(5u64), Bytes::new())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::Rejected { .. })
        ));
    }

    #[test]
    fn test_duplicate_submission_rejected() {
        let (mut backend, accounts) = make_backend();
        let tx = accounts[0]
            .auth
            .transfer(&mut backend, accounts[1].addr, U256::from(1u64))
            .unwrap();

        assert!(matches!(
            backend.send_transaction(tx),
            Err(BackendError::AlreadyKnown(_))
        ));
    }

    #[test]
    fn test_block_gas_limit_enforced() {
        let (mut backend, accounts) = make_backend();
        let mut auth = accounts[0].auth.clone();
        auth.gas_limit = GENESIS_GAS_LIMIT;
        auth.transfer(&mut backend, accounts[1].addr, U256::from(1u64))
            .unwrap();

        // Only 21000 gas was used, but a second full-block limit no longer fits.
        let mut other = accounts[1].auth.clone();
        other.gas_limit = GENESIS_GAS_LIMIT;
        let err = other
            .transfer(&mut backend, accounts[0].addr, U256::from(1u64))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BackendError>(),
            Some(BackendError::GasLimitReached { .. })
        ));
    }

    #[test]
    fn test_rollback_discards_pending() {
        let (mut backend, accounts) = make_backend();
        let tx = accounts[0]
            .auth
            .transfer(&mut backend, accounts[1].addr, ether(1))
            .unwrap();

        backend.rollback();
        assert_eq!(backend.pending_count(), 0);
        assert_eq!(backend.pending_nonce_at(accounts[0].addr).unwrap(), 0);
        assert!(backend.transaction_by_hash(*tx.hash()).is_err());

        backend.commit();
        assert_eq!(backend.head().gas_used, 0);
        assert_eq!(backend.balance_at(accounts[1].addr), ether(100));
    }

    #[test]
    fn test_commit_links_blocks_and_updates_base_fee() {
        let (mut backend, _) = make_backend();
        let genesis_hash = backend.head_block().hash;

        backend.commit();
        let first = backend.head_block().clone();
        backend.commit();
        let second = backend.head_block().clone();

        assert_eq!(first.header.parent_hash, genesis_hash);
        assert_eq!(second.header.parent_hash, first.hash);
        assert_eq!(first.header.timestamp, 10);
        assert_eq!(second.header.timestamp, 20);
        assert_eq!(first.header.base_fee_per_gas, Some(875_000_000));
        assert_eq!(second.header.base_fee_per_gas, Some(765_625_000));
        assert!(backend.block_by_number(3).is_err());
    }

    #[test]
    fn test_adjust_time() {
        let (mut backend, accounts) = make_backend();
        backend.adjust_time(100).unwrap();
        backend.commit();
        assert_eq!(backend.head().timestamp, 110);

        accounts[0]
            .auth
            .transfer(&mut backend, accounts[1].addr, U256::from(1u64))
            .unwrap();
        assert!(matches!(
            backend.adjust_time(5),
            Err(BackendError::PendingNotEmpty(1))
        ));
    }

    #[test]
    fn test_adjust_time_overflow_is_an_error() {
        let (mut backend, _) = make_backend();
        assert!(matches!(
            backend.adjust_time(u64::MAX),
            Err(BackendError::TimestampOverflow { timestamp: 10, .. })
        ));

        // The failed adjustment leaves the pending timestamp alone.
        backend.commit();
        assert_eq!(backend.head().timestamp, 10);
    }

    #[test]
    fn test_huge_block_time_saturates() {
        let accounts = build_accounts(&DEFAULT_KEYS[..1], 1337, 1_000_000).unwrap();
        let mut backend = SimulatedBackend::new(
            &genesis_alloc(&accounts, ether(1)),
            BackendOptions {
                chain_id: 1337,
                spec_id: SpecId::CANCUN,
                gas_limit: GENESIS_GAS_LIMIT,
                block_time: u64::MAX,
            },
        );

        backend.commit();
        backend.commit();
        assert_eq!(backend.head().number, 2);
        assert_eq!(backend.head().timestamp, u64::MAX);
    }

    #[test]
    fn test_deploy_and_call_contract() {
        let (mut backend, accounts) = make_backend();
        let deployer = &accounts[0];

        let tx = deployer
            .auth
            .deploy(&mut backend, counter_init_code())
            .unwrap();
        backend.commit();

        let receipt = backend.transaction_receipt(*tx.hash()).unwrap();
        assert!(receipt.succeeded());
        let contract = receipt.contract_address.expect("create receipt has an address");
        assert_eq!(contract, deployer.addr.create(0));
        assert!(!backend.code_at(contract).is_empty());

        deployer
            .auth
            .transact(&mut backend, contract, U256::ZERO, Bytes::new())
            .unwrap();
        backend.commit();
        assert_eq!(backend.storage_at(contract, U256::ZERO), U256::from(1u64));

        // A read-only call sees the increment but does not keep it.
        let output = backend
            .call_contract(&CallRequest {
                from: deployer.addr,
                to: contract,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(U256::from_be_slice(&output), U256::from(2u64));
        assert_eq!(backend.storage_at(contract, U256::ZERO), U256::from(1u64));
    }

    #[test]
    fn test_reverting_call() {
        let (mut backend, accounts) = make_backend();
        let tx = accounts[0]
            .auth
            .deploy(&mut backend, reverter_init_code())
            .unwrap();
        backend.commit();
        let contract = backend
            .transaction_receipt(*tx.hash())
            .unwrap()
            .contract_address
            .unwrap();

        let call = CallRequest {
            from: accounts[0].addr,
            to: contract,
            ..Default::default()
        };
        assert!(matches!(
            backend.call_contract(&call),
            Err(BackendError::CallReverted { .. })
        ));

        let tx = accounts[0]
            .auth
            .transact(&mut backend, contract, U256::ZERO, Bytes::new())
            .unwrap();
        backend.commit();
        let receipt = backend.transaction_receipt(*tx.hash()).unwrap();
        assert_eq!(receipt.status, RECEIPT_STATUS_FAILED);
        assert!(receipt.gas_used > 0);
        assert_eq!(backend.nonce_at(accounts[0].addr), 2);
    }

    #[test]
    fn test_pre_london_chain_has_no_base_fee() {
        let accounts = build_accounts(&DEFAULT_KEYS[..1], 1337, 1_000_000).unwrap();
        let mut backend = SimulatedBackend::new(
            &genesis_alloc(&accounts, ether(1)),
            BackendOptions {
                chain_id: 1337,
                spec_id: SpecId::BERLIN,
                gas_limit: GENESIS_GAS_LIMIT,
                block_time: 10,
            },
        );

        assert_eq!(backend.head().base_fee_per_gas, None);
        assert_eq!(backend.suggest_gas_price().unwrap(), 1);

        // A zero gas price is still fine without base-fee rules.
        accounts[0]
            .auth
            .transfer(&mut backend, Address::from([0x42; 20]), U256::from(7u64))
            .unwrap();
        backend.commit();
        assert_eq!(backend.balance_at(Address::from([0x42; 20])), U256::from(7u64));
    }
}
