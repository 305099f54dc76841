// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;
use std::convert::Infallible;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use revm::primitives::{AccountInfo, Bytecode, EvmState, KECCAK_EMPTY};
use revm::{DatabaseCommit, DatabaseRef};

use soltest_types::genesis::GenesisAlloc;

/// In-memory world state of the simulated chain.
///
/// Read through revm's `DatabaseRef` and updated with `DatabaseCommit`.
/// Cloning is how the pending block gets its own copy of head state.
#[derive(Debug, Clone, Default)]
pub struct MemDB {
    pub accounts: BTreeMap<Address, AccountInfo>,
    pub storage: BTreeMap<Address, BTreeMap<U256, U256>>,
    pub block_hashes: BTreeMap<u64, B256>,
    pub codes: BTreeMap<B256, Bytes>,
}

impl MemDB {
    /// Create a MemDB holding the given genesis allocation.
    pub fn from_genesis(alloc: &GenesisAlloc) -> Self {
        let mut db = MemDB::default();

        for (address, account) in alloc {
            let (code_hash, bytecode) = match &account.code {
                Some(code) if !code.is_empty() => {
                    let hash = keccak256(code);
                    db.codes.insert(hash, code.clone());
                    (hash, Bytecode::new_raw(code.clone()))
                }
                _ => (KECCAK_EMPTY, Bytecode::default()),
            };

            db.accounts.insert(
                *address,
                AccountInfo {
                    balance: account.balance,
                    nonce: account.nonce,
                    code_hash,
                    code: Some(bytecode),
                },
            );

            if !account.storage.is_empty() {
                db.storage.insert(*address, account.storage.clone());
            }
        }

        db
    }

    pub fn insert_block_hash(&mut self, number: u64, hash: B256) {
        self.block_hashes.insert(number, hash);
    }

    /// Balance of `address`, zero for unknown accounts.
    pub fn balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|info| info.balance)
            .unwrap_or_default()
    }

    /// Nonce of `address`, zero for unknown accounts.
    pub fn nonce(&self, address: Address) -> u64 {
        self.accounts
            .get(&address)
            .map(|info| info.nonce)
            .unwrap_or_default()
    }

    /// Deployed code at `address`, empty for accounts without code.
    pub fn code(&self, address: Address) -> Bytes {
        self.accounts
            .get(&address)
            .and_then(|info| self.codes.get(&info.code_hash))
            .cloned()
            .unwrap_or_default()
    }

    /// Value of a storage slot, zero when never written.
    pub fn storage_at(&self, address: Address, index: U256) -> U256 {
        self.storage
            .get(&address)
            .and_then(|slots| slots.get(&index))
            .copied()
            .unwrap_or_default()
    }
}

impl DatabaseRef for MemDB {
    type Error = Infallible;

    fn basic_ref(&self, address: Address) -> Result<Option<AccountInfo>, Self::Error> {
        Ok(self.accounts.get(&address).cloned())
    }

    fn code_by_hash_ref(&self, code_hash: B256) -> Result<Bytecode, Self::Error> {
        match self.codes.get(&code_hash) {
            Some(bytes) => Ok(Bytecode::new_raw(bytes.clone())),
            None => Ok(Bytecode::default()),
        }
    }

    fn storage_ref(&self, address: Address, index: U256) -> Result<U256, Self::Error> {
        Ok(self.storage_at(address, index))
    }

    fn block_hash_ref(&self, number: u64) -> Result<B256, Self::Error> {
        Ok(self.block_hashes.get(&number).copied().unwrap_or_default())
    }
}

impl DatabaseCommit for MemDB {
    fn commit(&mut self, changes: EvmState) {
        for (address, account) in changes {
            if !account.is_touched() {
                continue;
            }

            if account.is_selfdestructed() {
                self.accounts.remove(&address);
                self.storage.remove(&address);
                continue;
            }

            if account.is_created() {
                self.storage.remove(&address);
            }

            if let Some(code) = &account.info.code {
                if !code.is_empty() {
                    self.codes
                        .insert(account.info.code_hash, code.original_bytes());
                }
            }

            if !account.storage.is_empty() {
                let slots = self.storage.entry(address).or_default();
                for (index, slot) in account.storage {
                    slots.insert(index, slot.present_value);
                }
            }

            self.accounts.insert(address, account.info);
        }
    }
}
