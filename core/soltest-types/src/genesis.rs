// SPDX-License-Identifier: MIT
use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, U256};

/// Starting state of a single genesis account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenesisAccount {
    pub balance: U256,
    pub nonce: u64,
    pub code: Option<Bytes>,
    pub storage: BTreeMap<U256, U256>,
}

impl GenesisAccount {
    /// A plain externally-owned account holding `balance`.
    pub fn with_balance(balance: U256) -> Self {
        GenesisAccount {
            balance,
            ..Default::default()
        }
    }
}

/// Address to starting-state mapping a chain is seeded with.
pub type GenesisAlloc = BTreeMap<Address, GenesisAccount>;
