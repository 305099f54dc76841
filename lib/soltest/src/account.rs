// SPDX-License-Identifier: MIT
use std::collections::BTreeSet;

use alloy_primitives::{Address, U256};
use anyhow::{bail, Context, Result};

use soltest_types::genesis::{GenesisAccount, GenesisAlloc};
use soltest_types::key::TestKey;

use crate::transactor::Transactor;

/// A funded test account: its address, key and authorization handle.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub addr: Address,
    pub key: TestKey,
    pub auth: Transactor,
}

/// Derive one account per key, in key order.
///
/// A malformed key or two keys for the same address is an error; no
/// account list is returned in that case.
pub fn build_accounts<S: AsRef<str>>(
    keys: &[S],
    chain_id: u64,
    tx_gas_limit: u64,
) -> Result<Vec<TestAccount>> {
    let mut seen = BTreeSet::new();
    let mut accounts = Vec::with_capacity(keys.len());

    for (index, raw) in keys.iter().enumerate() {
        let key: TestKey = raw
            .as_ref()
            .parse()
            .with_context(|| format!("test key #{index}"))?;
        let addr = key.address();
        if !seen.insert(addr) {
            bail!("test key #{index} duplicates account {addr}");
        }

        accounts.push(TestAccount {
            addr,
            auth: Transactor::new(key.clone(), chain_id, tx_gas_limit),
            key,
        });
    }

    Ok(accounts)
}

/// Genesis allocation funding every account with `balance`.
pub fn genesis_alloc(accounts: &[TestAccount], balance: U256) -> GenesisAlloc {
    accounts
        .iter()
        .map(|account| (account.addr, GenesisAccount::with_balance(balance)))
        .collect()
}
