// SPDX-License-Identifier: MIT
use alloy_primitives::U256;

use crate::constants::{WEI_PER_ETHER, WEI_PER_GWEI};

/// Convert a whole number of ether to wei.
pub fn ether(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_ETHER)
}

/// Convert a whole number of gwei to wei.
pub fn gwei(amount: u64) -> U256 {
    U256::from(amount) * U256::from(WEI_PER_GWEI)
}

/// Convert a `u128` fee value (as carried by transactions) to `U256`.
pub fn fee_to_u256(fee: u128) -> U256 {
    U256::from(fee)
}

/// Total cost a sender pays for `gas_used` at `gas_price`.
pub fn gas_cost(gas_used: u64, gas_price: u128) -> U256 {
    U256::from(gas_used) * U256::from(gas_price)
}
