// SPDX-License-Identifier: MIT
use alloy_eips::eip1559::{calc_next_block_base_fee, BaseFeeParams};
use anyhow::{bail, Result};
use revm::primitives::SpecId;

use soltest_types::constants::INITIAL_BASE_FEE;

/// Resolve a hardfork name (case-insensitive) to the EVM specification.
///
/// Accepted names run from `homestead` to `cancun`; `paris` is an alias
/// for `merge`.
pub fn spec_id_from_name(name: &str) -> Result<SpecId> {
    let spec = match name.to_ascii_lowercase().as_str() {
        "homestead" => SpecId::HOMESTEAD,
        "tangerine" => SpecId::TANGERINE,
        "spurious_dragon" => SpecId::SPURIOUS_DRAGON,
        "byzantium" => SpecId::BYZANTIUM,
        "constantinople" => SpecId::CONSTANTINOPLE,
        "petersburg" => SpecId::PETERSBURG,
        "istanbul" => SpecId::ISTANBUL,
        "berlin" => SpecId::BERLIN,
        "london" => SpecId::LONDON,
        "merge" | "paris" => SpecId::MERGE,
        "shanghai" => SpecId::SHANGHAI,
        "cancun" => SpecId::CANCUN,
        other => bail!("unknown hardfork '{}'", other),
    };
    Ok(spec)
}

/// Returns true if EIP-1559 base-fee rules apply under `spec_id`.
///
/// Once active, a gas price below the block base fee is rejected, so a
/// zero gas price stops working.
pub fn has_base_fee(spec_id: SpecId) -> bool {
    SpecId::enabled(spec_id, SpecId::LONDON)
}

/// Base fee of the genesis block.
pub fn genesis_base_fee(spec_id: SpecId) -> u64 {
    if has_base_fee(spec_id) {
        INITIAL_BASE_FEE
    } else {
        0
    }
}

/// Base fee of the child of a block with the given gas figures.
pub fn next_base_fee(spec_id: SpecId, gas_used: u64, gas_limit: u64, base_fee: u64) -> u64 {
    if !has_base_fee(spec_id) {
        return 0;
    }
    calc_next_block_base_fee(gas_used, gas_limit, base_fee, BaseFeeParams::ethereum())
}

/// Gas price a sender should use for inclusion in the pending block.
///
/// With base-fee rules this is the pending base fee (no tip needed on a
/// chain without competition); before London any non-zero price works.
pub fn suggested_gas_price(spec_id: SpecId, pending_base_fee: u64) -> u128 {
    if has_base_fee(spec_id) {
        pending_base_fee as u128
    } else {
        1
    }
}
