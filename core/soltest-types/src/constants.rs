// SPDX-License-Identifier: MIT

/// Chain id used by test chains unless configured otherwise.
pub const DEFAULT_CHAIN_ID: u64 = 1337;

/// Block gas limit applied when the configured limit is zero.
pub const GENESIS_GAS_LIMIT: u64 = 4_712_388;

/// Gas limit placed on transactions built by a transactor.
///
/// Small enough that several transactions fit into one block at the
/// genesis gas limit.
pub const DEFAULT_TX_GAS_LIMIT: u64 = 1_000_000;

/// Seconds between the timestamps of consecutive committed blocks.
pub const DEFAULT_BLOCK_TIME: u64 = 10;

/// Upper bound on a configured block time: one year of seconds.
pub const MAX_BLOCK_TIME: u64 = 365 * 24 * 60 * 60;

/// Base fee of the genesis block once London fee rules are active (1 gwei).
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

/// Starting balance of every test account, in ether.
pub const DEFAULT_BALANCE_ETHER: u64 = 1_000_000;

pub const WEI_PER_GWEI: u64 = 1_000_000_000;
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

/// Receipt status of a transaction that executed successfully.
pub const RECEIPT_STATUS_SUCCESSFUL: u64 = 1;
/// Receipt status of a transaction that reverted or halted.
pub const RECEIPT_STATUS_FAILED: u64 = 0;

/// Private keys of the default test accounts, in account order.
pub const DEFAULT_KEYS: [&str; 15] = [
    "1010101010101010101010101010101010101010101010101010101010101010",
    "1111111111111111111111111111111111111111111111111111111111111111",
    "2222222222222222222222222222222222222222222222222222222222222222",
    "3333333333333333333333333333333333333333333333333333333333333333",
    "4444444444444444444444444444444444444444444444444444444444444444",
    "5555555555555555555555555555555555555555555555555555555555555555",
    "6666666666666666666666666666666666666666666666666666666666666666",
    "7777777777777777777777777777777777777777777777777777777777777777",
    "8888888888888888888888888888888888888888888888888888888888888888",
    "9999999999999999999999999999999999999999999999999999999999999999",
    "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
    "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
    "cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
    "dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
    "eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
];
