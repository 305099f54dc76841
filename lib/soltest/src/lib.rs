// SPDX-License-Identifier: MIT
//! soltest crate
//!
//! In-memory simulated chain with a fixed set of funded test accounts, plus
//! the `succeed` and `last_gas` helpers used by contract tests.

pub mod account;
pub mod backend;
pub mod chain;
pub mod config;
pub mod simulated;
pub mod transactor;

#[cfg(test)]
mod test_utils;

pub use account::TestAccount;
pub use backend::{Backend, BackendError, CallRequest, Receipt};
pub use chain::TestChain;
pub use config::ChainConfig;
pub use simulated::SimulatedBackend;
pub use transactor::{SignedTx, Transactor};
