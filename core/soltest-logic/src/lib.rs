// SPDX-License-Identifier: MIT
//! soltest-logic crate
//!
//! EVM glue for the simulated chain: in-memory state, single-transaction
//! execution and hardfork fee rules.

pub mod db;
pub mod executor;
pub mod hardfork;
