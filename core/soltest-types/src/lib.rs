// SPDX-License-Identifier: MIT
//! soltest-types crate
//!
//! Plain data shared by the chain logic and the test fixture: constants,
//! unit conversions, key material and the genesis allocation.

pub mod amount;
pub mod constants;
pub mod conversions;
pub mod genesis;
pub mod key;
