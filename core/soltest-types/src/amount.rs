// SPDX-License-Identifier: MIT
use std::fmt;

use alloy_primitives::U256;

/// Error type for parsing amount strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseError {
    pub message: String,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid amount: {}", self.message)
    }
}

impl std::error::Error for AmountParseError {}

/// Parse an amount string in the format `<number>[ETH|gwei|wei]` into wei.
///
/// Examples:
/// - `"1000000ETH"` (one million ether)
/// - `"1.5ETH"` (decimals are allowed for ETH and gwei)
/// - `"30gwei"`
/// - `"1000"` (wei is the default unit)
pub fn parse_amount(s: &str) -> Result<U256, AmountParseError> {
    let err = |msg: &str| AmountParseError {
        message: msg.to_string(),
    };

    let s = s.trim();
    let (num_str, decimals) = if let Some(stripped) =
        s.strip_suffix("ETH").or_else(|| s.strip_suffix("eth"))
    {
        (stripped, 18)
    } else if let Some(stripped) = s.strip_suffix("gwei") {
        (stripped, 9)
    } else if let Some(stripped) = s.strip_suffix("wei") {
        (stripped, 0)
    } else {
        (s, 0)
    };

    if num_str.is_empty() {
        return Err(err("amount cannot be empty"));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals as u64));

    if num_str.contains('.') {
        if decimals == 0 {
            return Err(err("decimal amounts need an ETH or gwei suffix"));
        }
        return parse_decimal(num_str, decimals, scale);
    }

    let amount =
        U256::from_str_radix(num_str, 10).map_err(|e| err(&format!("invalid number: {e}")))?;
    amount
        .checked_mul(scale)
        .ok_or_else(|| err("amount overflow when converting to wei"))
}

/// Parse a decimal amount like "1.5" with `decimals` fractional digits of precision.
fn parse_decimal(s: &str, decimals: usize, scale: U256) -> Result<U256, AmountParseError> {
    let err = |msg: &str| AmountParseError {
        message: msg.to_string(),
    };

    let (whole, frac) = s
        .split_once('.')
        .ok_or_else(|| err("expected decimal point"))?;

    if frac.len() > decimals {
        return Err(err(&format!(
            "too many decimal places (max {decimals})"
        )));
    }

    let whole_wei = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10)
            .map_err(|e| err(&format!("invalid whole part: {e}")))?
            .checked_mul(scale)
            .ok_or_else(|| err("overflow"))?
    };

    let frac_wei = if frac.is_empty() {
        U256::ZERO
    } else {
        let frac_padded = format!("{:0<width$}", frac, width = decimals);
        U256::from_str_radix(&frac_padded, 10)
            .map_err(|e| err(&format!("invalid fractional part: {e}")))?
    };

    whole_wei
        .checked_add(frac_wei)
        .ok_or_else(|| err("overflow"))
}
