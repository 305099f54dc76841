// SPDX-License-Identifier: MIT
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{keccak256, Address};
use k256::ecdsa::{SigningKey, VerifyingKey};

/// Error type for parsing private-key strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError {
    pub message: String,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid private key: {}", self.message)
    }
}

impl std::error::Error for KeyParseError {}

/// A secp256k1 private key used to sign test transactions.
#[derive(Clone)]
pub struct TestKey(SigningKey);

impl TestKey {
    pub fn signing_key(&self) -> &SigningKey {
        &self.0
    }

    /// Chain address controlled by this key.
    pub fn address(&self) -> Address {
        public_key_to_address(self.0.verifying_key())
    }

    /// Raw big-endian secret scalar.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes().into()
    }
}

impl From<SigningKey> for TestKey {
    fn from(key: SigningKey) -> Self {
        TestKey(key)
    }
}

// Never print the secret.
impl fmt::Debug for TestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestKey").field(&self.address()).finish()
    }
}

impl FromStr for TestKey {
    type Err = KeyParseError;

    /// Parse a 32-byte hex private key, with or without a `0x` prefix.
    ///
    /// The scalar must be non-zero and below the curve order.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |msg: &str| KeyParseError {
            message: msg.to_string(),
        };

        let hex_str = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if hex_str.len() != 64 {
            return Err(err(&format!(
                "expected 64 hex characters, got {}",
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str).map_err(|e| err(&format!("invalid hex: {e}")))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|_| err("scalar is zero or not below the secp256k1 order"))?;

        Ok(TestKey(key))
    }
}

/// Derive an address from a public key: the last 20 bytes of the keccak256
/// hash of the uncompressed point without its SEC1 tag byte.
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
