// SPDX-License-Identifier: MIT
//! Bytecode fixtures and log setup shared by the crate's tests.

use alloy_primitives::Bytes;
use hex_literal::hex;

/// Runtime that always reverts with empty output.
pub const REVERTER_RUNTIME: [u8; 5] = hex!("60006000fd");

/// Runtime that increments slot 0 and returns the new value.
pub const COUNTER_RUNTIME: [u8; 18] = hex!("6000546001018060005560005260206000f3");

/// Wrap `runtime` in init code that copies it to memory and returns it.
pub fn init_code(runtime: &[u8]) -> Bytes {
    let len = u8::try_from(runtime.len()).expect("fixture runtime fits in PUSH1");
    // PUSH1 len DUP1 PUSH1 0x0b PUSH1 0 CODECOPY PUSH1 0 RETURN
    let mut code = vec![0x60, len, 0x80, 0x60, 0x0b, 0x60, 0x00, 0x39, 0x60, 0x00, 0xf3];
    code.extend_from_slice(runtime);
    Bytes::from(code)
}

pub fn counter_init_code() -> Bytes {
    init_code(&COUNTER_RUNTIME)
}

pub fn reverter_init_code() -> Bytes {
    init_code(&REVERTER_RUNTIME)
}

/// Route `tracing` output to the test harness; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_init_code_layout() {
    let code = init_code(&REVERTER_RUNTIME);
    assert_eq!(code.len(), 11 + REVERTER_RUNTIME.len());
    assert_eq!(code[1] as usize, REVERTER_RUNTIME.len());
    assert_eq!(&code[11..], &REVERTER_RUNTIME);
}
