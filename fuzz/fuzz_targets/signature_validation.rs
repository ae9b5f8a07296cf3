#![no_main]

//! Fuzz target for LINE webhook signature validation.
//!
//! Splits the input into secret, signature header and body so every field
//! an attacker controls gets arbitrary bytes. Validation must never panic,
//! and a signature computed with the real secret must always verify.

use libfuzzer_sys::fuzz_target;
use relay_line::signature::{sign, validate_signature};

fuzz_target!(|data: &[u8]| {
    let mut parts = data.splitn(3, |b| *b == b'\n');
    let secret = String::from_utf8_lossy(parts.next().unwrap_or_default());
    let header = String::from_utf8_lossy(parts.next().unwrap_or_default());
    let body = parts.next().unwrap_or_default();

    let _ = validate_signature(body, &header, &secret);

    if !secret.is_empty() {
        let signature = sign(body, &secret);
        assert!(validate_signature(body, &signature, &secret).is_valid);
    }
});
