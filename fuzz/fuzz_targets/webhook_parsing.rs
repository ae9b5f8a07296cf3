#![no_main]

//! Fuzz target for LINE webhook payload parsing.
//!
//! Correctly signed arbitrary bodies must either parse or fail with
//! `MalformedPayload`; nothing may panic and no other error may surface.

use libfuzzer_sys::fuzz_target;
use relay_line::{
    events::{parse_payload, parse_signed},
    signature::sign,
    PlatformError,
};

const SECRET: &str = "fuzz-channel-secret";

fuzz_target!(|data: &[u8]| {
    let _ = parse_payload(data);

    let signature = sign(data, SECRET);
    match parse_signed(SECRET, Some(&signature), data) {
        Ok(events) => {
            for event in &events {
                let _ = event.text();
                let _ = event.user_id();
            }
        },
        Err(PlatformError::MalformedPayload { .. }) => {},
        Err(other) => panic!("unexpected error for signed body: {other}"),
    }
});
