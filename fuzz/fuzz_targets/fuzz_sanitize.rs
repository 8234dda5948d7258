#![no_main]

use bastion_errors::convenience::{MAX_SANITIZED_LEN, sanitize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let out = sanitize(&text);
    assert!(out.len() <= MAX_SANITIZED_LEN);
    assert!(!out.chars().any(char::is_control));
});
