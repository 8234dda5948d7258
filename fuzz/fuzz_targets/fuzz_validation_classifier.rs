#![no_main]

use bastion_errors::{FieldFailure, ValidationInput, definitions, from_validation_errors};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let failures: Vec<FieldFailure> = text
        .split('\n')
        .take(32)
        .map(|line| {
            let mut parts = line.splitn(4, '\u{0}');
            let field = parts.next().unwrap_or_default();
            let value = parts.next().unwrap_or_default();
            let tag = parts.next().unwrap_or_default();
            let failure = FieldFailure::new(field, value, tag);
            match parts.next() {
                Some(param) => failure.with_param(param),
                None => failure,
            }
        })
        .collect();

    let count = failures.len();
    let err = from_validation_errors(&ValidationInput::Fields(failures));
    if count != 1 {
        assert_eq!(err.public_status_code, definitions::BAD_REQUEST);
    }

    let err = from_validation_errors(&ValidationInput::Other(text.into_owned()));
    assert_eq!(err.public_status_code, definitions::BAD_REQUEST);
});
