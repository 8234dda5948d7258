#![no_main]

use bastion_errors::{DbFailure, EngineError, from_db_error};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut parts = text.splitn(4, '\u{0}');
    let code = parts.next().unwrap_or_default();
    let message = parts.next().unwrap_or_default();
    let constraint = parts.next().unwrap_or_default();
    let entity = parts.next().unwrap_or_default();

    let failures = [
        DbFailure::RowNotFound,
        DbFailure::Engine(EngineError::new(code, message).with_constraint(constraint).with_column(constraint)),
        DbFailure::Other(message.to_string()),
    ];

    for failure in &failures {
        let err = from_db_error(Some(failure), entity).expect("classifier returns Some for Some");
        assert_eq!(err.public_metadata.len(), 2);
        let _ = err.render();
        let mut line = String::new();
        let _ = err.service_log().write_to(&mut line);
    }
});
