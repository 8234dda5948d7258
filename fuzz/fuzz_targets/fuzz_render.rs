#![no_main]

use bastion_errors::{AppError, StatusCode, suppress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (i32, i32, String, String, Vec<(String, String)>)| {
    let (public, service, public_message, service_message, meta) = input;
    let public = StatusCode::from_raw(public);

    let mut err = AppError::new(public, public_message, service_message);
    err.service_status_code = StatusCode::from_raw(service);
    err.public_metadata.extend(meta.iter().cloned());
    err.service_metadata.extend(meta);

    let rendered = err.render();
    assert!(rendered.contains(&format!("({})", public.value())));
    assert!(rendered.contains(&format!("({})", service)));

    err.neutralize_public();
    assert_eq!(err.public_status_code, suppress(public));
    let _ = err.to_string();
    let _ = format!("{:?}", err);
});
