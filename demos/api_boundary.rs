//! Shows where suppression belongs: at the edge, right before an error is
//! written into a response body.
//!
//! Run with `cargo run --example api_boundary --features serde`.

use bastion_errors::{
    AppError, DbFailure, EngineError, FieldFailure, ValidationInput, definitions, from_db_error,
    from_validation_errors, sql_state,
};

/// Stand-in for an HTTP response.
struct Response {
    status: u16,
    body: String,
}

fn respond(mut err: AppError) -> Result<Response, serde_json::Error> {
    // Trust boundary: log the full error, then collapse over-detailed codes.
    eprintln!("service: {}", err.service_log());
    err.neutralize_public();

    let view = err.public_view();
    Ok(Response {
        status: view.http_status_or_500(),
        body: serde_json::to_string(&view)?,
    })
}

fn main() -> Result<(), serde_json::Error> {
    println!("--- API Boundary Example ---\n");

    let cases: Vec<(&str, AppError)> = vec![
        (
            "signup with taken email",
            from_db_error(
                Some(&DbFailure::Engine(
                    EngineError::new(sql_state::UNIQUE_VIOLATION, "duplicate key value violates unique constraint")
                        .with_constraint("users_email_key"),
                )),
                "User",
            )
            .unwrap_or_else(|| AppError::new(definitions::SERVER_ERROR, "Unknown server error", "nothing to classify")),
        ),
        (
            "deadlock during checkout",
            from_db_error(Some(&DbFailure::Engine(EngineError::new("40P01", "deadlock detected"))), "Order")
                .unwrap_or_else(|| AppError::new(definitions::SERVER_ERROR, "Unknown server error", "nothing to classify")),
        ),
        (
            "role outside allowed set",
            from_validation_errors(&ValidationInput::Fields(vec![
                FieldFailure::new("Role", "root", "oneof").with_param("admin editor viewer"),
            ])),
        ),
        (
            "two bad fields",
            from_validation_errors(&ValidationInput::Fields(vec![
                FieldFailure::new("Email", "not-an-email", "email"),
                FieldFailure::new("Age", "12", "gte").with_param("18"),
            ])),
        ),
    ];

    for (label, err) in cases {
        let response = respond(err)?;
        println!("{}:\n   HTTP {} {}\n", label, response.status, response.body);
    }

    Ok(())
}
