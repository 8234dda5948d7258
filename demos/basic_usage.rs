use bastion_errors::{AppError, DbFailure, Result, app_error, definitions, from_db_error, meta, sanitized};

fn find_user(id: &str) -> Result<String> {
    // Simulate a lookup that comes back empty
    if id == "missing" {
        return Err(from_db_error(Some(&DbFailure::RowNotFound), "User")
            .unwrap_or_else(|| AppError::new(definitions::SERVER_ERROR, "Unknown server error", "no error to classify")));
    }
    Ok(format!("user-{}", id))
}

fn rename_user(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        let mut err = app_error!(
            definitions::BAD_REQUEST_MISSING_FIELD,
            "Missing required field",
            "rename rejected, name was {:?}",
            sanitized!(name)
        );
        err.public_metadata.extend([("field", "name")]);
        err.service_metadata = meta! { "requestId" => "abc123" };
        return Err(err);
    }
    Ok(())
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    match find_user("missing") {
        Ok(user) => println!("found {}", user),
        Err(err) => {
            // SCENARIO 1: The client
            println!("1. [CLIENT RESPONSE] What the caller sees:");
            println!("   \"{}\"", err);

            // SCENARIO 2: The operator
            println!("\n2. [SERVICE LOG] What the logs see:");
            err.with_service_log(|log| {
                println!("   Code:     {}", log.service_code());
                println!("   Message:  {}", log.message());
                println!("   Metadata: {}", log.metadata());
            });
        }
    }

    if let Err(err) = rename_user("   \n") {
        println!("\n3. [FULL RENDER] Trusted diagnostics only:");
        println!("   {}", err.render());
    }
}
