//! Keeps recent failures in a bounded buffer and dumps them for an operator.

use bastion_errors::ring_buffer::RingBufferLogger;
use bastion_errors::{DbFailure, EngineError, FieldFailure, ValidationInput, from_db_error, from_validation_errors};
use std::thread;

fn main() {
    println!("--- Diagnostics Logging Example ---\n");

    // 64 entries, 512 bytes each
    let logger = RingBufferLogger::new(64, 512);

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let logger = logger.clone();
            thread::spawn(move || {
                for job in 0..40 {
                    let origin = format!("worker-{}/job-{}", worker, job);
                    let err = if job % 3 == 0 {
                        from_validation_errors(&ValidationInput::Fields(vec![FieldFailure::new(
                            "Quantity",
                            job.to_string(),
                            "min",
                        )
                        .with_param("1")]))
                    } else {
                        let failure = DbFailure::Engine(
                            EngineError::new("57014", "canceling statement due to statement timeout")
                                .with_detail(format!("job {}", job)),
                        );
                        match from_db_error(Some(&failure), "Shipment") {
                            Some(err) => err,
                            None => continue,
                        }
                    };
                    logger.log(&err, &origin);
                }
            })
        })
        .collect();

    for worker in workers {
        let _ = worker.join();
    }

    println!("retained:  {} / {}", logger.len(), logger.capacity());
    println!("evicted:   {}", logger.eviction_count());
    println!("payload:   {} bytes\n", logger.payload_bytes());

    println!("Most recent server-side failures:");
    for entry in logger.get_filtered(|e| e.service_code >= 5000).iter().rev().take(5) {
        println!(
            "   [{}] {} pgcode={} {}",
            entry.service_code,
            entry.origin,
            entry.meta("pgcode").unwrap_or("-"),
            entry.message
        );
    }

    println!("\nMost recent entries:");
    for entry in logger.get_recent(3) {
        println!("   {:?}", entry);
    }
}
