//! Status code suppression for public exposure.
//!
//! Some codes say more than a client should learn. `BadRequest_EnumViolation`
//! tells an attacker which validation layer fired; `ServerError_Database` names
//! the failing dependency. Suppression collapses these to the generic member
//! of their band before an error crosses a trust boundary.
//!
//! # Model
//!
//! - **Band preserved**: a 400-class code stays 400-class
//! - **One hop**: table targets are never table keys, so a single application
//!   reaches a fixed point
//! - **Public only**: `AppError::neutralize_public` rewrites the public code;
//!   the service code keeps full detail for diagnostics
//!
//! Suppression is never applied automatically. Callers decide where their trust
//! boundary is.
//!
//! # Example
//!
//! ```rust
//! use bastion_errors::{definitions, suppression};
//!
//! let public = suppression::suppress(definitions::SERVER_ERROR_DATABASE);
//! assert_eq!(public, definitions::SERVER_ERROR);
//!
//! // Codes outside the table pass through unchanged
//! let kept = suppression::suppress(definitions::NOT_FOUND_RESOURCE);
//! assert_eq!(kept, definitions::NOT_FOUND_RESOURCE);
//! ```

use crate::StatusCode;
use crate::definitions::*;

/// Over-detailed codes and the generic code each collapses to.
pub const SUPPRESSION_TABLE: &[(StatusCode, StatusCode)] = &[
    (BAD_REQUEST_OUT_OF_RANGE, BAD_REQUEST),
    (BAD_REQUEST_INVALID_VALUE, BAD_REQUEST),
    (BAD_REQUEST_ENUM_VIOLATION, BAD_REQUEST),
    (FORBIDDEN_ONLY_OWNERS, FORBIDDEN),
    (SERVER_ERROR_DATABASE, SERVER_ERROR),
    (SERVER_ERROR_SERVICE_COMMUNICATION, SERVER_ERROR),
];

/// Return the public-safe form of `code`.
///
/// Total and side-effect free. Codes absent from [`SUPPRESSION_TABLE`],
/// including unregistered values, are returned unchanged.
pub const fn suppress(code: StatusCode) -> StatusCode {
    let mut i = 0;
    while i < SUPPRESSION_TABLE.len() {
        let (from, to) = SUPPRESSION_TABLE[i];
        if from.value() == code.value() {
            return to;
        }
        i += 1;
    }
    code
}
