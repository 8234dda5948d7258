//! Registered status codes.
//!
//! # Taxonomy & Governance
//!
//! This file is the single registry of application status codes. Each code is
//! an HTTP status family with a sub-classification digit appended:
//!
//! - Bad request (4000-4009) | client input failed validation
//! - Unauthorized (4010-4019) | credentials missing or rejected
//! - Forbidden (4030-4039) | authenticated caller lacks rights
//! - Not found (4040-4049) | addressed resource is absent
//! - Conflict (4090-4099) | request collides with existing state
//! - Server error (5000-5009) | the service itself failed
//!
//! The trailing digit `0` is always the generic member of its band. Specific
//! members may be collapsed back to it before public exposure (see
//! [`crate::suppression`]).
//!
//! Band membership is asserted at compile time by `StatusCode::const_new`.
//! Name and value uniqueness are checked by the `tests` module at the bottom
//! of this file.

use crate::{define_status_codes, Band};

// One invocation so the name table and the constants cannot drift apart.
define_status_codes! {
    Band::BadRequest => {
        /// Generic bad request.
        BAD_REQUEST                = (4000, "BadRequest"),
        /// A required field is missing.
        BAD_REQUEST_MISSING_FIELD  = (4001, "BadRequest_MissingField"),
        /// A field has the wrong type.
        BAD_REQUEST_TYPE_MISMATCH  = (4002, "BadRequest_TypeMismatch"),
        /// A field failed a constraint with no more specific code.
        BAD_REQUEST_FIELD_CONSTRAINT = (4003, "BadRequest_FieldConstraint"),
        /// A field is not in the expected format.
        BAD_REQUEST_INVALID_FORMAT = (4004, "BadRequest_InvalidFormat"),
        /// A value is outside its permitted range or length.
        BAD_REQUEST_OUT_OF_RANGE   = (4005, "BadRequest_OutOfRange"),
        /// A value is not acceptable.
        BAD_REQUEST_INVALID_VALUE  = (4006, "BadRequest_InvalidValue"),
        /// A value is not among the allowed choices.
        BAD_REQUEST_ENUM_VIOLATION = (4007, "BadRequest_EnumViolation"),
    }
    Band::Unauthorized => {
        /// Generic unauthorized.
        UNAUTHORIZED                    = (4010, "Unauthorized"),
        /// Credentials were rejected.
        UNAUTHORIZED_INVALID_CREDENTIAL = (4011, "Unauthorized_InvalidCredential"),
        /// A token is required and was not supplied.
        UNAUTHORIZED_TOKEN_REQUIRED     = (4012, "Unauthorized_TokenRequired"),
        /// The supplied token is invalid.
        UNAUTHORIZED_INVALID_TOKEN      = (4013, "Unauthorized_InvalidToken"),
    }
    Band::Forbidden => {
        /// Generic forbidden.
        FORBIDDEN                       = (4030, "Forbidden"),
        /// Caller lacks the required privilege.
        FORBIDDEN_NOT_ENOUGH_PRIVILEGE  = (4031, "Forbidden_NotEnoughPrivilege"),
        /// Only resource owners may perform the action.
        FORBIDDEN_ONLY_OWNERS           = (4032, "Forbidden_OnlyOwners"),
    }
    Band::NotFound => {
        /// Generic not found.
        NOT_FOUND          = (4040, "NotFound"),
        /// The addressed resource does not exist.
        NOT_FOUND_RESOURCE = (4041, "NotFound_Resource"),
    }
    Band::Conflict => {
        /// Generic conflict.
        CONFLICT                = (4090, "Conflict"),
        /// The data duplicates an existing record.
        CONFLICT_DUPLICATE_DATA = (4091, "Conflict_DuplicateData"),
    }
    Band::ServerError => {
        /// Generic server error.
        SERVER_ERROR                       = (5000, "ServerError"),
        /// The database failed.
        SERVER_ERROR_DATABASE              = (5001, "ServerError_Database"),
        /// A downstream service call failed.
        SERVER_ERROR_SERVICE_COMMUNICATION = (5002, "ServerError_ServiceCommunication"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;
    use std::collections::HashSet;

    #[test]
    fn every_code_is_in_exactly_one_band() {
        for (code, name) in REGISTRY {
            let owners = Band::ALL
                .iter()
                .filter(|band| band.contains(code.value()))
                .count();
            assert_eq!(owners, 1, "{} ({}) must belong to one band", name, code.value());
        }
    }

    #[test]
    fn values_are_unique() {
        let mut seen = HashSet::new();
        for (code, _) in REGISTRY {
            assert!(seen.insert(code.value()), "duplicate value {}", code.value());
        }
    }

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();
        for (_, name) in REGISTRY {
            assert!(seen.insert(*name), "duplicate name {}", name);
        }
    }

    #[test]
    fn registry_is_ascending() {
        for pair in REGISTRY.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn names_follow_band_prefix() {
        for (code, name) in REGISTRY {
            let band = code.band().unwrap();
            let prefix = match band {
                Band::BadRequest => "BadRequest",
                Band::Unauthorized => "Unauthorized",
                Band::Forbidden => "Forbidden",
                Band::NotFound => "NotFound",
                Band::Conflict => "Conflict",
                Band::ServerError => "ServerError",
            };
            assert!(name.starts_with(prefix), "{} does not match {:?}", name, band);
        }
    }

    #[test]
    fn generic_member_ends_in_zero() {
        for band in Band::ALL {
            let generic = StatusCode::from_raw(band.start());
            assert!(generic.is_defined(), "{:?} has no generic member", band);
        }
    }

    #[test]
    fn registry_size() {
        assert_eq!(REGISTRY.len(), 22);
        assert_eq!(StatusCode::all().count(), 22);
    }
}
