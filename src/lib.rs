//! # Bastion Errors
//!
//! Structured application errors with a public half and a service half.
//!
//! ## Design Philosophy
//!
//! 1. **Every error carries two truths**: what the client may learn, and what
//!    the service needs to diagnose the failure
//! 2. **Status codes are HTTP-aligned** with a sub-classification digit
//!    (`4041` = not found, resource)
//! 3. **Low-level failures are classified, not forwarded**: database driver
//!    errors and field-validation failures become structured errors
//! 4. **Classification never fails**: unknown shapes land in a generic branch
//! 5. **Redaction is explicit**: `neutralize_public` collapses over-detailed
//!    public codes; nothing is suppressed behind the caller's back
//!
//! ## Trust Boundary
//!
//! - `Display` for [`AppError`] writes the public half only
//! - [`AppError::render`] writes both halves, for trusted diagnostics
//! - [`AppError::public_view`] is the borrowed view response writers serialize
//! - [`AppError::service_log`] is the borrowed view loggers consume
//!
//! Keeping secrets out of the public half is caller discipline. The type does
//! not inspect message contents.
//!
//! ## Quick Start
//!
//! ```rust
//! use bastion_errors::{DbFailure, EngineError, definitions, from_db_error, sql_state};
//!
//! let failure = DbFailure::Engine(
//!     EngineError::new(sql_state::UNIQUE_VIOLATION, "duplicate key value violates unique constraint")
//!         .with_constraint("users_email_key"),
//! );
//!
//! let mut err = from_db_error(Some(&failure), "User").unwrap();
//! assert_eq!(err.public_status_code, definitions::CONFLICT_DUPLICATE_DATA);
//! assert_eq!(err.public_metadata.get("constraint"), None);
//! assert_eq!(err.service_metadata.get("constraint"), Some("users_email_key"));
//!
//! // Before returning to a client:
//! err.neutralize_public();
//! println!("{}", err); // public half only
//! ```
//!
//! ## Validation Failures
//!
//! ```rust
//! use bastion_errors::{FieldFailure, ValidationInput, from_validation_errors};
//!
//! let input = ValidationInput::Fields(vec![
//!     FieldFailure::new("Email", "not-an-email", "email"),
//!     FieldFailure::new("Age", "12", "gte").with_param("18"),
//! ]);
//!
//! let err = from_validation_errors(&input);
//! assert_eq!(err.public_message, "Invalid input in one or more fields");
//! assert_eq!(err.public_metadata.get("fields"), Some("Email, Age"));
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize` for [`PublicView`], [`MetaData`] and [`StatusCode`]
//! - `sqlx`: `From<&sqlx::Error>` for [`DbFailure`]
//! - `validator`: `From<&validator::ValidationErrors>` for [`ValidationInput`]
//! - `trusted_debug`: full-text formatting of service logs (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::fmt;
use std::result;
use zeroize::Zeroize;

pub mod codes;
pub mod context;
pub mod convenience;
pub mod db;
pub mod definitions;
pub mod logging;
pub mod models;
pub mod ring_buffer;
pub mod suppression;
pub mod validation;

pub use codes::*;
pub use context::*;
pub use db::*;
pub use logging::*;
pub use models::*;
pub use ring_buffer::*;
pub use suppression::suppress;
pub use validation::*;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, AppError>;

/// Structured application error.
///
/// # Halves
///
/// - **Public**: `public_status_code`, `public_message`, `public_metadata`.
///   Safe to serialize into API responses.
/// - **Service**: `service_status_code`, `service_message`, `service_metadata`.
///   Internal diagnostics; may contain raw driver text and offending values.
///
/// # Lifecycle
///
/// Built once, by aggregate initialization, [`AppError::builder`], or one of
/// the classifiers. The only sanctioned mutation afterwards is
/// [`AppError::neutralize_public`]. No internal locking: share across threads
/// only behind the caller's own synchronization.
///
/// # Memory
///
/// The service message and all owned metadata are zeroized on drop.
///
/// # Example
///
/// ```rust
/// use bastion_errors::{AppError, MetaData, definitions};
///
/// let err = AppError {
///     public_status_code: definitions::BAD_REQUEST_MISSING_FIELD,
///     service_status_code: definitions::BAD_REQUEST_MISSING_FIELD,
///     public_message: "Missing required field".into(),
///     service_message: "Field 'username' is missing in the payload".into(),
///     public_metadata: MetaData::new().with("field", "username"),
///     service_metadata: MetaData::new().with("requestId", "abc123"),
/// };
///
/// assert_eq!(
///     err.render(),
///     "{publicStatus: BadRequest_MissingField (4001), serviceStatus: BadRequest_MissingField (4001), \
///      publicMessage: 'Missing required field', serviceMessage: 'Field 'username' is missing in the payload', \
///      publicMetaData: {field: 'username'}, serviceMetaData: {requestId: 'abc123'}}"
/// );
/// ```
#[must_use = "errors should be handled or logged"]
pub struct AppError {
    /// Code exposed to clients.
    pub public_status_code: StatusCode,
    /// Code kept for diagnostics.
    pub service_status_code: StatusCode,
    /// Message exposed to clients.
    pub public_message: String,
    /// Message kept for diagnostics.
    pub service_message: String,
    /// Metadata exposed to clients.
    pub public_metadata: MetaData,
    /// Metadata kept for diagnostics.
    pub service_metadata: MetaData,
}

impl AppError {
    /// Same code on both halves, no metadata.
    pub fn new(code: StatusCode, public_message: impl Into<String>, service_message: impl Into<String>) -> Self {
        Self {
            public_status_code: code,
            service_status_code: code,
            public_message: public_message.into(),
            service_message: service_message.into(),
            public_metadata: MetaData::new(),
            service_metadata: MetaData::new(),
        }
    }

    /// Start a fluent builder.
    #[inline]
    pub fn builder() -> AppErrorBuilder {
        AppErrorBuilder::new()
    }

    /// Render both halves as one deterministic line.
    ///
    /// Format:
    /// `{publicStatus: <name> (<n>), serviceStatus: <name> (<n>), publicMessage: '<m>', serviceMessage: '<m>', publicMetaData: {..}, serviceMetaData: {..}}`
    ///
    /// Messages and metadata are written verbatim, without escaping. Metadata
    /// follows insertion order.
    ///
    /// This includes the service half: use it for trusted diagnostics only.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_render(&mut out);
        out
    }

    /// Write the [`render`](AppError::render) line into any formatter.
    pub fn write_render(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "{{publicStatus: {}, serviceStatus: {}, publicMessage: '{}', serviceMessage: '{}', publicMetaData: {}, serviceMetaData: {}}}",
            self.public_status_code,
            self.service_status_code,
            self.public_message,
            self.service_message,
            self.public_metadata,
            self.service_metadata,
        )
    }

    /// Replace the public code with its suppressed form.
    ///
    /// Leaves the service code, both messages and both metadata maps untouched.
    /// No-op when the public code is not over-detailed. Idempotent.
    #[inline]
    pub fn neutralize_public(&mut self) {
        self.public_status_code = suppression::suppress(self.public_status_code);
    }

    /// Builder form of [`neutralize_public`](AppError::neutralize_public).
    #[inline]
    pub fn neutralized(mut self) -> Self {
        self.neutralize_public();
        self
    }

    /// Borrow the public half for a response writer.
    #[inline]
    pub fn public_view(&self) -> PublicView<'_> {
        PublicView::new(self.public_status_code, &self.public_message, &self.public_metadata)
    }

    /// Create a structured service log entry with explicit lifetime.
    ///
    /// The returned `ServiceLog` borrows from `self` and cannot outlive it,
    /// so service data is consumed by the logger and not retained.
    ///
    /// ```rust
    /// # use bastion_errors::{AppError, definitions};
    /// let err = AppError::builder()
    ///     .status(definitions::SERVER_ERROR)
    ///     .service(definitions::SERVER_ERROR_DATABASE, "connection reset")
    ///     .build();
    /// let log = err.service_log();
    /// assert_eq!(log.message(), "connection reset");
    /// ```
    #[inline]
    pub fn service_log(&self) -> ServiceLog<'_> {
        ServiceLog {
            public_code: self.public_status_code,
            service_code: self.service_status_code,
            message: &self.service_message,
            metadata: &self.service_metadata,
        }
    }

    /// Callback form of [`service_log`](AppError::service_log).
    #[inline]
    pub fn with_service_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ServiceLog<'_>) -> R,
    {
        let log = self.service_log();
        f(&log)
    }
}

impl Drop for AppError {
    fn drop(&mut self) {
        // Metadata zeroizes itself entry by entry.
        self.service_message.zeroize();
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let service_keys: Vec<&str> = self.service_metadata.keys().collect();
        f.debug_struct("AppError")
            .field("public_status_code", &self.public_status_code)
            .field("service_status_code", &self.service_status_code)
            .field("public_message", &self.public_message)
            .field("public_metadata", &self.public_metadata)
            .field("service_message", &"<REDACTED>")
            .field("service_metadata_keys", &service_keys)
            .finish()
    }
}

impl fmt::Display for AppError {
    /// External display - public half only.
    ///
    /// Format: `"<public name> (<n>): <public message>"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.public_view(), f)
    }
}

impl std::error::Error for AppError {}
