//! Borrowed service-half view for loggers.
//!
//! # Properties
//!
//! - Borrows from `AppError` with an explicit lifetime
//! - Cannot outlive the error that created it
//! - No allocation in accessors
//!
//! The view exists only for the duration of a logging call. When the error
//! drops, its service message and owned metadata are zeroized; nothing in this
//! module keeps a copy.

use crate::{MetaData, StatusCode};
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output.
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Service half of an [`AppError`](crate::AppError), borrowed for logging.
///
/// # Example
///
/// ```rust
/// # use bastion_errors::{AppError, definitions};
/// let err = AppError::builder()
///     .public(definitions::SERVER_ERROR, "Unknown server error")
///     .service(definitions::SERVER_ERROR_DATABASE, "pool exhausted")
///     .service_meta("pool", "primary")
///     .build();
///
/// let mut line = String::new();
/// err.service_log().write_to(&mut line).unwrap();
/// assert_eq!(
///     line,
///     "[ServerError_Database (5001)] public=ServerError (5000) message='pool exhausted' pool='primary'"
/// );
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ServiceLog<'a> {
    /// Code the client was (or will be) shown.
    pub public_code: StatusCode,
    /// Diagnostic code.
    pub service_code: StatusCode,
    /// Diagnostic message.
    pub message: &'a str,
    /// Diagnostic metadata.
    pub metadata: &'a MetaData,
}

impl<'a> ServiceLog<'a> {
    /// Format for human-readable logs in trusted debug contexts.
    ///
    /// Only available with both the `trusted_debug` feature and debug
    /// assertions. Fields are not truncated.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = format!(
            "[{}] public={} message='{}'",
            self.service_code, self.public_code, self.message
        );
        for (key, value) in self.metadata.iter() {
            output.push_str(&format!(" {}='{}'", key, value));
        }
        output
    }

    /// Write one log line into a formatter.
    ///
    /// Format: `[<service code>] public=<public code> message='<m>' k='v' ...`
    ///
    /// Each message and metadata value is capped at [`MAX_FIELD_OUTPUT_LEN`]
    /// bytes, with a visible truncation marker.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{}] public={} message='{}'",
            self.service_code,
            self.public_code,
            truncate_with_indicator(self.message)
        )?;

        for (key, value) in self.metadata.iter() {
            write!(f, " {}='{}'", key, truncate_with_indicator(value))?;
        }

        Ok(())
    }

    /// Public status code.
    #[inline]
    pub const fn public_code(&self) -> StatusCode {
        self.public_code
    }

    /// Service status code.
    #[inline]
    pub const fn service_code(&self) -> StatusCode {
        self.service_code
    }

    /// Service message, untruncated.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Service metadata.
    ///
    /// Not truncated here; that is the log sink's job when it
    /// serializes structured fields.
    #[inline]
    pub const fn metadata(&self) -> &'a MetaData {
        self.metadata
    }
}

impl fmt::Display for ServiceLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Cap `s` at `MAX_FIELD_OUTPUT_LEN` bytes on a char boundary.
///
/// Borrowed when no truncation is needed.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let mut idx = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    let mut result = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..idx]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}
