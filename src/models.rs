//! Public half of an error, as handed to response writers.
//!
//! # Trust Boundary
//!
//! `PublicView` borrows only the public fields of an [`AppError`](crate::AppError).
//! There is no accessor from a view back to the service half, so a handler
//! that receives a `PublicView` cannot leak service data by accident.
//!
//! The view does not apply suppression itself. Call
//! [`AppError::neutralize_public`](crate::AppError::neutralize_public) first,
//! or use [`PublicView::neutralized`] for a one-off.
//!
//! # Serialization
//!
//! With the `serde` feature the view serializes as:
//!
//! ```json
//! {"statusCode":4041,"statusName":"NotFound_Resource","httpStatus":404,"message":"User not found","metadata":{"resourceName":"User"}}
//! ```

use crate::{MetaData, StatusCode, suppression};
use std::borrow::Cow;
use std::fmt;

/// Borrowed public half of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PublicView<'a> {
    /// Public status code.
    pub status_code: StatusCode,
    /// Display name of `status_code`.
    pub status_name: Cow<'static, str>,
    /// HTTP status of the code's band, if any.
    pub http_status: Option<u16>,
    /// Public message.
    pub message: &'a str,
    /// Public metadata.
    pub metadata: &'a MetaData,
}

impl<'a> PublicView<'a> {
    /// Build a view over borrowed public fields.
    pub fn new(status_code: StatusCode, message: &'a str, metadata: &'a MetaData) -> Self {
        Self {
            status_code,
            status_name: status_code.name(),
            http_status: status_code.http_status(),
            message,
            metadata,
        }
    }

    /// Same view with the status code suppressed.
    pub fn neutralized(&self) -> Self {
        Self::new(suppression::suppress(self.status_code), self.message, self.metadata)
    }

    /// HTTP status to respond with. Codes outside every band map to 500.
    #[inline]
    pub fn http_status_or_500(&self) -> u16 {
        self.http_status.unwrap_or(500)
    }
}

impl fmt::Display for PublicView<'_> {
    /// `"<name> (<n>): <message>"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status_code, self.message)
    }
}
