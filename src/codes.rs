//! Status code namespace - HTTP-aligned application codes with a sub-classification digit.
//!
//! A client sees `NotFound_Resource (4041)`; the HTTP layer sees `404`.
//! The trailing digit lets services distinguish failure causes without
//! inventing new HTTP statuses.
//!
//! # Band Structure
//!
//! - **4000-4009**: Bad request (client input errors)
//! - **4010-4019**: Unauthorized (authentication failures)
//! - **4030-4039**: Forbidden (access control)
//! - **4040-4049**: Not found (missing resources)
//! - **4090-4099**: Conflict (state conflicts, duplicates)
//! - **5000-5009**: Server error (internal failures)
//!
//! # Governance
//!
//! Registered codes are defined once, as const statics, in [`crate::definitions`].
//! `StatusCode::const_new` asserts band membership, so a code defined outside
//! its band fails the build.
//!
//! Unregistered values are still representable (`StatusCode::from_raw`) because
//! codes travel through serialized payloads and foreign services. They render
//! with a placeholder name and never panic.
//!
//! # Copy Semantics
//!
//! `StatusCode` and `Band` are small numeric metadata and are `Copy`. They carry
//! no sensitive data.
//!
//! # Example
//!
//! ```rust
//! use bastion_errors::{Band, StatusCode, definitions};
//!
//! let code = definitions::NOT_FOUND_RESOURCE;
//! assert_eq!(code.name(), "NotFound_Resource");
//! assert_eq!(code.band(), Some(Band::NotFound));
//! assert_eq!(code.http_status(), Some(404));
//!
//! let foreign = StatusCode::from_raw(7777);
//! assert_eq!(foreign.name(), "UnknownStatusCode-7777");
//! ```

use crate::definitions::REGISTRY;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Band (HTTP Family)
// ============================================================================

/// HTTP-aligned family a status code belongs to.
///
/// Each band owns a contiguous ten-value range. The ranges are disjoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    /// 4000-4009: malformed or invalid client input.
    BadRequest,
    /// 4010-4019: missing or invalid credentials.
    Unauthorized,
    /// 4030-4039: authenticated but not allowed.
    Forbidden,
    /// 4040-4049: the addressed resource does not exist.
    NotFound,
    /// 4090-4099: the request conflicts with current state.
    Conflict,
    /// 5000-5009: the service failed.
    ServerError,
}

impl Band {
    /// Every band, in ascending numeric order.
    pub const ALL: [Band; 6] = [
        Band::BadRequest,
        Band::Unauthorized,
        Band::Forbidden,
        Band::NotFound,
        Band::Conflict,
        Band::ServerError,
    ];

    /// First value of the band (inclusive).
    #[inline]
    pub const fn start(self) -> i32 {
        match self {
            Self::BadRequest => 4000,
            Self::Unauthorized => 4010,
            Self::Forbidden => 4030,
            Self::NotFound => 4040,
            Self::Conflict => 4090,
            Self::ServerError => 5000,
        }
    }

    /// Last value of the band (inclusive).
    #[inline]
    pub const fn end(self) -> i32 {
        self.start() + 9
    }

    /// Check whether a raw value lies inside this band.
    #[inline]
    pub const fn contains(self, value: i32) -> bool {
        value >= self.start() && value <= self.end()
    }

    /// HTTP status this band is aligned with.
    #[inline]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::ServerError => 500,
        }
    }

    /// Locate the band for a raw value, if any.
    pub const fn of(value: i32) -> Option<Band> {
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i].contains(value) {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// Static label for logs and dashboards.
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::ServerError => "Server Error",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Status Code (Primary Identity Type)
// ============================================================================

/// Application status code.
///
/// A plain integer newtype. Registered values live in [`crate::definitions`];
/// any other value is legal but reports no name, no band membership guarantee,
/// and an `UnknownStatusCode-<n>` placeholder.
///
/// # Construction APIs
///
/// - `const_new`: for registry definitions (panics = compile error on band mismatch)
/// - `from_raw`: for values received from elsewhere (never fails)
/// - `lookup`: for runtime values that must be registered (returns Result)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(i32);

impl StatusCode {
    /// Create a registry code, asserting that it belongs to `band`.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const contexts) if `value` lies outside `band`.
    #[inline]
    pub const fn const_new(band: Band, value: i32) -> Self {
        assert!(band.contains(value), "Status code outside of its band");
        Self(value)
    }

    /// Wrap an arbitrary integer. Unregistered values are allowed.
    #[inline]
    pub const fn from_raw(value: i32) -> Self {
        Self(value)
    }

    /// Resolve a runtime value against the registry.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStatusCode` if `value` is not a registered code.
    pub fn lookup(value: i32) -> Result<Self, UnknownStatusCode> {
        let code = Self(value);
        if code.is_defined() {
            Ok(code)
        } else {
            Err(UnknownStatusCode { value })
        }
    }

    /// Raw numeric value.
    #[inline]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Registered display name, if this code is registered.
    pub const fn registered_name(self) -> Option<&'static str> {
        let mut i = 0;
        while i < REGISTRY.len() {
            if REGISTRY[i].0.0 == self.0 {
                return Some(REGISTRY[i].1);
            }
            i += 1;
        }
        None
    }

    /// Display name. Total: unregistered values yield `UnknownStatusCode-<n>`.
    ///
    /// Borrowed for registered codes, so the common path does not allocate.
    pub fn name(self) -> Cow<'static, str> {
        match self.registered_name() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(format!("UnknownStatusCode-{}", self.0)),
        }
    }

    /// Check whether this code is part of the registry.
    #[inline]
    pub const fn is_defined(self) -> bool {
        self.registered_name().is_some()
    }

    /// Band containing this value, registered or not.
    #[inline]
    pub const fn band(self) -> Option<Band> {
        Band::of(self.0)
    }

    /// HTTP status for the band, if the value falls in one.
    #[inline]
    pub const fn http_status(self) -> Option<u16> {
        match self.band() {
            Some(band) => Some(band.http_status()),
            None => None,
        }
    }

    /// True for the 4xxx bands.
    #[inline]
    pub const fn is_client_error(self) -> bool {
        matches!(
            self.band(),
            Some(Band::BadRequest | Band::Unauthorized | Band::Forbidden | Band::NotFound | Band::Conflict)
        )
    }

    /// True for the 5xxx band.
    #[inline]
    pub const fn is_server_error(self) -> bool {
        matches!(self.band(), Some(Band::ServerError))
    }

    /// True if public suppression would replace this code.
    #[inline]
    pub const fn is_suppressible(self) -> bool {
        crate::suppression::suppress(self).0 != self.0
    }

    /// Iterate over every registered code in ascending order.
    pub fn all() -> impl Iterator<Item = StatusCode> {
        REGISTRY.iter().map(|(code, _)| *code)
    }
}

impl fmt::Display for StatusCode {
    /// `"<name> (<value>)"`, e.g. `"Conflict_DuplicateData (4091)"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.registered_name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "UnknownStatusCode-{} ({})", self.0, self.0),
        }
    }
}

impl From<StatusCode> for i32 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl FromStr for StatusCode {
    type Err = ParseStatusCodeError;

    /// Parse a registered display name such as `"BadRequest_OutOfRange"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(code, _)| *code)
            .ok_or_else(|| ParseStatusCodeError {
                input: s.to_string(),
            })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StatusCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

// ============================================================================
// Lookup Errors
// ============================================================================

/// A runtime value that is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatusCode {
    /// The rejected value.
    pub value: i32,
}

impl fmt::Display for UnknownStatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status code {} is not registered", self.value)
    }
}

impl std::error::Error for UnknownStatusCode {}

/// Text that does not name a registered status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusCodeError {
    input: String,
}

impl ParseStatusCodeError {
    /// The text that failed to parse.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseStatusCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a registered status code name", self.input)
    }
}

impl std::error::Error for ParseStatusCodeError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::*;

    // ========================================================================
    // Band Tests
    // ========================================================================

    #[test]
    fn bands_are_disjoint() {
        for (i, a) in Band::ALL.iter().enumerate() {
            for b in &Band::ALL[i + 1..] {
                assert!(a.end() < b.start(), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(Band::of(4000), Some(Band::BadRequest));
        assert_eq!(Band::of(4009), Some(Band::BadRequest));
        assert_eq!(Band::of(4010), Some(Band::Unauthorized));
        assert_eq!(Band::of(4020), None);
        assert_eq!(Band::of(4049), Some(Band::NotFound));
        assert_eq!(Band::of(4050), None);
        assert_eq!(Band::of(5009), Some(Band::ServerError));
        assert_eq!(Band::of(5010), None);
        assert_eq!(Band::of(-1), None);
    }

    #[test]
    fn band_http_alignment() {
        assert_eq!(BAD_REQUEST.http_status(), Some(400));
        assert_eq!(UNAUTHORIZED_INVALID_TOKEN.http_status(), Some(401));
        assert_eq!(FORBIDDEN_ONLY_OWNERS.http_status(), Some(403));
        assert_eq!(NOT_FOUND_RESOURCE.http_status(), Some(404));
        assert_eq!(CONFLICT_DUPLICATE_DATA.http_status(), Some(409));
        assert_eq!(SERVER_ERROR_DATABASE.http_status(), Some(500));
        assert_eq!(StatusCode::from_raw(200).http_status(), None);
    }

    // ========================================================================
    // Naming Tests
    // ========================================================================

    #[test]
    fn registered_names() {
        assert_eq!(BAD_REQUEST_MISSING_FIELD.name(), "BadRequest_MissingField");
        assert_eq!(SERVER_ERROR_SERVICE_COMMUNICATION.name(), "ServerError_ServiceCommunication");
        assert!(matches!(BAD_REQUEST.name(), Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_names_encode_value() {
        assert_eq!(StatusCode::from_raw(4008).name(), "UnknownStatusCode-4008");
        assert_eq!(StatusCode::from_raw(-42).name(), "UnknownStatusCode--42");
        assert_eq!(StatusCode::from_raw(0).name(), "UnknownStatusCode-0");
    }

    #[test]
    fn display_includes_name_and_value() {
        assert_eq!(CONFLICT_DUPLICATE_DATA.to_string(), "Conflict_DuplicateData (4091)");
        assert_eq!(StatusCode::from_raw(1).to_string(), "UnknownStatusCode-1 (1)");
    }

    // ========================================================================
    // Runtime Construction Tests
    // ========================================================================

    #[test]
    fn lookup_accepts_registered_values() {
        assert_eq!(StatusCode::lookup(4041), Ok(NOT_FOUND_RESOURCE));
    }

    #[test]
    fn lookup_rejects_unregistered_values() {
        let err = StatusCode::lookup(4008).unwrap_err();
        assert_eq!(err.value, 4008);
        assert!(err.to_string().contains("4008"));
    }

    #[test]
    fn parse_round_trips_names() {
        for code in StatusCode::all() {
            let parsed: StatusCode = code.name().parse().unwrap();
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        let err = "Teapot".parse::<StatusCode>().unwrap_err();
        assert_eq!(err.input(), "Teapot");
    }

    #[test]
    fn client_server_split() {
        assert!(BAD_REQUEST.is_client_error());
        assert!(!BAD_REQUEST.is_server_error());
        assert!(SERVER_ERROR.is_server_error());
        assert!(!StatusCode::from_raw(42).is_client_error());
    }

    #[test]
    fn unregistered_value_inside_band_keeps_band() {
        let code = StatusCode::from_raw(4099);
        assert!(!code.is_defined());
        assert_eq!(code.band(), Some(Band::Conflict));
    }
}
