//! Metadata maps and builder for [`AppError`].
//!
//! # Architecture Integration
//!
//! - `MetaData`: insertion-ordered string map used for both the public and
//!   the service half of an error
//! - `AppErrorBuilder`: fluent construction when aggregate initialization
//!   gets noisy
//!
//! # Security Properties
//!
//! Service metadata routinely carries raw driver text (constraint names, SQL
//! messages, offending values). Owned keys and values are zeroized on drop.
//! Borrowed `'static` data is assumed to be literals and is left alone.
//!
//! # Example
//!
//! ```rust
//! use bastion_errors::{AppError, definitions};
//!
//! let err = AppError::builder()
//!     .public(definitions::NOT_FOUND_RESOURCE, "Order not found")
//!     .service(definitions::NOT_FOUND_RESOURCE, "order 42 missing from shard 3")
//!     .public_meta("resourceName", "Order")
//!     .service_meta("shard", "3")
//!     .build();
//!
//! assert_eq!(err.public_metadata.get("resourceName"), Some("Order"));
//! ```

use crate::{definitions, AppError, StatusCode};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use zeroize::Zeroize;

// ============================================================================
// Metadata Entry
// ============================================================================

/// Key-value pair with zeroization of owned data.
struct MetaEntry {
    key: Cow<'static, str>,
    value: Cow<'static, str>,
}

impl Zeroize for MetaEntry {
    fn zeroize(&mut self) {
        if let Cow::Owned(ref mut s) = self.key {
            s.zeroize();
        }
        if let Cow::Owned(ref mut s) = self.value {
            s.zeroize();
        }
    }
}

impl Drop for MetaEntry {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Metadata Map
// ============================================================================

/// String-keyed metadata with unique keys and stable insertion order.
///
/// # Capacity Choice
///
/// `SmallVec<[_; 4]>`: classifier output carries two to seven entries, and
/// lookups over a handful of keys are faster as a linear scan than hashing.
///
/// # Ordering
///
/// Iteration and rendering follow first-insertion order. Re-inserting an
/// existing key replaces the value in place and keeps its position.
///
/// # Equality
///
/// Two maps are equal when they hold the same keys with the same values,
/// regardless of order.
#[derive(Default)]
pub struct MetaData {
    entries: SmallVec<[MetaEntry; 4]>,
}

impl MetaData {
    /// Create an empty map.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                if let Cow::Owned(ref mut old) = entry.value {
                    old.zeroize();
                }
                entry.value = value;
            }
            None => self.entries.push(MetaEntry { key, value }),
        }
    }

    /// Builder form of [`MetaData::insert`].
    #[inline]
    pub fn with(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_ref())
    }

    /// Check whether `key` is present.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning whether it was present. The removed entry is zeroized.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.entries.iter().position(|e| e.key == key) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|e| (e.key.as_ref(), e.value.as_ref()))
    }

    /// Iterate keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_ref())
    }

    /// Drop every entry, zeroizing owned data.
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Clone for MetaData {
    fn clone(&self) -> Self {
        let mut entries = SmallVec::with_capacity(self.entries.len());
        for e in &self.entries {
            entries.push(MetaEntry {
                key: e.key.clone(),
                value: e.value.clone(),
            });
        }
        Self { entries }
    }
}

impl PartialEq for MetaData {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for MetaData {}

impl<K, V> FromIterator<(K, V)> for MetaData
where
    K: Into<Cow<'static, str>>,
    V: Into<Cow<'static, str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for MetaData
where
    K: Into<Cow<'static, str>>,
    V: Into<Cow<'static, str>>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl fmt::Display for MetaData {
    /// `{key: 'value', key: 'value'}`, or `{}` when empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: '{}'", k, v)?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for MetaData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Zeroize for MetaData {
    fn zeroize(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.zeroize();
        }
        self.entries.clear();
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MetaData {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for [`AppError`].
///
/// Both status codes should be set. `build()` falls back to `ServerError` for
/// a missing code; `try_build()` reports it instead.
#[derive(Default)]
pub struct AppErrorBuilder {
    public_status_code: Option<StatusCode>,
    service_status_code: Option<StatusCode>,
    public_message: String,
    service_message: String,
    public_metadata: MetaData,
    service_metadata: MetaData,
}

impl AppErrorBuilder {
    /// Create an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the public status code and message.
    pub fn public(mut self, code: StatusCode, message: impl Into<String>) -> Self {
        self.public_status_code = Some(code);
        self.public_message = message.into();
        self
    }

    /// Set the service status code and message.
    pub fn service(mut self, code: StatusCode, message: impl Into<String>) -> Self {
        self.service_status_code = Some(code);
        self.service_message = message.into();
        self
    }

    /// Set the same status code on both halves.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.public_status_code = Some(code);
        self.service_status_code = Some(code);
        self
    }

    /// Add a public metadata entry.
    pub fn public_meta(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.public_metadata.insert(key, value);
        self
    }

    /// Add a service metadata entry.
    pub fn service_meta(mut self, key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        self.service_metadata.insert(key, value);
        self
    }

    /// Add the same entry to both halves.
    pub fn shared_meta(mut self, key: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        let value = value.into();
        self.public_metadata.insert(key, value.clone());
        self.service_metadata.insert(key, value);
        self
    }

    /// Build, substituting `ServerError` for any unset code.
    pub fn build(self) -> AppError {
        let public = self.public_status_code.unwrap_or(definitions::SERVER_ERROR);
        let service = self.service_status_code.unwrap_or(definitions::SERVER_ERROR);
        self.finish(public, service)
    }

    /// Build, failing if either status code is unset.
    pub fn try_build(self) -> Result<AppError, BuilderError> {
        let public = self.public_status_code.ok_or(BuilderError::MissingPublicStatus)?;
        let service = self.service_status_code.ok_or(BuilderError::MissingServiceStatus)?;
        Ok(self.finish(public, service))
    }

    fn finish(self, public: StatusCode, service: StatusCode) -> AppError {
        AppError {
            public_status_code: public,
            service_status_code: service,
            public_message: self.public_message,
            service_message: self.service_message,
            public_metadata: self.public_metadata,
            service_metadata: self.service_metadata,
        }
    }
}

/// Reasons `AppErrorBuilder::try_build` can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderError {
    /// No public status code was set.
    MissingPublicStatus,
    /// No service status code was set.
    MissingServiceStatus,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPublicStatus => f.write_str("public status code not set"),
            Self::MissingServiceStatus => f.write_str("service status code not set"),
        }
    }
}

impl std::error::Error for BuilderError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::*;

    #[test]
    fn insert_keeps_first_position_on_replace() {
        let mut meta = MetaData::new();
        meta.insert("a", "1");
        meta.insert("b", "2");
        meta.insert("a", "3");

        let keys: Vec<_> = meta.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(meta.get("a"), Some("3"));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn display_formats() {
        assert_eq!(MetaData::new().to_string(), "{}");

        let meta = MetaData::new().with("field", "username");
        assert_eq!(meta.to_string(), "{field: 'username'}");

        let meta = MetaData::new().with("a", "1").with("b", String::from("2"));
        assert_eq!(meta.to_string(), "{a: '1', b: '2'}");
    }

    #[test]
    fn equality_ignores_order() {
        let a = MetaData::new().with("x", "1").with("y", "2");
        let b = MetaData::new().with("y", "2").with("x", "1");
        let c = MetaData::new().with("x", "1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn remove_and_clear() {
        let mut meta: MetaData = [("a", "1"), ("b", "2")].into_iter().collect();
        assert!(meta.remove("a"));
        assert!(!meta.remove("a"));
        assert!(!meta.contains_key("a"));
        meta.clear();
        assert!(meta.is_empty());
    }

    #[test]
    fn zeroize_empties_owned_entries() {
        let mut meta = MetaData::new().with("raw_error", String::from("secret"));
        meta.zeroize();
        assert!(meta.is_empty());
    }

    #[test]
    fn spills_past_inline_capacity() {
        let meta: MetaData = (0..10).map(|i| (format!("k{}", i), format!("v{}", i))).collect();
        assert_eq!(meta.len(), 10);
        assert_eq!(meta.get("k9"), Some("v9"));
    }

    #[test]
    fn builder_populates_all_fields() {
        let err = AppErrorBuilder::new()
            .public(BAD_REQUEST, "bad")
            .service(BAD_REQUEST_OUT_OF_RANGE, "age < 18")
            .public_meta("field", "age")
            .service_meta("value", "12")
            .build();

        assert_eq!(err.public_status_code, BAD_REQUEST);
        assert_eq!(err.service_status_code, BAD_REQUEST_OUT_OF_RANGE);
        assert_eq!(err.public_message, "bad");
        assert_eq!(err.service_message, "age < 18");
        assert_eq!(err.public_metadata.get("field"), Some("age"));
        assert_eq!(err.service_metadata.get("value"), Some("12"));
    }

    #[test]
    fn builder_defaults_missing_codes() {
        let err = AppErrorBuilder::new().build();
        assert_eq!(err.public_status_code, SERVER_ERROR);
        assert_eq!(err.service_status_code, SERVER_ERROR);
    }

    #[test]
    fn try_build_reports_missing_codes() {
        let err = AppErrorBuilder::new().try_build().unwrap_err();
        assert_eq!(err, BuilderError::MissingPublicStatus);

        let err = AppErrorBuilder::new().public(NOT_FOUND, "gone").try_build().unwrap_err();
        assert_eq!(err, BuilderError::MissingServiceStatus);
    }

    #[test]
    fn shared_meta_lands_in_both_halves() {
        let err = AppErrorBuilder::new()
            .status(CONFLICT)
            .shared_meta("resourceName", "User")
            .build();
        assert_eq!(err.public_metadata.get("resourceName"), Some("User"));
        assert_eq!(err.service_metadata.get("resourceName"), Some("User"));
    }
}
