//! Field-validation failure classification.
//!
//! Turns a batch of per-field validation failures into one [`AppError`].
//!
//! # Tag Categories
//!
//! Each failing rule is identified by a tag (`required`, `email`, `gte`, ...).
//! Tags fall into five disjoint categories, each with its own status code:
//!
//! | category | code | example tags |
//! |---|---|---|
//! | required | `BadRequest_MissingField` | `required`, `required_if` |
//! | format | `BadRequest_InvalidFormat` | `email`, `uuid4`, `json` |
//! | range | `BadRequest_OutOfRange` | `min`, `len`, `gte` |
//! | enumeration | `BadRequest_EnumViolation` | `oneof` |
//! | value | `BadRequest_InvalidValue` | `eq`, `ne`, `unique` |
//!
//! The `validator` crate's own codes are classified too: `url` and `regex` as
//! format, `length` and `range` as range, `must_match` as value.
//!
//! Unknown tags get `BadRequest_FieldConstraint`.
//!
//! # Aggregate Status
//!
//! A batch with exactly one failing field reports that field's code. Any
//! other batch reports plain `BadRequest`. Both halves carry the same code.
//!
//! # Example
//!
//! ```rust
//! use bastion_errors::{FieldFailure, ValidationInput, definitions, from_validation_errors};
//!
//! let err = from_validation_errors(&ValidationInput::Fields(vec![
//!     FieldFailure::new("Role", "root", "oneof").with_param("admin editor viewer"),
//! ]));
//!
//! assert_eq!(err.public_status_code, definitions::BAD_REQUEST_ENUM_VIOLATION);
//! assert_eq!(
//!     err.public_metadata.get("failures"),
//!     Some("Role: Role must be one of [admin editor viewer]")
//! );
//! ```

use crate::convenience::sanitize;
use crate::definitions::*;
use crate::{AppError, MetaData, StatusCode};
use std::fmt;

/// Code for tags outside every category.
pub const FALLBACK_STATUS_CODE: StatusCode = BAD_REQUEST_FIELD_CONSTRAINT;

// ============================================================================
// Classifier Input
// ============================================================================

/// One rule failure on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    /// Field name or dotted path.
    pub field: String,
    /// Offending value, rendered as text.
    pub value: String,
    /// Rule tag.
    pub tag: String,
    /// Rule parameter (`18` for `gte=18`), if any.
    pub param: Option<String>,
}

impl FieldFailure {
    /// Failure without a rule parameter.
    pub fn new(field: impl Into<String>, value: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            tag: tag.into(),
            param: None,
        }
    }

    /// Attach the rule parameter.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    fn param_str(&self) -> &str {
        self.param.as_deref().unwrap_or("")
    }
}

/// What a validator handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationInput {
    /// Structured per-field failures.
    Fields(Vec<FieldFailure>),
    /// Anything the validator could not express per field.
    Other(String),
}

impl From<Vec<FieldFailure>> for ValidationInput {
    fn from(fields: Vec<FieldFailure>) -> Self {
        Self::Fields(fields)
    }
}

// ============================================================================
// Tag Categories
// ============================================================================

/// Category of a validation tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Presence rules.
    Required,
    /// Syntax rules.
    Format,
    /// Size, length and bound rules.
    Range,
    /// Membership in a fixed set.
    Enumeration,
    /// Equality and uniqueness rules.
    ValueConstraint,
}

impl RuleCategory {
    /// Lookup order.
    pub const ORDERED: [RuleCategory; 5] = [
        Self::Required,
        Self::Format,
        Self::Enumeration,
        Self::ValueConstraint,
        Self::Range,
    ];

    /// Tags belonging to this category.
    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Required => &[
                "required",
                "required_if",
                "required_unless",
                "required_with",
                "required_with_all",
                "required_without",
                "required_without_all",
            ],
            Self::Format => &[
                "email",
                "uuid",
                "uuid3",
                "uuid4",
                "uuid5",
                "uuid3_rfc4122",
                "uuid4_rfc4122",
                "uuid5_rfc4122",
                "uuid_rfc4122",
                "base64",
                "base64url",
                "base64rawurl",
                "json",
                "image",
                // validator crate
                "url",
                "regex",
            ],
            Self::Range => &[
                "min", "max", "len", "gt", "lt", "gte", "lte",
                // validator crate
                "length", "range",
            ],
            Self::Enumeration => &["oneof"],
            Self::ValueConstraint => &[
                "eq",
                "ne",
                "eq_ignore_case",
                "ne_ignore_case",
                "unique",
                // validator crate
                "must_match",
            ],
        }
    }

    /// Status code reported for failures in this category.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Required => BAD_REQUEST_MISSING_FIELD,
            Self::Format => BAD_REQUEST_INVALID_FORMAT,
            Self::Range => BAD_REQUEST_OUT_OF_RANGE,
            Self::Enumeration => BAD_REQUEST_ENUM_VIOLATION,
            Self::ValueConstraint => BAD_REQUEST_INVALID_VALUE,
        }
    }

    /// Category of `tag`, if it has one. Case-sensitive.
    pub fn of(tag: &str) -> Option<Self> {
        Self::ORDERED.into_iter().find(|c| c.tags().contains(&tag))
    }
}

/// Status code for a single failing tag.
pub fn map_tag_to_status_code(tag: &str) -> StatusCode {
    RuleCategory::of(tag).map_or(FALLBACK_STATUS_CODE, RuleCategory::status_code)
}

/// Human-readable reason for one failure.
pub fn generate_reason(failure: &FieldFailure) -> String {
    let field = &failure.field;
    let tag = failure.tag.as_str();
    match RuleCategory::of(tag) {
        Some(RuleCategory::Required) => format!("{} is required", field),
        Some(RuleCategory::Format) => format!("{} must be a valid {}", field, tag),
        Some(RuleCategory::Range) if tag == "len" => {
            format!("{} must be exactly {} characters", field, failure.param_str())
        }
        Some(RuleCategory::Range) if tag == "length" || tag == "range" => {
            match bounds_phrase(failure.param_str()) {
                Some(bounds) if tag == "length" => format!("{} length must be {}", field, bounds),
                Some(bounds) => format!("{} must be {}", field, bounds),
                None => format!("{} must be {} {}", field, tag, failure.param_str()),
            }
        }
        Some(RuleCategory::Range) => format!("{} must be {} {}", field, tag, failure.param_str()),
        Some(RuleCategory::Enumeration) => format!("{} must be one of [{}]", field, failure.param_str()),
        Some(RuleCategory::ValueConstraint) | None => format!("{} failed validation: {}", field, tag),
    }
}

/// Render `max=20,min=3` as `at least 3 and at most 20`.
///
/// `None` when a pair is malformed or names an unknown bound.
fn bounds_phrase(param: &str) -> Option<String> {
    const ORDER: [(&str, &str); 5] = [
        ("equal", "exactly"),
        ("exclusive_min", "greater than"),
        ("min", "at least"),
        ("max", "at most"),
        ("exclusive_max", "less than"),
    ];

    let mut pairs = Vec::new();
    for pair in param.split(',').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=')?;
        let rank = ORDER.iter().position(|(k, _)| *k == key)?;
        pairs.push((rank, value));
    }
    if pairs.is_empty() {
        return None;
    }
    pairs.sort_by_key(|(rank, _)| *rank);
    Some(join(pairs.iter().map(|(rank, value)| format!("{} {}", ORDER[*rank].1, value)), " and "))
}

// ============================================================================
// Classification
// ============================================================================

/// Classified failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldValidationError {
    /// Field name.
    pub field: String,
    /// Offending value as supplied.
    pub value: String,
    /// Human-readable reason.
    pub reason: String,
    /// Rule tag.
    pub validation_tag: String,
    /// Code for this field alone.
    pub status_code: StatusCode,
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Classify each failure independently, preserving order.
pub fn map_validation_errors(failures: &[FieldFailure]) -> Vec<FieldValidationError> {
    failures
        .iter()
        .map(|failure| FieldValidationError {
            field: failure.field.clone(),
            value: failure.value.clone(),
            reason: generate_reason(failure),
            validation_tag: failure.tag.clone(),
            status_code: map_tag_to_status_code(&failure.tag),
        })
        .collect()
}

/// Build one error from a validator's output. Never fails.
pub fn from_validation_errors(input: &ValidationInput) -> AppError {
    match input {
        ValidationInput::Fields(failures) => from_field_failures(failures),
        ValidationInput::Other(raw) => AppError {
            public_status_code: BAD_REQUEST,
            service_status_code: BAD_REQUEST,
            public_message: String::from("Invalid input provided"),
            service_message: format!("Unknown validation error: {}", raw),
            public_metadata: MetaData::new().with("error_type", "Validation"),
            service_metadata: MetaData::new()
                .with("error_type", "ValidatorErrorUnknown")
                .with("raw_error", raw.clone()),
        },
    }
}

fn from_field_failures(failures: &[FieldFailure]) -> AppError {
    let classified = map_validation_errors(failures);

    let status = match classified.as_slice() {
        [only] => only.status_code,
        _ => BAD_REQUEST,
    };

    let fields = join(classified.iter().map(|fe| fe.field.as_str()), ", ");
    let failures = join(classified.iter().map(|fe| fe.to_string()), "; ");
    let service_message = join(
        classified.iter().map(|fe| {
            format!(
                "Field '{}' with value '{}' failed on '{}'",
                fe.field,
                sanitize(&fe.value),
                fe.validation_tag
            )
        }),
        "; ",
    );

    let mut details = MetaData::new();
    for fe in &classified {
        details.insert(format!("{}reason", fe.field), fe.validation_tag.clone());
        details.insert(format!("{}status_code", fe.field), fe.status_code.value().to_string());
    }

    AppError {
        public_status_code: status,
        service_status_code: status,
        public_message: String::from("Invalid input in one or more fields"),
        service_message,
        public_metadata: MetaData::new()
            .with("error_type", "Validation")
            .with("fields", fields.clone())
            .with("failures", failures),
        service_metadata: MetaData::new()
            .with("error_type", "ValidatorFieldErrors")
            .with("fields", fields)
            .with("details", details.to_string()),
    }
}

fn join<I, S>(parts: I, sep: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(part.as_ref());
    }
    out
}

// ============================================================================
// validator Integration
// ============================================================================

#[cfg(feature = "validator")]
impl From<&validator::ValidationErrors> for ValidationInput {
    /// Flatten nested struct and list errors into dotted field paths
    /// (`address.city`, `items[2].sku`), sorted by path.
    fn from(errors: &validator::ValidationErrors) -> Self {
        let mut out = Vec::new();
        flatten_validator_errors(errors, "", &mut out);
        Self::Fields(out)
    }
}

#[cfg(feature = "validator")]
impl From<validator::ValidationErrors> for ValidationInput {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::from(&errors)
    }
}

#[cfg(feature = "validator")]
fn flatten_validator_errors(errors: &validator::ValidationErrors, prefix: &str, out: &mut Vec<FieldFailure>) {
    use validator::ValidationErrorsKind;

    let mut entries: Vec<(String, &ValidationErrorsKind)> =
        errors.errors().iter().map(|(k, v)| (k.to_string(), v)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, kind) in entries {
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}.{}", prefix, name)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                out.extend(list.iter().map(|e| field_failure_from_validator(&path, e)));
            }
            ValidationErrorsKind::Struct(inner) => flatten_validator_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_validator_errors(inner, &format!("{}[{}]", path, idx), out);
                }
            }
        }
    }
}

#[cfg(feature = "validator")]
fn field_failure_from_validator(path: &str, error: &validator::ValidationError) -> FieldFailure {
    let render = |v: &serde_json::Value| match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let value = error.params.get("value").map(render).unwrap_or_default();

    let mut params: Vec<(String, String)> = error
        .params
        .iter()
        .map(|(k, v)| (k.to_string(), render(v)))
        .filter(|(k, _)| k != "value")
        .collect();
    params.sort();

    let mut failure = FieldFailure::new(path, value, error.code.to_string());
    if !params.is_empty() {
        failure = failure.with_param(join(params.iter().map(|(k, v)| format!("{}={}", k, v)), ","));
    }
    failure
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn categories_are_disjoint() {
        let mut seen = HashSet::new();
        for category in RuleCategory::ORDERED {
            for tag in category.tags() {
                assert!(seen.insert(*tag), "tag {} listed twice", tag);
            }
        }
    }

    #[test]
    fn tag_codes() {
        assert_eq!(map_tag_to_status_code("required_without_all"), BAD_REQUEST_MISSING_FIELD);
        assert_eq!(map_tag_to_status_code("uuid4_rfc4122"), BAD_REQUEST_INVALID_FORMAT);
        assert_eq!(map_tag_to_status_code("lte"), BAD_REQUEST_OUT_OF_RANGE);
        assert_eq!(map_tag_to_status_code("oneof"), BAD_REQUEST_ENUM_VIOLATION);
        assert_eq!(map_tag_to_status_code("ne_ignore_case"), BAD_REQUEST_INVALID_VALUE);
        assert_eq!(map_tag_to_status_code("startswith"), FALLBACK_STATUS_CODE);
        assert_eq!(map_tag_to_status_code("Required"), FALLBACK_STATUS_CODE);
    }

    #[test]
    fn reasons() {
        let cases = [
            (FieldFailure::new("Name", "", "required"), "Name is required"),
            (FieldFailure::new("Email", "x", "email"), "Email must be a valid email"),
            (FieldFailure::new("Pin", "12", "len").with_param("4"), "Pin must be exactly 4 characters"),
            (FieldFailure::new("Age", "12", "gte").with_param("18"), "Age must be gte 18"),
            (FieldFailure::new("Role", "x", "oneof").with_param("a b"), "Role must be one of [a b]"),
            (FieldFailure::new("Code", "x", "eq").with_param("y"), "Code failed validation: eq"),
            (FieldFailure::new("Sku", "x", "startswith"), "Sku failed validation: startswith"),
        ];
        for (failure, expected) in cases {
            assert_eq!(generate_reason(&failure), expected);
        }
    }

    #[test]
    fn validator_crate_tags() {
        assert_eq!(map_tag_to_status_code("url"), BAD_REQUEST_INVALID_FORMAT);
        assert_eq!(map_tag_to_status_code("regex"), BAD_REQUEST_INVALID_FORMAT);
        assert_eq!(map_tag_to_status_code("length"), BAD_REQUEST_OUT_OF_RANGE);
        assert_eq!(map_tag_to_status_code("range"), BAD_REQUEST_OUT_OF_RANGE);
        assert_eq!(map_tag_to_status_code("must_match"), BAD_REQUEST_INVALID_VALUE);

        let cases = [
            (
                FieldFailure::new("username", "ab", "length").with_param("max=20,min=3"),
                "username length must be at least 3 and at most 20",
            ),
            (
                FieldFailure::new("pin", "12", "length").with_param("equal=4"),
                "pin length must be exactly 4",
            ),
            (
                FieldFailure::new("age", "12", "range").with_param("max=99,min=18"),
                "age must be at least 18 and at most 99",
            ),
            (
                FieldFailure::new("ratio", "1", "range").with_param("exclusive_max=1"),
                "ratio must be less than 1",
            ),
            (
                FieldFailure::new("size", "9", "range").with_param("bogus"),
                "size must be range bogus",
            ),
            (FieldFailure::new("site", "x", "url"), "site must be a valid url"),
            (FieldFailure::new("confirm", "x", "must_match"), "confirm failed validation: must_match"),
        ];
        for (failure, expected) in cases {
            assert_eq!(generate_reason(&failure), expected);
        }
    }

    #[test]
    fn two_fields_aggregate() {
        let err = from_validation_errors(&ValidationInput::Fields(vec![
            FieldFailure::new("Email", "not-an-email", "email"),
            FieldFailure::new("Age", "12", "gte").with_param("18"),
        ]));

        assert_eq!(err.public_status_code, BAD_REQUEST);
        assert_eq!(err.service_status_code, BAD_REQUEST);
        assert_eq!(err.public_message, "Invalid input in one or more fields");
        assert_eq!(err.public_metadata.get("error_type"), Some("Validation"));
        assert_eq!(err.public_metadata.get("fields"), Some("Email, Age"));

        let failures = err.public_metadata.get("failures").unwrap();
        assert!(failures.contains("Email must be a valid email"));
        assert!(failures.contains("Age must be gte 18"));
        assert_eq!(failures, "Email: Email must be a valid email; Age: Age must be gte 18");

        assert_eq!(
            err.service_message,
            "Field 'Email' with value 'not-an-email' failed on 'email'; Field 'Age' with value '12' failed on 'gte'"
        );
        assert_eq!(err.service_metadata.get("error_type"), Some("ValidatorFieldErrors"));
        assert_eq!(
            err.service_metadata.get("details"),
            Some("{Emailreason: 'email', Emailstatus_code: '4004', Agereason: 'gte', Agestatus_code: '4005'}")
        );
    }

    #[test]
    fn single_field_uses_its_own_code() {
        let err = from_validation_errors(&ValidationInput::Fields(vec![FieldFailure::new("Name", "", "required")]));
        assert_eq!(err.public_status_code, BAD_REQUEST_MISSING_FIELD);
        assert_eq!(err.service_status_code, BAD_REQUEST_MISSING_FIELD);
        assert_eq!(err.public_metadata.get("failures"), Some("Name: Name is required"));
    }

    #[test]
    fn single_field_code_can_be_suppressed() {
        let mut err = from_validation_errors(&vec![FieldFailure::new("Qty", "0", "min").with_param("1")].into());
        assert_eq!(err.public_status_code, BAD_REQUEST_OUT_OF_RANGE);
        err.neutralize_public();
        assert_eq!(err.public_status_code, BAD_REQUEST);
        assert_eq!(err.service_status_code, BAD_REQUEST_OUT_OF_RANGE);
    }

    #[test]
    fn empty_batch_is_plain_bad_request() {
        let err = from_validation_errors(&ValidationInput::Fields(Vec::new()));
        assert_eq!(err.public_status_code, BAD_REQUEST);
        assert_eq!(err.public_metadata.get("fields"), Some(""));
        assert_eq!(err.service_message, "");
    }

    #[test]
    fn other_input() {
        let err = from_validation_errors(&ValidationInput::Other(String::from("unexpected EOF")));
        assert_eq!(err.public_status_code, BAD_REQUEST);
        assert_eq!(err.public_message, "Invalid input provided");
        assert_eq!(err.service_message, "Unknown validation error: unexpected EOF");
        assert_eq!(err.public_metadata.len(), 1);
        assert_eq!(err.service_metadata.get("error_type"), Some("ValidatorErrorUnknown"));
        assert_eq!(err.service_metadata.get("raw_error"), Some("unexpected EOF"));
    }

    #[test]
    fn values_are_sanitized_in_service_message() {
        let err = from_validation_errors(&ValidationInput::Fields(vec![FieldFailure::new(
            "Bio",
            "line1\nline2\x1b[31m",
            "max",
        )
        .with_param("10")]));
        assert_eq!(err.service_message, "Field 'Bio' with value 'line1?line2?' failed on 'max'");
    }

    #[test]
    fn bare_escape_keeps_rest_of_value() {
        let err = from_validation_errors(&ValidationInput::Fields(vec![FieldFailure::new(
            "Bio",
            "hello\x1bworld, this is the offending value",
            "max",
        )
        .with_param("10")]));
        assert_eq!(
            err.service_message,
            "Field 'Bio' with value 'hello?world, this is the offending value' failed on 'max'"
        );
    }

    #[test]
    fn map_preserves_order_and_values() {
        let mapped = map_validation_errors(&[
            FieldFailure::new("B", "2", "oneof").with_param("x y"),
            FieldFailure::new("A", "1", "uuid"),
        ]);
        assert_eq!(mapped[0].field, "B");
        assert_eq!(mapped[0].status_code, BAD_REQUEST_ENUM_VIOLATION);
        assert_eq!(mapped[1].value, "1");
        assert_eq!(mapped[1].to_string(), "A: A must be a valid uuid");
    }

    #[cfg(feature = "validator")]
    #[test]
    fn flattens_validator_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut email = ValidationError::new("email");
        email.add_param("value".into(), &"nope");
        errors.add("email", email);

        let mut length = ValidationError::new("length");
        length.add_param("value".into(), &"ab");
        length.add_param("min".into(), &3);
        length.add_param("max".into(), &20);
        errors.add("username", length);

        let input = ValidationInput::from(&errors);
        let ValidationInput::Fields(fields) = input else {
            panic!("expected field failures");
        };

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], FieldFailure::new("email", "nope", "email"));
        assert_eq!(fields[1].field, "username");
        assert_eq!(fields[1].value, "ab");
        assert_eq!(fields[1].param.as_deref(), Some("max=20,min=3"));
    }
}
