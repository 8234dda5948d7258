//! Database failure classification.
//!
//! Turns a relational-database failure into an [`AppError`] with a
//! client-safe public half and a diagnostic service half.
//!
//! # Input Model
//!
//! Drivers differ, so classification works over [`DbFailure`], a small sum
//! type carrying exactly what the classifier reads. With the `sqlx` feature,
//! `sqlx::Error` converts into it directly.
//!
//! # Mapping
//!
//! | failure | public code | service code |
//! |---|---|---|
//! | no rows | `NotFound_Resource` | `NotFound_Resource` |
//! | `23505` unique | `Conflict_DuplicateData` | same |
//! | `23503` foreign key | `BadRequest` | same |
//! | `23502` not null | `BadRequest` | same |
//! | `23514` check | `BadRequest` | same |
//! | other SQL-state | `ServerError` | `ServerError_Database` |
//! | anything else | `ServerError` | `ServerError_Database` |
//!
//! Public metadata only ever holds `error_type` and `resourceName`. Driver
//! text (messages, constraint and column names, severity) stays in the
//! service metadata.

use crate::definitions::*;
use crate::{AppError, MetaData, StatusCode};
use std::fmt;

/// SQL-state codes the classifier recognizes.
pub mod sql_state {
    /// `unique_violation`
    pub const UNIQUE_VIOLATION: &str = "23505";
    /// `foreign_key_violation`
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    /// `not_null_violation`
    pub const NOT_NULL_VIOLATION: &str = "23502";
    /// `check_violation`
    pub const CHECK_VIOLATION: &str = "23514";
}

const SERVER_ERROR_NOTICE: &str = "A server error occurred. Please try again later.";
const NO_ROWS: &str = "no rows in result set";

// ============================================================================
// Classifier Input
// ============================================================================

/// Error reported by the database engine itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Five-character SQL-state code.
    pub code: String,
    /// Primary human-readable message.
    pub message: String,
    /// Severity label, `ERROR` unless the driver says otherwise.
    pub severity: String,
    /// Violated constraint, when the engine names one.
    pub constraint: Option<String>,
    /// Offending column, when the engine names one.
    pub column: Option<String>,
    /// Secondary detail message.
    pub detail: Option<String>,
}

impl EngineError {
    /// Engine error with `ERROR` severity and no optional fields.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: String::from("ERROR"),
            constraint: None,
            column: None,
            detail: None,
        }
    }

    /// Name the violated constraint.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    /// Name the offending column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Override the severity label.
    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    /// Attach the engine's detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for EngineError {
    /// `"<severity>: <message>"`, the form PostgreSQL itself prints. Drivers
    /// differ (lib/pq says `pq: <message>`), so `raw_error` stays engine-native.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

impl std::error::Error for EngineError {}

/// A database operation failure, as seen by the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbFailure {
    /// A query expected a row and got none.
    RowNotFound,
    /// The engine rejected the statement.
    Engine(EngineError),
    /// Anything else: pool, I/O, protocol or decode failures.
    Other(String),
}

impl fmt::Display for DbFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowNotFound => f.write_str(NO_ROWS),
            Self::Engine(e) => fmt::Display::fmt(e, f),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

impl std::error::Error for DbFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for DbFailure {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Classify a database failure for `entity_name`.
///
/// `None` in gives `None` out; every failure gives a populated error.
///
/// # Example
///
/// ```rust
/// use bastion_errors::{DbFailure, definitions, from_db_error};
///
/// let err = from_db_error(Some(&DbFailure::RowNotFound), "User").unwrap();
/// assert_eq!(err.public_status_code, definitions::NOT_FOUND_RESOURCE);
/// assert_eq!(err.public_message, "User not found");
///
/// assert!(from_db_error(None, "User").is_none());
/// ```
pub fn from_db_error(err: Option<&DbFailure>, entity_name: &str) -> Option<AppError> {
    let err = err?;
    Some(match err {
        DbFailure::RowNotFound => row_not_found(entity_name),
        DbFailure::Engine(engine) => classify_engine(engine, entity_name),
        DbFailure::Other(raw) => unknown(raw, entity_name),
    })
}

fn row_not_found(entity: &str) -> AppError {
    let error_type = "Data not found";
    AppError {
        public_status_code: NOT_FOUND_RESOURCE,
        service_status_code: NOT_FOUND_RESOURCE,
        public_message: format!("{} not found", entity),
        service_message: format!("No record found for {}: {}", entity, NO_ROWS),
        public_metadata: public_meta(error_type, entity),
        service_metadata: MetaData::new()
            .with("error_type", error_type)
            .with("resourceName", entity.to_owned())
            .with("raw_error", NO_ROWS),
    }
}

/// Recognized engine failure: codes, public message, service prefix, type label.
struct EngineRule {
    code: StatusCode,
    public: fn(&str) -> String,
    service_prefix: &'static str,
    error_type: &'static str,
}

fn engine_rule(code: &str) -> Option<EngineRule> {
    let rule = match code {
        sql_state::UNIQUE_VIOLATION => EngineRule {
            code: CONFLICT_DUPLICATE_DATA,
            public: |e| format!("A {} with the same value already exists", e),
            service_prefix: "Unique constraint violation on",
            error_type: "Data duplication",
        },
        sql_state::FOREIGN_KEY_VIOLATION => EngineRule {
            code: BAD_REQUEST,
            public: |e| format!("{} has invalid reference to related data", e),
            service_prefix: "Foreign key constraint failed on",
            error_type: "Foreign key violation",
        },
        sql_state::NOT_NULL_VIOLATION => EngineRule {
            code: BAD_REQUEST,
            public: |e| format!("{} is missing required fields", e),
            service_prefix: "NOT NULL constraint failed on",
            error_type: "Missing field",
        },
        sql_state::CHECK_VIOLATION => EngineRule {
            code: BAD_REQUEST,
            public: |e| format!("{} failed validation rules", e),
            service_prefix: "CHECK constraint violation on",
            error_type: "Constraint check failed",
        },
        _ => return None,
    };
    Some(rule)
}

fn classify_engine(engine: &EngineError, entity: &str) -> AppError {
    let mut service = MetaData::new().with("pgcode", engine.code.clone());

    let Some(rule) = engine_rule(&engine.code) else {
        service.extend(engine_tail(engine, entity));
        return AppError {
            public_status_code: SERVER_ERROR,
            service_status_code: SERVER_ERROR_DATABASE,
            public_message: String::from(SERVER_ERROR_NOTICE),
            service_message: format!("Unhandled PostgreSQL error for {}: {}", entity, engine.message),
            public_metadata: public_meta("Internal database error", entity),
            service_metadata: service,
        };
    };

    // Not-null violations name a column; the rest name a constraint.
    if engine.code == sql_state::NOT_NULL_VIOLATION {
        service.insert("column", engine.column.clone().unwrap_or_default());
    } else {
        service.insert("constraint", engine.constraint.clone().unwrap_or_default());
    }
    service.insert("error_type", rule.error_type);
    service.extend(engine_tail(engine, entity));

    AppError {
        public_status_code: rule.code,
        service_status_code: rule.code,
        public_message: (rule.public)(entity),
        service_message: format!("{} {}: {}", rule.service_prefix, entity, engine.message),
        public_metadata: public_meta(rule.error_type, entity),
        service_metadata: service,
    }
}

/// Trailing service entries shared by every engine branch.
fn engine_tail(engine: &EngineError, entity: &str) -> [(&'static str, String); 4] {
    [
        ("resourceName", entity.to_owned()),
        ("error_message", engine.message.clone()),
        ("error_severity", engine.severity.clone()),
        ("raw_error", engine.to_string()),
    ]
}

fn unknown(raw: &str, entity: &str) -> AppError {
    AppError {
        public_status_code: SERVER_ERROR,
        service_status_code: SERVER_ERROR_DATABASE,
        public_message: String::from(SERVER_ERROR_NOTICE),
        service_message: format!("Unexpected DB error for {}: {}", entity, raw),
        public_metadata: public_meta("Unknown server error", entity),
        service_metadata: MetaData::new()
            .with("error_type", "Unknown database error")
            .with("resourceName", entity.to_owned())
            .with("raw_error", raw.to_owned()),
    }
}

fn public_meta(error_type: &'static str, entity: &str) -> MetaData {
    MetaData::new()
        .with("error_type", error_type)
        .with("resourceName", entity.to_owned())
}

// ============================================================================
// sqlx Integration
// ============================================================================

#[cfg(feature = "sqlx")]
impl From<&sqlx::Error> for DbFailure {
    fn from(err: &sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::RowNotFound,
            sqlx::Error::Database(db) => {
                let mut engine = EngineError::new(
                    db.code().map(|c| c.into_owned()).unwrap_or_default(),
                    db.message(),
                );
                if let Some(constraint) = db.constraint() {
                    engine = engine.with_constraint(constraint);
                }
                if let Some(pg) = db.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
                    engine = engine.with_severity(format!("{:?}", pg.severity()).to_uppercase());
                    if let Some(column) = pg.column() {
                        engine = engine.with_column(column);
                    }
                    if let Some(detail) = pg.detail() {
                        engine = engine.with_detail(detail);
                    }
                }
                Self::Engine(engine)
            }
            other => Self::Other(other.to_string()),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for DbFailure {
    fn from(err: sqlx::Error) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================
