/// Core error types for Vibesia
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias using `VibesiaError`
pub type Result<T> = std::result::Result<T, VibesiaError>;

/// Boxed source kept on transaction failures for logging only
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for Vibesia
#[derive(Error, Debug)]
pub enum VibesiaError {
    /// Entity absent, or a playlist owned by somebody else
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// No (valid) actor where one is required
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Actor known but lacks the capability
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Song already in playlist, playlist name already used by the owner
    #[error("Duplicate {entity}: {key}")]
    DuplicateEntry { entity: &'static str, key: String },

    /// Malformed input with field-level detail
    #[error("Validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// Operation disabled by policy
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Sanitized storage failure during a (multi-step) mutation
    #[error("{message}")]
    TransactionFailure {
        code: FailureCode,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// Classification of a storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    ConstraintViolation,
    Timeout,
    StorageFailure,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::ConstraintViolation => "constraint_violation",
            FailureCode::Timeout => "timeout",
            FailureCode::StorageFailure => "storage_failure",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn format_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl VibesiaError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create a duplicate entry error
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateEntry {
            entity,
            key: key.into(),
        }
    }

    /// Create a single-field validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Create a transaction failure without an underlying source
    pub fn transaction(code: FailureCode, message: impl Into<String>) -> Self {
        Self::TransactionFailure {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::DuplicateEntry { .. } => "duplicate_entry",
            Self::Validation(_) => "validation_error",
            Self::UnsupportedOperation(_) => "unsupported_operation",
            Self::TransactionFailure { code, .. } => code.as_str(),
        }
    }
}

impl From<validator::ValidationErrors> for VibesiaError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        collect_validation_errors("", &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Self::Validation(fields)
    }
}

fn collect_validation_errors(
    prefix: &str,
    errors: &validator::ValidationErrors,
    out: &mut Vec<FieldError>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), |m| m.to_string());
                    out.push(FieldError::new(path.clone(), message));
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_validation_errors(&path, nested, out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_errors(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for VibesiaError {
    fn from(err: sqlx::Error) -> Self {
        let (code, message) = match &err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation => (
                    FailureCode::ConstraintViolation,
                    "A uniqueness constraint was violated",
                ),
                sqlx::error::ErrorKind::ForeignKeyViolation => (
                    FailureCode::ConstraintViolation,
                    "A referenced record does not exist",
                ),
                sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => (
                    FailureCode::ConstraintViolation,
                    "A data integrity constraint was violated",
                ),
                _ if is_sqlite_busy(db.code().as_deref()) => (
                    FailureCode::Timeout,
                    "The database is busy, please retry",
                ),
                _ => (FailureCode::StorageFailure, "The storage operation failed"),
            },
            sqlx::Error::PoolTimedOut => (
                FailureCode::Timeout,
                "Timed out waiting for a database connection",
            ),
            _ => (FailureCode::StorageFailure, "The storage operation failed"),
        };

        Self::TransactionFailure {
            code,
            message: message.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including their extended codes
#[cfg(feature = "sqlx-support")]
fn is_sqlite_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, 5 | 6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, max = 5))]
        name: String,
        #[validate(range(min = 1))]
        position: i64,
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(VibesiaError::not_found("Playlist", 3).code(), "not_found");
        assert_eq!(
            VibesiaError::duplicate("PlaylistEntry", "1/2").code(),
            "duplicate_entry"
        );
        assert_eq!(
            VibesiaError::transaction(FailureCode::Timeout, "busy").code(),
            "timeout"
        );
    }

    #[test]
    fn validation_errors_keep_field_paths() {
        let sample = Sample {
            name: String::new(),
            position: 0,
        };
        let err: VibesiaError = sample.validate().unwrap_err().into();

        let VibesiaError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["name", "position"]);
    }

    #[test]
    fn not_found_message_names_entity() {
        let err = VibesiaError::not_found("Playlist", 42);
        assert_eq!(err.to_string(), "Playlist not found: 42");
    }

    #[cfg(feature = "sqlx-support")]
    #[test]
    fn busy_codes_are_detected() {
        assert!(is_sqlite_busy(Some("5")));
        assert!(is_sqlite_busy(Some("517")));
        assert!(is_sqlite_busy(Some("6")));
        assert!(!is_sqlite_busy(Some("19")));
        assert!(!is_sqlite_busy(None));
    }
}
