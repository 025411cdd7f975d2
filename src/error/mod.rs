//! Error types and handling for `recon`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for ad-hoc failures
//! - Keeps "not found" distinct from constraint violations
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for scripted callers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `recon` operations.
#[derive(Error, Debug)]
pub enum ReconError {
    // === Storage Errors ===
    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A CHECK, NOT NULL or FOREIGN KEY constraint rejected the write.
    #[error("Constraint violation: {reason}")]
    Constraint { reason: String },

    // === Bug Errors ===
    /// Bug with the specified ID was not found.
    #[error("Bug not found: {id}")]
    BugNotFound { id: i64 },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several fields failed validation at once.
    #[error("Validation errors: {}", join_validation_errors(.errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Invalid severity value.
    #[error("Invalid severity: {severity}")]
    InvalidSeverity { severity: String },

    /// Invalid priority value.
    #[error("Invalid priority: {priority}")]
    InvalidPriority { priority: String },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Invalid resolution value.
    #[error("Invalid resolution: {resolution}")]
    InvalidResolution { resolution: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Recon workspace not initialized.
    #[error("Recon not initialized: run 'recon init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReconError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized
                | Self::BugNotFound { .. }
                | Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::InvalidSeverity { .. }
                | Self::InvalidPriority { .. }
                | Self::InvalidStatus { .. }
                | Self::InvalidResolution { .. }
                | Self::Constraint { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: recon init"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::BugNotFound { .. } => Some("Run 'recon list' to see active bugs"),
            Self::InvalidSeverity { .. } => Some("Valid severities: Blocker, Critical, Major, Minor"),
            Self::InvalidPriority { .. } => Some("Valid priorities: Critical, High, Medium, Low"),
            Self::InvalidStatus { .. } => {
                Some("Valid statuses: Reported, In Progress, On Hold, Resolved, Closed")
            }
            Self::InvalidResolution { .. } => Some(
                "Valid resolutions: Fixed, Won't Fix, Duplicate, Cannot Reproduce, Done (empty clears)",
            ),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Collapse a list of field errors; a single error stays a plain
    /// [`ReconError::Validation`].
    #[must_use]
    pub fn from_validation_errors(mut errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = errors.remove(0);
            Self::Validation {
                field: err.field,
                reason: err.message,
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// Turn `SQLite` constraint failures into [`ReconError::Constraint`],
    /// passing every other database error through unchanged.
    #[must_use]
    pub fn from_sqlite(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::Constraint {
                    reason: message.unwrap_or_else(|| code.to_string()),
                }
            }
            other => Self::Database(other),
        }
    }
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type using `ReconError`.
pub type Result<T> = std::result::Result<T, ReconError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconError::BugNotFound { id: 42 };
        assert_eq!(err.to_string(), "Bug not found: 42");
    }

    #[test]
    fn test_validation_error() {
        let err = ReconError::validation("summary", "cannot be empty");
        assert_eq!(
            err.to_string(),
            "Validation failed: summary: cannot be empty"
        );
    }

    #[test]
    fn test_from_validation_errors() {
        let single = ReconError::from_validation_errors(vec![ValidationError::new(
            "author",
            "cannot be empty",
        )]);
        assert!(matches!(single, ReconError::Validation { ref field, .. } if field == "author"));

        let many = ReconError::from_validation_errors(vec![
            ValidationError::new("author", "cannot be empty"),
            ValidationError::new("comment", "cannot be empty"),
        ]);
        assert!(matches!(many, ReconError::ValidationErrors { ref errors } if errors.len() == 2));
        assert_eq!(
            many.to_string(),
            "Validation errors: author: cannot be empty; comment: cannot be empty"
        );
    }

    #[test]
    fn test_user_recoverable() {
        assert!(ReconError::NotInitialized.is_user_recoverable());

        let not_recoverable = ReconError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            None,
        ));
        assert!(!not_recoverable.is_user_recoverable());
    }

    #[test]
    fn test_suggestion() {
        assert_eq!(
            ReconError::NotInitialized.suggestion(),
            Some("Run: recon init")
        );
        assert!(ReconError::Config("bad".to_string()).suggestion().is_none());
    }

    #[test]
    fn test_from_sqlite_maps_constraint_violations() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT NOT NULL CHECK (v IN ('a')));")
            .unwrap();
        let err = conn
            .execute("INSERT INTO t (v) VALUES ('b')", [])
            .unwrap_err();
        assert!(matches!(
            ReconError::from_sqlite(err),
            ReconError::Constraint { .. }
        ));

        let err = conn.execute("SELECT * FROM missing", []).unwrap_err();
        assert!(matches!(
            ReconError::from_sqlite(err),
            ReconError::Database(_)
        ));
    }
}
