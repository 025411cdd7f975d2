//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::ReconError;
use crate::model::{Priority, Resolution, Severity, Status};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Database Errors (exit code 2) ===
    /// Database operation failed
    DatabaseError,
    /// Recon workspace not initialized
    NotInitialized,
    /// Already initialized
    AlreadyInitialized,

    // === Bug Errors (exit code 3) ===
    /// Bug with specified ID not found
    BugNotFound,

    // === Validation Errors (exit code 4) ===
    /// Field validation failed
    ValidationFailed,
    /// Storage constraint rejected the write
    ConstraintViolation,
    /// Invalid severity value
    InvalidSeverity,
    /// Invalid priority value
    InvalidPriority,
    /// Invalid status value
    InvalidStatus,
    /// Invalid resolution value
    InvalidResolution,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::BugNotFound => "BUG_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConstraintViolation => "CONSTRAINT_VIOLATION",
            Self::InvalidSeverity => "INVALID_SEVERITY",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidResolution => "INVALID_RESOLUTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller might succeed by fixing the input and retrying.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed
                | Self::InvalidSeverity
                | Self::InvalidPriority
                | Self::InvalidStatus
                | Self::InvalidResolution
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Database errors
    /// - 3: Bug errors
    /// - 4: Validation errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseError | Self::NotInitialized | Self::AlreadyInitialized => 2,
            Self::BugNotFound => 3,
            Self::ValidationFailed
            | Self::ConstraintViolation
            | Self::InvalidSeverity
            | Self::InvalidPriority
            | Self::InvalidStatus
            | Self::InvalidResolution => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `ReconError`.
    #[must_use]
    pub fn from_error(err: &ReconError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &ReconError) -> (ErrorCode, Option<Value>) {
        match err {
            ReconError::Database(_) => (ErrorCode::DatabaseError, None),
            ReconError::Constraint { reason } => (
                ErrorCode::ConstraintViolation,
                Some(json!({"reason": reason})),
            ),
            ReconError::BugNotFound { id } => (ErrorCode::BugNotFound, Some(json!({"id": id}))),
            ReconError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            ReconError::ValidationErrors { errors } => (
                ErrorCode::ValidationFailed,
                Some(json!({
                    "errors": errors.iter()
                        .map(|e| json!({"field": e.field, "message": e.message}))
                        .collect::<Vec<_>>()
                })),
            ),
            ReconError::InvalidSeverity { severity } => (
                ErrorCode::InvalidSeverity,
                Some(json!({
                    "provided": severity,
                    "valid_values": Severity::ALL.map(|s| s.as_str()),
                })),
            ),
            ReconError::InvalidPriority { priority } => (
                ErrorCode::InvalidPriority,
                Some(json!({
                    "provided": priority,
                    "valid_values": Priority::ALL.map(|p| p.as_str()),
                })),
            ),
            ReconError::InvalidStatus { status } => (
                ErrorCode::InvalidStatus,
                Some(json!({
                    "provided": status,
                    "valid_values": Status::ALL.map(|s| s.as_str()),
                })),
            ),
            ReconError::InvalidResolution { resolution } => (
                ErrorCode::InvalidResolution,
                Some(json!({
                    "provided": resolution,
                    "valid_values": Resolution::ALL.map(|r| r.as_str()),
                })),
            ),
            ReconError::Config(_) => (ErrorCode::ConfigError, None),
            ReconError::NotInitialized => (ErrorCode::NotInitialized, None),
            ReconError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            ReconError::Io(_) => (ErrorCode::IoError, None),
            ReconError::Json(_) => (ErrorCode::JsonError, None),
            ReconError::Yaml(_) => (ErrorCode::YamlError, None),
            ReconError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    /// Prefer a "did you mean" hint over the generic suggestion.
    fn generate_hint(err: &ReconError) -> Option<String> {
        let detected = match err {
            ReconError::InvalidStatus { status } => {
                detect_intent(status, &STATUS_SYNONYMS).map(|s| format!("--status \"{s}\""))
            }
            ReconError::InvalidPriority { priority } => {
                detect_intent(priority, &PRIORITY_SYNONYMS).map(|p| format!("--priority {p}"))
            }
            ReconError::InvalidSeverity { severity } => {
                detect_intent(severity, &SEVERITY_SYNONYMS).map(|s| format!("--severity {s}"))
            }
            _ => None,
        };

        if let Some(flag) = detected {
            return Some(format!("Did you mean {flag}?"));
        }
        err.suggestion().map(str::to_string)
    }
}

// === Intent Detection ===

/// Status synonyms for intent detection.
static STATUS_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("new", "Reported"),
        ("open", "Reported"),
        ("todo", "Reported"),
        ("wip", "In Progress"),
        ("working", "In Progress"),
        ("active", "In Progress"),
        ("started", "In Progress"),
        ("blocked", "On Hold"),
        ("paused", "On Hold"),
        ("waiting", "On Hold"),
        ("fixed", "Resolved"),
        ("done", "Resolved"),
        ("complete", "Resolved"),
        ("finished", "Closed"),
        ("archived", "Closed"),
    ]
    .into_iter()
    .collect()
});

/// Priority synonyms for intent detection.
static PRIORITY_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("p0", "Critical"),
        ("urgent", "Critical"),
        ("highest", "Critical"),
        ("p1", "High"),
        ("important", "High"),
        ("p2", "Medium"),
        ("normal", "Medium"),
        ("default", "Medium"),
        ("p3", "Low"),
        ("lowest", "Low"),
        ("backlog", "Low"),
    ]
    .into_iter()
    .collect()
});

/// Severity synonyms for intent detection.
static SEVERITY_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("showstopper", "Blocker"),
        ("fatal", "Blocker"),
        ("severe", "Critical"),
        ("high", "Critical"),
        ("normal", "Major"),
        ("medium", "Major"),
        ("low", "Minor"),
        ("trivial", "Minor"),
        ("cosmetic", "Minor"),
    ]
    .into_iter()
    .collect()
});

fn detect_intent(
    input: &str,
    synonyms: &HashMap<&'static str, &'static str>,
) -> Option<&'static str> {
    let lower = input.trim().to_lowercase();
    synonyms.get(lower.as_str()).copied()
}
