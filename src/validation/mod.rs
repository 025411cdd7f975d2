//! Validation helpers for `recon`.
//!
//! These routines check field-level rules before anything reaches the
//! database and return every problem found, not just the first.

use crate::error::ValidationError;
use crate::model::{NewBug, NewTimelineEvent};

/// Validates bug fields.
pub struct BugValidator;

impl BugValidator {
    /// Validate a bug about to be created.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_new(bug: &NewBug) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(err) = Self::validate_summary(&bug.summary) {
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A summary must contain something other than whitespace.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for an empty summary.
    pub fn validate_summary(summary: &str) -> Result<(), ValidationError> {
        if summary.trim().is_empty() {
            return Err(ValidationError::new("summary", "cannot be empty"));
        }
        Ok(())
    }
}

/// Validates timeline event fields.
pub struct TimelineEventValidator;

impl TimelineEventValidator {
    /// Validate a timeline event and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(event: &NewTimelineEvent) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if event.bug_id <= 0 {
            errors.push(ValidationError::new("bug_id", "must be positive"));
        }

        if event.author.trim().is_empty() {
            errors.push(ValidationError::new("author", "cannot be empty"));
        }

        if event.comment.trim().is_empty() {
            errors.push(ValidationError::new("comment", "cannot be empty"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
