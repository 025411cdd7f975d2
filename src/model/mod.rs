//! Core data types for `recon`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Bug` - A stored defect report
//! - `NewBug` - Field values for creating a bug
//! - `Severity`, `Priority`, `Status`, `Resolution` - Closed classification enums
//! - `TimelineEvent` - An append-only annotation on a bug
//! - `NewTimelineEvent` - Field values for adding an event

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ReconError;

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Lowercase a user-supplied label and fold `_`/`-` into spaces and drop
/// apostrophes, so `in_progress`, `In Progress` and `wont-fix` all parse.
fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| *c != '\'')
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect()
}

/// How badly a bug breaks the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    Blocker,
    Critical,
    #[default]
    Major,
    Minor,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Blocker, Self::Critical, Self::Major, Self::Minor];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blocker => "Blocker",
            Self::Critical => "Critical",
            Self::Major => "Major",
            Self::Minor => "Minor",
        }
    }

    /// Blocker and Critical severities belong to the critical tier.
    #[must_use]
    pub const fn is_critical_tier(&self) -> bool {
        matches!(self, Self::Blocker | Self::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "blocker" => Ok(Self::Blocker),
            "critical" => Ok(Self::Critical),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            _ => Err(ReconError::InvalidSeverity {
                severity: s.to_string(),
            }),
        }
    }
}

/// How soon a bug should be worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ReconError::InvalidPriority {
                priority: s.to_string(),
            }),
        }
    }
}

/// Bug lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Reported,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Self; 5] = [
        Self::Reported,
        Self::InProgress,
        Self::OnHold,
        Self::Resolved,
        Self::Closed,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "Reported",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Resolved and Closed bugs need no further work.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "reported" => Ok(Self::Reported),
            "in progress" | "inprogress" => Ok(Self::InProgress),
            "on hold" | "onhold" => Ok(Self::OnHold),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ReconError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// How a bug was dealt with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Fixed,
    #[serde(rename = "Won't Fix")]
    WontFix,
    Duplicate,
    #[serde(rename = "Cannot Reproduce")]
    CannotReproduce,
    Done,
}

impl Resolution {
    pub const ALL: [Self; 5] = [
        Self::Fixed,
        Self::WontFix,
        Self::Duplicate,
        Self::CannotReproduce,
        Self::Done,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::WontFix => "Won't Fix",
            Self::Duplicate => "Duplicate",
            Self::CannotReproduce => "Cannot Reproduce",
            Self::Done => "Done",
        }
    }

    /// Parse a resolution selection where the empty string means "none".
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` for a non-empty value outside the enum.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, ReconError> {
        if s.trim().is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "fixed" => Ok(Self::Fixed),
            "wont fix" | "wontfix" => Ok(Self::WontFix),
            "duplicate" => Ok(Self::Duplicate),
            "cannot reproduce" | "cant reproduce" => Ok(Self::CannotReproduce),
            "done" => Ok(Self::Done),
            _ => Err(ReconError::InvalidResolution {
                resolution: s.to_string(),
            }),
        }
    }
}

/// A stored defect report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bug {
    /// Store-assigned identifier.
    pub id: i64,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps_to_reproduce: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_result: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_result: Option<String>,

    pub severity: Severity,
    pub priority: Priority,
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_case_name: Option<String>,

    /// Soft-delete marker.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_archived: bool,

    /// Local time, assigned by the store at insertion.
    pub created_at: NaiveDateTime,
}

impl Bug {
    /// Display identifier, e.g. `BUG-007`.
    #[must_use]
    pub fn display_id(&self) -> String {
        format!("BUG-{:03}", self.id)
    }

    /// Priority in the critical tier, or severity Blocker/Critical.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        matches!(self.priority, Priority::Critical) || self.severity.is_critical_tier()
    }

    /// No assignee, or only whitespace.
    #[must_use]
    pub fn is_unassigned(&self) -> bool {
        self.assignee_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
    }
}

/// Field values for a bug that has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewBug {
    pub summary: String,
    pub description: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub expected_result: Option<String>,
    pub actual_result: Option<String>,
    pub severity: Severity,
    pub priority: Priority,
    pub status: Status,
    pub assignee_name: Option<String>,
    pub reporter_name: Option<String>,
    pub environment: Option<String>,
    pub resolution: Option<Resolution>,
    pub requirement_number: Option<String>,
    pub test_case_name: Option<String>,
}

impl NewBug {
    /// A bug with the given summary and the default classification
    /// (Major / Medium / Reported).
    #[must_use]
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }
}

/// An append-only, timestamped annotation on a bug.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    pub id: i64,
    pub bug_id: i64,
    pub author: String,
    pub comment: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,

    /// Local time, assigned by the store at insertion.
    pub event_at: NaiveDateTime,

    #[serde(default)]
    pub is_nexus_event: bool,
}

/// Field values for a timeline event that has not been stored yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTimelineEvent {
    pub bug_id: i64,
    pub author: String,
    pub comment: String,
    pub attachment_url: Option<String>,
    pub is_nexus_event: bool,
}

impl NewTimelineEvent {
    #[must_use]
    pub fn new(bug_id: i64, author: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            bug_id,
            author: author.into(),
            comment: comment.into(),
            attachment_url: None,
            is_nexus_event: false,
        }
    }

    #[must_use]
    pub const fn nexus(mut self) -> Self {
        self.is_nexus_event = true;
        self
    }
}
