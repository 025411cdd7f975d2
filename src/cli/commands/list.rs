//! List command implementation.

use crate::cli::ListArgs;
use crate::cli::commands::open_workspace;
use crate::config;
use crate::error::Result;
use crate::format::{TextFormatOptions, format_bug_line_with};
use crate::model::{Bug, Priority, Severity, Status};
use crate::output::OutputContext;
use std::str::FromStr;
use tracing::debug;

/// Filters parsed from `ListArgs`.
#[derive(Debug, Clone, Default)]
pub struct BugFilter {
    pub statuses: Vec<Status>,
    pub severities: Vec<Severity>,
    pub priorities: Vec<Priority>,
    pub assignee: Option<String>,
    pub unassigned: bool,
    pub critical: bool,
    pub limit: usize,
}

impl BugFilter {
    /// Parse filter values from CLI args.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown status, severity or priority.
    pub fn from_args(args: &ListArgs) -> Result<Self> {
        Ok(Self {
            statuses: parse_all(&args.status)?,
            severities: parse_all(&args.severity)?,
            priorities: parse_all(&args.priority)?,
            assignee: args.assignee.clone(),
            unassigned: args.unassigned,
            critical: args.critical,
            limit: args.limit,
        })
    }

    #[must_use]
    pub fn matches(&self, bug: &Bug) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&bug.status) {
            return false;
        }
        if !self.severities.is_empty() && !self.severities.contains(&bug.severity) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&bug.priority) {
            return false;
        }
        if let Some(assignee) = &self.assignee {
            if bug.assignee_name.as_deref() != Some(assignee.as_str()) {
                return false;
            }
        }
        if self.unassigned && !bug.is_unassigned() {
            return false;
        }
        if self.critical && !bug.is_critical() {
            return false;
        }
        true
    }

    /// Keep matching bugs in store order, up to the limit.
    #[must_use]
    pub fn apply(&self, bugs: Vec<Bug>) -> Vec<Bug> {
        let matching = bugs.into_iter().filter(|bug| self.matches(bug));
        if self.limit > 0 {
            matching.take(self.limit).collect()
        } else {
            matching.collect()
        }
    }
}

fn parse_all<T: FromStr<Err = crate::error::ReconError>>(values: &[String]) -> Result<Vec<T>> {
    values.iter().map(|value| value.parse()).collect()
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if filters are invalid or the database cannot be read.
pub fn execute(args: &ListArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let filter = BugFilter::from_args(args)?;
    let storage_ctx = open_workspace(cli)?;
    let bugs = filter.apply(storage_ctx.storage.get_active_bugs()?);
    debug!(count = bugs.len(), "Listing bugs");

    if ctx.is_json() {
        return ctx.print_json(&bugs);
    }

    if bugs.is_empty() {
        ctx.println("No bugs found.");
        return Ok(());
    }

    let options = TextFormatOptions {
        use_color: ctx.use_color(),
        max_width: Some(ctx.width()),
    };
    for bug in &bugs {
        ctx.println(&format_bug_line_with(bug, options));
    }
    Ok(())
}
