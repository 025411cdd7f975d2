//! Update command implementation.

use crate::cli::UpdateArgs;
use crate::cli::commands::{open_workspace, optional_text_update, parse_bug_id};
use crate::config;
use crate::error::Result;
use crate::model::{Priority, Resolution, Severity, Status};
use crate::output::OutputContext;
use crate::storage::BugUpdate;
use std::str::FromStr;
use tracing::info;

/// Translate CLI args into a partial update.
///
/// Optional text fields given as an empty string are cleared; the summary
/// is required and passed through as given so validation can reject an
/// empty one.
///
/// # Errors
///
/// Returns an error for an invalid severity, priority, status or resolution.
pub fn build_update(args: &UpdateArgs) -> Result<BugUpdate> {
    Ok(BugUpdate {
        summary: args.summary.clone(),
        description: optional_text_update(args.description.as_ref()),
        steps_to_reproduce: optional_text_update(args.steps.as_ref()),
        expected_result: optional_text_update(args.expected.as_ref()),
        actual_result: optional_text_update(args.actual.as_ref()),
        severity: args.severity.as_deref().map(Severity::from_str).transpose()?,
        priority: args.priority.as_deref().map(Priority::from_str).transpose()?,
        status: args.status.as_deref().map(Status::from_str).transpose()?,
        assignee_name: optional_text_update(args.assignee.as_ref()),
        reporter_name: optional_text_update(args.reporter.as_ref()),
        environment: optional_text_update(args.environment.as_ref()),
        resolution: args
            .resolution
            .as_deref()
            .map(Resolution::parse_optional)
            .transpose()?,
        requirement_number: optional_text_update(args.requirement.as_ref()),
        test_case_name: optional_text_update(args.test_case.as_ref()),
    })
}

/// Execute the update command.
///
/// # Errors
///
/// Returns an error if the id or a field value is invalid, the bug does not
/// exist, or the update is rejected.
pub fn execute(args: &UpdateArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let id = parse_bug_id(&args.id)?;
    let update = build_update(args)?;
    let mut storage_ctx = open_workspace(cli)?;

    if update.is_empty() {
        info!(id, "No fields to update");
    }
    let bug = storage_ctx.storage.update_bug(id, &update)?;

    if ctx.is_json() {
        ctx.print_json(&bug)?;
    } else if update.is_empty() {
        ctx.println(&format!("No changes for {}", bug.display_id()));
    } else {
        ctx.println(&format!("Updated {}: {}", bug.display_id(), bug.summary));
    }
    Ok(())
}
