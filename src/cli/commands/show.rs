//! Show command implementation.

use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config;
use crate::error::{ReconError, Result};
use crate::format::{format_bug_details, format_timeline_event};
use crate::model::{Bug, TimelineEvent};
use crate::output::OutputContext;
use crate::storage::{SqliteStorage, chronological};
use serde::Serialize;

/// A bug with its timeline, oldest event first.
#[derive(Debug, Serialize)]
pub struct BugDetails {
    #[serde(flatten)]
    pub bug: Bug,
    pub timeline: Vec<TimelineEvent>,
}

/// Load a bug and its timeline. Archived bugs are still shown.
///
/// # Errors
///
/// Returns `BugNotFound` for an unknown id.
pub fn load_details(storage: &SqliteStorage, id: i64) -> Result<BugDetails> {
    let bug = storage.get_bug(id)?.ok_or(ReconError::BugNotFound { id })?;
    let timeline = chronological(storage.get_timeline_events(id)?);
    Ok(BugDetails { bug, timeline })
}

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the id is invalid, the bug does not exist, or the
/// database cannot be read.
pub fn execute(
    id: &str,
    with_timeline: bool,
    cli: &config::CliOverrides,
    ctx: &OutputContext,
) -> Result<()> {
    let id = parse_bug_id(id)?;
    let storage_ctx = open_workspace(cli)?;
    let details = load_details(&storage_ctx.storage, id)?;

    if ctx.is_json() {
        return ctx.print_json(&details);
    }

    let mut output = format_bug_details(&details.bug, ctx.use_color());
    if with_timeline {
        output.push_str("\nTimeline:\n");
        if details.timeline.is_empty() {
            output.push_str("  (no events)\n");
        }
        for event in &details.timeline {
            output.push_str("  ");
            output.push_str(&format_timeline_event(event));
            output.push('\n');
        }
    }
    ctx.println(output.trim_end());
    Ok(())
}
