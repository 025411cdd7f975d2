//! Timeline command implementation.

use crate::cli::TimelineArgs;
use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config;
use crate::error::{ReconError, Result};
use crate::format::format_timeline_event;
use crate::model::TimelineEvent;
use crate::output::OutputContext;
use crate::storage::{SqliteStorage, chronological};

/// Load events for a bug: the `limit` newest (0 = all), newest first unless
/// `oldest_first` is set.
///
/// # Errors
///
/// Returns `BugNotFound` for an unknown bug.
pub fn load_timeline(
    storage: &SqliteStorage,
    bug_id: i64,
    limit: usize,
    oldest_first: bool,
) -> Result<Vec<TimelineEvent>> {
    if !storage.bug_exists(bug_id)? {
        return Err(ReconError::BugNotFound { id: bug_id });
    }
    let events = storage.get_recent_timeline_events(bug_id, limit)?;
    Ok(if oldest_first {
        chronological(events)
    } else {
        events
    })
}

/// Execute the timeline command.
///
/// # Errors
///
/// Returns an error if the id is invalid or the bug does not exist.
pub fn execute(args: &TimelineArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let bug_id = parse_bug_id(&args.id)?;
    let storage_ctx = open_workspace(cli)?;
    let events = load_timeline(&storage_ctx.storage, bug_id, args.limit, args.chronological)?;

    if ctx.is_json() {
        return ctx.print_json(&events);
    }
    if events.is_empty() {
        ctx.println(&format!("No timeline events for BUG-{bug_id:03}."));
        return Ok(());
    }
    for event in &events {
        ctx.println(&format_timeline_event(event));
    }
    Ok(())
}
