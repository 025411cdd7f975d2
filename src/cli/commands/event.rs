//! Event command implementation.

use crate::cli::EventArgs;
use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config::{self, ConfigLayer};
use crate::error::{ReconError, Result};
use crate::model::{NewTimelineEvent, TimelineEvent};
use crate::output::OutputContext;
use crate::storage::SqliteStorage;

/// Execute the event command.
///
/// # Errors
///
/// Returns an error if the id is invalid, the bug does not exist, or the
/// event fails validation.
pub fn execute(args: &EventArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let bug_id = parse_bug_id(&args.id)?;
    let mut storage_ctx = open_workspace(cli)?;
    let event = add_event(&mut storage_ctx.storage, bug_id, args, &storage_ctx.config)?;

    if ctx.is_json() {
        ctx.print_json(&event)?;
    } else {
        let marker = if event.is_nexus_event { " (nexus)" } else { "" };
        ctx.println(&format!(
            "Added event #{} to BUG-{:03}{marker}",
            event.id, event.bug_id
        ));
    }
    Ok(())
}

/// Store an event for `bug_id` and read it back.
///
/// The author falls back to the configured actor.
///
/// # Errors
///
/// Returns `BugNotFound` for an unknown bug, or a validation error.
pub fn add_event(
    storage: &mut SqliteStorage,
    bug_id: i64,
    args: &EventArgs,
    layer: &ConfigLayer,
) -> Result<TimelineEvent> {
    if !storage.bug_exists(bug_id)? {
        return Err(ReconError::BugNotFound { id: bug_id });
    }

    let author = args
        .author
        .clone()
        .unwrap_or_else(|| config::resolve_actor(layer));
    let mut new_event = NewTimelineEvent::new(bug_id, author, args.comment.clone());
    new_event.attachment_url = args.attachment.clone();
    if args.nexus {
        new_event = new_event.nexus();
    }

    let id = storage.add_timeline_event(&new_event)?;
    storage
        .get_recent_timeline_events(bug_id, 0)?
        .into_iter()
        .find(|event| event.id == id)
        .ok_or(ReconError::BugNotFound { id: bug_id })
}
