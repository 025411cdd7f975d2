//! Export command implementation.

use crate::cli::ExportArgs;
use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config;
use crate::error::{ReconError, Result};
use crate::format::csv::{export_file_name, write_bug_report};
use crate::model::{Bug, TimelineEvent};
use crate::output::OutputContext;
use crate::storage::{SqliteStorage, chronological};
use crate::util::time::local_today;
use chrono::NaiveDate;
use serde_json::json;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the bug does not exist or the report cannot be
/// written.
pub fn execute(args: &ExportArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let id = parse_bug_id(&args.id)?;
    let storage_ctx = open_workspace(cli)?;
    let (bug, events) = load_report(&storage_ctx.storage, id)?;
    let today = local_today();

    if args.stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_bug_report(&mut handle, &bug, &events, today)?;
        return Ok(());
    }

    let path = resolve_output_path(args.output.as_deref(), &bug, today)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    write_bug_report(&mut writer, &bug, &events, today)?;
    info!(id, path = %path.display(), events = events.len(), "Exported bug report");

    if ctx.is_json() {
        ctx.print_json(&json!({
            "id": bug.display_id(),
            "path": path.display().to_string(),
            "events": events.len(),
        }))?;
    } else {
        ctx.println(&format!("Exported {} to {}", bug.display_id(), path.display()));
    }
    Ok(())
}

/// Load a bug (archived included) and its timeline, oldest first.
///
/// # Errors
///
/// Returns `BugNotFound` for an unknown id.
pub fn load_report(storage: &SqliteStorage, id: i64) -> Result<(Bug, Vec<TimelineEvent>)> {
    let bug = storage.get_bug(id)?.ok_or(ReconError::BugNotFound { id })?;
    let events = chronological(storage.get_timeline_events(id)?);
    Ok((bug, events))
}

/// Where to write the report: the generated name in the current directory,
/// the generated name inside a given directory, or a given file path.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_output_path(output: Option<&Path>, bug: &Bug, today: NaiveDate) -> Result<PathBuf> {
    let file_name = export_file_name(bug, today);
    match output {
        Some(path) if path.is_dir() => Ok(path.join(file_name)),
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?.join(file_name)),
    }
}
