//! Archive command implementation.

use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config;
use crate::error::Result;
use crate::output::OutputContext;
use serde_json::json;

/// Execute the archive command.
///
/// All ids are parsed before anything is archived. Archiving stops at the
/// first unknown id; earlier ids stay archived.
///
/// # Errors
///
/// Returns an error if an id is invalid or a bug does not exist.
pub fn execute(ids: &[String], cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let parsed = ids
        .iter()
        .map(|id| parse_bug_id(id))
        .collect::<Result<Vec<_>>>()?;

    let mut storage_ctx = open_workspace(cli)?;
    let mut archived = Vec::with_capacity(parsed.len());
    for id in parsed {
        storage_ctx.storage.archive_bug(id)?;
        archived.push(format!("BUG-{id:03}"));
    }

    if ctx.is_json() {
        ctx.print_json(&json!({ "archived": archived }))?;
    } else {
        for id in &archived {
            ctx.println(&format!("Archived {id}"));
        }
    }
    Ok(())
}
