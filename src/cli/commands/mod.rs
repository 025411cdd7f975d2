//! Command implementations.
//!
//! Each command exposes `execute`, taking its parsed args, the CLI config
//! overrides and the output context.

pub mod archive;
pub mod completions;
pub mod create;
pub mod event;
pub mod export;
pub mod init;
pub mod list;
pub mod show;
pub mod stats;
pub mod timeline;
pub mod update;
pub mod version;

use crate::config::{self, CliOverrides, StorageContext};
use crate::error::{ReconError, Result};

/// Parse a bug reference: `7`, `007`, `BUG-007` or `bug-7`.
///
/// # Errors
///
/// Returns a validation error if no positive id can be read.
pub fn parse_bug_id(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let digits = trimmed
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("bug-"))
        .map_or(trimmed, |_| &trimmed[4..]);

    match digits.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ReconError::validation(
            "id",
            format!("'{input}' is not a bug id (expected e.g. 7 or BUG-007)"),
        )),
    }
}

/// Discover the workspace and open its database.
///
/// # Errors
///
/// Returns `NotInitialized` outside a workspace, or any open error.
pub fn open_workspace(cli: &CliOverrides) -> Result<StorageContext> {
    let recon_dir = config::discover_recon_dir_with_cli(cli)?;
    config::open_storage_with_cli(&recon_dir, cli)
}

/// Turn a CLI value for an optional text field into a tri-state update:
/// absent leaves the field alone, empty clears it.
#[must_use]
pub fn optional_text_update(value: Option<&String>) -> Option<Option<String>> {
    value.map(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(v.clone())
        }
    })
}
