//! Stats command implementation.
//!
//! Prints the dashboard counters. Due dates are not part of the bug record,
//! so the due-soon and overdue counters need a `--due-dates` file:
//!
//! ```yaml
//! BUG-007: 2025-06-05
//! 12: 2025-06-03 17:00:00
//! 3: +2d
//! ```

use crate::cli::StatsArgs;
use crate::cli::commands::{open_workspace, parse_bug_id};
use crate::config;
use crate::dashboard::{DashboardStats, DueDateSource, NoDueDates};
use crate::error::{ReconError, Result};
use crate::format::format_dashboard;
use crate::output::OutputContext;
use crate::util::time::{local_now, parse_flexible_date, parse_local_timestamp};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Execute the stats command.
///
/// # Errors
///
/// Returns an error if the database cannot be read, the due-date file is
/// malformed, or the due-soon window is invalid.
pub fn execute(args: &StatsArgs, cli: &config::CliOverrides, ctx: &OutputContext) -> Result<()> {
    let storage_ctx = open_workspace(cli)?;
    let bugs = storage_ctx.storage.get_active_bugs()?;
    let now = local_now();

    let window_days = match args.due_soon_days {
        Some(days) if days < 0 => {
            return Err(ReconError::validation(
                "due-soon-days",
                "must not be negative",
            ));
        }
        Some(days) => days,
        None => config::due_soon_days_from_layer(&storage_ctx.config)?,
    };

    let window = Duration::try_days(window_days)
        .ok_or_else(|| ReconError::validation("due-soon-days", "window is too large"))?;

    let due_dates = match &args.due_dates {
        Some(path) => {
            let due_dates = load_due_dates(path, now.date())?;
            debug!(count = due_dates.len(), "Loaded due dates");
            Some(due_dates)
        }
        None => None,
    };
    let source: &dyn DueDateSource = match &due_dates {
        Some(map) => map,
        None => &NoDueDates,
    };
    let stats = DashboardStats::compute_with_due_dates(&bugs, now, source, window);

    if ctx.is_json() {
        return ctx.print_json(&stats);
    }
    ctx.println(format_dashboard(&stats).trim_end());
    Ok(())
}

/// Read a due-date file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_due_dates(path: &Path, today: NaiveDate) -> Result<HashMap<i64, NaiveDateTime>> {
    let contents = fs::read_to_string(path)?;
    parse_due_dates(&contents, today)
}

/// Parse a YAML mapping of bug id to due date.
///
/// Keys are ids in any form `parse_bug_id` accepts. A value with a time of
/// day is used as is; a bare or relative date means the end of that day.
///
/// # Errors
///
/// Returns an error for a non-mapping document, a bad key, or a bad date.
pub fn parse_due_dates(contents: &str, today: NaiveDate) -> Result<HashMap<i64, NaiveDateTime>> {
    let value: Value = serde_yaml::from_str(contents)?;
    let mapping = match value {
        Value::Null => return Ok(HashMap::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ReconError::Config(
                "due-date file must map bug ids to dates".to_string(),
            ));
        }
    };

    let mut due_dates = HashMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let id = match &key {
            Value::Number(n) => parse_bug_id(&n.to_string())?,
            Value::String(s) => parse_bug_id(s)?,
            other => {
                return Err(ReconError::Config(format!(
                    "invalid bug id in due-date file: {other:?}"
                )));
            }
        };
        let Value::String(raw) = &value else {
            return Err(ReconError::Config(format!(
                "due date for BUG-{id:03} must be a string"
            )));
        };
        due_dates.insert(id, parse_due_value(raw, today)?);
    }
    Ok(due_dates)
}

fn parse_due_value(raw: &str, today: NaiveDate) -> Result<NaiveDateTime> {
    if let Ok(date) = parse_flexible_date(raw, today, "due_date") {
        return Ok(date.and_time(end_of_day()));
    }
    parse_local_timestamp(raw)
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
