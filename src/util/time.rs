//! Local timestamp parsing and formatting.
//!
//! The store keeps wall-clock local time as `YYYY-MM-DD HH:MM:SS` text with
//! no offset. Everything here works on `NaiveDateTime` for that reason.

use crate::error::{ReconError, Result};
use chrono::{Days, Local, NaiveDate, NaiveDateTime, Timelike};

/// Storage format for timestamps.
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Human format used in exports, e.g. `Jan 5, 2025, 09:03 AM`.
pub const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";

/// Parse a stored timestamp.
///
/// Accepts the storage format, an optional fractional second, a `T`
/// separator, and bare dates (midnight).
///
/// # Errors
///
/// Returns a validation error if no known format matches.
pub fn parse_local_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    for format in [
        STORAGE_FORMAT,
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }

    Err(ReconError::validation(
        "timestamp",
        format!("unrecognized timestamp: {s}"),
    ))
}

/// Format a timestamp the way it is stored.
#[must_use]
pub fn format_storage_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}

/// Format a timestamp for people.
#[must_use]
pub fn format_display_timestamp(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Current local wall-clock time, truncated to whole seconds.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Today's local calendar date.
#[must_use]
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date given on the command line.
///
/// Supports `YYYY-MM-DD`, `today`, `yesterday`, `tomorrow`, and `-Nd`/`+Nd`
/// offsets from `today`.
///
/// # Errors
///
/// Returns a validation error naming `field_name` for anything else.
pub fn parse_flexible_date(s: &str, today: NaiveDate, field_name: &str) -> Result<NaiveDate> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return offset_days(today, -1, field_name),
        "tomorrow" => return offset_days(today, 1, field_name),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    if let Some(amount) = s.strip_suffix('d') {
        if let Ok(days) = amount.parse::<i64>() {
            if amount.starts_with('+') || amount.starts_with('-') {
                return offset_days(today, days, field_name);
            }
        }
    }

    Err(ReconError::validation(
        field_name,
        "invalid date (use YYYY-MM-DD, today, tomorrow, or +Nd/-Nd)",
    ))
}

fn offset_days(today: NaiveDate, days: i64, field_name: &str) -> Result<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        today.checked_add_days(magnitude)
    } else {
        today.checked_sub_days(magnitude)
    };
    shifted.ok_or_else(|| ReconError::validation(field_name, "date out of range"))
}
