//! Output formatting for `recon`.
//!
//! Human-readable text for the terminal and the CSV bug report export.
//! JSON output goes straight through `serde_json` on the model types.
//!
//! # CSV Output
//!
//! The [`csv`] module renders a single bug with its timeline:
//! - A details section of `Label,Value` rows
//! - A timeline table, or a placeholder line when there are no events
//! - Proper escaping of commas, quotes, and newlines

pub mod csv;
mod text;

pub use text::{
    TextFormatOptions, format_bug_details, format_bug_line, format_bug_line_with,
    format_dashboard, format_priority_badge, format_severity_badge, format_status_icon,
    format_status_label, format_timeline_event, terminal_width, truncate_title,
};
