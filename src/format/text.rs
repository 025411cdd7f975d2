//! Text formatting functions for `recon`.
//!
//! Human-readable terminal output:
//! - Status icons (○ ◐ ⏸ ✓ ✗)
//! - Severity and priority badges
//! - Bug lines, detail blocks, timeline entries and the dashboard

use crate::dashboard::DashboardStats;
use crate::model::{Bug, Priority, Severity, Status, TimelineEvent};
use crate::util::time::format_display_timestamp;
use crossterm::style::Stylize;
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Status icon characters.
pub mod icons {
    /// Reported, nobody on it yet.
    pub const REPORTED: &str = "○";
    pub const IN_PROGRESS: &str = "◐";
    pub const ON_HOLD: &str = "⏸";
    pub const RESOLVED: &str = "✓";
    pub const CLOSED: &str = "✗";
    /// Marks nexus events in a timeline.
    pub const NEXUS: &str = "★";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::Reported => icons::REPORTED,
        Status::InProgress => icons::IN_PROGRESS,
        Status::OnHold => icons::ON_HOLD,
        Status::Resolved => icons::RESOLVED,
        Status::Closed => icons::CLOSED,
    }
}

/// Format status label with optional color.
#[must_use]
pub fn format_status_label(status: Status, use_color: bool) -> String {
    let label = status.as_str();
    if !use_color {
        return label.to_string();
    }

    match status {
        Status::Reported => label.red().to_string(),
        Status::InProgress => label.yellow().to_string(),
        Status::OnHold => label.blue().to_string(),
        Status::Resolved => label.green().to_string(),
        Status::Closed => label.dark_grey().to_string(),
    }
}

/// Format severity as a bracketed badge with optional color.
#[must_use]
pub fn format_severity_badge(severity: Severity, use_color: bool) -> String {
    let label = severity.as_str();
    if !use_color {
        return format!("[{label}]");
    }

    let colored = match severity {
        Severity::Blocker => label.red().bold().to_string(),
        Severity::Critical => label.red().to_string(),
        Severity::Major => label.yellow().to_string(),
        Severity::Minor => label.dark_grey().to_string(),
    };
    format!("[{colored}]")
}

/// Format priority as a bracketed badge with optional color.
#[must_use]
pub fn format_priority_badge(priority: Priority, use_color: bool) -> String {
    let label = priority.as_str();
    if !use_color {
        return format!("[{label}]");
    }

    let colored = match priority {
        Priority::Critical => label.magenta().bold().to_string(),
        Priority::High => label.magenta().to_string(),
        Priority::Medium => label.cyan().to_string(),
        Priority::Low => label.dark_grey().to_string(),
    };
    format!("[{colored}]")
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }
    crossterm::terminal::size().map_or(80, |(cols, _)| usize::from(cols).max(20))
}

/// Truncate a summary to fit within `max_len` visible columns.
///
/// Wide characters (emoji, CJK) count by display width.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }

    let (budget, suffix) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };

    let mut width = 0;
    let mut out = String::new();
    for c in title.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + cw > budget {
            break;
        }
        width += cw;
        out.push(c);
    }
    out.push_str(suffix);
    out
}

/// Single-line bug summary.
///
/// Format: `{icon} {BUG-id} [{severity}] [{priority}] {summary}`
#[must_use]
pub fn format_bug_line_with(bug: &Bug, options: TextFormatOptions) -> String {
    let id = bug.display_id();
    let severity_plain = format_severity_badge(bug.severity, false);
    let priority_plain = format_priority_badge(bug.priority, false);

    let prefix_len = UnicodeWidthStr::width(format_status_icon(bug.status))
        + 1
        + id.len()
        + 1
        + severity_plain.len()
        + 1
        + priority_plain.len()
        + 1;

    let summary = options.max_width.map_or_else(
        || bug.summary.clone(),
        |width| truncate_title(&bug.summary, width.saturating_sub(prefix_len)),
    );

    format!(
        "{} {id} {} {} {summary}",
        format_status_icon(bug.status),
        format_severity_badge(bug.severity, options.use_color),
        format_priority_badge(bug.priority, options.use_color),
    )
}

#[must_use]
pub fn format_bug_line(bug: &Bug) -> String {
    format_bug_line_with(bug, TextFormatOptions::plain())
}

/// Multi-line detail block for `show`.
#[must_use]
pub fn format_bug_details(bug: &Bug, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", bug.display_id(), bug.summary);
    let _ = writeln!(
        out,
        "Status: {}  Severity: {}  Priority: {}",
        format_status_label(bug.status, use_color),
        bug.severity,
        bug.priority
    );
    if bug.is_archived {
        let _ = writeln!(out, "Archived: yes");
    }

    let optional = [
        ("Resolution", bug.resolution.map(|r| r.as_str().to_string())),
        ("Assignee", bug.assignee_name.clone()),
        ("Reporter", bug.reporter_name.clone()),
        ("Environment", bug.environment.clone()),
        ("Requirement", bug.requirement_number.clone()),
        ("Test case", bug.test_case_name.clone()),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(out, "{label}: {value}");
        }
    }
    let _ = writeln!(out, "Created: {}", format_display_timestamp(&bug.created_at));

    let sections = [
        ("Description", bug.description.as_deref()),
        ("Steps to reproduce", bug.steps_to_reproduce.as_deref()),
        ("Expected", bug.expected_result.as_deref()),
        ("Actual", bug.actual_result.as_deref()),
    ];
    for (heading, body) in sections {
        if let Some(body) = body {
            let _ = write!(out, "\n{heading}:\n{body}\n");
        }
    }

    out
}

/// One timeline entry, e.g. `★ Jan 5, 2025, 09:03 AM  sam: Reproduced`.
#[must_use]
pub fn format_timeline_event(event: &TimelineEvent) -> String {
    let marker = if event.is_nexus_event { icons::NEXUS } else { "•" };
    let mut line = format!(
        "{marker} {}  {}: {}",
        format_display_timestamp(&event.event_at),
        event.author,
        event.comment
    );
    if let Some(url) = &event.attachment_url {
        let _ = write!(line, " <{url}>");
    }
    line
}

/// Dashboard block for `stats`.
#[must_use]
pub fn format_dashboard(stats: &DashboardStats) -> String {
    let rows = [
        ("Active", stats.total),
        ("Reported", stats.reported),
        ("In progress", stats.in_progress),
        ("Resolved", stats.resolved),
        ("Critical", stats.critical_bugs),
        ("New today", stats.new_today),
        ("Unassigned", stats.unassigned),
        ("Due soon", stats.due_soon),
        ("Overdue", stats.overdue),
    ];

    let mut out = String::new();
    for (label, count) in rows {
        let _ = writeln!(out, "{label:<12} {count:>5}");
    }
    out
}
