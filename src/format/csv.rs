//! CSV bug report export for `recon`.
//!
//! A report is a single bug's details followed by its timeline. It is not a
//! flat table: a title block, a `Label,Value` section, then an event table.

use crate::model::{Bug, TimelineEvent};
use crate::util::time::format_display_timestamp;
use chrono::NaiveDate;
use std::io::{self, Write};

/// Header row for the timeline section.
pub const TIMELINE_HEADER: &str = "Event ID,Author,Date,Nexus Event,Comment";

/// Placeholder line when a bug has no events.
pub const NO_EVENTS_LINE: &str = "No timeline events recorded.";

const SUMMARY_STEM_CHARS: usize = 30;

/// Escape a CSV field value.
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
/// Doubles any existing quotes within the value.
#[must_use]
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

fn escape_optional(value: Option<&str>) -> String {
    value.map(escape_field).unwrap_or_default()
}

/// The `Label,Value` rows of the details section, in export order.
#[must_use]
pub fn detail_rows(bug: &Bug) -> Vec<(&'static str, String)> {
    vec![
        ("Bug ID", bug.display_id()),
        ("Summary", escape_field(&bug.summary)),
        ("Description", escape_optional(bug.description.as_deref())),
        ("Status", escape_field(bug.status.as_str())),
        ("Priority", escape_field(bug.priority.as_str())),
        ("Severity", escape_field(bug.severity.as_str())),
        ("Assignee", escape_optional(bug.assignee_name.as_deref())),
        ("Reporter", escape_optional(bug.reporter_name.as_deref())),
        ("Environment", escape_optional(bug.environment.as_deref())),
        (
            "Resolution",
            escape_optional(bug.resolution.map(|r| r.as_str())),
        ),
        (
            "Requirement Number",
            escape_optional(bug.requirement_number.as_deref()),
        ),
        (
            "Test Case Name",
            escape_optional(bug.test_case_name.as_deref()),
        ),
        (
            "Steps to Reproduce",
            escape_optional(bug.steps_to_reproduce.as_deref()),
        ),
        (
            "Expected Result",
            escape_optional(bug.expected_result.as_deref()),
        ),
        (
            "Actual Result",
            escape_optional(bug.actual_result.as_deref()),
        ),
        (
            "Created At",
            escape_field(&format_display_timestamp(&bug.created_at)),
        ),
    ]
}

/// Format one timeline row.
#[must_use]
pub fn format_event_row(event: &TimelineEvent) -> String {
    [
        event.id.to_string(),
        escape_field(&event.author),
        escape_field(&format_display_timestamp(&event.event_at)),
        if event.is_nexus_event { "Yes" } else { "No" }.to_string(),
        escape_field(&event.comment),
    ]
    .join(",")
}

/// Render the full report. Events are written in the order given; callers
/// pass them oldest first.
#[must_use]
pub fn format_bug_report(bug: &Bug, events: &[TimelineEvent], generated_on: NaiveDate) -> String {
    let mut lines: Vec<String> = vec![
        "Recon Bug Report Export".to_string(),
        format!("Generated on: {}", generated_on.format("%-m/%-d/%Y")),
        String::new(),
        "=== BUG DETAILS ===".to_string(),
    ];

    lines.extend(
        detail_rows(bug)
            .into_iter()
            .map(|(label, value)| format!("{label},{value}")),
    );
    lines.push(String::new());

    lines.push("=== TIMELINE EVENTS ===".to_string());
    if events.is_empty() {
        lines.push(NO_EVENTS_LINE.to_string());
    } else {
        lines.push(TIMELINE_HEADER.to_string());
        lines.extend(events.iter().map(format_event_row));
    }

    lines.join("\n")
}

/// Write the report to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_bug_report<W: Write>(
    writer: &mut W,
    bug: &Bug,
    events: &[TimelineEvent],
    generated_on: NaiveDate,
) -> io::Result<()> {
    writer.write_all(format_bug_report(bug, events, generated_on).as_bytes())?;
    writer.flush()
}

/// Suggested file name, e.g. `BUG-007_Crash_on_save_2025-01-05.csv`.
///
/// The summary keeps only ASCII letters, digits and whitespace, is cut to
/// 30 characters, and has each whitespace run replaced by `_`.
#[must_use]
pub fn export_file_name(bug: &Bug, date: NaiveDate) -> String {
    let kept: String = bug
        .summary
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .take(SUMMARY_STEM_CHARS)
        .collect();

    let mut stem = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }

    format!("{}_{stem}_{}.csv", bug.display_id(), date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Resolution, Severity, Status};
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn make_test_bug(id: i64, summary: &str) -> Bug {
        Bug {
            id,
            summary: summary.to_string(),
            description: Some("Tapping save closes the app".to_string()),
            steps_to_reproduce: None,
            expected_result: None,
            actual_result: None,
            severity: Severity::Critical,
            priority: Priority::High,
            status: Status::InProgress,
            assignee_name: Some("kim".to_string()),
            reporter_name: None,
            environment: None,
            resolution: Some(Resolution::WontFix),
            requirement_number: None,
            test_case_name: None,
            is_archived: false,
            created_at: ts("2025-01-05 09:03:00"),
        }
    }

    fn make_event(id: i64, comment: &str, nexus: bool) -> TimelineEvent {
        TimelineEvent {
            id,
            bug_id: 7,
            author: "sam".to_string(),
            comment: comment.to_string(),
            attachment_url: None,
            event_at: ts("2025-01-06 14:30:00"),
            is_nexus_event: nexus,
        }
    }

    fn generated() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    }

    #[test]
    fn test_escape_field_plain() {
        assert_eq!(escape_field("hello"), "hello");
    }

    #[test]
    fn test_escape_field_with_comma() {
        assert_eq!(escape_field("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_escape_field_with_quotes() {
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_escape_field_with_newline() {
        assert_eq!(escape_field("line1\nline2"), "\"line1\nline2\"");
        assert_eq!(escape_field("a\rb"), "\"a\rb\"");
    }

    #[test]
    fn test_report_layout() {
        let bug = make_test_bug(7, "Crash on save");
        let report = format_bug_report(&bug, &[make_event(1, "Seen on iOS", true)], generated());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "Recon Bug Report Export");
        assert_eq!(lines[1], "Generated on: 1/7/2025");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "=== BUG DETAILS ===");
        assert_eq!(lines[4], "Bug ID,BUG-007");
        assert_eq!(lines[5], "Summary,Crash on save");
        assert_eq!(lines[7], "Status,In Progress");
        assert_eq!(lines[10], "Assignee,kim");
        assert_eq!(lines[11], "Reporter,");
        assert_eq!(lines[13], "Resolution,Won't Fix");
        assert_eq!(lines[19], "Created At,\"Jan 5, 2025, 09:03 AM\"");
        assert_eq!(lines[20], "");
        assert_eq!(lines[21], "=== TIMELINE EVENTS ===");
        assert_eq!(lines[22], TIMELINE_HEADER);
        assert_eq!(lines[23], "1,sam,\"Jan 6, 2025, 02:30 PM\",Yes,Seen on iOS");
        assert_eq!(lines.len(), 24);
        assert!(!report.ends_with('\n'));
    }

    #[test]
    fn test_report_without_events() {
        let bug = make_test_bug(12, "Quiet bug");
        let report = format_bug_report(&bug, &[], generated());
        assert!(report.ends_with("=== TIMELINE EVENTS ===\nNo timeline events recorded."));
        assert!(!report.contains(TIMELINE_HEADER));
    }

    #[test]
    fn test_summary_with_comma_is_quoted() {
        let bug = make_test_bug(1, "Crash, then hang");
        let report = format_bug_report(&bug, &[], generated());
        assert!(report.contains("Summary,\"Crash, then hang\""));
    }

    #[test]
    fn test_event_order_is_preserved() {
        let bug = make_test_bug(1, "x");
        let events = vec![make_event(3, "older", false), make_event(9, "newer", false)];
        let report = format_bug_report(&bug, &events, generated());
        let older = report.find("older").unwrap();
        let newer = report.find("newer").unwrap();
        assert!(older < newer);
    }

    #[test]
    fn test_write_bug_report_matches_format() {
        let bug = make_test_bug(2, "x");
        let mut buf = Vec::new();
        write_bug_report(&mut buf, &bug, &[], generated()).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format_bug_report(&bug, &[], generated())
        );
    }

    #[test]
    fn test_export_file_name() {
        let bug = make_test_bug(7, "Crash on save!");
        assert_eq!(
            export_file_name(&bug, generated()),
            "BUG-007_Crash_on_save_2025-01-07.csv"
        );
    }

    #[test]
    fn test_export_file_name_truncates_and_collapses() {
        let bug = make_test_bug(1234, "A  very   long summary: that keeps going and going");
        let name = export_file_name(&bug, generated());
        // 30 kept chars: "A  very   long summary that ke"
        assert_eq!(name, "BUG-1234_A_very_long_summary_that_ke_2025-01-07.csv");
    }
}
