//! Database schema definitions and setup.

use rusqlite::{Connection, Result};

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// The complete SQL schema for the recon database.
pub const SCHEMA_SQL: &str = r"
    -- Bugs
    CREATE TABLE IF NOT EXISTS Bugs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        summary TEXT NOT NULL,
        description TEXT,
        steps_to_reproduce TEXT,
        expected_result TEXT,
        actual_result TEXT,
        severity TEXT NOT NULL CHECK (severity IN ('Blocker', 'Critical', 'Major', 'Minor')),
        priority TEXT NOT NULL CHECK (priority IN ('Critical', 'High', 'Medium', 'Low')),
        status TEXT NOT NULL CHECK (status IN ('Reported', 'In Progress', 'On Hold', 'Resolved', 'Closed')),
        assignee_name TEXT,
        reporter_name TEXT,
        environment TEXT,
        resolution TEXT CHECK (resolution IN ('Fixed', 'Won''t Fix', 'Duplicate', 'Cannot Reproduce', 'Done')),
        requirement_number TEXT,
        test_case_name TEXT,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now', 'localtime')),
        CHECK (length(summary) >= 1)
    );

    CREATE INDEX IF NOT EXISTS idx_bugs_is_archived ON Bugs(is_archived);
    CREATE INDEX IF NOT EXISTS idx_bugs_status ON Bugs(status);

    -- Timeline events
    CREATE TABLE IF NOT EXISTS TimelineEvents (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id INTEGER NOT NULL,
        author TEXT NOT NULL,
        comment TEXT NOT NULL,
        attachment_url TEXT,
        event_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now', 'localtime')),
        is_nexus_event INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (bug_id) REFERENCES Bugs (id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_timeline_events_bug_id ON TimelineEvents(bug_id);
    CREATE INDEX IF NOT EXISTS idx_timeline_events_event_at ON TimelineEvents(event_at);
";

/// Apply the schema to the database.
///
/// Idempotent: every statement uses `IF NOT EXISTS`, so calling this on an
/// already-initialized database leaves existing rows untouched.
///
/// # Errors
///
/// Returns an error if the SQL execution fails or pragmas cannot be set.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    // WAL so readers never see a torn write while another statement commits.
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // Foreign keys are off by default per connection in SQLite.
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(SCHEMA_SQL)?;

    let version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version < CURRENT_SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)?;
    }

    Ok(())
}
