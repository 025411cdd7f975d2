//! Timeline event storage for `recon`.
//!
//! Events are append-only: there is no update or delete path. Reads come
//! back newest first (`event_at DESC, id DESC`); callers that want the
//! detail-view order use [`chronological`].

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{ReconError, Result};
use crate::model::{NewTimelineEvent, TimelineEvent};
use crate::storage::sqlite::{SqliteStorage, timestamp_column};
use crate::validation::TimelineEventValidator;

const SELECT_EVENTS: &str = r"
    SELECT id, bug_id, author, comment, attachment_url, event_at, is_nexus_event
    FROM TimelineEvents
    WHERE bug_id = ?1
    ORDER BY event_at DESC, id DESC
";

/// Insert a timeline event and return its id.
///
/// # Errors
///
/// Returns a validation error for an empty author or comment, and
/// [`ReconError::Constraint`] when the parent bug does not exist.
pub fn insert_event(conn: &Connection, event: &NewTimelineEvent) -> Result<i64> {
    TimelineEventValidator::validate(event).map_err(ReconError::from_validation_errors)?;

    let attachment_url = event
        .attachment_url
        .as_deref()
        .filter(|url| !url.trim().is_empty());

    conn.execute(
        "INSERT INTO TimelineEvents (bug_id, author, comment, attachment_url, is_nexus_event)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.bug_id,
            event.author,
            event.comment,
            attachment_url,
            i64::from(event.is_nexus_event),
        ],
    )
    .map_err(ReconError::from_sqlite)?;

    Ok(conn.last_insert_rowid())
}

/// Get events for a bug, newest first.
///
/// `limit` of 0 returns every event.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_events(conn: &Connection, bug_id: i64, limit: usize) -> Result<Vec<TimelineEvent>> {
    let mut stmt = if limit > 0 {
        conn.prepare(&format!("{SELECT_EVENTS} LIMIT ?2"))?
    } else {
        conn.prepare(SELECT_EVENTS)?
    };

    let events = if limit > 0 {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        stmt.query_map(params![bug_id, limit], event_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?
    } else {
        stmt.query_map(params![bug_id], event_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?
    };

    Ok(events)
}

/// Count events attached to a bug.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_events(conn: &Connection, bug_id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM TimelineEvents WHERE bug_id = ?",
        [bug_id],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or(0))
}

/// Reorder a newest-first list into oldest-first.
#[must_use]
pub fn chronological(mut events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    events.reverse();
    events
}

fn event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimelineEvent> {
    Ok(TimelineEvent {
        id: row.get(0)?,
        bug_id: row.get(1)?,
        author: row.get(2)?,
        comment: row.get(3)?,
        attachment_url: row.get(4)?,
        event_at: timestamp_column(row, 5)?,
        is_nexus_event: row.get::<_, i64>(6)? != 0,
    })
}

impl SqliteStorage {
    /// Append a timeline event to a bug.
    ///
    /// # Errors
    ///
    /// See [`insert_event`].
    pub fn add_timeline_event(&mut self, event: &NewTimelineEvent) -> Result<i64> {
        let id = insert_event(&self.conn, event)?;
        info!(id, bug_id = event.bug_id, nexus = event.is_nexus_event, "Timeline event added");
        Ok(id)
    }

    /// All events for a bug, newest first. Unknown bugs yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_timeline_events(&self, bug_id: i64) -> Result<Vec<TimelineEvent>> {
        let events = get_events(&self.conn, bug_id, 0)?;
        debug!(bug_id, count = events.len(), "Loaded timeline");
        Ok(events)
    }

    /// The `limit` most recent events for a bug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_recent_timeline_events(
        &self,
        bug_id: i64,
        limit: usize,
    ) -> Result<Vec<TimelineEvent>> {
        get_events(&self.conn, bug_id, limit)
    }

    /// Number of events attached to a bug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_timeline_events(&self, bug_id: i64) -> Result<usize> {
        count_events(&self.conn, bug_id)
    }
}
