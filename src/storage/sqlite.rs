//! `SQLite` storage implementation: the storage context and bug operations.

use crate::dashboard::DashboardStats;
use crate::error::{ReconError, Result};
use crate::model::{Bug, NewBug, Priority, Resolution, Severity, Status};
use crate::storage::schema::apply_schema;
use crate::util::time::{local_today, parse_local_timestamp};
use crate::validation::BugValidator;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const BUG_COLUMNS: &str = "id, summary, description, steps_to_reproduce, expected_result, \
     actual_result, severity, priority, status, assignee_name, reporter_name, environment, \
     resolution, requirement_number, test_case_name, is_archived, created_at";

/// SQLite-based storage backend.
///
/// Owns the single database connection for the process; repositories are
/// the methods on this type.
#[derive(Debug)]
pub struct SqliteStorage {
    pub(crate) conn: Connection,
}

impl SqliteStorage {
    /// Open a new connection to the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a new connection with an optional busy timeout (ms).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema application fails.
    pub fn open_with_timeout(path: &Path, lock_timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;
        if let Some(timeout) = lock_timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        }
        let storage = Self { conn };
        storage.initialize()?;
        debug!(path = %path.display(), "Opened bug database");
        Ok(storage)
    }

    /// Open an in-memory database for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Ensure tables, constraints and pragmas exist. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns an error if schema setup fails.
    pub fn initialize(&self) -> Result<()> {
        apply_schema(&self.conn).map_err(|e| {
            tracing::error!(error = %e, "Schema setup failed");
            ReconError::from_sqlite(e)
        })
    }

    /// Create a new bug and return its store-assigned id.
    ///
    /// Empty optional text fields are stored as NULL.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty summary, or a constraint
    /// error if the database rejects the row.
    pub fn create_bug(&mut self, bug: &NewBug) -> Result<i64> {
        BugValidator::validate_new(bug).map_err(ReconError::from_validation_errors)?;

        self.conn
            .execute(
                "INSERT INTO Bugs (
                    summary, description, steps_to_reproduce, expected_result, actual_result,
                    severity, priority, status, assignee_name, reporter_name, environment,
                    resolution, requirement_number, test_case_name
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                rusqlite::params![
                    bug.summary,
                    non_empty(bug.description.as_deref()),
                    non_empty(bug.steps_to_reproduce.as_deref()),
                    non_empty(bug.expected_result.as_deref()),
                    non_empty(bug.actual_result.as_deref()),
                    bug.severity.as_str(),
                    bug.priority.as_str(),
                    bug.status.as_str(),
                    non_empty(bug.assignee_name.as_deref()),
                    non_empty(bug.reporter_name.as_deref()),
                    non_empty(bug.environment.as_deref()),
                    bug.resolution.map(|r| r.as_str()),
                    non_empty(bug.requirement_number.as_deref()),
                    non_empty(bug.test_case_name.as_deref()),
                ],
            )
            .map_err(ReconError::from_sqlite)?;

        let id = self.conn.last_insert_rowid();
        info!(id, summary = %bug.summary, "Bug created");
        Ok(id)
    }

    /// Get a bug by ID, archived or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_bug(&self, id: i64) -> Result<Option<Bug>> {
        let sql = format!("SELECT {BUG_COLUMNS} FROM Bugs WHERE id = ?");
        let bug = self
            .conn
            .query_row(&sql, [id], bug_from_row)
            .optional()?;
        Ok(bug)
    }

    /// All non-archived bugs, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_active_bugs(&self) -> Result<Vec<Bug>> {
        let sql = format!("SELECT {BUG_COLUMNS} FROM Bugs WHERE is_archived = 0 ORDER BY id DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let bugs = stmt
            .query_map([], bug_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        debug!(count = bugs.len(), "Loaded active bugs");
        Ok(bugs)
    }

    /// Check whether a bug with this id exists (archived or not).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn bug_exists(&self, id: i64) -> Result<bool> {
        let exists = self
            .conn
            .prepare("SELECT 1 FROM Bugs WHERE id = ?")?
            .exists([id])?;
        Ok(exists)
    }

    /// Count non-archived bugs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn count_active_bugs(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT count(*) FROM Bugs WHERE is_archived = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Apply a partial update and return the updated bug.
    ///
    /// Only fields set in `updates` are written; the whole update is one
    /// statement, so it applies completely or not at all.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` for an unknown id, a validation error if the
    /// summary would become empty, or a constraint error from the database.
    pub fn update_bug(&mut self, id: i64, updates: &BugUpdate) -> Result<Bug> {
        if !self.bug_exists(id)? {
            return Err(ReconError::BugNotFound { id });
        }

        if let Some(summary) = &updates.summary {
            if summary.trim().is_empty() {
                return Err(ReconError::validation("summary", "cannot be empty"));
            }
        }

        if !updates.is_empty() {
            let mut set_clauses: Vec<&str> = vec![];
            let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

            let mut add_update = |clause: &'static str, val: Box<dyn rusqlite::ToSql>| {
                set_clauses.push(clause);
                params.push(val);
            };

            if let Some(ref summary) = updates.summary {
                add_update("summary = ?", Box::new(summary.clone()));
            }
            if let Some(severity) = updates.severity {
                add_update("severity = ?", Box::new(severity.as_str()));
            }
            if let Some(priority) = updates.priority {
                add_update("priority = ?", Box::new(priority.as_str()));
            }
            if let Some(status) = updates.status {
                add_update("status = ?", Box::new(status.as_str()));
            }
            if let Some(resolution) = updates.resolution {
                add_update("resolution = ?", Box::new(resolution.map(|r| r.as_str())));
            }

            let text_fields = [
                ("description = ?", &updates.description),
                ("steps_to_reproduce = ?", &updates.steps_to_reproduce),
                ("expected_result = ?", &updates.expected_result),
                ("actual_result = ?", &updates.actual_result),
                ("assignee_name = ?", &updates.assignee_name),
                ("reporter_name = ?", &updates.reporter_name),
                ("environment = ?", &updates.environment),
                ("requirement_number = ?", &updates.requirement_number),
                ("test_case_name = ?", &updates.test_case_name),
            ];
            for (clause, value) in text_fields {
                if let Some(value) = value {
                    let stored = non_empty(value.as_deref()).map(str::to_string);
                    add_update(clause, Box::new(stored));
                }
            }

            let sql = format!("UPDATE Bugs SET {} WHERE id = ?", set_clauses.join(", "));
            params.push(Box::new(id));

            let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
            self.conn
                .execute(&sql, params_refs.as_slice())
                .map_err(ReconError::from_sqlite)?;

            info!(id, fields = set_clauses.len(), "Bug updated");
        }

        self.get_bug(id)?.ok_or(ReconError::BugNotFound { id })
    }

    /// Soft-delete a bug. Archiving an archived bug succeeds and changes nothing.
    ///
    /// Timeline events are kept.
    ///
    /// # Errors
    ///
    /// Returns `BugNotFound` for an unknown id.
    pub fn archive_bug(&mut self, id: i64) -> Result<()> {
        let changed = self
            .conn
            .execute("UPDATE Bugs SET is_archived = 1 WHERE id = ?", [id])?;
        if changed == 0 {
            return Err(ReconError::BugNotFound { id });
        }
        info!(id, "Bug archived");
        Ok(())
    }

    /// Dashboard counters over the current active bug set.
    ///
    /// # Errors
    ///
    /// Returns an error if the active bugs cannot be loaded.
    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        let bugs = self.get_active_bugs()?;
        Ok(DashboardStats::compute(&bugs, local_today()))
    }
}

/// Fields to update on a bug.
///
/// Required fields use `Option<T>` (`None` = untouched). Optional fields use
/// `Option<Option<T>>`: `None` = untouched, `Some(None)` = clear,
/// `Some(Some(v))` = set. An empty string set on a text field is stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugUpdate {
    pub summary: Option<String>,
    pub description: Option<Option<String>>,
    pub steps_to_reproduce: Option<Option<String>>,
    pub expected_result: Option<Option<String>>,
    pub actual_result: Option<Option<String>>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assignee_name: Option<Option<String>>,
    pub reporter_name: Option<Option<String>>,
    pub environment: Option<Option<String>>,
    pub resolution: Option<Option<Resolution>>,
    pub requirement_number: Option<Option<String>>,
    pub test_case_name: Option<Option<String>>,
}

impl BugUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.description.is_none()
            && self.steps_to_reproduce.is_none()
            && self.expected_result.is_none()
            && self.actual_result.is_none()
            && self.severity.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee_name.is_none()
            && self.reporter_name.is_none()
            && self.environment.is_none()
            && self.resolution.is_none()
            && self.requirement_number.is_none()
            && self.test_case_name.is_none()
    }

    /// Set the resolution from a form selection, where `""` clears it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResolution` for a non-empty unknown value.
    pub fn with_resolution_selection(mut self, selection: &str) -> Result<Self> {
        self.resolution = Some(Resolution::parse_optional(selection)?);
        Ok(self)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = ReconError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_local_timestamp(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn bug_from_row(row: &Row<'_>) -> rusqlite::Result<Bug> {
    let resolution = match row.get::<_, Option<String>>(12)? {
        Some(raw) => Some(raw.parse::<Resolution>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(12, Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Bug {
        id: row.get(0)?,
        summary: row.get(1)?,
        description: row.get(2)?,
        steps_to_reproduce: row.get(3)?,
        expected_result: row.get(4)?,
        actual_result: row.get(5)?,
        severity: parse_column(row, 6)?,
        priority: parse_column(row, 7)?,
        status: parse_column(row, 8)?,
        assignee_name: row.get(9)?,
        reporter_name: row.get(10)?,
        environment: row.get(11)?,
        resolution,
        requirement_number: row.get(13)?,
        test_case_name: row.get(14)?,
        is_archived: row.get::<_, i64>(15)? != 0,
        created_at: timestamp_column(row, 16)?,
    })
}
