//! Storage CRUD tests against real `SQLite` (no mocks).
//!
//! Covers `create_bug`, `get_bug`, `get_active_bugs`, `update_bug` and
//! `archive_bug`, plus reopening a file-backed database.

mod common;

use common::fixtures::{self, BugBuilder};
use common::{test_db, test_db_with_dir};
use recon::ReconError;
use recon::model::{Priority, Resolution, Severity, Status};
use recon::storage::{BugUpdate, SqliteStorage};

// ============================================================================
// CREATE
// ============================================================================

#[test]
fn create_bug_minimal_fields() {
    let mut storage = test_db();
    let id = storage.create_bug(&fixtures::bug("Crash on save")).unwrap();

    let bug = storage.get_bug(id).unwrap().expect("bug exists");
    assert_eq!(bug.summary, "Crash on save");
    assert_eq!(bug.severity, Severity::Major);
    assert_eq!(bug.priority, Priority::Medium);
    assert_eq!(bug.status, Status::Reported);
    assert_eq!(bug.resolution, None);
    assert!(!bug.is_archived);
}

#[test]
fn create_bug_ids_increase() {
    let mut storage = test_db();
    let first = storage.create_bug(&fixtures::bug("one")).unwrap();
    let second = storage.create_bug(&fixtures::bug("two")).unwrap();
    assert!(second > first);
}

#[test]
fn create_bug_all_fields_round_trip() {
    let mut storage = test_db();
    let new_bug = BugBuilder::new("Export truncates")
        .description("Long summaries are cut")
        .severity(Severity::Critical)
        .priority(Priority::High)
        .status(Status::Resolved)
        .assignee("kim")
        .reporter("ana")
        .resolution(Resolution::Fixed)
        .build();

    let id = storage.create_bug(&new_bug).unwrap();
    let bug = storage.get_bug(id).unwrap().unwrap();

    assert_eq!(bug.description.as_deref(), Some("Long summaries are cut"));
    assert_eq!(bug.severity, Severity::Critical);
    assert_eq!(bug.priority, Priority::High);
    assert_eq!(bug.status, Status::Resolved);
    assert_eq!(bug.assignee_name.as_deref(), Some("kim"));
    assert_eq!(bug.reporter_name.as_deref(), Some("ana"));
    assert_eq!(bug.resolution, Some(Resolution::Fixed));
}

#[test]
fn create_bug_rejects_blank_summary() {
    let mut storage = test_db();
    let err = storage.create_bug(&fixtures::bug("   ")).unwrap_err();
    assert!(matches!(err, ReconError::Validation { ref field, .. } if field == "summary"));
    assert_eq!(storage.count_active_bugs().unwrap(), 0);
}

#[test]
fn create_bug_stores_empty_optional_text_as_none() {
    let mut storage = test_db();
    let new_bug = BugBuilder::new("Blank env").assignee("").build();
    let id = storage.create_bug(&new_bug).unwrap();
    let bug = storage.get_bug(id).unwrap().unwrap();
    assert_eq!(bug.assignee_name, None);
    assert!(bug.is_unassigned());
}

// ============================================================================
// READ
// ============================================================================

#[test]
fn get_bug_missing_is_none() {
    let storage = test_db();
    assert!(storage.get_bug(99).unwrap().is_none());
    assert!(!storage.bug_exists(99).unwrap());
}

#[test]
fn active_bugs_are_newest_first_and_skip_archived() {
    let mut storage = test_db();
    let a = storage.create_bug(&fixtures::bug("a")).unwrap();
    let b = storage.create_bug(&fixtures::bug("b")).unwrap();
    let c = storage.create_bug(&fixtures::bug("c")).unwrap();
    storage.archive_bug(b).unwrap();

    let ids: Vec<i64> = storage
        .get_active_bugs()
        .unwrap()
        .iter()
        .map(|bug| bug.id)
        .collect();
    assert_eq!(ids, vec![c, a]);
    assert_eq!(storage.count_active_bugs().unwrap(), 2);
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn update_bug_changes_only_given_fields() {
    let mut storage = test_db();
    let id = storage
        .create_bug(&BugBuilder::new("Crash").assignee("kim").build())
        .unwrap();

    let updated = storage
        .update_bug(
            id,
            &BugUpdate {
                status: Some(Status::InProgress),
                priority: Some(Priority::Critical),
                ..BugUpdate::default()
            },
        )
        .unwrap();

    assert_eq!(updated.status, Status::InProgress);
    assert_eq!(updated.priority, Priority::Critical);
    assert_eq!(updated.summary, "Crash");
    assert_eq!(updated.assignee_name.as_deref(), Some("kim"));
}

#[test]
fn update_bug_clears_optional_fields() {
    let mut storage = test_db();
    let id = storage
        .create_bug(
            &BugBuilder::new("Crash")
                .assignee("kim")
                .resolution(Resolution::Duplicate)
                .build(),
        )
        .unwrap();

    let updated = storage
        .update_bug(
            id,
            &BugUpdate {
                assignee_name: Some(None),
                resolution: Some(None),
                ..BugUpdate::default()
            },
        )
        .unwrap();
    assert_eq!(updated.assignee_name, None);
    assert_eq!(updated.resolution, None);
}

#[test]
fn update_bug_missing_id() {
    let mut storage = test_db();
    let err = storage
        .update_bug(
            5,
            &BugUpdate {
                summary: Some("x".to_string()),
                ..BugUpdate::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ReconError::BugNotFound { id: 5 }));
}

#[test]
fn update_bug_rejects_empty_summary_and_keeps_row() {
    let mut storage = test_db();
    let id = storage.create_bug(&fixtures::bug("Keep me")).unwrap();
    let result = storage.update_bug(
        id,
        &BugUpdate {
            summary: Some(String::new()),
            status: Some(Status::Closed),
            ..BugUpdate::default()
        },
    );
    assert!(result.is_err());

    let bug = storage.get_bug(id).unwrap().unwrap();
    assert_eq!(bug.summary, "Keep me");
    assert_eq!(bug.status, Status::Reported);
}

#[test]
fn update_bug_empty_update_returns_current_row() {
    let mut storage = test_db();
    let id = storage.create_bug(&fixtures::bug("Same")).unwrap();
    let before = storage.get_bug(id).unwrap().unwrap();
    let after = storage.update_bug(id, &BugUpdate::default()).unwrap();
    assert_eq!(before, after);
}

// ============================================================================
// ARCHIVE
// ============================================================================

#[test]
fn archive_bug_keeps_row_readable() {
    let mut storage = test_db();
    let id = storage.create_bug(&fixtures::bug("Old")).unwrap();
    storage.archive_bug(id).unwrap();

    let bug = storage.get_bug(id).unwrap().unwrap();
    assert!(bug.is_archived);
    assert!(storage.get_active_bugs().unwrap().is_empty());
}

#[test]
fn archive_bug_twice_is_ok() {
    let mut storage = test_db();
    let id = storage.create_bug(&fixtures::bug("Old")).unwrap();
    storage.archive_bug(id).unwrap();
    storage.archive_bug(id).unwrap();
    assert_eq!(storage.count_active_bugs().unwrap(), 0);
}

#[test]
fn archive_bug_missing_id() {
    let mut storage = test_db();
    assert!(matches!(
        storage.archive_bug(12),
        Err(ReconError::BugNotFound { id: 12 })
    ));
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn file_database_survives_reopen() {
    let (mut storage, dir) = test_db_with_dir();
    let id = storage.create_bug(&fixtures::bug("Persisted")).unwrap();
    drop(storage);

    let reopened = SqliteStorage::open(&dir.path().join(".recon").join("recon.db")).unwrap();
    let bug = reopened.get_bug(id).unwrap().unwrap();
    assert_eq!(bug.summary, "Persisted");
}
