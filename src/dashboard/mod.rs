//! Dashboard aggregation over the active bug set.
//!
//! Counters are recomputed from scratch on every call; nothing is cached.

use crate::model::{Bug, Status};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

/// Summary counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Active bugs considered.
    pub total: usize,
    pub reported: usize,
    pub in_progress: usize,
    pub resolved: usize,
    /// Priority Critical, or severity Blocker/Critical. Counted once per bug.
    pub critical_bugs: usize,
    /// Created on the reference date.
    pub new_today: usize,
    /// No assignee, or a whitespace-only one.
    pub unassigned: usize,
    /// Due within the look-ahead window. Needs a [`DueDateSource`].
    pub due_soon: usize,
    /// Past due and not yet resolved or closed. Needs a [`DueDateSource`].
    pub overdue: usize,
}

/// Supplies due dates for bugs; the bug record itself carries none.
pub trait DueDateSource {
    fn due_at(&self, bug: &Bug) -> Option<NaiveDateTime>;
}

impl DueDateSource for HashMap<i64, NaiveDateTime> {
    fn due_at(&self, bug: &Bug) -> Option<NaiveDateTime> {
        self.get(&bug.id).copied()
    }
}

/// No due dates at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDueDates;

impl DueDateSource for NoDueDates {
    fn due_at(&self, _bug: &Bug) -> Option<NaiveDateTime> {
        None
    }
}

impl DashboardStats {
    /// Fold the active bugs into counters. Due-date counters stay at zero.
    #[must_use]
    pub fn compute(bugs: &[Bug], today: NaiveDate) -> Self {
        let mut stats = Self {
            total: bugs.len(),
            ..Self::default()
        };

        for bug in bugs {
            match bug.status {
                Status::Reported => stats.reported += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::Resolved => stats.resolved += 1,
                Status::OnHold | Status::Closed => {}
            }
            if bug.is_critical() {
                stats.critical_bugs += 1;
            }
            if bug.is_unassigned() {
                stats.unassigned += 1;
            }
            if bug.created_at.date() == today {
                stats.new_today += 1;
            }
        }

        stats
    }

    /// Like [`DashboardStats::compute`], plus `overdue` and `due_soon` from
    /// an external due-date provider.
    ///
    /// Resolved and closed bugs are never overdue or due soon. A bug due
    /// exactly at `now` counts as due soon.
    #[must_use]
    pub fn compute_with_due_dates(
        bugs: &[Bug],
        now: NaiveDateTime,
        source: &dyn DueDateSource,
        due_soon_window: Duration,
    ) -> Self {
        let mut stats = Self::compute(bugs, now.date());
        let horizon = now
            .checked_add_signed(due_soon_window)
            .unwrap_or(NaiveDateTime::MAX);

        for bug in bugs.iter().filter(|bug| !bug.status.is_done()) {
            let Some(due) = source.due_at(bug) else {
                continue;
            };
            if due < now {
                stats.overdue += 1;
            } else if due <= horizon {
                stats.due_soon += 1;
            }
        }

        stats
    }
}
