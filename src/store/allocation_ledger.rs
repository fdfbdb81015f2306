//! Strongly consistent allocation storage.
//!
//! Every write takes the user's row lock, re-reads the user's allocations,
//! runs the [`AllocationGuard`] and writes before releasing the lock. Two
//! concurrent writes for the same user are therefore serialized and the loser
//! sees the winner's allocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::calculation::{AllocationCheck, AllocationGuard};
use crate::error::{EngineError, EngineResult};
use crate::models::{ActiveWindow, AllocationRecord};

type UserRows = Arc<Mutex<Vec<AllocationRecord>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A write the ledger accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationChange {
    /// The record as stored.
    pub record: AllocationRecord,
    /// The user's total as checked under the same lock as the write.
    pub total_allocation: f64,
}

/// Allocation records keyed by user, with a lock per user.
#[derive(Debug, Default)]
pub struct AllocationLedger {
    guard: AllocationGuard,
    users: Mutex<HashMap<String, UserRows>>,
}

impl AllocationLedger {
    /// Creates an empty ledger that checks writes with `guard`.
    pub fn new(guard: AllocationGuard) -> Self {
        Self {
            guard,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Rows for a user who may write, creating the entry if needed.
    fn rows_for_write(&self, user_id: &str) -> UserRows {
        let mut users = lock(&self.users);
        users.entry(user_id.to_string()).or_default().clone()
    }

    fn existing_rows(&self, user_id: &str) -> Option<UserRows> {
        lock(&self.users).get(user_id).cloned()
    }

    /// Number of users holding an entry, empty or not.
    pub fn user_count(&self) -> usize {
        lock(&self.users).len()
    }

    /// Adds a project membership with the given allocation.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ValidationError`] if the user already has a live
    ///   allocation for the project, or the fraction is out of range.
    /// - [`EngineError::AllocationConflict`] if the allocation does not fit.
    pub fn add_member(
        &self,
        user_id: &str,
        project_id: &str,
        allocation_fraction: f64,
        active_window: ActiveWindow,
        now: DateTime<Utc>,
    ) -> EngineResult<AllocationChange> {
        let rows = self.rows_for_write(user_id);
        let mut rows = lock(&rows);

        rows.retain(|r| !(r.project_id == project_id && r.active_window.has_expired(now)));
        if rows.iter().any(|r| r.project_id == project_id) {
            return Err(EngineError::validation(
                "project_id",
                format!("user '{user_id}' already has an allocation for '{project_id}'"),
            ));
        }

        let check = self
            .guard
            .check(user_id, allocation_fraction, None, &rows, now)?;

        let record = AllocationRecord {
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
            allocation_fraction,
            active_window,
        };
        rows.push(record.clone());
        log_applied("add", &record, &check);
        Ok(AllocationChange {
            record,
            total_allocation: check.would_be_total,
        })
    }

    /// Changes the fraction of an existing membership.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the user has no live allocation for the
    ///   project.
    /// - [`EngineError::AllocationConflict`] if the new fraction does not fit
    ///   next to the user's other allocations.
    pub fn reallocate(
        &self,
        user_id: &str,
        project_id: &str,
        allocation_fraction: f64,
        now: DateTime<Utc>,
    ) -> EngineResult<AllocationChange> {
        let not_found = || EngineError::NotFound {
            entity: "allocation".to_string(),
            id: format!("{user_id}/{project_id}"),
        };
        let rows = self.existing_rows(user_id).ok_or_else(not_found)?;
        let mut rows = lock(&rows);

        let index = rows
            .iter()
            .position(|r| r.project_id == project_id && !r.active_window.has_expired(now))
            .ok_or_else(not_found)?;

        let check = self
            .guard
            .check(user_id, allocation_fraction, Some(project_id), &rows, now)?;

        rows[index].allocation_fraction = allocation_fraction;
        let record = rows[index].clone();
        log_applied("reallocate", &record, &check);
        Ok(AllocationChange {
            record,
            total_allocation: check.would_be_total,
        })
    }

    /// Removes a membership. Returns whether anything was removed.
    ///
    /// Repeating the call is harmless.
    pub fn end_membership(&self, user_id: &str, project_id: &str) -> bool {
        let Some(rows) = self.existing_rows(user_id) else {
            return false;
        };
        let mut rows = lock(&rows);
        let before = rows.len();
        rows.retain(|r| r.project_id != project_id);
        let removed = rows.len() != before;
        if removed {
            info!(user_id = %user_id, project_id = %project_id, "Membership ended");
        }
        removed
    }

    /// Drops every allocation whose window has ended by `now`, then every
    /// user left without rows.
    ///
    /// Returns how many records were removed. Safe to run repeatedly from a
    /// scheduler; a second run with the same `now` removes nothing.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let mut users = lock(&self.users);
        let mut removed = 0;
        users.retain(|_, rows_handle| {
            let mut rows = lock(rows_handle);
            let before = rows.len();
            rows.retain(|r| !r.active_window.has_expired(now));
            removed += before - rows.len();
            // A writer holding its own handle may be about to push.
            !rows.is_empty() || Arc::strong_count(&*rows_handle) > 1
        });
        if removed > 0 {
            info!(removed, %now, "Expired allocations pruned");
        }
        removed
    }

    /// The user's allocations counting toward capacity at `now`.
    pub fn active_allocations(&self, user_id: &str, now: DateTime<Utc>) -> Vec<AllocationRecord> {
        let Some(rows) = self.existing_rows(user_id) else {
            return Vec::new();
        };
        let rows = lock(&rows);
        rows.iter().filter(|r| r.is_active_at(now)).cloned().collect()
    }

    /// Sum of the user's active allocation fractions at `now`.
    pub fn total_allocation(&self, user_id: &str, now: DateTime<Utc>) -> f64 {
        self.active_allocations(user_id, now)
            .iter()
            .map(|r| r.allocation_fraction)
            .sum()
    }
}

fn log_applied(operation: &str, record: &AllocationRecord, check: &AllocationCheck) {
    debug!(
        operation,
        user_id = %record.user_id,
        project_id = %record.project_id,
        allocation_fraction = record.allocation_fraction,
        total = check.would_be_total,
        "Allocation applied"
    );
}
