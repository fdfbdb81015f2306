//! Project allocation models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open activity window `[starts_at, ends_at)` over instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    /// When the allocation starts counting.
    pub starts_at: DateTime<Utc>,
    /// When it stops counting; `None` is open-ended.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl ActiveWindow {
    /// An open-ended window starting at `starts_at`.
    pub fn open(starts_at: DateTime<Utc>) -> Self {
        Self {
            starts_at,
            ends_at: None,
        }
    }

    /// Returns true if `now` falls inside the window.
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        now >= self.starts_at && self.ends_at.is_none_or(|end| now < end)
    }

    /// Returns true if the window has ended by `now`.
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.is_some_and(|end| now >= end)
    }
}

/// A user's committed share of capacity toward one project.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{ActiveWindow, AllocationRecord};
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
/// let record = AllocationRecord {
///     user_id: "u1".to_string(),
///     project_id: "apollo".to_string(),
///     allocation_fraction: 0.5,
///     active_window: ActiveWindow::open(start),
/// };
/// assert!(record.is_active_at(start));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    /// The allocated user.
    pub user_id: String,
    /// The project the capacity is committed to.
    pub project_id: String,
    /// Share of full-time capacity, in `[0.0, 1.0]`.
    pub allocation_fraction: f64,
    /// When the allocation counts toward the user's total.
    pub active_window: ActiveWindow,
}

impl AllocationRecord {
    /// Returns true if the allocation counts toward the total at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.active_window.contains(now)
    }
}
