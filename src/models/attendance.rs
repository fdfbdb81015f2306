//! Attendance record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One user's punches for one business date.
///
/// Punches are absolute instants; the business date is the civil date the
/// record belongs to.
///
/// # Example
///
/// ```
/// use attendance_engine::models::AttendanceRecord;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let record = AttendanceRecord {
///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
///     clock_in: Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()),
///     clock_out: None,
/// };
/// assert!(record.has_clock_in());
/// assert!(!record.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The business date of the record.
    pub date: NaiveDate,
    /// Clock-in instant, if the user punched in.
    #[serde(default)]
    pub clock_in: Option<DateTime<Utc>>,
    /// Clock-out instant, if the user punched out.
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Returns true if a clock-in was recorded.
    pub fn has_clock_in(&self) -> bool {
        self.clock_in.is_some()
    }

    /// Returns true if both punches were recorded.
    pub fn is_complete(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_some()
    }
}
