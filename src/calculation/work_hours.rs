//! Worked, ordinary and overtime hours for a single attendance record.
//!
//! Hours are computed from whole minutes and kept as exact decimals, rounded
//! to two places only once at the end.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, EffectiveSchedule};

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Hours worked on one record, split at the schedule's overtime threshold.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::WorkHours;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let hours = WorkHours {
///     worked_hours: Decimal::from_str("9.5").unwrap(),
///     ordinary_hours: Decimal::from_str("8").unwrap(),
///     overtime_hours: Decimal::from_str("1.5").unwrap(),
/// };
/// assert_eq!(hours.ordinary_hours + hours.overtime_hours, hours.worked_hours);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    /// Time between the punches less the unpaid break.
    pub worked_hours: Decimal,
    /// Worked hours up to the overtime threshold.
    pub ordinary_hours: Decimal,
    /// Worked hours above the overtime threshold.
    pub overtime_hours: Decimal,
}

/// Computes work hours for `record` under `schedule`.
///
/// Returns `None` when either punch is missing or the clock-out precedes the
/// clock-in. A break longer than the time on site yields zero worked hours.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::calculate_work_hours;
/// use attendance_engine::models::{AttendanceRecord, EffectiveSchedule};
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let record = AttendanceRecord {
///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
///     clock_in: Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()),
///     clock_out: Some(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()),
/// };
/// // Ten hours on site less a 60 minute break.
/// let hours = calculate_work_hours(&record, &EffectiveSchedule::company_default()).unwrap();
/// assert_eq!(hours.worked_hours, Decimal::new(9, 0));
/// assert_eq!(hours.overtime_hours, Decimal::new(1, 0));
/// ```
pub fn calculate_work_hours(
    record: &AttendanceRecord,
    schedule: &EffectiveSchedule,
) -> Option<WorkHours> {
    let (clock_in, clock_out) = (record.clock_in?, record.clock_out?);
    if clock_out < clock_in {
        return None;
    }

    let on_site_minutes = (clock_out - clock_in).num_minutes();
    let worked_minutes = (on_site_minutes - i64::from(schedule.break_minutes)).max(0);
    let worked_hours = Decimal::from(worked_minutes) / MINUTES_PER_HOUR;

    let threshold = schedule.overtime_threshold_hours.max(Decimal::ZERO);
    let overtime_hours = (worked_hours - threshold).max(Decimal::ZERO);
    let ordinary_hours = worked_hours - overtime_hours;

    Some(WorkHours {
        worked_hours: worked_hours.round_dp(2),
        ordinary_hours: ordinary_hours.round_dp(2),
        overtime_hours: overtime_hours.round_dp(2),
    })
}
