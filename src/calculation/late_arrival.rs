//! Late-arrival and early-departure evaluation.
//!
//! Punches are converted to business-local civil time with an explicit offset
//! and compared as minutes after midnight. Arriving exactly at the start time
//! is on time.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{CivilTime, EffectiveSchedule};

use super::time_codec::{to_civil_date, to_civil_time, to_instant};

/// Why a punch could not be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotEvaluableReason {
    /// No clock-in was recorded.
    MissingClockIn,
    /// No clock-out was recorded.
    MissingClockOut,
    /// No schedule was supplied.
    MissingSchedule,
}

/// A definite lateness determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LateArrival {
    /// True if the user clocked in after the start time.
    pub is_late: bool,
    /// Minutes after the start time, zero when on time.
    pub late_minutes: u32,
    /// The clock-in as business-local wall time.
    pub clock_in: CivilTime,
    /// The scheduled start used for the comparison.
    pub start_time: CivilTime,
}

/// Outcome of a lateness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LatenessOutcome {
    /// The clock-in was compared with the schedule.
    Evaluated(LateArrival),
    /// There was nothing to compare.
    NotEvaluable {
        /// What was missing.
        reason: NotEvaluableReason,
    },
}

impl LatenessOutcome {
    /// The determination, if one was made.
    pub fn evaluated(&self) -> Option<&LateArrival> {
        match self {
            LatenessOutcome::Evaluated(late) => Some(late),
            LatenessOutcome::NotEvaluable { .. } => None,
        }
    }

    /// True only for an evaluated late arrival.
    pub fn is_late(&self) -> bool {
        self.evaluated().is_some_and(|late| late.is_late)
    }
}

/// Minutes by which `clock_in` is after `start`, zero when on time or early.
pub fn late_minutes(clock_in: CivilTime, start: CivilTime) -> u32 {
    clock_in
        .minutes_of_day()
        .saturating_sub(start.minutes_of_day())
}

/// Evaluates a clock-in against a schedule's start time.
///
/// A missing clock-in is never treated as late. A missing schedule is a data
/// error: it is logged and the punch is reported as not evaluable.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{evaluate_late_arrival, parse_offset, LatenessOutcome};
/// use attendance_engine::models::EffectiveSchedule;
/// use chrono::{TimeZone, Utc};
///
/// let offset = parse_offset("+09:00").unwrap();
/// let schedule = EffectiveSchedule::company_default(); // starts 09:00
///
/// // 00:00 UTC is 09:00 in the business zone: on time.
/// let on_time = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
/// let outcome = evaluate_late_arrival(Some(on_time), Some(&schedule), offset);
/// assert!(!outcome.is_late());
///
/// // 00:05 UTC is 09:05: five minutes late.
/// let late = Utc.with_ymd_and_hms(2026, 1, 15, 0, 5, 0).unwrap();
/// match evaluate_late_arrival(Some(late), Some(&schedule), offset) {
///     LatenessOutcome::Evaluated(result) => assert_eq!(result.late_minutes, 5),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn evaluate_late_arrival(
    clock_in: Option<DateTime<Utc>>,
    schedule: Option<&EffectiveSchedule>,
    offset: FixedOffset,
) -> LatenessOutcome {
    let Some(clock_in) = clock_in else {
        return LatenessOutcome::NotEvaluable {
            reason: NotEvaluableReason::MissingClockIn,
        };
    };
    let Some(schedule) = schedule else {
        error!(clock_in = %clock_in, "Late-arrival check without a schedule");
        return LatenessOutcome::NotEvaluable {
            reason: NotEvaluableReason::MissingSchedule,
        };
    };

    let civil = to_civil_time(clock_in, offset);
    let late_minutes = late_minutes(civil, schedule.start_time);

    LatenessOutcome::Evaluated(LateArrival {
        is_late: late_minutes > 0,
        late_minutes,
        clock_in: civil,
        start_time: schedule.start_time,
    })
}

/// Evaluates a clock-in for the record dated `record_date`.
///
/// Same as [`evaluate_late_arrival`] when the clock-in falls on the record's
/// business date. A clock-in on an earlier date is on time; one on a later
/// date is late by the whole minutes elapsed since the scheduled start on
/// `record_date`.
pub fn evaluate_late_arrival_on(
    record_date: NaiveDate,
    clock_in: Option<DateTime<Utc>>,
    schedule: Option<&EffectiveSchedule>,
    offset: FixedOffset,
) -> LatenessOutcome {
    let outcome = evaluate_late_arrival(clock_in, schedule, offset);
    let (LatenessOutcome::Evaluated(mut late), Some(clock_in)) = (outcome, clock_in) else {
        return outcome;
    };

    late.late_minutes = match to_civil_date(clock_in, offset).cmp(&record_date) {
        Ordering::Equal => late.late_minutes,
        Ordering::Less => 0,
        Ordering::Greater => {
            let start = to_instant(record_date, late.start_time, offset);
            u32::try_from((clock_in - start).num_minutes()).unwrap_or(u32::MAX)
        }
    };
    late.is_late = late.late_minutes > 0;
    LatenessOutcome::Evaluated(late)
}

/// A definite early-departure determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyDeparture {
    /// True if the user clocked out before the end time.
    pub left_early: bool,
    /// Minutes before the end time, zero otherwise.
    pub early_minutes: u32,
    /// The clock-out as business-local wall time.
    pub clock_out: CivilTime,
    /// The scheduled end used for the comparison.
    pub end_time: CivilTime,
}

/// Outcome of an early-departure evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DepartureOutcome {
    /// The clock-out was compared with the schedule.
    Evaluated(EarlyDeparture),
    /// There was nothing to compare.
    NotEvaluable {
        /// What was missing.
        reason: NotEvaluableReason,
    },
}

impl DepartureOutcome {
    /// True only for an evaluated early departure.
    pub fn left_early(&self) -> bool {
        matches!(self, DepartureOutcome::Evaluated(d) if d.left_early)
    }
}

/// Evaluates a clock-out against a schedule's end time.
///
/// A clock-out that falls on a later business date than `record_date` is
/// never early.
pub fn evaluate_early_departure(
    record_date: NaiveDate,
    clock_out: Option<DateTime<Utc>>,
    schedule: Option<&EffectiveSchedule>,
    offset: FixedOffset,
) -> DepartureOutcome {
    let Some(clock_out) = clock_out else {
        return DepartureOutcome::NotEvaluable {
            reason: NotEvaluableReason::MissingClockOut,
        };
    };
    let Some(schedule) = schedule else {
        error!(clock_out = %clock_out, "Early-departure check without a schedule");
        return DepartureOutcome::NotEvaluable {
            reason: NotEvaluableReason::MissingSchedule,
        };
    };

    let civil = to_civil_time(clock_out, offset);
    let early_minutes = if to_civil_date(clock_out, offset) > record_date {
        0
    } else {
        schedule
            .end_time
            .minutes_of_day()
            .saturating_sub(civil.minutes_of_day())
    };

    DepartureOutcome::Evaluated(EarlyDeparture {
        left_early: early_minutes > 0,
        early_minutes,
        clock_out: civil,
        end_time: schedule.end_time,
    })
}
