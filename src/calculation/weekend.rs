//! Weekend derivation from a configurable week-start day.
//!
//! The weekend is the two days immediately before the week starts. Weekday
//! numbers run 0 = Sunday through 6 = Saturday.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{DEFAULT_WEEK_START_DAY, EffectiveSchedule};

/// The two weekend weekdays, in week order.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::weekend_days;
/// use chrono::Weekday;
///
/// let weekend = weekend_days(1);
/// assert_eq!((weekend.first, weekend.second), (Weekday::Sat, Weekday::Sun));
/// assert_eq!(weekend.numbers(), [6, 0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekendDays {
    /// The first weekend day.
    pub first: Weekday,
    /// The second weekend day; always the day after `first`.
    pub second: Weekday,
}

impl WeekendDays {
    /// Both days as 0 = Sunday numbers.
    pub fn numbers(&self) -> [u8; 2] {
        [
            self.first.num_days_from_sunday() as u8,
            self.second.num_days_from_sunday() as u8,
        ]
    }

    /// Returns true if `weekday` is one of the two weekend days.
    pub fn contains(&self, weekday: Weekday) -> bool {
        weekday == self.first || weekday == self.second
    }
}

/// Derives the weekend pair for `week_start_day`.
///
/// An out-of-range week-start day silently yields the default weekend
/// (Saturday, Sunday).
pub fn weekend_days(week_start_day: u8) -> WeekendDays {
    let start = if week_start_day <= 6 {
        week_start_day
    } else {
        debug!(
            week_start_day,
            "Week-start day out of range, using default weekend"
        );
        DEFAULT_WEEK_START_DAY
    };

    WeekendDays {
        first: weekday_from_sunday((start + 5) % 7),
        second: weekday_from_sunday((start + 6) % 7),
    }
}

/// Returns true if `date` falls on a weekend for `week_start_day`.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::is_weekend;
/// use chrono::NaiveDate;
///
/// let saturday = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
/// assert!(is_weekend(saturday, 1));
/// assert!(!is_weekend(saturday, 3));
/// ```
pub fn is_weekend(date: NaiveDate, week_start_day: u8) -> bool {
    weekend_days(week_start_day).contains(date.weekday())
}

/// The weekend pair for a resolved schedule.
///
/// A schedule resolved with `source = ERROR` carries the default week-start
/// day, so the default weekend follows without further checks.
pub fn weekend_for_schedule(schedule: &EffectiveSchedule) -> WeekendDays {
    weekend_days(schedule.week_start_day)
}

fn weekday_from_sunday(n: u8) -> Weekday {
    // chrono numbers weekdays from Monday = 0.
    Weekday::try_from((n % 7 + 6) % 7).unwrap_or(Weekday::Sun)
}
