//! Monthly attendance aggregation.
//!
//! Runs schedule resolution, lateness, early departure, work hours and
//! weekend detection over one user's records for a calendar month and folds
//! the results into a [`MonthlySummary`].

use chrono::{Datelike, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, ScheduleSource};
use crate::store::ScheduleStore;

use super::late_arrival::{
    DepartureOutcome, LatenessOutcome, evaluate_early_departure, evaluate_late_arrival_on,
};
use super::settings_resolver::SettingsResolver;
use super::time_codec::has_shape;
use super::weekend::is_weekend;
use super::work_hours::{WorkHours, calculate_work_hours};

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// Creates a month.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationError`] if `month` is not 1..=12 or
    /// the year is outside chrono's supported range.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::validation(
                "month",
                format!("{year}-{month:02} is not a calendar month"),
            ));
        }
        Ok(Self { year, month })
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The month number, 1 = January.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns true if `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for CalendarMonth {
    type Err = EngineError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::validation("month", format!("'{s}' is not in YYYY-MM form"));
        let trimmed = s.trim();
        if !has_shape(trimmed, "dddd-dd") {
            return Err(invalid());
        }
        let first = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map_err(|_| invalid())?;
        Self::new(first.year(), first.month())
    }
}

impl Serialize for CalendarMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarMonth {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A non-fatal observation raised while summarizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// The record date the warning concerns.
    pub date: NaiveDate,
    /// A human-readable description of the warning.
    pub message: String,
}

impl SummaryWarning {
    fn new(code: &str, date: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            date,
            message: message.into(),
        }
    }
}

/// Per-record evaluation inside a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The record date.
    pub date: NaiveDate,
    /// Where the schedule for the day came from.
    pub schedule_source: ScheduleSource,
    /// Project label when the schedule came from a project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    /// Lateness for the clock-in.
    pub lateness: LatenessOutcome,
    /// Early departure for the clock-out.
    pub departure: DepartureOutcome,
    /// Work hours, absent when not computable.
    pub work_hours: Option<WorkHours>,
    /// Whether the date is a weekend under the day's schedule.
    pub is_weekend: bool,
}

/// One user's attendance statistics for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// The user summarized.
    pub user_id: String,
    /// The month summarized.
    pub month: CalendarMonth,
    /// Records that fell inside the month.
    pub days_recorded: u32,
    /// Evaluated days with a late clock-in.
    pub late_count: u32,
    /// Sum of late minutes across the month.
    pub total_late_minutes: u32,
    /// Days whose lateness could not be evaluated.
    pub unevaluable_days: u32,
    /// Evaluated days with an early clock-out.
    pub early_departure_count: u32,
    /// Sum of worked hours.
    pub worked_hours: Decimal,
    /// Sum of overtime hours.
    pub overtime_hours: Decimal,
    /// Days worked on a weekend.
    pub weekend_days_worked: u32,
    /// Days whose schedule came back as `ERROR`.
    pub degraded_resolutions: u32,
    /// Observations worth a reviewer's attention.
    pub warnings: Vec<SummaryWarning>,
    /// Per-record detail, in date order.
    pub days: Vec<DaySummary>,
}

impl MonthlySummary {
    fn empty(user_id: &str, month: CalendarMonth) -> Self {
        Self {
            user_id: user_id.to_string(),
            month,
            days_recorded: 0,
            late_count: 0,
            total_late_minutes: 0,
            unevaluable_days: 0,
            early_departure_count: 0,
            worked_hours: Decimal::ZERO,
            overtime_hours: Decimal::ZERO,
            weekend_days_worked: 0,
            degraded_resolutions: 0,
            warnings: Vec::new(),
            days: Vec::new(),
        }
    }

    fn add_day(&mut self, day: DaySummary) {
        self.days_recorded += 1;

        match &day.lateness {
            LatenessOutcome::Evaluated(late) => {
                if late.is_late {
                    self.late_count += 1;
                    self.total_late_minutes += late.late_minutes;
                }
            }
            LatenessOutcome::NotEvaluable { .. } => self.unevaluable_days += 1,
        }

        if day.departure.left_early() {
            self.early_departure_count += 1;
        }

        if let Some(hours) = &day.work_hours {
            self.worked_hours += hours.worked_hours;
            self.overtime_hours += hours.overtime_hours;
        }

        if day.is_weekend && day.lateness.evaluated().is_some() {
            self.weekend_days_worked += 1;
        }

        if day.schedule_source == ScheduleSource::Error {
            self.degraded_resolutions += 1;
            self.warnings.push(SummaryWarning::new(
                "DEGRADED_SCHEDULE",
                day.date,
                "schedule lookup failed; company default applied",
            ));
        }

        self.days.push(day);
    }
}

/// Summarizes `records` for `user_id` over `month`.
///
/// Records dated outside the month are ignored. Each remaining record gets
/// its own schedule resolution, so a schedule change mid-month is honored.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::{summarize_month, parse_offset, CalendarMonth, SettingsResolver};
/// use attendance_engine::models::AttendanceRecord;
/// use attendance_engine::store::InMemoryScheduleStore;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let records = vec![AttendanceRecord {
///     date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
///     // 09:10 in the business zone.
///     clock_in: Some(Utc.with_ymd_and_hms(2026, 1, 15, 0, 10, 0).unwrap()),
///     clock_out: Some(Utc.with_ymd_and_hms(2026, 1, 15, 9, 10, 0).unwrap()),
/// }];
///
/// let summary = summarize_month(
///     &SettingsResolver::default(),
///     &InMemoryScheduleStore::new(),
///     "u1",
///     CalendarMonth::new(2026, 1).unwrap(),
///     &records,
///     parse_offset("+09:00").unwrap(),
/// );
/// assert_eq!(summary.late_count, 1);
/// assert_eq!(summary.total_late_minutes, 10);
/// ```
pub fn summarize_month(
    resolver: &SettingsResolver,
    store: &dyn ScheduleStore,
    user_id: &str,
    month: CalendarMonth,
    records: &[AttendanceRecord],
    offset: FixedOffset,
) -> MonthlySummary {
    let mut in_month: Vec<&AttendanceRecord> =
        records.iter().filter(|r| month.contains(r.date)).collect();
    in_month.sort_by_key(|r| r.date);

    let skipped = records.len() - in_month.len();
    if skipped > 0 {
        debug!(user_id = %user_id, %month, skipped, "Ignoring records outside the month");
    }

    let mut summary = MonthlySummary::empty(user_id, month);
    let mut previous: Option<NaiveDate> = None;

    for record in in_month {
        if previous == Some(record.date) {
            warn!(user_id = %user_id, date = %record.date, "Several records for one date");
            summary.warnings.push(SummaryWarning::new(
                "DUPLICATE_DATE",
                record.date,
                "more than one attendance record for this date",
            ));
        }
        previous = Some(record.date);

        let schedule = resolver.resolve(store, user_id, record.date);
        let lateness = evaluate_late_arrival_on(record.date, record.clock_in, Some(&schedule), offset);
        let departure =
            evaluate_early_departure(record.date, record.clock_out, Some(&schedule), offset);
        let work_hours = calculate_work_hours(record, &schedule);

        if record.is_complete() && work_hours.is_none() {
            summary.warnings.push(SummaryWarning::new(
                "CLOCK_OUT_BEFORE_CLOCK_IN",
                record.date,
                "clock-out precedes clock-in; hours not computed",
            ));
        }

        summary.add_day(DaySummary {
            date: record.date,
            is_weekend: is_weekend(record.date, schedule.week_start_day),
            schedule_source: schedule.source,
            source_label: schedule.source_label,
            lateness,
            departure,
            work_hours,
        });
    }

    debug!(
        user_id = %user_id,
        %month,
        days = summary.days_recorded,
        late = summary.late_count,
        "Month summarized"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssignmentClass, ScheduleAssignment, ScheduleDefinition};
    use crate::store::{InMemoryScheduleStore, StoreError};
    use chrono::{DateTime, TimeZone, Utc};
    use std::str::FromStr;

    struct FailingStore;

    impl ScheduleStore for FailingStore {
        fn assignments_for(
            &self,
            _user_id: &str,
            _class: AssignmentClass,
        ) -> Result<Vec<ScheduleAssignment>, StoreError> {
            Err(StoreError::Unavailable("timeout".to_string()))
        }
    }

    fn tokyo() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn tokyo_instant(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        tokyo()
            .with_ymd_and_hms(2026, 1, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn day(d: u32, clock_in: Option<(u32, u32)>, clock_out: Option<(u32, u32)>) -> AttendanceRecord {
        AttendanceRecord {
            date: NaiveDate::from_ymd_opt(2026, 1, d).unwrap(),
            clock_in: clock_in.map(|(h, m)| tokyo_instant(d, h, m)),
            clock_out: clock_out.map(|(h, m)| tokyo_instant(d, h, m)),
        }
    }

    fn january() -> CalendarMonth {
        CalendarMonth::new(2026, 1).unwrap()
    }

    #[test]
    fn test_counts_late_days_and_minutes() {
        let records = vec![
            day(13, Some((9, 0)), Some((18, 0))),
            day(14, Some((9, 5)), Some((18, 0))),
            day(15, Some((9, 30)), Some((17, 0))),
            day(16, None, Some((18, 0))),
        ];
        let summary = summarize_month(
            &SettingsResolver::default(),
            &InMemoryScheduleStore::new(),
            "u1",
            january(),
            &records,
            tokyo(),
        );

        assert_eq!(summary.days_recorded, 4);
        assert_eq!(summary.late_count, 2);
        assert_eq!(summary.total_late_minutes, 35);
        assert_eq!(summary.unevaluable_days, 1);
        assert_eq!(summary.early_departure_count, 1);
        assert_eq!(summary.degraded_resolutions, 0);
    }

    #[test]
    fn test_sums_work_hours() {
        let records = vec![
            day(13, Some((9, 0)), Some((18, 0))),
            day(14, Some((9, 0)), Some((20, 0))),
        ];
        let summary = summarize_month(
            &SettingsResolver::default(),
            &InMemoryScheduleStore::new(),
            "u1",
            january(),
            &records,
            tokyo(),
        );
        assert_eq!(summary.worked_hours, Decimal::from_str("18").unwrap());
        assert_eq!(summary.overtime_hours, Decimal::from_str("2").unwrap());
    }

    #[test]
    fn test_records_outside_month_are_ignored() {
        let mut february = day(13, Some((10, 0)), Some((18, 0)));
        february.date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let records = vec![day(13, Some((9, 0)), Some((18, 0))), february];

        let summary = summarize_month(
            &SettingsResolver::default(),
            &InMemoryScheduleStore::new(),
            "u1",
            january(),
            &records,
            tokyo(),
        );
        assert_eq!(summary.days_recorded, 1);
        assert_eq!(summary.late_count, 0);
    }

    #[test]
    fn test_weekend_days_follow_the_schedule() {
        let store = InMemoryScheduleStore::new();
        let definition = ScheduleDefinition {
            week_start_day: 3,
            ..ScheduleDefinition::company_default()
        };
        store
            .define(ScheduleAssignment::new(
                "u1",
                AssignmentClass::Personal,
                definition,
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            ))
            .unwrap();

        // 2026-01-17 is a Saturday, 2026-01-19 a Monday.
        let records = vec![
            day(17, Some((9, 0)), Some((18, 0))),
            day(19, Some((9, 0)), Some((18, 0))),
        ];
        let summary = summarize_month(
            &SettingsResolver::default(),
            &store,
            "u1",
            january(),
            &records,
            tokyo(),
        );
        assert_eq!(summary.weekend_days_worked, 1);
        assert!(summary.days[1].is_weekend);
        assert!(!summary.days[0].is_weekend);
    }

    #[test]
    fn test_storage_failure_is_counted_as_degraded() {
        let records = vec![day(13, Some((9, 0)), Some((18, 0)))];
        let summary = summarize_month(
            &SettingsResolver::default(),
            &FailingStore,
            "u1",
            january(),
            &records,
            tokyo(),
        );
        assert_eq!(summary.degraded_resolutions, 1);
        assert_eq!(summary.days[0].schedule_source, ScheduleSource::Error);
        assert_eq!(summary.warnings[0].code, "DEGRADED_SCHEDULE");
    }

    #[test]
    fn test_duplicate_dates_are_flagged() {
        let records = vec![
            day(13, Some((9, 0)), Some((12, 0))),
            day(13, Some((13, 0)), Some((18, 0))),
        ];
        let summary = summarize_month(
            &SettingsResolver::default(),
            &InMemoryScheduleStore::new(),
            "u1",
            january(),
            &records,
            tokyo(),
        );
        assert_eq!(summary.days_recorded, 2);
        assert!(summary.warnings.iter().any(|w| w.code == "DUPLICATE_DATE"));
    }

    #[test]
    fn test_calendar_month_parsing() {
        assert_eq!("2026-01".parse::<CalendarMonth>().unwrap(), january());
        assert_eq!(january().to_string(), "2026-01");
        assert!("2026-13".parse::<CalendarMonth>().is_err());
        assert!("2026-1".parse::<CalendarMonth>().is_err());
        assert!("2026-00".parse::<CalendarMonth>().is_err());
        assert!("+026-01".parse::<CalendarMonth>().is_err());
        assert!("January".parse::<CalendarMonth>().is_err());
        assert!(CalendarMonth::new(2026, 0).is_err());
    }
}
