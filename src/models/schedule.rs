//! Work-schedule models.
//!
//! This module defines the schedule definition shared by assignments and the
//! company default, the [`ScheduleAssignment`] that binds a definition to a
//! user for a validity window, and the resolved [`EffectiveSchedule`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::CivilTime;

/// Week-start day used when nothing else is configured (Monday).
pub const DEFAULT_WEEK_START_DAY: u8 = 1;

/// The work-time fields of a schedule.
///
/// # Example
///
/// ```
/// use attendance_engine::models::ScheduleDefinition;
///
/// let definition = ScheduleDefinition::company_default();
/// assert_eq!(definition.start_time.to_string(), "09:00");
/// assert!(definition.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleDefinition {
    /// Scheduled start of the working day.
    pub start_time: CivilTime,
    /// Scheduled end of the working day.
    pub end_time: CivilTime,
    /// Unpaid break length in minutes.
    pub break_minutes: u32,
    /// Standard working hours per day.
    pub standard_hours: Decimal,
    /// Worked hours above which time counts as overtime.
    pub overtime_threshold_hours: Decimal,
    /// First day of the business week, 0 = Sunday.
    pub week_start_day: u8,
}

impl ScheduleDefinition {
    /// The company default: 09:00-18:00, 60 minute break, 8h standard.
    pub fn company_default() -> Self {
        Self {
            start_time: CivilTime::hm(9, 0),
            end_time: CivilTime::hm(18, 0),
            break_minutes: 60,
            standard_hours: Decimal::new(8, 0),
            overtime_threshold_hours: Decimal::new(8, 0),
            week_start_day: DEFAULT_WEEK_START_DAY,
        }
    }

    /// Length of the scheduled window in minutes, break included.
    pub fn window_minutes(&self) -> u32 {
        self.end_time
            .minutes_of_day()
            .saturating_sub(self.start_time.minutes_of_day())
    }

    /// Checks the definition before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationError`] when the end time is not after
    /// the start time, the break fills the whole window, the week-start day is
    /// outside 0..=6, or an hour quantity is negative.
    pub fn validate(&self) -> EngineResult<()> {
        if self.end_time <= self.start_time {
            return Err(EngineError::validation(
                "end_time",
                format!(
                    "end time {} must be after start time {}",
                    self.end_time, self.start_time
                ),
            ));
        }
        if self.break_minutes >= self.window_minutes() {
            return Err(EngineError::validation(
                "break_minutes",
                format!(
                    "break of {} minutes does not fit in a {} minute window",
                    self.break_minutes,
                    self.window_minutes()
                ),
            ));
        }
        if self.week_start_day > 6 {
            return Err(EngineError::validation(
                "week_start_day",
                format!("{} is not a weekday number (0-6)", self.week_start_day),
            ));
        }
        if self.standard_hours <= Decimal::ZERO {
            return Err(EngineError::validation(
                "standard_hours",
                "must be greater than zero",
            ));
        }
        if self.overtime_threshold_hours < Decimal::ZERO {
            return Err(EngineError::validation(
                "overtime_threshold_hours",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

impl Default for ScheduleDefinition {
    fn default() -> Self {
        Self::company_default()
    }
}

/// Where an effective schedule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleSource {
    /// A project-specific assignment.
    Project,
    /// The user's personal assignment.
    Personal,
    /// The company default; no assignment applied.
    Default,
    /// The company default because storage failed.
    Error,
}

impl std::fmt::Display for ScheduleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleSource::Project => write!(f, "PROJECT"),
            ScheduleSource::Personal => write!(f, "PERSONAL"),
            ScheduleSource::Default => write!(f, "DEFAULT"),
            ScheduleSource::Error => write!(f, "ERROR"),
        }
    }
}

/// Priority class of an assignment. `Project` outranks `Personal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentClass {
    /// Schedule attached to a project membership.
    Project,
    /// Schedule the user configured for themself.
    Personal,
}

impl AssignmentClass {
    /// The schedule source reported when this class wins resolution.
    pub fn source(&self) -> ScheduleSource {
        match self {
            AssignmentClass::Project => ScheduleSource::Project,
            AssignmentClass::Personal => ScheduleSource::Personal,
        }
    }
}

/// Binds a user to a schedule definition for a validity window.
///
/// The window is `[valid_from, valid_until)`; `valid_until = None` is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleAssignment {
    /// Unique identifier.
    pub id: Uuid,
    /// The user the schedule applies to.
    pub user_id: String,
    /// Priority class.
    pub class: AssignmentClass,
    /// Project the assignment belongs to, for `Project` assignments.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Human-readable label used in audit output (e.g. the project name).
    #[serde(default)]
    pub label: Option<String>,
    /// The schedule itself.
    pub schedule: ScheduleDefinition,
    /// First date the assignment applies (inclusive).
    pub valid_from: NaiveDate,
    /// First date the assignment no longer applies (exclusive).
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Inactive assignments never take part in resolution.
    pub is_active: bool,
    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
}

impl ScheduleAssignment {
    /// Creates an active, open-ended assignment.
    pub fn new(
        user_id: impl Into<String>,
        class: AssignmentClass,
        schedule: ScheduleDefinition,
        valid_from: NaiveDate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            class,
            project_id: None,
            label: None,
            schedule,
            valid_from,
            valid_until: None,
            is_active: true,
            created_at,
        }
    }

    /// Attaches the owning project and its display label.
    pub fn for_project(mut self, project_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self.label = Some(label.into());
        self
    }

    /// Closes the window at `valid_until` (exclusive).
    pub fn until(mut self, valid_until: NaiveDate) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Returns true if `date` lies inside the validity window.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_until.is_none_or(|end| date < end)
    }

    /// Returns true if the assignment is active and covers `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        self.is_active && self.covers(date)
    }
}

/// The single work-time configuration chosen for a user on a date.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{EffectiveSchedule, ScheduleSource};
///
/// let schedule = EffectiveSchedule::company_default();
/// assert_eq!(schedule.source, ScheduleSource::Default);
/// assert_eq!(schedule.week_start_day, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveSchedule {
    /// Scheduled start of the working day.
    pub start_time: CivilTime,
    /// Scheduled end of the working day.
    pub end_time: CivilTime,
    /// Unpaid break length in minutes.
    pub break_minutes: u32,
    /// Standard working hours per day.
    pub standard_hours: Decimal,
    /// Worked hours above which time counts as overtime.
    pub overtime_threshold_hours: Decimal,
    /// First day of the business week, 0 = Sunday.
    pub week_start_day: u8,
    /// Which rule produced this schedule.
    pub source: ScheduleSource,
    /// Audit label, set for project schedules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
}

impl EffectiveSchedule {
    /// Builds an effective schedule from a definition.
    pub fn from_definition(
        definition: &ScheduleDefinition,
        source: ScheduleSource,
        source_label: Option<String>,
    ) -> Self {
        Self {
            start_time: definition.start_time,
            end_time: definition.end_time,
            break_minutes: definition.break_minutes,
            standard_hours: definition.standard_hours,
            overtime_threshold_hours: definition.overtime_threshold_hours,
            week_start_day: definition.week_start_day,
            source,
            source_label,
        }
    }

    /// The built-in company default tagged `DEFAULT`.
    pub fn company_default() -> Self {
        Self::from_definition(
            &ScheduleDefinition::company_default(),
            ScheduleSource::Default,
            None,
        )
    }

    /// Returns true when the schedule is a fallback caused by a storage failure.
    pub fn is_degraded(&self) -> bool {
        self.source == ScheduleSource::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> CivilTime {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_company_default_values() {
        let d = ScheduleDefinition::company_default();
        assert_eq!(d.start_time, t("09:00"));
        assert_eq!(d.end_time, t("18:00"));
        assert_eq!(d.break_minutes, 60);
        assert_eq!(d.standard_hours, Decimal::new(8, 0));
        assert_eq!(d.week_start_day, 1);
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let d = ScheduleDefinition {
            start_time: t("18:00"),
            end_time: t("09:00"),
            ..ScheduleDefinition::company_default()
        };
        let err = d.validate().unwrap_err();
        assert!(matches!(err, EngineError::ValidationError { ref field, .. } if field == "end_time"));
    }

    #[test]
    fn test_validate_rejects_break_filling_window() {
        let d = ScheduleDefinition {
            start_time: t("09:00"),
            end_time: t("10:00"),
            break_minutes: 60,
            ..ScheduleDefinition::company_default()
        };
        let err = d.validate().unwrap_err();
        assert!(
            matches!(err, EngineError::ValidationError { ref field, .. } if field == "break_minutes")
        );
    }

    #[test]
    fn test_validate_rejects_week_start_out_of_range() {
        let d = ScheduleDefinition {
            week_start_day: 7,
            ..ScheduleDefinition::company_default()
        };
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_assignment_window_is_half_open() {
        let a = ScheduleAssignment::new(
            "u1",
            AssignmentClass::Personal,
            ScheduleDefinition::company_default(),
            date(2026, 1, 1),
            Utc::now(),
        )
        .until(date(2026, 2, 1));

        assert!(!a.covers(date(2025, 12, 31)));
        assert!(a.covers(date(2026, 1, 1)));
        assert!(a.covers(date(2026, 1, 31)));
        assert!(!a.covers(date(2026, 2, 1)));
    }

    #[test]
    fn test_inactive_assignment_never_applies() {
        let mut a = ScheduleAssignment::new(
            "u1",
            AssignmentClass::Project,
            ScheduleDefinition::company_default(),
            date(2026, 1, 1),
            Utc::now(),
        );
        a.is_active = false;
        assert!(!a.applies_on(date(2026, 1, 10)));
    }

    #[test]
    fn test_source_serializes_screaming_case() {
        assert_eq!(
            serde_json::to_string(&ScheduleSource::Project).unwrap(),
            "\"PROJECT\""
        );
        assert_eq!(
            serde_json::to_string(&ScheduleSource::Error).unwrap(),
            "\"ERROR\""
        );
    }

    #[test]
    fn test_effective_schedule_deserialization() {
        let json = r#"{
            "start_time": "10:00",
            "end_time": "19:00",
            "break_minutes": 60,
            "standard_hours": "8",
            "overtime_threshold_hours": "8",
            "week_start_day": 1,
            "source": "PROJECT",
            "source_label": "Apollo"
        }"#;
        let s: EffectiveSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.start_time, t("10:00"));
        assert_eq!(s.source, ScheduleSource::Project);
        assert_eq!(s.source_label.as_deref(), Some("Apollo"));
    }
}
