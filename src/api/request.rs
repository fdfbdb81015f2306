//! Request types for the attendance engine API.
//!
//! This module defines the JSON request bodies for each endpoint and the
//! checks that run before a request reaches the engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::calculation::CalendarMonth;
use crate::error::{EngineError, EngineResult};
use crate::models::{ActiveWindow, AttendanceRecord};

fn require_id(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Request body for `POST /schedules/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveScheduleRequest {
    /// The user to resolve for.
    pub user_id: String,
    /// The business-local date.
    pub date: NaiveDate,
}

impl ResolveScheduleRequest {
    /// Checks the request fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_id("user_id", &self.user_id)
    }
}

/// Request body for `POST /attendance/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateAttendanceRequest {
    /// The user the record belongs to.
    pub user_id: String,
    /// The attendance record to evaluate.
    pub record: AttendanceRecord,
}

impl EvaluateAttendanceRequest {
    /// Checks the request fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_id("user_id", &self.user_id)
    }
}

/// Request body for `POST /attendance/monthly-summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummaryRequest {
    /// The user to summarize.
    pub user_id: String,
    /// The month, written `YYYY-MM`.
    pub month: CalendarMonth,
    /// The user's attendance records; those outside the month are ignored.
    #[serde(default)]
    pub records: Vec<AttendanceRecord>,
}

impl MonthlySummaryRequest {
    /// Checks the request fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_id("user_id", &self.user_id)
    }
}

/// Request body for `POST /allocations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAllocationRequest {
    /// The user joining the project.
    pub user_id: String,
    /// The project joined.
    pub project_id: String,
    /// Share of the user's capacity, in `[0, 1]`.
    pub allocation_fraction: f64,
    /// Start of the allocation; defaults to now.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// End of the allocation, exclusive; open-ended when absent.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

impl CreateAllocationRequest {
    /// Checks the request fields and builds the active window.
    ///
    /// `now` fills in a missing start.
    pub fn active_window(&self, now: DateTime<Utc>) -> EngineResult<ActiveWindow> {
        require_id("user_id", &self.user_id)?;
        require_id("project_id", &self.project_id)?;

        let starts_at = self.starts_at.unwrap_or(now);
        if let Some(ends_at) = self.ends_at {
            if ends_at <= starts_at {
                return Err(EngineError::validation(
                    "ends_at",
                    format!("{ends_at} must be after starts_at {starts_at}"),
                ));
            }
        }
        Ok(ActiveWindow {
            starts_at,
            ends_at: self.ends_at,
        })
    }
}

/// Request body for `PUT /allocations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAllocationRequest {
    /// The user whose membership changes.
    pub user_id: String,
    /// The project of the membership.
    pub project_id: String,
    /// New share of the user's capacity, in `[0, 1]`.
    pub allocation_fraction: f64,
}

impl UpdateAllocationRequest {
    /// Checks the request fields.
    pub fn validate(&self) -> EngineResult<()> {
        require_id("user_id", &self.user_id)?;
        require_id("project_id", &self.project_id)
    }
}

/// Request body for `DELETE /allocations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndMembershipRequest {
    /// The user leaving the project.
    pub user_id: String,
    /// The project left.
    pub project_id: String,
}
