//! Core data models for the attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation;
mod attendance;
mod civil_time;
mod schedule;

pub use allocation::{ActiveWindow, AllocationRecord};
pub use attendance::AttendanceRecord;
pub use civil_time::{CivilTime, MINUTES_PER_DAY};
pub use schedule::{
    AssignmentClass, DEFAULT_WEEK_START_DAY, EffectiveSchedule, ScheduleAssignment,
    ScheduleDefinition, ScheduleSource,
};
