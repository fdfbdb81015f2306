//! Calculation logic for the attendance engine.
//!
//! This module contains the time codec that converts between instants and
//! business-local civil time, effective schedule resolution, late-arrival and
//! early-departure evaluation, weekend derivation, work-hours calculation,
//! monthly aggregation and the project allocation capacity guard.

mod allocation_guard;
mod late_arrival;
mod monthly_summary;
mod settings_resolver;
mod time_codec;
mod weekend;
mod work_hours;

pub use allocation_guard::{
    AllocationCheck, AllocationGuard, DEFAULT_ALLOCATION_EPSILON, FULL_CAPACITY,
    validate_fraction,
};
pub use late_arrival::{
    DepartureOutcome, EarlyDeparture, LateArrival, LatenessOutcome, NotEvaluableReason,
    evaluate_early_departure, evaluate_late_arrival, evaluate_late_arrival_on, late_minutes,
};
pub use monthly_summary::{
    CalendarMonth, DaySummary, MonthlySummary, SummaryWarning, summarize_month,
};
pub use settings_resolver::SettingsResolver;
pub use time_codec::{
    format_civil_time, parse_civil_time, parse_offset, to_civil_date, to_civil_time, to_instant,
};
pub use weekend::{WeekendDays, is_weekend, weekend_days, weekend_for_schedule};
pub use work_hours::{WorkHours, calculate_work_hours};
