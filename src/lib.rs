//! Attendance and work-schedule compliance engine.
//!
//! This crate resolves the effective work schedule for a user on a date,
//! evaluates clock punches against it in a fixed business time zone, derives
//! weekends from a configurable week start, aggregates monthly statistics and
//! guards project allocations against overcommitment.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
