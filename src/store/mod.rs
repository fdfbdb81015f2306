//! Persistence ports and in-memory implementations.
//!
//! The resolver receives a [`ScheduleStore`] on every call instead of reaching
//! for a shared client. [`AllocationLedger`] keeps allocation records and runs
//! the capacity check and the write under one per-user lock.

mod allocation_ledger;
mod schedule_store;

pub use allocation_ledger::{AllocationChange, AllocationLedger};
pub use schedule_store::{InMemoryScheduleStore, ScheduleStore, StoreError};
