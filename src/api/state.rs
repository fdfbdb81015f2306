//! Application state for the attendance engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::SettingsResolver;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::store::{AllocationLedger, ScheduleStore};

/// Shared application state.
///
/// Holds the validated configuration, the schedule store port, the
/// allocation ledger and the clock every handler reads "now" from.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
    resolver: Arc<SettingsResolver>,
    schedules: Arc<dyn ScheduleStore>,
    ledger: Arc<AllocationLedger>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates application state reading time from the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::ValidationError`] if the
    /// configured allocation tolerance is out of range.
    pub fn new(config: EngineConfig, schedules: Arc<dyn ScheduleStore>) -> EngineResult<Self> {
        let ledger = AllocationLedger::new(config.guard()?);
        Ok(Self {
            resolver: Arc::new(config.resolver()),
            config: Arc::new(config),
            schedules,
            ledger: Arc::new(ledger),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the schedule resolver.
    pub fn resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    /// Returns the schedule store.
    pub fn schedules(&self) -> &dyn ScheduleStore {
        self.schedules.as_ref()
    }

    /// Returns the allocation ledger.
    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    /// Returns the clock.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::InMemoryScheduleStore;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_with_clock_replaces_now() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let state = AppState::new(EngineConfig::default(), Arc::new(InMemoryScheduleStore::new()))
            .unwrap()
            .with_clock(Arc::new(FixedClock(now)));
        assert_eq!(state.clock().now(), now);
    }

    #[test]
    fn test_resolver_uses_configured_default() {
        let state =
            AppState::new(EngineConfig::default(), Arc::new(InMemoryScheduleStore::new())).unwrap();
        assert_eq!(
            state.resolver().default_schedule(),
            &state.config().default_schedule
        );
    }
}
