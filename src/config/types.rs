//! Configuration types for the attendance engine.
//!
//! [`EngineSettings`] mirrors the YAML file; [`EngineConfig`] is the validated
//! form the rest of the crate consumes.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::calculation::{AllocationGuard, DEFAULT_ALLOCATION_EPSILON, SettingsResolver, parse_offset};
use crate::error::EngineResult;
use crate::models::ScheduleDefinition;

/// Business offset used when none is configured.
pub const DEFAULT_BUSINESS_OFFSET: &str = "+09:00";

const DEFAULT_BUSINESS_OFFSET_SECONDS: i32 = 9 * 3600;

/// Raw contents of `engine.yaml`.
///
/// Every key is optional; missing keys take the documented defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// Fixed UTC offset of the business zone, e.g. `"+09:00"`.
    #[serde(default)]
    pub business_utc_offset: Option<String>,
    /// Company default schedule.
    #[serde(default)]
    pub default_schedule: Option<ScheduleDefinition>,
    /// Tolerance for the allocation capacity check.
    #[serde(default)]
    pub allocation_epsilon: Option<f64>,
}

/// Validated engine configuration.
///
/// # Example
///
/// ```
/// use attendance_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.business_offset.local_minus_utc(), 9 * 3600);
/// assert_eq!(config.default_schedule.start_time.to_string(), "09:00");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Fixed UTC offset of the business zone.
    pub business_offset: FixedOffset,
    /// Company default schedule.
    pub default_schedule: ScheduleDefinition,
    /// Tolerance for the allocation capacity check.
    pub allocation_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            business_offset: FixedOffset::east_opt(DEFAULT_BUSINESS_OFFSET_SECONDS)
                .unwrap_or_else(|| Utc.fix()),
            default_schedule: ScheduleDefinition::company_default(),
            allocation_epsilon: DEFAULT_ALLOCATION_EPSILON,
        }
    }
}

impl EngineConfig {
    /// Validates raw settings, filling in defaults for missing keys.
    ///
    /// # Errors
    ///
    /// - [`crate::error::EngineError::FormatError`] for a malformed offset.
    /// - [`crate::error::EngineError::ValidationError`] for an invalid default
    ///   schedule or an epsilon outside `[0, 1e-9]`.
    pub fn from_settings(settings: EngineSettings) -> EngineResult<Self> {
        let business_offset = parse_offset(
            settings
                .business_utc_offset
                .as_deref()
                .unwrap_or(DEFAULT_BUSINESS_OFFSET),
        )?;

        let default_schedule = settings.default_schedule.unwrap_or_default();
        default_schedule.validate()?;

        let allocation_epsilon = settings
            .allocation_epsilon
            .unwrap_or(DEFAULT_ALLOCATION_EPSILON);
        AllocationGuard::with_epsilon(allocation_epsilon)?;

        Ok(Self {
            business_offset,
            default_schedule,
            allocation_epsilon,
        })
    }

    /// A resolver falling back to the configured default schedule.
    pub fn resolver(&self) -> SettingsResolver {
        SettingsResolver::new(self.default_schedule.clone())
    }

    /// A guard using the configured tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::ValidationError`] if the
    /// tolerance was changed to an out-of-range value after validation.
    pub fn guard(&self) -> EngineResult<AllocationGuard> {
        AllocationGuard::with_epsilon(self.allocation_epsilon)
    }
}
