//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings};

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "engine.yaml";

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// └── engine.yaml   # business offset, default schedule, allocation epsilon
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// println!("Business offset: {}", loader.config().business_offset);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from `engine.yaml` in the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing ([`EngineError::ConfigNotFound`])
    /// - The file is not valid YAML or has unknown keys
    ///   ([`EngineError::ConfigParseError`])
    /// - A value fails validation ([`EngineError::ValidationError`] or
    ///   [`EngineError::FormatError`])
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let file = path.as_ref().join(CONFIG_FILE_NAME);
        let path_str = file.display().to_string();

        let content = fs::read_to_string(&file).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let loader = Self::from_yaml_str(&content, &path_str)?;
        info!(
            path = %path_str,
            business_offset = %loader.config.business_offset,
            "Engine configuration loaded"
        );
        Ok(loader)
    }

    /// Parses configuration from YAML text. `origin` names the source in
    /// error messages.
    pub fn from_yaml_str(content: &str, origin: &str) -> EngineResult<Self> {
        // An empty document means "all defaults".
        let settings: EngineSettings = if content.trim().is_empty() {
            EngineSettings::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        Ok(Self {
            config: EngineConfig::from_settings(settings)?,
        })
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use rust_decimal::Decimal;

    fn config_path() -> &'static str {
        "./config"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let config = result.unwrap().into_config();
        assert_eq!(config.business_offset.local_minus_utc(), 9 * 3600);
        assert_eq!(config.default_schedule.start_time.to_string(), "09:00");
        assert_eq!(config.default_schedule.end_time.to_string(), "18:00");
        assert_eq!(config.default_schedule.standard_hours, Decimal::from_str("8").unwrap());
        assert_eq!(config.allocation_epsilon, 1e-9);
    }

    #[test]
    fn test_shipped_file_matches_defaults() {
        let loaded = ConfigLoader::load(config_path()).unwrap().into_config();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn test_missing_directory_returns_config_not_found() {
        let result = ConfigLoader::load("./config/does-not-exist");
        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.ends_with(CONFIG_FILE_NAME));
            }
            other => panic!("Expected ConfigNotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let loader = ConfigLoader::from_yaml_str("", "inline").unwrap();
        assert_eq!(loader.config(), &EngineConfig::default());
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let loader = ConfigLoader::from_yaml_str("business_utc_offset: \"-05:00\"\n", "inline").unwrap();
        assert_eq!(loader.config().business_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(loader.config().allocation_epsilon, 1e-9);
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let result = ConfigLoader::from_yaml_str("timezone: Asia/Tokyo\n", "inline");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_unknown_schedule_key_is_a_parse_error() {
        let yaml = "default_schedule:\n  start_time: \"09:00\"\n  end_time: \"18:00\"\n  break_minutes: 60\n  standard_hours: 8\n  overtime_threshold_hours: 8\n  week_start_day: 1\n  week_start_dya: 0\n";
        let result = ConfigLoader::from_yaml_str(yaml, "inline");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_malformed_time_is_a_parse_error() {
        let yaml = "default_schedule:\n  start_time: \"9am\"\n  end_time: \"18:00\"\n  break_minutes: 60\n  standard_hours: 8\n  overtime_threshold_hours: 8\n  week_start_day: 1\n";
        let result = ConfigLoader::from_yaml_str(yaml, "inline");
        assert!(matches!(result, Err(EngineError::ConfigParseError { .. })));
    }

    #[test]
    fn test_invalid_default_schedule_is_rejected() {
        let yaml = "default_schedule:\n  start_time: \"18:00\"\n  end_time: \"09:00\"\n  break_minutes: 60\n  standard_hours: 8\n  overtime_threshold_hours: 8\n  week_start_day: 1\n";
        let result = ConfigLoader::from_yaml_str(yaml, "inline");
        assert!(matches!(result, Err(EngineError::ValidationError { .. })));
    }

    #[test]
    fn test_epsilon_above_limit_is_rejected() {
        let result = ConfigLoader::from_yaml_str("allocation_epsilon: 0.01\n", "inline");
        assert!(matches!(result, Err(EngineError::ValidationError { .. })));
    }

    #[test]
    fn test_bad_offset_is_a_format_error() {
        let result = ConfigLoader::from_yaml_str("business_utc_offset: \"JST\"\n", "inline");
        assert!(matches!(result, Err(EngineError::FormatError { .. })));
    }
}
