//! Configuration loading and management for the attendance engine.
//!
//! This module loads the business UTC offset, the company default schedule
//! and the allocation tolerance from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap().into_config();
//! println!("Default start: {}", config.default_schedule.start_time);
//! ```

mod loader;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};
pub use types::{DEFAULT_BUSINESS_OFFSET, EngineConfig, EngineSettings};
