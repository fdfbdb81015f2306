//! Error types for the attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while resolving schedules,
//! evaluating attendance and guarding project allocations.

use thiserror::Error;

/// The main error type for the attendance engine.
///
/// Storage failures during schedule lookup are recovered inside the resolver
/// and never reach callers as this type; everything else is surfaced.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::FormatError {
///     input: "9:00".to_string(),
///     message: "expected HH:MM".to_string(),
/// };
/// assert_eq!(error.to_string(), "Invalid time '9:00': expected HH:MM");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A wall-clock or offset string was malformed.
    #[error("Invalid time '{input}': {message}")]
    FormatError {
        /// The rejected input.
        input: String,
        /// What was wrong with it.
        message: String,
    },

    /// Schedule storage failed during lookup.
    #[error("Schedule resolution failed for user '{user_id}': {message}")]
    ResolutionError {
        /// The user being resolved.
        user_id: String,
        /// The underlying storage failure.
        message: String,
    },

    /// A proposed allocation would push the user above full capacity.
    #[error(
        "Allocation conflict for user '{user_id}': current {current_total} + proposed {proposed} = {would_be_total} exceeds 1.0"
    )]
    AllocationConflict {
        /// The user whose capacity was exceeded.
        user_id: String,
        /// Sum of the user's other active allocations.
        current_total: f64,
        /// The fraction that was requested.
        proposed: f64,
        /// What the total would have become.
        would_be_total: f64,
    },

    /// Input failed a domain rule.
    #[error("Invalid '{field}': {message}")]
    ValidationError {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: String,
        /// Its identifier.
        id: String,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::ValidationError`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a [`EngineError::FormatError`].
    pub fn format(input: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::FormatError {
            input: input.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
