//! Response types for the attendance engine API.
//!
//! This module defines the success bodies for each endpoint, the error
//! response structures and the mapping from [`EngineError`] to HTTP status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::{DepartureOutcome, LatenessOutcome, WeekendDays, WorkHours};
use crate::error::EngineError;
use crate::models::{AllocationRecord, EffectiveSchedule};
use crate::store::AllocationChange;

/// Response body for `POST /schedules/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveScheduleResponse {
    /// The schedule in force, tagged with its source.
    pub schedule: EffectiveSchedule,
    /// The weekend pair under that schedule.
    pub weekend: WeekendDays,
}

/// Response body for `POST /attendance/evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    /// The user evaluated.
    pub user_id: String,
    /// The record date.
    pub date: NaiveDate,
    /// The schedule the record was evaluated against.
    pub schedule: EffectiveSchedule,
    /// Lateness of the clock-in.
    pub lateness: LatenessOutcome,
    /// Early departure of the clock-out.
    pub departure: DepartureOutcome,
    /// Work hours, absent when not computable.
    pub work_hours: Option<WorkHours>,
    /// Whether the date is a weekend under the schedule.
    pub is_weekend: bool,
}

/// Response body for allocation writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationResponse {
    /// The stored allocation.
    pub allocation: AllocationRecord,
    /// The user's total active allocation after the write.
    pub total_allocation: f64,
}

impl From<AllocationChange> for AllocationResponse {
    fn from(change: AllocationChange) -> Self {
        Self {
            allocation: change.record,
            total_allocation: change.total_allocation,
        }
    }
}

/// Response body for `POST /allocations/prune`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneResponse {
    /// Number of expired allocations removed.
    pub removed: usize,
}

/// Capacity figures returned with an allocation conflict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictDetails {
    /// Sum of the user's other active allocations.
    pub current_total: f64,
    /// The fraction that was requested.
    pub proposed: f64,
    /// Total had the allocation been applied.
    pub would_be_total: f64,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Capacity figures for an allocation conflict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ConflictDetails>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            conflict: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::FormatError { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("FORMAT_ERROR", message),
            },
            EngineError::ValidationError { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("The field '{}' contains invalid information", field),
                ),
            },
            EngineError::ResolutionError { .. } => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::new("RESOLUTION_ERROR", message),
            },
            EngineError::AllocationConflict {
                current_total,
                proposed,
                would_be_total,
                ..
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError {
                    conflict: Some(ConflictDetails {
                        current_total,
                        proposed,
                        would_be_total,
                    }),
                    ..ApiError::new("ALLOCATION_CONFLICT", message)
                },
            },
            EngineError::NotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", message),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
        assert!(!json.contains("conflict"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_error_response_carries_status_and_json_body() {
        let response = ApiErrorResponse::from(EngineError::NotFound {
            entity: "allocation".to_string(),
            id: "u1/p1".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_allocation_conflict_maps_to_409_with_figures() {
        let engine_error = EngineError::AllocationConflict {
            user_id: "u1".to_string(),
            current_total: 0.8,
            proposed: 0.3,
            would_be_total: 1.1,
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "ALLOCATION_CONFLICT");
        let conflict = api_error.error.conflict.unwrap();
        assert_eq!(conflict.proposed, 0.3);
        assert_eq!(conflict.would_be_total, 1.1);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let engine_error = EngineError::NotFound {
            entity: "allocation".to_string(),
            id: "u1/p1".to_string(),
        };
        let api_error: ApiErrorResponse = engine_error.into();
        assert_eq!(api_error.status, StatusCode::NOT_FOUND);
        assert!(api_error.error.message.contains("u1/p1"));
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let api_error: ApiErrorResponse =
            EngineError::validation("allocation_fraction", "1.5 is not within [0, 1]").into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "VALIDATION_ERROR");
    }
}
