//! HTTP request handlers for the attendance engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    calculate_work_hours, evaluate_early_departure, evaluate_late_arrival_on, is_weekend,
    summarize_month, weekend_for_schedule,
};
use crate::error::EngineError;

use super::request::{
    CreateAllocationRequest, EndMembershipRequest, EvaluateAttendanceRequest,
    MonthlySummaryRequest, ResolveScheduleRequest, UpdateAllocationRequest,
};
use super::response::{
    AllocationResponse, ApiError, ApiErrorResponse, EvaluationResponse, PruneResponse,
    ResolveScheduleResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/schedules/resolve", post(resolve_schedule_handler))
        .route("/attendance/evaluate", post(evaluate_attendance_handler))
        .route("/attendance/monthly-summary", post(monthly_summary_handler))
        .route(
            "/allocations",
            post(create_allocation_handler)
                .put(update_allocation_handler)
                .delete(end_membership_handler),
        )
        .route("/allocations/prune", post(prune_allocations_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    ApiErrorResponse::from(err).into_response()
}

/// Converts a body extraction failure into a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /schedules/resolve.
///
/// Returns the effective schedule and weekend pair for a user on a date.
async fn resolve_schedule_handler(
    State(state): State<AppState>,
    payload: Result<Json<ResolveScheduleRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing schedule resolution request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    if let Err(err) = request.validate() {
        return error_response(correlation_id, err);
    }

    let schedule = state
        .resolver()
        .resolve(state.schedules(), &request.user_id, request.date);
    let weekend = weekend_for_schedule(&schedule);

    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        date = %request.date,
        source = %schedule.source,
        "Schedule resolved"
    );
    json_response(StatusCode::OK, ResolveScheduleResponse { schedule, weekend })
}

/// Handler for POST /attendance/evaluate.
///
/// Evaluates one attendance record against the user's schedule for its date.
async fn evaluate_attendance_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateAttendanceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing attendance evaluation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    if let Err(err) = request.validate() {
        return error_response(correlation_id, err);
    }

    let offset = state.config().business_offset;
    let record = request.record;
    let schedule = state
        .resolver()
        .resolve(state.schedules(), &request.user_id, record.date);

    let lateness = evaluate_late_arrival_on(record.date, record.clock_in, Some(&schedule), offset);
    let departure = evaluate_early_departure(record.date, record.clock_out, Some(&schedule), offset);
    let work_hours = calculate_work_hours(&record, &schedule);
    let weekend = is_weekend(record.date, schedule.week_start_day);

    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        date = %record.date,
        source = %schedule.source,
        is_late = lateness.is_late(),
        "Attendance evaluated"
    );
    json_response(
        StatusCode::OK,
        EvaluationResponse {
            user_id: request.user_id,
            date: record.date,
            schedule,
            lateness,
            departure,
            work_hours,
            is_weekend: weekend,
        },
    )
}

/// Handler for POST /attendance/monthly-summary.
async fn monthly_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<MonthlySummaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing monthly summary request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };
    if let Err(err) = request.validate() {
        return error_response(correlation_id, err);
    }

    let start_time = Instant::now();
    let summary = summarize_month(
        state.resolver(),
        state.schedules(),
        &request.user_id,
        request.month,
        &request.records,
        state.config().business_offset,
    );

    info!(
        correlation_id = %correlation_id,
        user_id = %request.user_id,
        month = %request.month,
        days = summary.days_recorded,
        late_count = summary.late_count,
        degraded = summary.degraded_resolutions,
        duration_us = start_time.elapsed().as_micros(),
        "Monthly summary completed"
    );
    json_response(StatusCode::OK, summary)
}

/// Handler for POST /allocations.
///
/// Adds a project membership; 409 when it would exceed full capacity.
async fn create_allocation_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateAllocationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation create request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let now = state.clock().now();
    let result = request.active_window(now).and_then(|window| {
        state.ledger().add_member(
            &request.user_id,
            &request.project_id,
            request.allocation_fraction,
            window,
            now,
        )
    });

    match result {
        Ok(change) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                project_id = %request.project_id,
                total_allocation = change.total_allocation,
                "Allocation created"
            );
            json_response(StatusCode::CREATED, AllocationResponse::from(change))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /allocations.
///
/// Changes the fraction of an existing membership.
async fn update_allocation_handler(
    State(state): State<AppState>,
    payload: Result<Json<UpdateAllocationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation update request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let now = state.clock().now();
    let result = request.validate().and_then(|()| {
        state.ledger().reallocate(
            &request.user_id,
            &request.project_id,
            request.allocation_fraction,
            now,
        )
    });

    match result {
        Ok(change) => {
            info!(
                correlation_id = %correlation_id,
                user_id = %request.user_id,
                project_id = %request.project_id,
                total_allocation = change.total_allocation,
                "Allocation updated"
            );
            json_response(StatusCode::OK, AllocationResponse::from(change))
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /allocations.
///
/// Ends a membership. Repeating the request returns 404.
async fn end_membership_handler(
    State(state): State<AppState>,
    payload: Result<Json<EndMembershipRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing membership end request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    if state
        .ledger()
        .end_membership(&request.user_id, &request.project_id)
    {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(
            correlation_id,
            EngineError::NotFound {
                entity: "allocation".to_string(),
                id: format!("{}/{}", request.user_id, request.project_id),
            },
        )
    }
}

/// Handler for POST /allocations/prune.
///
/// Removes allocations whose window has ended. Safe to call repeatedly.
async fn prune_allocations_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    let removed = state.ledger().prune_expired(state.clock().now());
    info!(correlation_id = %correlation_id, removed, "Expired allocations pruned");
    json_response(StatusCode::OK, PruneResponse { removed })
}
