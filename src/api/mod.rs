//! HTTP API module for the attendance engine.
//!
//! This module exposes schedule resolution, attendance evaluation, monthly
//! summaries and project allocation management as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CreateAllocationRequest, EndMembershipRequest, EvaluateAttendanceRequest,
    MonthlySummaryRequest, ResolveScheduleRequest, UpdateAllocationRequest,
};
pub use response::{
    AllocationResponse, ApiError, ConflictDetails, EvaluationResponse, PruneResponse,
    ResolveScheduleResponse,
};
pub use state::AppState;
