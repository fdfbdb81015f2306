//! Schedule assignment storage.

use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{AssignmentClass, ScheduleAssignment};

/// Failure reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the query.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Stored data could not be decoded.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

/// Read port used by the settings resolver.
pub trait ScheduleStore: Send + Sync {
    /// All assignments of `class` for `user_id`, in any state.
    ///
    /// Filtering by activity and validity window is the caller's job.
    fn assignments_for(
        &self,
        user_id: &str,
        class: AssignmentClass,
    ) -> Result<Vec<ScheduleAssignment>, StoreError>;
}

/// A process-local schedule store.
///
/// Defining a new assignment supersedes the user's previous active assignment
/// of the same class (and project): the predecessor's window is closed at the
/// successor's start so past dates keep resolving to it. A predecessor is
/// deactivated only when the successor's window covers all of its own.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    assignments: RwLock<Vec<ScheduleAssignment>>,
}

impl InMemoryScheduleStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores an assignment, superseding its predecessors.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationError`] if the schedule
    /// definition or the validity window is invalid. Nothing is stored then.
    pub fn define(&self, assignment: ScheduleAssignment) -> EngineResult<ScheduleAssignment> {
        assignment.schedule.validate()?;
        if let Some(until) = assignment.valid_until {
            if until <= assignment.valid_from {
                return Err(EngineError::validation(
                    "valid_until",
                    format!(
                        "window end {} must be after start {}",
                        until, assignment.valid_from
                    ),
                ));
            }
        }

        let mut assignments = self
            .assignments
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for previous in assignments.iter_mut().filter(|a| {
            a.is_active
                && a.user_id == assignment.user_id
                && a.class == assignment.class
                && a.project_id == assignment.project_id
        }) {
            if covers_window(&assignment, previous) {
                previous.is_active = false;
            } else if previous.valid_from < assignment.valid_from
                && previous
                    .valid_until
                    .is_none_or(|end| end > assignment.valid_from)
            {
                previous.valid_until = Some(assignment.valid_from);
            } else {
                continue;
            }
            info!(
                user_id = %assignment.user_id,
                superseded = %previous.id,
                successor = %assignment.id,
                "Schedule assignment superseded"
            );
        }

        assignments.push(assignment.clone());
        Ok(assignment)
    }

    /// Snapshot of every stored assignment, superseded ones included.
    pub fn all(&self) -> Vec<ScheduleAssignment> {
        self.assignments
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn covers_window(successor: &ScheduleAssignment, previous: &ScheduleAssignment) -> bool {
    if successor.valid_from > previous.valid_from {
        return false;
    }
    match (successor.valid_until, previous.valid_until) {
        (None, _) => true,
        (Some(end), Some(previous_end)) => end >= previous_end,
        (Some(_), None) => false,
    }
}

impl ScheduleStore for InMemoryScheduleStore {
    fn assignments_for(
        &self,
        user_id: &str,
        class: AssignmentClass,
    ) -> Result<Vec<ScheduleAssignment>, StoreError> {
        let assignments = self
            .assignments
            .read()
            .map_err(|_| StoreError::Unavailable("schedule store lock poisoned".to_string()))?;
        Ok(assignments
            .iter()
            .filter(|a| a.user_id == user_id && a.class == class)
            .cloned()
            .collect())
    }
}
