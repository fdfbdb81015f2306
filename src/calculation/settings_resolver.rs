//! Effective schedule resolution.
//!
//! Resolves exactly one [`EffectiveSchedule`] per user and date using the
//! precedence project > personal > company default. Storage failures never
//! escape: they degrade to the default tagged [`ScheduleSource::Error`].

use chrono::NaiveDate;
use tracing::{debug, error, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssignmentClass, EffectiveSchedule, ScheduleAssignment, ScheduleDefinition, ScheduleSource,
};
use crate::store::ScheduleStore;

/// Chooses the schedule in force for a user on a date.
///
/// The resolver holds only the company default; the store is passed on each
/// call so independent evaluations share no state.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::SettingsResolver;
/// use attendance_engine::models::ScheduleSource;
/// use attendance_engine::store::InMemoryScheduleStore;
/// use chrono::NaiveDate;
///
/// let resolver = SettingsResolver::default();
/// let store = InMemoryScheduleStore::new();
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
///
/// let schedule = resolver.resolve(&store, "u1", date);
/// assert_eq!(schedule.source, ScheduleSource::Default);
/// assert_eq!(schedule.start_time.to_string(), "09:00");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsResolver {
    default_schedule: ScheduleDefinition,
}

impl SettingsResolver {
    /// Creates a resolver falling back to `default_schedule`.
    pub fn new(default_schedule: ScheduleDefinition) -> Self {
        Self { default_schedule }
    }

    /// The company default this resolver falls back to.
    pub fn default_schedule(&self) -> &ScheduleDefinition {
        &self.default_schedule
    }

    /// Resolves the effective schedule for `user_id` on `date`.
    ///
    /// Never fails. A storage failure yields the company default with
    /// `source = ERROR` so reports can tell it apart from a genuine default.
    pub fn resolve(
        &self,
        store: &dyn ScheduleStore,
        user_id: &str,
        date: NaiveDate,
    ) -> EffectiveSchedule {
        match self.try_resolve(store, user_id, date) {
            Ok(schedule) => {
                debug!(
                    user_id = %user_id,
                    date = %date,
                    source = %schedule.source,
                    "Schedule resolved"
                );
                schedule
            }
            Err(err) => {
                error!(
                    user_id = %user_id,
                    date = %date,
                    error = %err,
                    "Schedule lookup failed, falling back to company default"
                );
                EffectiveSchedule::from_definition(
                    &self.default_schedule,
                    ScheduleSource::Error,
                    None,
                )
            }
        }
    }

    fn try_resolve(
        &self,
        store: &dyn ScheduleStore,
        user_id: &str,
        date: NaiveDate,
    ) -> EngineResult<EffectiveSchedule> {
        for class in [AssignmentClass::Project, AssignmentClass::Personal] {
            if let Some(assignment) = pick(store, user_id, class, date)? {
                let label = match class {
                    AssignmentClass::Project => assignment
                        .label
                        .clone()
                        .or_else(|| assignment.project_id.clone()),
                    AssignmentClass::Personal => None,
                };
                return Ok(EffectiveSchedule::from_definition(
                    &assignment.schedule,
                    class.source(),
                    label,
                ));
            }
        }

        Ok(EffectiveSchedule::from_definition(
            &self.default_schedule,
            ScheduleSource::Default,
            None,
        ))
    }
}

/// The most recently created assignment of `class` that applies on `date`.
fn pick(
    store: &dyn ScheduleStore,
    user_id: &str,
    class: AssignmentClass,
    date: NaiveDate,
) -> EngineResult<Option<ScheduleAssignment>> {
    let candidates = store
        .assignments_for(user_id, class)
        .map_err(|err| EngineError::ResolutionError {
            user_id: user_id.to_string(),
            message: err.to_string(),
        })?;

    let applicable: Vec<ScheduleAssignment> = candidates
        .into_iter()
        .filter(|a| a.user_id == user_id && a.class == class && a.applies_on(date))
        .filter(|a| match a.schedule.validate() {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    assignment_id = %a.id,
                    error = %err,
                    "Skipping stored assignment with invalid schedule"
                );
                false
            }
        })
        .collect();

    if class == AssignmentClass::Personal && applicable.len() > 1 {
        warn!(
            user_id = %user_id,
            date = %date,
            count = applicable.len(),
            "Several personal schedules apply; using the most recent"
        );
    }

    Ok(applicable.into_iter().max_by_key(|a| a.created_at))
}
