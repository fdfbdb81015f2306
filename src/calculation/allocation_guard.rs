//! Project allocation capacity guard.
//!
//! Decides whether a proposed allocation fraction fits next to a user's other
//! active allocations without taking the total above full capacity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::AllocationRecord;

/// Tolerance applied to the capacity check.
///
/// Large enough to absorb float summation noise (`0.1 + 0.2`), far too small
/// to hide a real overcommitment.
pub const DEFAULT_ALLOCATION_EPSILON: f64 = 1e-9;

/// Full-time capacity.
pub const FULL_CAPACITY: f64 = 1.0;

/// Totals behind an accepted allocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationCheck {
    /// Sum of the user's other active allocations.
    pub current_total: f64,
    /// The fraction that was requested.
    pub proposed: f64,
    /// Total after the allocation is applied.
    pub would_be_total: f64,
}

/// Checks proposed allocation fractions against existing ones.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::AllocationGuard;
/// use attendance_engine::models::{ActiveWindow, AllocationRecord};
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
/// let existing = vec![AllocationRecord {
///     user_id: "u1".to_string(),
///     project_id: "apollo".to_string(),
///     allocation_fraction: 0.8,
///     active_window: ActiveWindow::open(now),
/// }];
///
/// let guard = AllocationGuard::default();
/// assert!(guard.check("u1", 0.2, None, &existing, now).is_ok());
/// assert!(guard.check("u1", 0.3, None, &existing, now).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllocationGuard {
    epsilon: f64,
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_ALLOCATION_EPSILON,
        }
    }
}

impl AllocationGuard {
    /// Creates a guard with a custom tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ValidationError`] unless
    /// `0 <= epsilon <= DEFAULT_ALLOCATION_EPSILON`.
    pub fn with_epsilon(epsilon: f64) -> EngineResult<Self> {
        if !(0.0..=DEFAULT_ALLOCATION_EPSILON).contains(&epsilon) {
            return Err(EngineError::validation(
                "allocation_epsilon",
                format!("{epsilon} is outside [0, {DEFAULT_ALLOCATION_EPSILON}]"),
            ));
        }
        Ok(Self { epsilon })
    }

    /// The configured tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Checks whether `proposed` fits for `user_id`.
    ///
    /// `existing` may hold any records; only those belonging to `user_id`,
    /// active at `now` and not for `exclude_project` are summed. Pass the
    /// project being updated as `exclude_project` so its old fraction is not
    /// counted twice.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ValidationError`] if `proposed` is not a finite value
    ///   in `[0, 1]`. The value is never clamped.
    /// - [`EngineError::AllocationConflict`] carrying the current total, the
    ///   proposed fraction and the would-be total if capacity is exceeded.
    pub fn check(
        &self,
        user_id: &str,
        proposed: f64,
        exclude_project: Option<&str>,
        existing: &[AllocationRecord],
        now: DateTime<Utc>,
    ) -> EngineResult<AllocationCheck> {
        validate_fraction(proposed)?;

        let current_total: f64 = existing
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| exclude_project.is_none_or(|p| r.project_id != p))
            .filter(|r| r.is_active_at(now))
            .map(|r| r.allocation_fraction)
            .sum();
        let would_be_total = current_total + proposed;

        if would_be_total > FULL_CAPACITY + self.epsilon {
            info!(
                user_id = %user_id,
                current_total,
                proposed,
                would_be_total,
                "Allocation rejected: capacity exceeded"
            );
            return Err(EngineError::AllocationConflict {
                user_id: user_id.to_string(),
                current_total,
                proposed,
                would_be_total,
            });
        }

        debug!(user_id = %user_id, would_be_total, "Allocation fits");
        Ok(AllocationCheck {
            current_total,
            proposed,
            would_be_total,
        })
    }
}

/// Rejects fractions that are not finite values in `[0, 1]`.
pub fn validate_fraction(fraction: f64) -> EngineResult<()> {
    if !fraction.is_finite() || !(0.0..=FULL_CAPACITY).contains(&fraction) {
        return Err(EngineError::validation(
            "allocation_fraction",
            format!("{fraction} is not within [0, 1]"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActiveWindow;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap()
    }

    fn record(user: &str, project: &str, fraction: f64) -> AllocationRecord {
        AllocationRecord {
            user_id: user.to_string(),
            project_id: project.to_string(),
            allocation_fraction: fraction,
            active_window: ActiveWindow::open(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_rejects_total_above_one() {
        let existing = vec![record("u1", "p1", 0.5), record("u1", "p2", 0.3)];
        let err = AllocationGuard::default()
            .check("u1", 0.3, None, &existing, now())
            .unwrap_err();

        match err {
            EngineError::AllocationConflict {
                current_total,
                proposed,
                would_be_total,
                ..
            } => {
                assert!((current_total - 0.8).abs() < 1e-12);
                assert_eq!(proposed, 0.3);
                assert!((would_be_total - 1.1).abs() < 1e-12);
            }
            other => panic!("expected AllocationConflict, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_total_exactly_one() {
        let existing = vec![record("u1", "p1", 0.8)];
        let check = AllocationGuard::default()
            .check("u1", 0.2, None, &existing, now())
            .unwrap();
        assert!((check.would_be_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_float_noise_is_tolerated() {
        // 0.1 + 0.2 + 0.7 sums to slightly more than 1.0 in binary floating point.
        let existing = vec![record("u1", "p1", 0.1), record("u1", "p2", 0.2)];
        assert!(AllocationGuard::default()
            .check("u1", 0.7, None, &existing, now())
            .is_ok());
    }

    #[test]
    fn test_small_real_overcommitment_is_rejected() {
        let existing = vec![record("u1", "p1", 0.5)];
        assert!(AllocationGuard::default()
            .check("u1", 0.500001, None, &existing, now())
            .is_err());
    }

    #[test]
    fn test_excluded_project_is_not_counted() {
        let existing = vec![record("u1", "p1", 0.6), record("u1", "p2", 0.4)];
        let check = AllocationGuard::default()
            .check("u1", 0.6, Some("p1"), &existing, now())
            .unwrap();
        assert!((check.current_total - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_other_users_and_inactive_records_are_ignored() {
        let mut expired = record("u1", "p3", 0.9);
        expired.active_window.ends_at = Some(Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap());
        let mut future = record("u1", "p4", 0.9);
        future.active_window.starts_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let existing = vec![record("u2", "p1", 0.9), expired, future];

        let check = AllocationGuard::default()
            .check("u1", 1.0, None, &existing, now())
            .unwrap();
        assert_eq!(check.current_total, 0.0);
    }

    #[test]
    fn test_out_of_range_fraction_is_not_clamped() {
        let guard = AllocationGuard::default();
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            let err = guard.check("u1", bad, None, &[], now()).unwrap_err();
            assert!(matches!(err, EngineError::ValidationError { .. }));
        }
    }

    #[test]
    fn test_with_epsilon_bounds() {
        assert!(AllocationGuard::with_epsilon(0.0).is_ok());
        assert!(AllocationGuard::with_epsilon(1e-9).is_ok());
        assert!(AllocationGuard::with_epsilon(1e-3).is_err());
        assert!(AllocationGuard::with_epsilon(-1e-12).is_err());
    }
}
