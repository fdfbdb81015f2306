//! Property tests for the time codec, lateness, weekends and the allocation
//! guard.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use attendance_engine::calculation::{
    AllocationGuard, LatenessOutcome, evaluate_late_arrival, format_civil_time, is_weekend,
    late_minutes, parse_civil_time, to_civil_time, to_instant, weekend_days,
};
use attendance_engine::models::{
    ActiveWindow, AllocationRecord, CivilTime, EffectiveSchedule, ScheduleDefinition,
    ScheduleSource,
};

fn civil_time() -> impl Strategy<Value = CivilTime> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| CivilTime::new(h, m).unwrap())
}

fn offset() -> impl Strategy<Value = FixedOffset> {
    (-14 * 4..=14 * 4).prop_map(|quarters: i32| FixedOffset::east_opt(quarters * 15 * 60).unwrap())
}

fn schedule_starting(start: CivilTime) -> EffectiveSchedule {
    let definition = ScheduleDefinition {
        start_time: start,
        ..ScheduleDefinition::company_default()
    };
    EffectiveSchedule::from_definition(&definition, ScheduleSource::Personal, None)
}

proptest! {
    #[test]
    fn civil_time_round_trips_through_text(time in civil_time()) {
        let text = format_civil_time(time);
        prop_assert_eq!(text.len(), 5);
        prop_assert_eq!(parse_civil_time(&text).unwrap(), time);
    }

    #[test]
    fn instant_round_trips_through_civil_time(
        time in civil_time(),
        offset in offset(),
        day in 0i64..3650,
    ) {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(day);
        let instant = to_instant(date, time, offset);
        prop_assert_eq!(to_civil_time(instant, offset), time);
    }

    #[test]
    fn clock_in_at_start_is_never_late(start in civil_time(), offset in offset()) {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let clock_in = to_instant(date, start, offset);
        let schedule = schedule_starting(start);

        match evaluate_late_arrival(Some(clock_in), Some(&schedule), offset) {
            LatenessOutcome::Evaluated(result) => {
                prop_assert!(!result.is_late);
                prop_assert_eq!(result.late_minutes, 0);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn late_minutes_are_monotonic(start in civil_time(), a in civil_time(), b in civil_time()) {
        let (earlier, later) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(late_minutes(later, start) >= late_minutes(earlier, start));
    }

    #[test]
    fn late_minutes_match_the_numeric_difference(start in civil_time(), clock_in in civil_time()) {
        let expected = clock_in.minutes_of_day().saturating_sub(start.minutes_of_day());
        prop_assert_eq!(late_minutes(clock_in, start), expected);
    }

    #[test]
    fn weekend_is_two_consecutive_days_before_week_start(week_start_day in 0u8..7) {
        let weekend = weekend_days(week_start_day);
        prop_assert_eq!(weekend.first.succ(), weekend.second);
        prop_assert_eq!(
            weekend.second.succ().num_days_from_sunday(),
            u32::from(week_start_day)
        );
    }

    #[test]
    fn exactly_two_days_per_week_are_weekend(week_start_day in 0u8..7, day in 0i64..3650) {
        let monday = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap() + Duration::weeks(day / 7);
        let count = (0..7)
            .map(|offset| monday + Duration::days(offset))
            .filter(|date| is_weekend(*date, week_start_day))
            .count();
        prop_assert_eq!(count, 2);
        prop_assert_eq!(monday.weekday(), chrono::Weekday::Mon);
    }

    #[test]
    fn guard_accepts_exactly_when_total_fits(
        existing in prop::collection::vec(0u32..=100, 0..4),
        proposed in 0u32..=100,
    ) {
        // Whole percentages keep the expected outcome independent of float noise.
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let records: Vec<AllocationRecord> = existing
            .iter()
            .enumerate()
            .map(|(i, pct)| AllocationRecord {
                user_id: "u1".to_string(),
                project_id: format!("p{i}"),
                allocation_fraction: f64::from(*pct) / 100.0,
                active_window: ActiveWindow::open(now),
            })
            .collect();

        let fits = existing.iter().sum::<u32>() + proposed <= 100;
        let result = AllocationGuard::default().check(
            "u1",
            f64::from(proposed) / 100.0,
            None,
            &records,
            now,
        );
        prop_assert_eq!(result.is_ok(), fits);
    }
}
