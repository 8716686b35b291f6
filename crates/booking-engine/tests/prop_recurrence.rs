//! Property-based tests for recurrence expansion.

use std::collections::BTreeMap;

use booking_engine::{
    expand_recurrence, BusyEvent, EngineConfig, RecurrencePattern, RecurrenceSpec, TimeInterval,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;

fn arb_pattern() -> impl Strategy<Value = RecurrencePattern> {
    prop_oneof![
        Just(RecurrencePattern::Weekly),
        Just(RecurrencePattern::Biweekly),
    ]
}

/// Start dates across June 2025.
fn arb_start_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=28).prop_map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
}

fn arb_preferred() -> impl Strategy<Value = NaiveTime> {
    (6u32..=20, prop_oneof![Just(0u32), Just(30u32)])
        .prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

/// A feed with a couple of busy events scattered over the horizon.
fn arb_feed() -> impl Strategy<Value = BTreeMap<NaiveDate, Vec<BusyEvent>>> {
    prop::collection::vec((1u32..=28, 8i64..=18, 1i64..=4), 0..6).prop_map(|entries| {
        let mut feed: BTreeMap<NaiveDate, Vec<BusyEvent>> = BTreeMap::new();
        for (day, start_hour, len_hours) in entries {
            let date = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
            let start = date.and_hms_opt(start_hour as u32, 0, 0).unwrap().and_utc();
            let end = start + Duration::hours(len_hours);
            feed.entry(date)
                .or_default()
                .push(BusyEvent::new(TimeInterval::new(start, end).unwrap(), None));
        }
        feed
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Expansion is deterministic
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn expansion_is_deterministic(
        pattern in arb_pattern(),
        start_date in arb_start_date(),
        preferred in arb_preferred(),
        horizon in 1u32..=8,
        duration in 15u32..=120,
        feed in arb_feed(),
    ) {
        let engine_config = EngineConfig::default();
        let spec = RecurrenceSpec {
            pattern,
            days_of_week: vec![],
            preferred_time: preferred,
            start_date,
            horizon_weeks: horizon,
        };

        let first = expand_recurrence(&spec, duration, &feed, &engine_config).unwrap();
        let second = expand_recurrence(&spec, duration, &feed, &engine_config).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Partitions are disjoint and cover every target date
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn partitions_are_disjoint_and_complete(
        pattern in arb_pattern(),
        start_date in arb_start_date(),
        preferred in arb_preferred(),
        horizon in 1u32..=8,
        duration in 15u32..=120,
        feed in arb_feed(),
    ) {
        let engine_config = EngineConfig::default();
        let spec = RecurrenceSpec {
            pattern,
            days_of_week: vec![],
            preferred_time: preferred,
            start_date,
            horizon_weeks: horizon,
        };

        let outcome = expand_recurrence(&spec, duration, &feed, &engine_config).unwrap();

        let mut dates: Vec<NaiveDate> = outcome.confirmed.iter().map(|c| c.date).collect();
        dates.extend(outcome.conflicting.iter().map(|c| c.date));
        dates.extend(outcome.blocked.iter().map(|b| b.date));
        dates.sort();

        // One classification per target date, no date in two partitions.
        prop_assert_eq!(dates.len(), horizon as usize);
        for pair in dates.windows(2) {
            prop_assert!(pair[0] < pair[1], "duplicate target date {:?}", pair[0]);
        }

        // Every target date keeps the spec's weekday.
        for date in &dates {
            prop_assert_eq!(date.weekday(), start_date.weekday());
        }

        // Confirmed occurrences start at the preferred time.
        for c in &outcome.confirmed {
            prop_assert_eq!(c.start, c.date.and_time(preferred).and_utc());
        }
    }
}
