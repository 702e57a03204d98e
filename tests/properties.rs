//! Property tests for clock arithmetic and duration-preserving moves

mod common;

use proptest::prelude::*;

use classgrid::api::memory::InMemoryApi;
use classgrid::models::NewSlotInput;
use classgrid::timetable::clock::{add_minutes, duration_minutes, MINUTES_PER_DAY};
use classgrid::timetable::grid::TIME_BINS;
use classgrid::timetable::{TimeOfDay, Weekday};

use common::Harness;

fn any_time() -> impl Strategy<Value = TimeOfDay> {
    (0..MINUTES_PER_DAY).prop_map(TimeOfDay::from_minutes)
}

fn any_weekday() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|i| Weekday::from_index(i).unwrap())
}

proptest! {
    #[test]
    fn add_minutes_stays_in_range(time in any_time(), delta in any::<i32>()) {
        let shifted = add_minutes(time, delta);
        prop_assert!(shifted.minutes_since_midnight() < MINUTES_PER_DAY as u16);
        prop_assert!(shifted.hour() < 24);
        prop_assert!(shifted.minute() < 60);
    }

    #[test]
    fn add_minutes_inverts(time in any_time(), delta in -100_000i32..100_000) {
        prop_assert_eq!(add_minutes(add_minutes(time, delta), -delta), time);
    }

    #[test]
    fn duration_matches_add(start in any_time(), minutes in 0..MINUTES_PER_DAY) {
        let end = add_minutes(start, minutes);
        prop_assert_eq!(duration_minutes(start, end), minutes);
    }

    #[test]
    fn lenient_parse_never_panics(input in ".{0,12}") {
        let time = TimeOfDay::parse_lenient(&input);
        prop_assert!(time.minutes_since_midnight() < MINUTES_PER_DAY as u16);
    }

    #[test]
    fn display_round_trips(time in any_time()) {
        prop_assert_eq!(TimeOfDay::parse(&time.to_string()).unwrap(), time);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn move_to_bin_preserves_duration(
        start in any_time(),
        length in 1..MINUTES_PER_DAY,
        from_day in any_weekday(),
        to_day in any_weekday(),
        bin_index in 0..TIME_BINS.len(),
    ) {
        tokio_test::block_on(async {
            let input = NewSlotInput {
                class_assigned: 1,
                weekday: from_day,
                start_time: start,
                end_time: add_minutes(start, length),
                subject: None,
                teacher: None,
            };
            let api = InMemoryApi::demo().with_slot(input);
            let mut h = Harness::with_api(api, true).await;
            let id = h.engine.store().slots()[0].id;
            let bin = TIME_BINS[bin_index];

            let moved = h.engine.move_to_bin(id, to_day, bin).await.unwrap();

            assert_eq!(moved.weekday, to_day);
            assert_eq!(moved.start_time, bin);
            assert_eq!(moved.duration_minutes(), length);
        });
    }

    #[test]
    fn move_to_day_keeps_times(
        start in any_time(),
        length in 1..MINUTES_PER_DAY,
        to_day in any_weekday(),
    ) {
        tokio_test::block_on(async {
            let input = NewSlotInput {
                class_assigned: 2,
                weekday: Weekday::Monday,
                start_time: start,
                end_time: add_minutes(start, length),
                subject: None,
                teacher: None,
            };
            let mut h = Harness::with_api(InMemoryApi::demo().with_slot(input), true).await;
            let before = h.engine.store().slots()[0].clone();

            let after = h.engine.move_to_day(before.id, to_day).await.unwrap();

            assert_eq!(after.start_time, before.start_time);
            assert_eq!(after.end_time, before.end_time);
        });
    }
}
