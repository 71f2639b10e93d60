//! Property-based tests for expansion and aggregation using proptest.
//!
//! These tests verify invariants that should hold for *any* well-formed event
//! definition and window, not just the scenarios in `expander_tests.rs`.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use liturgy_engine::rule::{Frequency, Ordinal, RecurrenceRule};
use liturgy_engine::{
    expand, generate, DateWindow, EngineConfig, EventDefinition, ScheduleFilter,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A date in 2023-2025.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..1096).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + Days::new(offset)
    })
}

fn arb_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Biweekly),
        Just(Frequency::MonthlyOrdinal),
        Just(Frequency::MonthlyDay),
        Just(Frequency::Yearly),
    ]
}

fn arb_ordinal() -> impl Strategy<Value = Ordinal> {
    prop_oneof![
        Just(Ordinal::First),
        Just(Ordinal::Second),
        Just(Ordinal::Third),
        Just(Ordinal::Fourth),
        Just(Ordinal::Last),
    ]
}

fn arb_rule() -> impl Strategy<Value = RecurrenceRule> {
    (
        arb_frequency(),
        proptest::sample::subsequence(WEEKDAYS.to_vec(), 0..=7),
        arb_ordinal(),
        0usize..7,
        proptest::option::of(1u32..=31),
        proptest::option::of(arb_date()),
    )
        .prop_map(|(frequency, days, ordinal, day_idx, month_day, end_date)| RecurrenceRule {
            frequency,
            days,
            ordinal,
            ordinal_day: WEEKDAYS[day_idx],
            month_day,
            end_date,
        })
}

/// Mostly recurring definitions, with some special, legacy and inactive ones.
fn arb_definition() -> impl Strategy<Value = EventDefinition> {
    (
        0u32..1000,
        arb_date(),
        0u32..24,
        0u32..60,
        arb_rule(),
        proptest::collection::vec(arb_date(), 0..6),
        0u8..10,
        0u64..4,
    )
        .prop_map(|(id, start, hour, minute, rule, exceptions, kind, church)| {
            let start_text = format!("{}T{:02}:{:02}", start, hour, minute);
            let mut def =
                EventDefinition::new(format!("def-{id}"), start_text).at_church(church);
            def.exception_dates = exceptions.into_iter().collect();
            match kind {
                0 => def.special(),
                1 => def,
                2 => def.recurring(rule).inactive(),
                _ => def.recurring(rule),
            }
        })
}

/// A window of 1 to 120 days.
fn arb_window() -> impl Strategy<Value = DateWindow> {
    (arb_date(), 0u64..120).prop_map(|(start, len)| {
        DateWindow::new(start, start + Days::new(len)).unwrap()
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Every occurrence lies inside the window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn occurrences_stay_in_window(def in arb_definition(), window in arb_window()) {
        let occurrences = expand(&def, &window, &EngineConfig::default()).unwrap();
        for occ in &occurrences {
            prop_assert!(
                window.contains(occ.date),
                "{} outside {:?}",
                occ.date,
                window
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Property 2: Exception dates never produce an occurrence
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn exceptions_respected(def in arb_definition(), window in arb_window()) {
        let occurrences = expand(&def, &window, &EngineConfig::default()).unwrap();
        for occ in &occurrences {
            prop_assert!(!def.exception_dates.contains(&occ.date), "excepted {}", occ.date);
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Nothing on or after a recurring rule's end date
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn end_date_respected(def in arb_definition(), window in arb_window()) {
        let occurrences = expand(&def, &window, &EngineConfig::default()).unwrap();
        if def.is_special_event {
            return Ok(());
        }
        if let Some(end) = def.recurrence_rule.as_ref().and_then(|r| r.end_date) {
            for occ in &occurrences {
                prop_assert!(occ.date < end, "{} not before end {}", occ.date, end);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: Biweekly occurrences on the same weekday are 14-day multiples apart
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn biweekly_never_adjacent_weeks(
        start in arb_date(),
        days in proptest::sample::subsequence(WEEKDAYS.to_vec(), 1..=7),
        window in arb_window(),
    ) {
        let rule = RecurrenceRule {
            frequency: Frequency::Biweekly,
            days,
            ..RecurrenceRule::default()
        };
        let def = EventDefinition::new("bi", format!("{start}T09:00")).recurring(rule);
        let occurrences = expand(&def, &window, &EngineConfig::default()).unwrap();

        for a in &occurrences {
            for b in &occurrences {
                if a.date < b.date && a.date.weekday() == b.date.weekday() {
                    let gap = (b.date - a.date).num_days();
                    prop_assert_eq!(
                        gap % 14,
                        0,
                        "{} and {} are {} days apart",
                        a.date,
                        b.date,
                        gap
                    );
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Inactive definitions never produce occurrences
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn inactive_excluded(def in arb_definition(), window in arb_window()) {
        let def = def.inactive();
        let occurrences = expand(&def, &window, &EngineConfig::default()).unwrap();
        prop_assert!(occurrences.is_empty());

        let schedule = generate(
            &[def],
            &window,
            &ScheduleFilter::default(),
            &EngineConfig::default(),
        )
        .unwrap();
        prop_assert!(schedule.occurrences.is_empty());
        prop_assert!(schedule.warnings.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Property 6: generate is idempotent, sorted, and traceable to its inputs
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn generate_idempotent_and_sorted(
        defs in proptest::collection::vec(arb_definition(), 0..8),
        window in arb_window(),
    ) {
        let filter = ScheduleFilter::default();
        let config = EngineConfig::default();
        let first = generate(&defs, &window, &filter, &config).unwrap();
        let second = generate(&defs, &window, &filter, &config).unwrap();
        prop_assert_eq!(&first, &second);

        for pair in first.occurrences.windows(2) {
            prop_assert!(
                (pair[0].date, pair[0].time) <= (pair[1].date, pair[1].time),
                "not sorted: {:?} > {:?}",
                (pair[0].date, pair[0].time),
                (pair[1].date, pair[1].time)
            );
        }

        for occ in &first.occurrences {
            prop_assert!(
                defs.iter().any(|d| d.id == occ.event_definition_id && d.is_active),
                "occurrence for unknown or inactive definition {}",
                occ.event_definition_id
            );
        }
    }
}
