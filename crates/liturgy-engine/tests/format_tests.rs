//! Tests for recurrence descriptions, time labels and badges.

use chrono::{NaiveTime, Weekday};
use liturgy_engine::format::{badges, format_time, format_time_range, Badge, TimeStyle};
use liturgy_engine::rule::{normalize, Frequency, Ordinal};
use liturgy_engine::{
    describe, describe_raw, expand, DateWindow, EngineConfig, EventDefinition, RecurrenceRule,
};
use serde_json::json;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

// ---------------------------------------------------------------------------
// describe
// ---------------------------------------------------------------------------

#[test]
fn one_time_when_not_recurring() {
    let rule = RecurrenceRule::weekly(&[Weekday::Sun]);
    assert_eq!(describe(Some(&rule), false), "One-time");
    assert_eq!(describe(None, false), "One-time");
}

#[test]
fn recurring_without_rule_is_custom() {
    assert_eq!(describe(None, true), "Custom");
}

#[test]
fn describes_each_frequency() {
    let daily = RecurrenceRule::default().with_frequency(Frequency::Daily);
    assert_eq!(describe(Some(&daily), true), "Daily");

    let weekly = RecurrenceRule::weekly(&[Weekday::Wed, Weekday::Sun]);
    assert_eq!(describe(Some(&weekly), true), "Every Sunday, Wednesday");

    let biweekly = RecurrenceRule::weekly(&[Weekday::Sat]).with_frequency(Frequency::Biweekly);
    assert_eq!(describe(Some(&biweekly), true), "Every other Saturday");

    let monthly = RecurrenceRule {
        frequency: Frequency::MonthlyOrdinal,
        ordinal: Ordinal::Last,
        ordinal_day: Weekday::Thu,
        ..RecurrenceRule::default()
    };
    assert_eq!(describe(Some(&monthly), true), "Last Thursday monthly");

    let month_day = RecurrenceRule {
        frequency: Frequency::MonthlyDay,
        month_day: Some(22),
        ..RecurrenceRule::default()
    };
    assert_eq!(describe(Some(&month_day), true), "Monthly on the 22nd");
    let month_day = RecurrenceRule::default().with_frequency(Frequency::MonthlyDay);
    assert_eq!(describe(Some(&month_day), true), "Monthly");

    let yearly = RecurrenceRule::default().with_frequency(Frequency::Yearly);
    assert_eq!(describe(Some(&yearly), true), "Yearly");
}

#[test]
fn weekly_without_days_reads_plainly() {
    assert_eq!(describe(Some(&RecurrenceRule::default()), true), "Weekly");
    let biweekly = RecurrenceRule::default().with_frequency(Frequency::Biweekly);
    assert_eq!(describe(Some(&biweekly), true), "Every other week");
}

// ---------------------------------------------------------------------------
// describe_raw
// ---------------------------------------------------------------------------

#[test]
fn raw_legacy_and_unknown_tags() {
    assert_eq!(describe_raw(&json!({ "frequency": "bimonthly" }), true), "Every 2 months");
    assert_eq!(describe_raw(&json!({ "frequency": "hourly" }), true), "Custom");
    assert_eq!(describe_raw(&json!({}), true), "Custom");
    assert_eq!(describe_raw(&json!({ "frequency": "hourly" }), false), "One-time");
}

#[test]
fn raw_monthly_needs_both_fields() {
    let full = json!({
        "frequency": "monthly_ordinal",
        "ordinal": "first",
        "ordinalDay": "Friday"
    });
    assert_eq!(describe_raw(&full, true), "First Friday monthly");

    let partial = json!({ "frequency": "monthly_ordinal", "ordinal": "second" });
    assert_eq!(describe_raw(&partial, true), "Monthly");
}

#[test]
fn raw_weekly_matches_sanitized_description() {
    let raw = json!({ "frequency": "weekly", "days": ["sunday", "Bogus", "Friday"] });
    assert_eq!(describe_raw(&raw, true), "Every Sunday, Friday");
    assert_eq!(describe_raw(&raw, true), describe(Some(&normalize(&raw)), true));
}

// ---------------------------------------------------------------------------
// Times
// ---------------------------------------------------------------------------

#[test]
fn twelve_hour_times() {
    assert_eq!(format_time(time(8, 0), TimeStyle::TwelveHour), "8:00 AM");
    assert_eq!(format_time(time(13, 30), TimeStyle::TwelveHour), "1:30 PM");
    assert_eq!(format_time(time(0, 15), TimeStyle::TwelveHour), "12:15 AM");
    assert_eq!(format_time(time(12, 0), TimeStyle::TwelveHour), "12:00 PM");
}

#[test]
fn twenty_four_hour_times() {
    assert_eq!(format_time(time(8, 0), TimeStyle::TwentyFourHour), "08:00");
    assert_eq!(format_time(time(19, 45), TimeStyle::TwentyFourHour), "19:45");
}

#[test]
fn time_ranges() {
    assert_eq!(
        format_time_range(time(8, 0), 60, TimeStyle::TwelveHour),
        "8:00 AM - 9:00 AM"
    );
    assert_eq!(
        format_time_range(time(23, 30), 60, TimeStyle::TwentyFourHour),
        "23:30 - 00:30"
    );
    assert_eq!(format_time_range(time(8, 0), 0, TimeStyle::TwelveHour), "8:00 AM");
}

// ---------------------------------------------------------------------------
// Badges
// ---------------------------------------------------------------------------

#[test]
fn badges_for_recurring_livestream_and_special() {
    let window = DateWindow::parse("2024-01-07", "2024-01-07").unwrap();
    let config = EngineConfig::default();

    let recurring = EventDefinition::new("m", "2024-01-07T10:00")
        .recurring(RecurrenceRule::weekly(&[Weekday::Sun]))
        .livestreamed();
    let occs = expand(&recurring, &window, &config).unwrap();
    assert_eq!(badges(&occs[0]), vec![Badge::Livestream, Badge::Recurring]);

    let special = EventDefinition::new("s", "2024-01-07T15:00").special();
    let occs = expand(&special, &window, &config).unwrap();
    assert_eq!(badges(&occs[0]), vec![Badge::Special]);
    assert_eq!(Badge::Special.label(), "Special");

    let legacy = EventDefinition::new("l", "2024-01-07T17:00");
    let occs = expand(&legacy, &window, &config).unwrap();
    assert!(badges(&occs[0]).is_empty());
}
