//! Occurrence expansion -- turns one event definition into concrete dated occurrences.
//!
//! Recurring definitions describe a standing schedule: their start timestamp
//! supplies the time of day (and the biweekly/yearly anchor) but does not bound
//! the expansion from below. Only the window, the exception dates and the
//! rule's end date do.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Weekday};

use crate::config::EngineConfig;
use crate::error::{LiturgyError, Result};
use crate::model::{EventDefinition, Occurrence};
use crate::rule::{Frequency, Ordinal, RecurrenceRule};
use crate::window::{parse_start_date_time, DateWindow};

/// Expand one definition over an inclusive date window.
///
/// Cases are tried in priority order: special event, recurring rule, then the
/// legacy weekday inference for plain definitions. Inactive definitions expand
/// to nothing.
///
/// Occurrences inferred from the start weekday are a standing weekly schedule,
/// so they are not flagged `is_special` and stay in the weekly grid. With
/// `config.infer_legacy_weekday` off the same definition yields one special
/// occurrence.
///
/// # Errors
/// Returns `LiturgyError::WindowTooLarge` if the window exceeds
/// `config.max_window_days`.
/// Returns `LiturgyError::UnparseableStartDateTime` if `start_date_time` cannot be parsed.
/// Returns `LiturgyError::InvalidRecurrenceRule` if the definition is recurring
/// but carries no rule.
pub fn expand(
    definition: &EventDefinition,
    window: &DateWindow,
    config: &EngineConfig,
) -> Result<Vec<Occurrence>> {
    config.check_window(window)?;
    expand_within(definition, window, config)
}

/// [`expand`] without the window bound check; the aggregator checks once per call.
pub(crate) fn expand_within(
    definition: &EventDefinition,
    window: &DateWindow,
    config: &EngineConfig,
) -> Result<Vec<Occurrence>> {
    if !definition.is_active {
        return Ok(Vec::new());
    }

    let start = parse_start_date_time(&definition.start_date_time).ok_or_else(|| {
        LiturgyError::UnparseableStartDateTime {
            id: definition.id.clone(),
            value: definition.start_date_time.clone(),
        }
    })?;
    let anchor = start.date();
    let time = start.time();

    if definition.is_special_event {
        return Ok(single(definition, anchor, time, window));
    }

    if definition.is_recurring {
        let rule = definition.recurrence_rule.as_ref().ok_or_else(|| {
            LiturgyError::InvalidRecurrenceRule {
                id: definition.id.clone(),
            }
        })?;
        let occurrences: Vec<Occurrence> = rule_dates(rule, anchor, window)
            .into_iter()
            .filter(|date| !rule.has_ended_by(*date))
            .filter(|date| !definition.exception_dates.contains(date))
            .map(|date| Occurrence::from_definition(definition, date, time, false))
            .collect();
        tracing::trace!(
            id = %definition.id,
            frequency = ?rule.frequency,
            count = occurrences.len(),
            "expanded recurring definition"
        );
        return Ok(occurrences);
    }

    if config.infer_legacy_weekday {
        let weekday = anchor.weekday();
        return Ok(window
            .days()
            .filter(|date| date.weekday() == weekday)
            .filter(|date| !definition.exception_dates.contains(date))
            .map(|date| Occurrence::from_definition(definition, date, time, false))
            .collect());
    }

    Ok(single(definition, anchor, time, window))
}

/// The lone occurrence of a special or one-off definition, if it falls in the window.
fn single(
    definition: &EventDefinition,
    date: NaiveDate,
    time: NaiveTime,
    window: &DateWindow,
) -> Vec<Occurrence> {
    if window.contains(date) && !definition.exception_dates.contains(&date) {
        vec![Occurrence::from_definition(definition, date, time, true)]
    } else {
        Vec::new()
    }
}

/// Every in-window date matched by the rule, before exception and end-date filtering.
fn rule_dates(rule: &RecurrenceRule, anchor: NaiveDate, window: &DateWindow) -> Vec<NaiveDate> {
    match rule.frequency {
        Frequency::Daily => window.days().collect(),
        Frequency::Weekly => window
            .days()
            .filter(|date| rule.days.contains(&date.weekday()))
            .collect(),
        Frequency::Biweekly => window
            .days()
            .filter(|date| rule.days.contains(&date.weekday()))
            .filter(|date| on_biweekly_parity(*date, anchor))
            .collect(),
        Frequency::MonthlyOrdinal => months_touching(window)
            .filter_map(|(year, month)| {
                ordinal_weekday(year, month, rule.ordinal_day, rule.ordinal)
            })
            .filter(|date| window.contains(*date))
            .collect(),
        Frequency::MonthlyDay => {
            let day = rule.month_day.unwrap_or_else(|| anchor.day());
            months_touching(window)
                .filter_map(|(year, month)| NaiveDate::from_ymd_opt(year, month, day))
                .filter(|date| window.contains(*date))
                .collect()
        }
        Frequency::Yearly => (window.start.year()..=window.end.year())
            .filter_map(|year| NaiveDate::from_ymd_opt(year, anchor.month(), anchor.day()))
            .filter(|date| window.contains(*date))
            .collect(),
    }
}

/// Whether `date` lies an even number of weeks from the first date with the
/// same weekday on or after `anchor`. Dates before the anchor keep the parity.
///
/// Works on day counts so an anchor at the edge of the calendar cannot overflow.
fn on_biweekly_parity(date: NaiveDate, anchor: NaiveDate) -> bool {
    let lead = i64::from(days_until(anchor.weekday(), date.weekday()));
    let weeks = ((date - anchor).num_days() - lead).div_euclid(7);
    weeks.rem_euclid(2) == 0
}

/// Days forward from `from` to the next `to`; zero when they match.
fn days_until(from: Weekday, to: Weekday) -> u32 {
    (7 + to.num_days_from_monday() - from.num_days_from_monday()) % 7
}

/// `(year, month)` for every month overlapping the window, in order.
fn months_touching(window: &DateWindow) -> impl Iterator<Item = (i32, u32)> {
    let first = window.start.year() * 12 + window.start.month0() as i32;
    let last = window.end.year() * 12 + window.end.month0() as i32;
    (first..=last).map(|idx| (idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1))
}

/// The Nth (or last) `weekday` of a month.
fn ordinal_weekday(year: i32, month: u32, weekday: Weekday, ordinal: Ordinal) -> Option<NaiveDate> {
    match ordinal.position() {
        Some(n) => NaiveDate::from_weekday_of_month_opt(year, month, weekday, n),
        None => {
            let last = NaiveDate::from_ymd_opt(year, month, 1)?
                .checked_add_months(Months::new(1))?
                .pred_opt()?;
            let back = days_until(weekday, last.weekday());
            last.checked_sub_days(Days::new(u64::from(back)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn last_weekday_of_month() {
        // January 2024 ends on a Wednesday.
        assert_eq!(
            ordinal_weekday(2024, 1, Weekday::Wed, Ordinal::Last),
            Some(date(2024, 1, 31))
        );
        assert_eq!(
            ordinal_weekday(2024, 1, Weekday::Fri, Ordinal::Last),
            Some(date(2024, 1, 26))
        );
        assert_eq!(
            ordinal_weekday(2024, 12, Weekday::Tue, Ordinal::Last),
            Some(date(2024, 12, 31))
        );
    }

    #[test]
    fn months_touching_crosses_year_boundary() {
        let window = DateWindow::new(date(2023, 11, 20), date(2024, 2, 1)).unwrap();
        let months: Vec<_> = months_touching(&window).collect();
        assert_eq!(months, vec![(2023, 11), (2023, 12), (2024, 1), (2024, 2)]);
    }

    #[test]
    fn days_until_wraps_the_week() {
        assert_eq!(days_until(Weekday::Sun, Weekday::Sun), 0);
        assert_eq!(days_until(Weekday::Mon, Weekday::Sun), 6);
        assert_eq!(days_until(Weekday::Sat, Weekday::Mon), 2);
    }

    #[test]
    fn biweekly_parity_extends_before_anchor() {
        let anchor = date(2024, 1, 7);
        assert!(on_biweekly_parity(date(2024, 1, 7), anchor));
        assert!(!on_biweekly_parity(date(2023, 12, 31), anchor));
        assert!(on_biweekly_parity(date(2023, 12, 24), anchor));

        // Anchor on a Monday: the first Sunday on or after it is six days later.
        let anchor = date(2024, 1, 8);
        assert!(on_biweekly_parity(date(2024, 1, 14), anchor));
        assert!(!on_biweekly_parity(date(2024, 1, 21), anchor));
    }

    #[test]
    fn biweekly_parity_at_calendar_edge() {
        // The matching weekday after the last representable date may not exist.
        let anchor = NaiveDate::MAX;
        assert_ne!(
            on_biweekly_parity(date(2024, 1, 7), anchor),
            on_biweekly_parity(date(2024, 1, 14), anchor)
        );
        assert!(on_biweekly_parity(anchor, anchor));
    }
}
