//! Human-readable recurrence descriptions, time labels and display badges.
//!
//! Both the public schedule renderer and the admin editor preview call these,
//! so what an administrator configures reads the same everywhere.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Occurrence;
use crate::rule::{normalize, weekday_name, Frequency, RecurrenceRule};

/// Describe a sanitized rule, e.g. "Every Sunday, Wednesday" or "First Friday monthly".
///
/// Non-recurring definitions are "One-time". A recurring definition without a
/// rule is "Custom".
pub fn describe(rule: Option<&RecurrenceRule>, is_recurring: bool) -> String {
    if !is_recurring {
        return "One-time".to_string();
    }
    let Some(rule) = rule else {
        return "Custom".to_string();
    };

    match rule.frequency {
        Frequency::Daily => "Daily".to_string(),
        Frequency::Weekly if rule.days.is_empty() => "Weekly".to_string(),
        Frequency::Weekly => format!("Every {}", day_list(rule)),
        Frequency::Biweekly if rule.days.is_empty() => "Every other week".to_string(),
        Frequency::Biweekly => format!("Every other {}", day_list(rule)),
        Frequency::MonthlyOrdinal => format!(
            "{} {} monthly",
            rule.ordinal.label(),
            weekday_name(rule.ordinal_day)
        ),
        Frequency::MonthlyDay => match rule.month_day {
            Some(day) => format!("Monthly on the {}", ordinal_suffix(day)),
            None => "Monthly".to_string(),
        },
        Frequency::Yearly => "Yearly".to_string(),
    }
}

/// Describe raw, unsanitized rule data as it comes from the editor form.
///
/// Handles the legacy `bimonthly` tag and reports unrecognized frequencies as
/// "Custom" rather than letting the normalizer coerce them to weekly. A
/// monthly-ordinal rule missing either its ordinal or its weekday reads
/// "Monthly".
pub fn describe_raw(raw: &Value, is_recurring: bool) -> String {
    if !is_recurring {
        return "One-time".to_string();
    }
    let tag = raw.get("frequency").and_then(Value::as_str).unwrap_or_default();
    if tag.trim().eq_ignore_ascii_case("bimonthly") {
        return "Every 2 months".to_string();
    }
    match Frequency::from_name(tag) {
        Some(Frequency::MonthlyOrdinal) if !has_ordinal_fields(raw) => "Monthly".to_string(),
        Some(_) => describe(Some(&normalize(raw)), true),
        None => "Custom".to_string(),
    }
}

/// Clock style for rendered times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStyle {
    /// "8:00 AM"
    #[default]
    TwelveHour,
    /// "08:00"
    TwentyFourHour,
}

pub fn format_time(time: NaiveTime, style: TimeStyle) -> String {
    match style {
        TimeStyle::TwelveHour => time.format("%-I:%M %p").to_string(),
        TimeStyle::TwentyFourHour => time.format("%H:%M").to_string(),
    }
}

/// "8:00 AM - 9:00 AM". A zero duration renders the start time alone.
pub fn format_time_range(time: NaiveTime, duration_minutes: u32, style: TimeStyle) -> String {
    if duration_minutes == 0 {
        return format_time(time, style);
    }
    let (end, _) = time.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    format!("{} - {}", format_time(time, style), format_time(end, style))
}

/// Labels shown next to an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Livestream,
    Special,
    Recurring,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Livestream => "Livestream",
            Badge::Special => "Special",
            Badge::Recurring => "Recurring",
        }
    }
}

/// Badges for an occurrence, in display order.
pub fn badges(occurrence: &Occurrence) -> Vec<Badge> {
    let mut out = Vec::new();
    if occurrence.is_livestreamed {
        out.push(Badge::Livestream);
    }
    if occurrence.is_special {
        out.push(Badge::Special);
    } else if occurrence.is_recurring {
        out.push(Badge::Recurring);
    }
    out
}

fn day_list(rule: &RecurrenceRule) -> String {
    rule.days
        .iter()
        .map(|d| weekday_name(*d))
        .collect::<Vec<_>>()
        .join(", ")
}

fn has_ordinal_fields(raw: &Value) -> bool {
    let present = |names: &[&str]| {
        names.iter().any(|name| {
            raw.get(*name)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.trim().is_empty())
        })
    };
    present(&["ordinal"]) && present(&["ordinalDay", "ordinal_day"])
}

/// 1st, 2nd, 3rd, 4th, 11th, 21st, ...
fn ordinal_suffix(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_suffixes() {
        let rendered: Vec<String> = [1, 2, 3, 4, 11, 12, 13, 21, 22, 23, 31]
            .into_iter()
            .map(ordinal_suffix)
            .collect();
        assert_eq!(
            rendered,
            ["1st", "2nd", "3rd", "4th", "11th", "12th", "13th", "21st", "22nd", "23rd", "31st"]
        );
    }
}
