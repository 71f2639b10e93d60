//! Recurrence rule model and the normalizer that builds it from untrusted input.
//!
//! Recurrence data arrives as loosely-typed JSON from an admin form. [`normalize`]
//! is the single parsing boundary: it never fails, and anything malformed
//! degrades to a safe default instead of raising.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::window::parse_iso_date;

/// English weekday names, Sunday first, as they appear in stored rules.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// How often a recurring definition repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    #[default]
    Weekly,
    Biweekly,
    /// The Nth (or last) given weekday of each month.
    MonthlyOrdinal,
    /// A fixed day of each month, e.g. the 15th.
    MonthlyDay,
    Yearly,
}

impl Frequency {
    /// Match a stored frequency tag, in its snake_case or camelCase spelling.
    /// Surrounding whitespace is ignored; anything else is unrecognized.
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim() {
            "daily" => Some(Frequency::Daily),
            "weekly" => Some(Frequency::Weekly),
            "biweekly" => Some(Frequency::Biweekly),
            "monthly_ordinal" | "monthlyOrdinal" => Some(Frequency::MonthlyOrdinal),
            "monthly_day" | "monthlyDay" => Some(Frequency::MonthlyDay),
            "yearly" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// Which occurrence of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordinal {
    #[default]
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl Ordinal {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "first" => Some(Ordinal::First),
            "second" => Some(Ordinal::Second),
            "third" => Some(Ordinal::Third),
            "fourth" => Some(Ordinal::Fourth),
            "last" => Some(Ordinal::Last),
            _ => None,
        }
    }

    /// 1-based position within the month, `None` for [`Ordinal::Last`].
    pub fn position(self) -> Option<u8> {
        match self {
            Ordinal::First => Some(1),
            Ordinal::Second => Some(2),
            Ordinal::Third => Some(3),
            Ordinal::Fourth => Some(4),
            Ordinal::Last => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Ordinal::First => "First",
            Ordinal::Second => "Second",
            Ordinal::Third => "Third",
            Ordinal::Fourth => "Fourth",
            Ordinal::Last => "Last",
        }
    }
}

/// A sanitized recurrence rule.
///
/// Deserializing goes through [`normalize`], so any JSON value produces a
/// valid rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Weekdays for weekly and biweekly rules, Sunday first, no duplicates.
    #[serde(serialize_with = "serialize_weekdays")]
    pub days: Vec<Weekday>,
    pub ordinal: Ordinal,
    #[serde(serialize_with = "serialize_weekday")]
    pub ordinal_day: Weekday,
    /// Day of month for [`Frequency::MonthlyDay`]; the start date's day when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_day: Option<u32>,
    /// First date on which the rule no longer produces occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self {
            frequency: Frequency::Weekly,
            days: Vec::new(),
            ordinal: Ordinal::First,
            ordinal_day: Weekday::Fri,
            month_day: None,
            end_date: None,
        }
    }
}

impl RecurrenceRule {
    /// A weekly rule on the given days.
    pub fn weekly(days: &[Weekday]) -> Self {
        Self {
            frequency: Frequency::Weekly,
            days: sorted_weekdays(days.iter().copied()),
            ..Self::default()
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// True when `date` is on or after the rule's end date.
    pub fn has_ended_by(&self, date: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| date >= end)
    }
}

impl From<Value> for RecurrenceRule {
    fn from(raw: Value) -> Self {
        normalize(&raw)
    }
}

/// Sanitize an untrusted recurrence object into a [`RecurrenceRule`].
///
/// Unrecognized or malformed fields fall back to their defaults; invalid
/// weekday entries are dropped. Field names are accepted in camelCase or
/// snake_case.
pub fn normalize(raw: &Value) -> RecurrenceRule {
    let mut rule = RecurrenceRule::default();
    let Some(obj) = raw.as_object() else {
        return rule;
    };

    if let Some(frequency) = str_field(obj, &["frequency"]).and_then(Frequency::from_name) {
        rule.frequency = frequency;
    }
    if let Some(Value::Array(days)) = field(obj, &["days"]) {
        let parsed = days.iter().filter_map(Value::as_str).filter_map(parse_weekday);
        rule.days = sorted_weekdays(parsed);
    }
    if let Some(ordinal) = str_field(obj, &["ordinal"]).and_then(Ordinal::from_name) {
        rule.ordinal = ordinal;
    }
    if let Some(day) = str_field(obj, &["ordinalDay", "ordinal_day"]).and_then(parse_weekday) {
        rule.ordinal_day = day;
    }
    rule.month_day = field(obj, &["monthDay", "month_day"]).and_then(month_day);
    rule.end_date =
        str_field(obj, &["endDate", "end_date"]).and_then(|s| parse_iso_date(s.trim()));

    rule
}

/// Keep only well-formed `YYYY-MM-DD` strings from a JSON array, deduplicated
/// and sorted. Non-arrays yield an empty set.
pub fn normalize_exception_dates(raw: &Value) -> BTreeSet<NaiveDate> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|s| parse_iso_date(s.trim()))
            .collect(),
        _ => BTreeSet::new(),
    }
}

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Parse a weekday name after trimming and Title-Casing it.
///
/// Only the seven full English names match; abbreviations do not.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let title = title_case(raw.trim());
    WEEKDAY_NAMES
        .iter()
        .position(|name| *name == title)
        .map(|idx| WEEKDAYS[idx])
}

/// Full English name of a weekday.
pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_sunday() as usize]
}

pub(crate) fn deserialize_exception_dates<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeSet<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(normalize_exception_dates(&raw))
}

fn sorted_weekdays(days: impl Iterator<Item = Weekday>) -> Vec<Weekday> {
    let unique: BTreeSet<u32> = days.map(|d| d.num_days_from_sunday()).collect();
    unique.into_iter().map(|n| WEEKDAYS[n as usize]).collect()
}

fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

fn str_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    field(obj, names).and_then(Value::as_str)
}

fn month_day(raw: &Value) -> Option<u32> {
    let day = match raw {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (1..=31).contains(&day).then_some(day as u32)
}

fn serialize_weekdays<S: Serializer>(
    days: &[Weekday],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(days.iter().map(|d| weekday_name(*d)))
}

fn serialize_weekday<S: Serializer>(
    day: &Weekday,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}
