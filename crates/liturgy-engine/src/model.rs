//! Event definitions (input) and occurrences (output).

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::rule::{deserialize_exception_dates, RecurrenceRule};

/// Identifier of an external church entity.
pub type ChurchId = u64;

/// Church id meaning "every church in the parish".
pub const ALL_CHURCHES: ChurchId = 0;

/// One configured recurring or one-off service, as stored by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub church_id: ChurchId,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    /// Naive local timestamp, parsed lazily so one bad record can be skipped.
    /// A missing or non-string value is kept as text and fails at expansion.
    #[serde(default, deserialize_with = "deserialize_start")]
    pub start_date_time: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_special_event: bool,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_rule: Option<RecurrenceRule>,
    #[serde(default, deserialize_with = "deserialize_exception_dates")]
    pub exception_dates: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub is_livestreamed: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub side_note: String,
}

impl EventDefinition {
    /// An active, non-recurring definition with every optional field empty.
    pub fn new(id: impl Into<String>, start_date_time: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            church_id: ALL_CHURCHES,
            event_type: String::new(),
            title: String::new(),
            start_date_time: start_date_time.into(),
            duration_minutes: default_duration(),
            is_active: true,
            is_special_event: false,
            is_recurring: false,
            recurrence_rule: None,
            exception_dates: BTreeSet::new(),
            is_livestreamed: false,
            notes: String::new(),
            side_note: String::new(),
        }
    }

    pub fn recurring(mut self, rule: RecurrenceRule) -> Self {
        self.is_recurring = true;
        self.recurrence_rule = Some(rule);
        self
    }

    pub fn special(mut self) -> Self {
        self.is_special_event = true;
        self
    }

    pub fn at_church(mut self, church_id: ChurchId) -> Self {
        self.church_id = church_id;
        self
    }

    pub fn of_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn except(mut self, date: NaiveDate) -> Self {
        self.exception_dates.insert(date);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn livestreamed(mut self) -> Self {
        self.is_livestreamed = true;
        self
    }
}

/// A concrete, dated instance of an [`EventDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub event_definition_id: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub church_id: ChurchId,
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_livestreamed: bool,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub side_note: String,
    /// Sourced from a special or one-off definition.
    #[serde(default)]
    pub is_special: bool,
    #[serde(default)]
    pub is_recurring: bool,
}

impl Occurrence {
    pub(crate) fn from_definition(
        definition: &EventDefinition,
        date: NaiveDate,
        time: NaiveTime,
        is_special: bool,
    ) -> Self {
        Self {
            event_definition_id: definition.id.clone(),
            date,
            time,
            duration_minutes: definition.duration_minutes,
            church_id: definition.church_id,
            event_type: definition.event_type.clone(),
            title: definition.title.clone(),
            is_livestreamed: definition.is_livestreamed,
            notes: definition.notes.clone(),
            side_note: definition.side_note.clone(),
            is_special,
            is_recurring: definition.is_recurring && !definition.is_special_event,
        }
    }
}

fn default_duration() -> u32 {
    60
}

fn default_true() -> bool {
    true
}

/// Storage layers hand out numeric post ids as often as strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn deserialize_start<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// `HH:MM` wall-clock times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
