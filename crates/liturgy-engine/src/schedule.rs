//! Schedule aggregation across many event definitions.
//!
//! Filters definitions, expands each over the window, and merges the results
//! into one deterministically ordered list. A malformed definition is skipped
//! and reported in [`Schedule::warnings`]; it never blanks the whole schedule.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::{LiturgyError, Result};
use crate::expander::expand_within;
use crate::model::{ChurchId, EventDefinition, Occurrence, ALL_CHURCHES};
use crate::window::DateWindow;

/// Optional narrowing of the definitions fed to [`generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleFilter {
    /// Keep definitions for this church plus those for all churches.
    pub church_id: Option<ChurchId>,
    /// Keep definitions whose event type matches exactly.
    pub event_type: Option<String>,
}

impl ScheduleFilter {
    pub fn for_church(church_id: ChurchId) -> Self {
        Self {
            church_id: Some(church_id),
            ..Self::default()
        }
    }

    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Active definitions passing the church and event-type filters.
    pub fn matches(&self, definition: &EventDefinition) -> bool {
        if !definition.is_active {
            return false;
        }
        if let Some(church_id) = self.church_id {
            if definition.church_id != church_id && definition.church_id != ALL_CHURCHES {
                return false;
            }
        }
        match &self.event_type {
            Some(event_type) => definition.event_type == *event_type,
            None => true,
        }
    }
}

/// A definition left out of the schedule, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDefinition {
    pub id: String,
    pub reason: String,
    #[serde(skip)]
    pub error: LiturgyError,
}

/// The merged result of [`generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub window: DateWindow,
    /// Sorted by date, time, church, then definition id.
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<SkippedDefinition>,
}

impl Schedule {
    /// Number of definitions that could not be expanded. Meant for
    /// administrator diagnostics only.
    pub fn skipped_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Storage collaborator that hands out event definitions.
pub trait DefinitionSource {
    /// Definitions matching `filter`. Implementations may return a superset;
    /// [`generate`] filters again.
    fn definitions(&self, filter: &ScheduleFilter) -> Vec<EventDefinition>;
}

impl DefinitionSource for [EventDefinition] {
    fn definitions(&self, filter: &ScheduleFilter) -> Vec<EventDefinition> {
        self.iter().filter(|d| filter.matches(d)).cloned().collect()
    }
}

impl DefinitionSource for Vec<EventDefinition> {
    fn definitions(&self, filter: &ScheduleFilter) -> Vec<EventDefinition> {
        self.as_slice().definitions(filter)
    }
}

/// Expand and merge every matching definition over the window.
///
/// # Errors
/// Returns `LiturgyError::WindowTooLarge` if the window exceeds
/// `config.max_window_days`. Per-definition failures are collected into
/// [`Schedule::warnings`] instead.
pub fn generate(
    definitions: &[EventDefinition],
    window: &DateWindow,
    filter: &ScheduleFilter,
    config: &EngineConfig,
) -> Result<Schedule> {
    config.check_window(window)?;

    let mut occurrences = Vec::new();
    let mut warnings = Vec::new();

    for definition in definitions.iter().filter(|d| filter.matches(d)) {
        match expand_within(definition, window, config) {
            Ok(expanded) => occurrences.extend(expanded),
            Err(error) => {
                tracing::warn!(id = %definition.id, %error, "skipping event definition");
                warnings.push(SkippedDefinition {
                    id: definition.id.clone(),
                    reason: error.to_string(),
                    error,
                });
            }
        }
    }

    sort_occurrences(&mut occurrences);

    tracing::debug!(
        start = %window.start,
        end = %window.end,
        definitions = definitions.len(),
        occurrences = occurrences.len(),
        skipped = warnings.len(),
        "generated schedule"
    );

    Ok(Schedule {
        window: *window,
        occurrences,
        warnings,
    })
}

/// Read raw storage records into definitions.
///
/// Records that do not deserialize come back as warnings, identified by their
/// `id` when they carry one and by their position (`#3`) otherwise.
pub fn read_definitions(records: Vec<Value>) -> (Vec<EventDefinition>, Vec<SkippedDefinition>) {
    let mut definitions = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let id = match record.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => format!("#{index}"),
        };
        match serde_json::from_value::<EventDefinition>(record) {
            Ok(definition) => definitions.push(definition),
            Err(source) => {
                let error = LiturgyError::MalformedDefinition {
                    id: id.clone(),
                    reason: source.to_string(),
                };
                tracing::warn!(%id, %error, "skipping malformed event definition");
                warnings.push(SkippedDefinition {
                    id,
                    reason: error.to_string(),
                    error,
                });
            }
        }
    }
    (definitions, warnings)
}

/// [`generate`] over raw storage records. Unreadable records cannot be
/// filtered, so they are always reported, ahead of expansion failures.
///
/// # Errors
/// Same as [`generate`].
pub fn generate_records(
    records: Vec<Value>,
    window: &DateWindow,
    filter: &ScheduleFilter,
    config: &EngineConfig,
) -> Result<Schedule> {
    config.check_window(window)?;
    let (definitions, mut warnings) = read_definitions(records);
    let mut schedule = generate(&definitions, window, filter, config)?;
    warnings.append(&mut schedule.warnings);
    schedule.warnings = warnings;
    Ok(schedule)
}

/// [`generate`] over the definitions a storage collaborator returns for `filter`.
///
/// # Errors
/// Same as [`generate`].
pub fn generate_from<S>(
    source: &S,
    window: &DateWindow,
    filter: &ScheduleFilter,
    config: &EngineConfig,
) -> Result<Schedule>
where
    S: DefinitionSource + ?Sized,
{
    config.check_window(window)?;
    let definitions = source.definitions(filter);
    generate(&definitions, window, filter, config)
}

/// Sort into the canonical schedule order.
pub fn sort_occurrences(occurrences: &mut [Occurrence]) {
    occurrences.sort_by(schedule_order);
}

pub(crate) fn schedule_order(a: &Occurrence, b: &Occurrence) -> Ordering {
    a.date
        .cmp(&b.date)
        .then(a.time.cmp(&b.time))
        .then(a.church_id.cmp(&b.church_id))
        .then_with(|| a.event_definition_id.cmp(&b.event_definition_id))
}
