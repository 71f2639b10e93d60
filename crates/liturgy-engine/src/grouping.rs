//! Shape occurrences for the weekly grid, list and per-church views.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::model::{ChurchId, Occurrence, ALL_CHURCHES};
use crate::schedule::schedule_order;

/// Lookup of church display names, owned by the storage layer.
pub trait ChurchDirectory {
    fn church_name(&self, church_id: ChurchId) -> Option<String>;
}

impl ChurchDirectory for HashMap<ChurchId, String> {
    fn church_name(&self, church_id: ChurchId) -> Option<String> {
        self.get(&church_id).cloned()
    }
}

impl ChurchDirectory for BTreeMap<ChurchId, String> {
    fn church_name(&self, church_id: ChurchId) -> Option<String> {
        self.get(&church_id).cloned()
    }
}

/// Occurrences at one church, for single-day multi-church views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurchGroup {
    pub name: String,
    pub has_livestream: bool,
    pub occurrences: Vec<Occurrence>,
}

/// Bucket occurrences into the seven days starting at `week_start`.
///
/// All seven dates are present; days without events map to an empty list.
/// Occurrences outside the week are dropped. Each bucket is time-ordered.
pub fn group_by_week(
    occurrences: &[Occurrence],
    week_start: NaiveDate,
) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut week: BTreeMap<NaiveDate, Vec<Occurrence>> = week_start
        .iter_days()
        .take(7)
        .map(|date| (date, Vec::new()))
        .collect();

    for occurrence in occurrences {
        if let Some(bucket) = week.get_mut(&occurrence.date) {
            bucket.push(occurrence.clone());
        }
    }
    for bucket in week.values_mut() {
        bucket.sort_by(schedule_order);
    }
    week
}

/// Bucket occurrences by date, keeping only dates that have events.
pub fn group_by_day(occurrences: &[Occurrence]) -> BTreeMap<NaiveDate, Vec<Occurrence>> {
    let mut days: BTreeMap<NaiveDate, Vec<Occurrence>> = BTreeMap::new();
    for occurrence in occurrences {
        days.entry(occurrence.date).or_default().push(occurrence.clone());
    }
    for bucket in days.values_mut() {
        bucket.sort_by(schedule_order);
    }
    days
}

/// Group occurrences by church, naming each group through `directory`.
///
/// Church `0` is labelled "All Churches" unless the directory names it.
pub fn group_by_church<D>(
    occurrences: &[Occurrence],
    directory: &D,
) -> BTreeMap<ChurchId, ChurchGroup>
where
    D: ChurchDirectory + ?Sized,
{
    let mut groups: BTreeMap<ChurchId, ChurchGroup> = BTreeMap::new();
    for occurrence in occurrences {
        let group = groups
            .entry(occurrence.church_id)
            .or_insert_with(|| ChurchGroup {
                name: church_label(directory, occurrence.church_id),
                has_livestream: false,
                occurrences: Vec::new(),
            });
        group.has_livestream |= occurrence.is_livestreamed;
        group.occurrences.push(occurrence.clone());
    }
    for group in groups.values_mut() {
        group.occurrences.sort_by(schedule_order);
    }
    groups
}

/// Separate regular occurrences from special events, which render in their
/// own section below the weekly view. Input order is preserved in both halves.
pub fn split_special(occurrences: &[Occurrence]) -> (Vec<Occurrence>, Vec<Occurrence>) {
    occurrences.iter().cloned().partition(|o| !o.is_special)
}

/// The most recent `first_day` on or before `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    date.checked_sub_days(Days::new(u64::from(back)))
        .unwrap_or(NaiveDate::MIN)
}

/// Whether the occurrence falls on `today`, for highlighting.
pub fn is_today(occurrence: &Occurrence, today: NaiveDate) -> bool {
    occurrence.date == today
}

fn church_label<D: ChurchDirectory + ?Sized>(directory: &D, church_id: ChurchId) -> String {
    directory
        .church_name(church_id)
        .unwrap_or_else(|| match church_id {
            ALL_CHURCHES => "All Churches".to_string(),
            id => format!("Church {id}"),
        })
}
