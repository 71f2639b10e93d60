//! Plain-text views of the weekly grid and per-church day schedule.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::NaiveDate;
use liturgy_engine::format::{badges, format_time_range, TimeStyle};
use liturgy_engine::grouping::{is_today, split_special};
use liturgy_engine::{ChurchDirectory, ChurchGroup, ChurchId, Occurrence, ALL_CHURCHES};

pub fn week_text<D: ChurchDirectory>(
    grid: &BTreeMap<NaiveDate, Vec<Occurrence>>,
    directory: &D,
    today: NaiveDate,
    style: TimeStyle,
) -> String {
    let mut out = String::new();
    if let Some(first) = grid.keys().next() {
        let _ = writeln!(out, "Week of {}", first.format("%a %b %-d, %Y"));
    }

    let mut specials = Vec::new();
    for (date, occurrences) in grid {
        let (regular, special) = split_special(occurrences);
        specials.extend(special);

        let marker = if *date == today { " (today)" } else { "" };
        let _ = writeln!(out, "\n{}{}", date.format("%A, %b %-d"), marker);
        if regular.is_empty() {
            let _ = writeln!(out, "  (no events)");
        }
        for occurrence in &regular {
            let _ = writeln!(out, "  {}", line(occurrence, directory, style));
        }
    }

    if !specials.is_empty() {
        let _ = writeln!(out, "\nSpecial events");
        for occurrence in &specials {
            let today_marker = if is_today(occurrence, today) { " (today)" } else { "" };
            let _ = writeln!(
                out,
                "  {}{}  {}",
                occurrence.date.format("%a %b %-d"),
                today_marker,
                line(occurrence, directory, style)
            );
        }
    }
    out
}

pub fn day_text(
    date: NaiveDate,
    groups: &BTreeMap<ChurchId, ChurchGroup>,
    style: TimeStyle,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A, %B %-d, %Y"));
    if groups.is_empty() {
        let _ = writeln!(out, "  (no events)");
    }
    for group in groups.values() {
        let live = if group.has_livestream { " [livestream]" } else { "" };
        let _ = writeln!(out, "\n{}{}", group.name, live);
        for occurrence in &group.occurrences {
            let _ = writeln!(
                out,
                "  {}  {}{}",
                format_time_range(occurrence.time, occurrence.duration_minutes, style),
                label(occurrence),
                badge_suffix(occurrence)
            );
        }
    }
    out
}

fn line<D: ChurchDirectory>(occurrence: &Occurrence, directory: &D, style: TimeStyle) -> String {
    let church = match directory.church_name(occurrence.church_id) {
        Some(name) => format!(" @ {name}"),
        None if occurrence.church_id == ALL_CHURCHES => String::new(),
        None => format!(" @ Church {}", occurrence.church_id),
    };
    format!(
        "{}  {}{}{}",
        format_time_range(occurrence.time, occurrence.duration_minutes, style),
        label(occurrence),
        church,
        badge_suffix(occurrence)
    )
}

/// Title, falling back to the event type.
fn label(occurrence: &Occurrence) -> &str {
    if occurrence.title.is_empty() {
        &occurrence.event_type
    } else {
        &occurrence.title
    }
}

fn badge_suffix(occurrence: &Occurrence) -> String {
    let labels: Vec<&str> = badges(occurrence).into_iter().map(|b| b.label()).collect();
    if labels.is_empty() {
        String::new()
    } else {
        format!("  [{}]", labels.join(", "))
    }
}
