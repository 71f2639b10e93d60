//! Calendar-date windows and the date/time parsers shared by the engine.
//!
//! All values are naive: the site's single configured timezone is assumed and
//! no offset arithmetic is ever performed.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{LiturgyError, Result};

/// Accepted layouts for an event definition's `startDateTime`.
const START_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Build a window, rejecting an end that precedes the start.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(LiturgyError::InvertedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Build a window from two `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start =
            parse_iso_date(start).ok_or_else(|| LiturgyError::InvalidDate(start.to_string()))?;
        let end = parse_iso_date(end).ok_or_else(|| LiturgyError::InvalidDate(end.to_string()))?;
        Self::new(start, end)
    }

    /// The seven days beginning at `start`.
    pub fn week(start: NaiveDate) -> Self {
        let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the window, in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }
}

/// Parse a strict `YYYY-MM-DD` date. Anything else (extra digits, signs,
/// trailing text, impossible days) yields `None`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parse a naive local start timestamp such as `2024-01-07T10:00`.
pub fn parse_start_date_time(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    START_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}
