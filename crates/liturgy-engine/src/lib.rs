//! # liturgy-engine
//!
//! Deterministic liturgical schedule expansion for parish calendars.
//!
//! Event definitions (Masses, confessions, adoration, one-off feasts) come from
//! an external store with loosely-typed recurrence data. The engine sanitizes
//! that data, expands each definition into dated occurrences over a window,
//! merges them into one stable ordering, and shapes the result for weekly-grid
//! and per-church views. Everything is pure and synchronous.
//!
//! ## Modules
//!
//! - [`rule`] — recurrence rule model and the normalizer for untrusted input
//! - [`expander`] — one definition → occurrences within a date window
//! - [`schedule`] — many definitions → filtered, merged, sorted schedule
//! - [`grouping`] — weekly grid, per-day list and per-church groupings
//! - [`format`] — recurrence descriptions, time labels, badges
//! - [`window`] — inclusive date windows and date parsing
//! - [`config`] — engine limits and legacy behaviour switches
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod expander;
pub mod format;
pub mod grouping;
pub mod model;
pub mod rule;
pub mod schedule;
pub mod window;

pub use config::EngineConfig;
pub use error::LiturgyError;
pub use expander::expand;
pub use format::{describe, describe_raw};
pub use grouping::{group_by_church, group_by_week, ChurchDirectory, ChurchGroup};
pub use model::{ChurchId, EventDefinition, Occurrence, ALL_CHURCHES};
pub use rule::{normalize, Frequency, Ordinal, RecurrenceRule};
pub use schedule::{
    generate, generate_records, DefinitionSource, Schedule, ScheduleFilter, SkippedDefinition,
};
pub use window::DateWindow;
