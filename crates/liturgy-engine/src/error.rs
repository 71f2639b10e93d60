//! Error types for liturgy-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiturgyError {
    #[error("Definition '{id}' is marked recurring but has no recurrence rule")]
    InvalidRecurrenceRule { id: String },

    #[error("Definition '{id}' has an unparseable start date/time: '{value}'")]
    UnparseableStartDateTime { id: String, value: String },

    #[error("Definition '{id}' could not be read: {reason}")]
    MalformedDefinition { id: String, reason: String },

    #[error("Window of {days} days exceeds the maximum of {max} days")]
    WindowTooLarge { days: i64, max: u32 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Window start {start} is after window end {end}")]
    InvertedWindow { start: String, end: String },
}

impl LiturgyError {
    /// Per-definition errors are reported as warnings and never abort a batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LiturgyError::InvalidRecurrenceRule { .. }
                | LiturgyError::UnparseableStartDateTime { .. }
                | LiturgyError::MalformedDefinition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LiturgyError>;
