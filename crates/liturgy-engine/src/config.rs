//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LiturgyError, Result};
use crate::window::DateWindow;

/// Default expansion bound: two years, leap day included.
pub const DEFAULT_MAX_WINDOW_DAYS: u32 = 731;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Windows longer than this many days are rejected with
    /// [`LiturgyError::WindowTooLarge`].
    #[serde(alias = "max_window_days")]
    pub max_window_days: u32,
    /// Expand non-recurring, non-special definitions weekly on the weekday of
    /// their start date. Legacy data relies on this; when disabled such
    /// definitions produce a single occurrence.
    #[serde(alias = "infer_legacy_weekday")]
    pub infer_legacy_weekday: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_window_days: DEFAULT_MAX_WINDOW_DAYS,
            infer_legacy_weekday: true,
        }
    }
}

impl EngineConfig {
    pub fn check_window(&self, window: &DateWindow) -> Result<()> {
        let days = window.len_days();
        if days > i64::from(self.max_window_days) {
            return Err(LiturgyError::WindowTooLarge {
                days,
                max: self.max_window_days,
            });
        }
        Ok(())
    }
}
