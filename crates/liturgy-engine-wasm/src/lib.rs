//! WASM bindings for liturgy-engine.
//!
//! Exposes schedule generation, weekly grouping and recurrence descriptions to
//! the admin event editor via `wasm-bindgen`, so the preview it shows comes
//! from the same code as the public calendar. All complex types are passed as
//! JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p liturgy-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir assets/js/liturgy/ \
//!   target/wasm32-unknown-unknown/release/liturgy_engine_wasm.wasm
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDate;
use liturgy_engine::window::parse_iso_date;
use liturgy_engine::{DateWindow, EngineConfig, Occurrence, ScheduleFilter};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// JSON-level implementations (plain `String` errors, testable off-wasm)
// ---------------------------------------------------------------------------

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_iso_date(raw).ok_or_else(|| format!("Invalid date '{}': expected YYYY-MM-DD", raw))
}

fn generate_json(
    definitions_json: &str,
    window_start: &str,
    window_end: &str,
    filters_json: Option<&str>,
    config_json: Option<&str>,
) -> Result<String, String> {
    let records: Vec<Value> = serde_json::from_str(definitions_json)
        .map_err(|e| format!("Invalid definitions JSON: {}", e))?;
    let window = DateWindow::parse(window_start, window_end).map_err(|e| e.to_string())?;
    let filter: ScheduleFilter = match filters_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid filters JSON: {}", e))?
        }
        None => ScheduleFilter::default(),
    };
    let config: EngineConfig = match config_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("Invalid config JSON: {}", e))?
        }
        None => EngineConfig::default(),
    };

    let schedule = liturgy_engine::generate_records(records, &window, &filter, &config)
        .map_err(|e| e.to_string())?;
    to_json(&schedule)
}

fn group_by_week_json(occurrences_json: &str, week_start: &str) -> Result<String, String> {
    let occurrences: Vec<Occurrence> = serde_json::from_str(occurrences_json)
        .map_err(|e| format!("Invalid occurrences JSON: {}", e))?;
    let start = parse_date(week_start)?;
    let grid: BTreeMap<NaiveDate, Vec<Occurrence>> =
        liturgy_engine::group_by_week(&occurrences, start);
    to_json(&grid)
}

fn describe_json(rule_json: &str, is_recurring: bool) -> Result<String, String> {
    let raw: Value =
        serde_json::from_str(rule_json).map_err(|e| format!("Invalid rule JSON: {}", e))?;
    Ok(liturgy_engine::describe_raw(&raw, is_recurring))
}

fn normalize_json(rule_json: &str) -> Result<String, String> {
    let raw: Value =
        serde_json::from_str(rule_json).map_err(|e| format!("Invalid rule JSON: {}", e))?;
    to_json(&liturgy_engine::normalize(&raw))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Expand event definitions into a merged schedule for an inclusive date window.
///
/// Returns a JSON string `{window, occurrences, warnings}`. Records that cannot
/// be read or expanded appear in `warnings` instead of failing the call.
///
/// # Arguments
/// - `definitions_json` -- JSON array of event definitions (camelCase fields)
/// - `window_start` / `window_end` -- inclusive bounds, `YYYY-MM-DD`
/// - `filters_json` -- optional `{churchId, eventType}`
/// - `config_json` -- optional `{maxWindowDays, inferLegacyWeekday}`
#[wasm_bindgen(js_name = "generateSchedule")]
pub fn generate_schedule(
    definitions_json: &str,
    window_start: &str,
    window_end: &str,
    filters_json: Option<String>,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    generate_json(
        definitions_json,
        window_start,
        window_end,
        filters_json.as_deref(),
        config_json.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Bucket occurrences into the seven days starting at `week_start`.
///
/// Returns a JSON object keyed by `YYYY-MM-DD` with all seven dates present.
#[wasm_bindgen(js_name = "groupByWeek")]
pub fn group_by_week(occurrences_json: &str, week_start: &str) -> Result<String, JsValue> {
    group_by_week_json(occurrences_json, week_start).map_err(|e| JsValue::from_str(&e))
}

/// Human-readable summary of a raw recurrence rule, e.g. "First Friday monthly".
#[wasm_bindgen(js_name = "describeRecurrence")]
pub fn describe_recurrence(rule_json: &str, is_recurring: bool) -> Result<String, JsValue> {
    describe_json(rule_json, is_recurring).map_err(|e| JsValue::from_str(&e))
}

/// Sanitized recurrence rule as JSON, for the editor to write back to storage.
#[wasm_bindgen(js_name = "normalizeRecurrence")]
pub fn normalize_recurrence(rule_json: &str) -> Result<String, JsValue> {
    normalize_json(rule_json).map_err(|e| JsValue::from_str(&e))
}
