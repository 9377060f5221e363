//! Row adaptation
//!
//! The data-fetch collaborator hands the engine already-fetched rows as
//! JSON documents. Adaptation is deliberately lossy: a field that is
//! absent, empty, or textual garbage becomes `None` and flows through the
//! analytics as missing data. Only a structurally invalid document (not an
//! array of objects) is an error.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::commentary::CommentaryRow;
use crate::error::EngineError;
use crate::types::{BedStateEvent, RawDailyRecord, SlotState};

/// A numeric field that may arrive as a JSON number or a numeric string.
/// Anything else, including non-finite values, is missing data.
fn lossy_f64(value: Option<&Value>) -> Option<f64> {
    let v = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Raw field as text, empty strings dropped.
fn lossy_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Calendar date from a date or timestamp value: the first ten characters
/// must read as `YYYY-MM-DD`.
fn date_key(value: Option<&Value>) -> Option<NaiveDate> {
    let s = value?.as_str()?;
    let prefix = s.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Full timestamp in either of the store's two layouts.
fn timestamp(value: Option<&Value>) -> Option<NaiveDateTime> {
    let s = value?.as_str()?;
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Respiration variability from the nested analysis field, which arrives
/// either as a structured object or as a JSON document in a string. Any
/// shape mismatch resolves to missing, never to an error.
pub fn extract_std_dev(value: Option<&Value>) -> Option<f64> {
    let object = match value? {
        Value::Object(map) => Value::Object(map.clone()),
        Value::String(s) => serde_json::from_str::<Value>(s).ok()?,
        _ => return None,
    };
    lossy_f64(object.get("std_dev"))
}

fn rows(json: &str) -> Result<Vec<Value>, EngineError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(rows) => Ok(rows),
        other => Err(EngineError::AdaptError(format!(
            "expected an array of rows, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Adapt daily metric rows. Rows without a readable date are dropped.
pub fn adapt_daily_rows(json: &str) -> Result<Vec<RawDailyRecord>, EngineError> {
    let mut records = Vec::new();
    for row in rows(json)? {
        let Some(date) = date_key(row.get("created_at").or_else(|| row.get("date"))) else {
            continue;
        };
        records.push(RawDailyRecord {
            date,
            night_on_bed: lossy_f64(row.get("night_on_bed")),
            night_sleep: lossy_f64(row.get("night_sleep")),
            sleep_respiration: lossy_f64(row.get("sleep_respiration")),
            day_on_bed: lossy_f64(row.get("day_on_bed")),
            day_leave: lossy_f64(row.get("day_leave")),
            asleep_leave: lossy_f64(row.get("asleep_leave")),
            asleep_leave_minute: lossy_f64(row.get("asleep_leave_minute")),
            asleep_start: lossy_string(row.get("asleep_start")),
            respiration_std_dev: extract_std_dev(row.get("respiration_analy")),
        });
    }
    Ok(records)
}

/// Adapt body-turn rows carrying a date and a start-of-turn time.
/// Unparseable times are dropped.
pub fn adapt_turn_events(json: &str) -> Result<Vec<NaiveDateTime>, EngineError> {
    let mut events = Vec::new();
    for row in rows(json)? {
        let Some(date) = date_key(row.get("date").or_else(|| row.get("created_at"))) else {
            continue;
        };
        let Some(raw) = row.get("time_start").and_then(Value::as_str) else {
            continue;
        };
        let time = NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok();
        if let Some(t) = time {
            events.push(date.and_time(t));
        }
    }
    Ok(events)
}

/// Adapt occupancy detections for slot aggregation. Unknown state codes
/// and unreadable timestamps are dropped.
pub fn adapt_bed_state_events(json: &str) -> Result<Vec<BedStateEvent>, EngineError> {
    let mut events = Vec::new();
    for row in rows(json)? {
        let Some(detected_at) = timestamp(row.get("detect_at")) else {
            continue;
        };
        let Some(state) = row
            .get("value")
            .and_then(Value::as_str)
            .and_then(SlotState::from_code)
        else {
            continue;
        };
        events.push(BedStateEvent { detected_at, state });
    }
    Ok(events)
}

/// Adapt per-day longest-lying-stretch rows into a date map.
pub fn adapt_longest_lying(json: &str) -> Result<HashMap<NaiveDate, f64>, EngineError> {
    let mut map = HashMap::new();
    for row in rows(json)? {
        let Some(date) = date_key(row.get("date").or_else(|| row.get("created_at"))) else {
            continue;
        };
        if let Some(hours) = lossy_f64(row.get("max_duration_hours")) {
            map.insert(date, hours);
        }
    }
    Ok(map)
}

/// Adapt commentary sheet rows. Cells other than the three key columns
/// become per-category fields.
pub fn adapt_commentary_rows(json: &str) -> Result<Vec<CommentaryRow>, EngineError> {
    let mut out = Vec::new();
    for row in rows(json)? {
        let Value::Object(map) = row else {
            continue;
        };
        let mut commentary = CommentaryRow::default();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            match key.as_str() {
                "month" => commentary.month_cell = text,
                "serial_id" => commentary.serial_id = text,
                "agency_id" => commentary.agency_id = text,
                _ => {
                    commentary.fields.insert(key, text);
                }
            }
        }
        out.push(commentary);
    }
    Ok(out)
}
