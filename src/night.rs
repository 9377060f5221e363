//! Night-window construction and sleep-onset time handling
//!
//! Sleep-onset values arrive in whatever shape the upstream store produced:
//! a full timestamp, a bare time, or plain text. Parsing tries a fixed format
//! list and resolves to null on total failure; nothing here raises.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::types::NightWindow;

/// Accepted sleep-onset formats, tried in order; first success wins.
const TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%H:%M:%S",
    "%H:%M",
];

/// Parse a raw sleep-onset value into a time of day.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    for fmt in TIME_FORMATS {
        if fmt.starts_with("%Y") {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt.time());
            }
        } else if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some(t);
        }
    }
    None
}

/// Convert a time of day to a decimal hour for charting.
///
/// Times before noon are treated as the following morning and shifted by
/// +24, so a 01:30 bedtime becomes 25.5 and stays numerically ordered
/// against late-evening onsets around 20-24.
pub fn hour_of_day(t: NaiveTime) -> f64 {
    let h = t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0;
    if h < 12.0 {
        h + 24.0
    } else {
        h
    }
}

/// Parse a raw sleep-onset value straight to the shifted decimal hour.
pub fn onset_hour(raw: &str) -> Option<f64> {
    parse_time_of_day(raw).map(hour_of_day)
}

/// Build the night interval for one calendar day.
///
/// `start = anchor + onset time`, `end = start + night_sleep_hours`. The
/// window may cross into the next calendar date and has no upper length
/// bound here; unbounded windows are caught downstream by the turn-interval
/// outlier filter. Returns `None` when either input is missing or the
/// duration is not a finite number.
pub fn build_night_window(
    anchor: NaiveDate,
    asleep_start: Option<&str>,
    night_sleep_hours: Option<f64>,
) -> Option<NightWindow> {
    let t = parse_time_of_day(asleep_start?)?;
    let hours = night_sleep_hours?;
    if !hours.is_finite() {
        return None;
    }

    let start = anchor.and_time(t);
    let end = start + chrono::Duration::seconds((hours * 3600.0).round() as i64);
    Some(NightWindow { start, end })
}
