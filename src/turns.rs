//! Body-turn interval analysis
//!
//! Splits a day's turn events into the night window and the surrounding day
//! hours, then reduces each side to a mean inter-turn gap in minutes. The
//! sensor sometimes replays or reorders events, so non-positive gaps are
//! discarded, and implausibly long averages are treated as noise.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::NightWindow;

/// Averages above this many minutes are sensor noise and resolve to null.
/// The cutoff applies to per-day and per-month averages alike.
pub const TURN_INTERVAL_OUTLIER_MINUTES: f64 = 720.0;

/// Mean night and day turn intervals in minutes for one calendar day.
///
/// Only events dated on `anchor` or `anchor + 1` are considered. An event
/// belongs to the night side iff the window is present and contains it
/// (inclusive start, exclusive end); everything else is day. Each side needs
/// at least two events and one positive gap, otherwise it is null.
pub fn split_and_average(
    anchor: NaiveDate,
    window: Option<&NightWindow>,
    events: &[NaiveDateTime],
) -> (Option<f64>, Option<f64>) {
    let day0 = anchor;
    let day1 = anchor + Duration::days(1);

    let mut night_turns = Vec::new();
    let mut day_turns = Vec::new();

    for &event in events {
        let event_date = event.date();
        if event_date < day0 || event_date > day1 {
            continue;
        }
        match window {
            Some(w) if w.contains(event) => night_turns.push(event),
            _ => day_turns.push(event),
        }
    }

    (mean_interval(night_turns), mean_interval(day_turns))
}

/// Mean of the positive consecutive gaps, in minutes, with the outlier
/// cutoff applied.
fn mean_interval(mut turns: Vec<NaiveDateTime>) -> Option<f64> {
    if turns.len() < 2 {
        return None;
    }
    turns.sort();

    let gaps: Vec<f64> = turns
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_seconds() as f64 / 60.0)
        .filter(|minutes| *minutes > 0.0)
        .collect();

    if gaps.is_empty() {
        return None;
    }

    let avg = gaps.iter().sum::<f64>() / gaps.len() as f64;
    if avg > TURN_INTERVAL_OUTLIER_MINUTES {
        None
    } else {
        Some(avg)
    }
}
