//! 30-minute occupancy slot aggregation
//!
//! Raw occupancy detections are merged into a fixed 48-bucket timeline
//! covering noon-to-noon. Within a bucket, the highest-priority state wins
//! regardless of arrival order, so the result is stable under event
//! permutation.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::{BedStateEvent, MonthKey, SlotState, SlotTimeline, SLOTS_PER_DAY};

/// Start of the timeline window for an anchor date: that day's noon.
fn window_start(anchor: NaiveDate) -> NaiveDateTime {
    anchor.and_hms_opt(12, 0, 0).expect("noon is a valid time")
}

/// Merge raw detections into the 48-slot timeline for one anchor date.
///
/// Events outside `[anchor 12:00, anchor+1 12:00)` are dropped. Buckets with
/// no qualifying event stay [`SlotState::Empty`].
pub fn aggregate_slots(anchor: NaiveDate, events: &[BedStateEvent]) -> SlotTimeline {
    let start = window_start(anchor);
    let mut slots = vec![SlotState::Empty; SLOTS_PER_DAY];

    for event in events {
        let minutes = (event.detected_at - start).num_minutes();
        if minutes < 0 {
            continue;
        }
        let index = (minutes / 30) as usize;
        if index >= SLOTS_PER_DAY {
            continue;
        }
        if event.state.priority() > slots[index].priority() {
            slots[index] = event.state;
        }
    }

    SlotTimeline {
        anchor,
        label: window_label(anchor),
        slots,
    }
}

/// Display label for one window, e.g. "10/31 12:00 - 11/1 12:00".
fn window_label(anchor: NaiveDate) -> String {
    use chrono::Datelike;
    let end = anchor + Duration::days(1);
    format!(
        "{}/{} 12:00 - {}/{} 12:00",
        anchor.month(),
        anchor.day(),
        end.month(),
        end.day()
    )
}

/// Timeline set for a month's occupancy view.
///
/// For a month of N days this yields N + 1 windows, anchored from the last
/// day of the previous month through the last day of the month, so the view
/// covers every night that touches the month.
pub fn month_timelines(month: MonthKey, events: &[BedStateEvent]) -> Vec<SlotTimeline> {
    let first_anchor = month.shifted(-1).last_day();
    let windows = month.days_in_month() + 1;

    (0..windows)
        .map(|i| aggregate_slots(first_anchor + Duration::days(i as i64), events))
        .collect()
}
