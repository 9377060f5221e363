//! Daily record validity filtering
//!
//! A raw daily row can be noise: the sensor occasionally reports hard zeros
//! for the night metrics, or a night-on-bed duration too short to describe a
//! real night. Such days are excluded from every average and chart point,
//! while the calendar date itself still appears downstream with null values.

use crate::types::RawDailyRecord;

/// Minimum plausible night-on-bed duration (hours), boundary inclusive.
pub const MIN_NIGHT_ON_BED_HOURS: f64 = 2.0;

/// Whether a raw daily record may contribute to averages and charts.
///
/// A record is invalid if any of `night_on_bed`, `night_sleep`, or
/// `sleep_respiration` is exactly 0, or if `night_on_bed` is present and
/// below [`MIN_NIGHT_ON_BED_HOURS`]. A missing field never invalidates.
pub fn is_valid(record: &RawDailyRecord) -> bool {
    let zeroed = [
        record.night_on_bed,
        record.night_sleep,
        record.sleep_respiration,
    ]
    .iter()
    .any(|v| *v == Some(0.0));

    if zeroed {
        return false;
    }

    match record.night_on_bed {
        Some(hours) if hours < MIN_NIGHT_ON_BED_HOURS => false,
        _ => true,
    }
}

/// Filter a fetched range down to the days that pass [`is_valid`].
pub fn valid_days(records: &[RawDailyRecord]) -> Vec<&RawDailyRecord> {
    records.iter().filter(|r| is_valid(r)).collect()
}
