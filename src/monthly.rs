//! Monthly bucketing for the half-year trend view
//!
//! Valid days are bucketed by calendar month over a six-month window ending
//! at the reference month, then reduced to per-bucket arithmetic means. A
//! bucket with no contributing days yields null for every mean, never zero.

use chrono::NaiveDateTime;

use crate::night::{build_night_window, onset_hour};
use crate::scoring::mean;
use crate::turns::split_and_average;
use crate::types::{MonthKey, MonthlyAggregate, RawDailyRecord};
use crate::validity::is_valid;

/// Months covered by the trend view, reference month included.
pub const HALF_YEAR_MONTHS: i32 = 6;

/// The six month keys ending at `reference`, oldest first.
pub fn half_year_months(reference: MonthKey) -> Vec<MonthKey> {
    (1 - HALF_YEAR_MONTHS..=0)
        .map(|offset| reference.shifted(offset))
        .collect()
}

#[derive(Default)]
struct MonthBucket {
    night_on_bed: Vec<f64>,
    night_sleep: Vec<f64>,
    respiration: Vec<f64>,
    day_on_bed: Vec<f64>,
    leave_total: Vec<f64>,
    night_leave: Vec<f64>,
    asleep_leave_min: Vec<f64>,
    onset_hours: Vec<f64>,
    night_turn: Vec<f64>,
    day_turn: Vec<f64>,
}

/// Reduce valid days to per-month means for the six months ending at
/// `reference`. Turn intervals are computed per day through the night
/// window and then averaged within the month; the 720-minute outlier
/// filter has already dropped noisy days by the time they reach a bucket.
pub fn aggregate_half_year(
    reference: MonthKey,
    records: &[RawDailyRecord],
    turn_events: &[NaiveDateTime],
) -> Vec<MonthlyAggregate> {
    let months = half_year_months(reference);
    let mut buckets: Vec<MonthBucket> = months.iter().map(|_| MonthBucket::default()).collect();

    for record in records.iter().filter(|r| is_valid(r)) {
        let key = MonthKey::of(record.date);
        let Some(slot) = months.iter().position(|m| *m == key) else {
            continue;
        };
        let bucket = &mut buckets[slot];

        if let Some(v) = record.night_on_bed {
            bucket.night_on_bed.push(v);
        }
        if let Some(v) = record.night_sleep {
            bucket.night_sleep.push(v);
        }
        if let Some(v) = record.sleep_respiration {
            bucket.respiration.push(v);
        }
        if let Some(v) = record.day_on_bed {
            bucket.day_on_bed.push(v);
        }
        if let (Some(day_bed), Some(night_bed)) = (record.day_on_bed, record.night_on_bed) {
            bucket.leave_total.push((24.0 - day_bed - night_bed).max(0.0));
        }
        if let Some(v) = record.asleep_leave {
            bucket.night_leave.push(v);
        }
        if let Some(v) = record.asleep_leave_minute {
            bucket.asleep_leave_min.push(v);
        }
        if let Some(h) = record.asleep_start.as_deref().and_then(onset_hour) {
            bucket.onset_hours.push(h);
        }

        let window =
            build_night_window(record.date, record.asleep_start.as_deref(), record.night_sleep);
        if window.is_some() {
            let (night, day) = split_and_average(record.date, window.as_ref(), turn_events);
            if let Some(v) = night {
                bucket.night_turn.push(v);
            }
            if let Some(v) = day {
                bucket.day_turn.push(v);
            }
        }
    }

    months
        .into_iter()
        .zip(buckets)
        .map(|(month, bucket)| {
            let sum_on_bed: f64 = bucket.night_on_bed.iter().sum();
            let sum_sleep: f64 = bucket.night_sleep.iter().sum();
            let sleep_efficiency_pct = if sum_on_bed > 0.0 && sum_sleep > 0.0 {
                Some(sum_sleep / sum_on_bed * 100.0)
            } else {
                None
            };

            MonthlyAggregate {
                month,
                night_on_bed_hours: mean(&bucket.night_on_bed),
                night_sleep_hours: mean(&bucket.night_sleep),
                respiration: mean(&bucket.respiration),
                day_on_bed_hours: mean(&bucket.day_on_bed),
                leave_total_hours: mean(&bucket.leave_total),
                night_leave_count: mean(&bucket.night_leave),
                asleep_leave_minutes: mean(&bucket.asleep_leave_min),
                onset_hour: mean(&bucket.onset_hours),
                night_turn_minutes: mean(&bucket.night_turn),
                day_turn_minutes: mean(&bucket.day_turn),
                sleep_efficiency_pct,
            }
        })
        .collect()
}

/// The two classification aggregates for one reference month:
/// mean total on-bed hours and mean sleep-period leave count, both over
/// that month's valid days.
pub fn mode_aggregates(month: MonthKey, records: &[RawDailyRecord]) -> (Option<f64>, Option<f64>) {
    let mut onbed_totals = Vec::new();
    let mut leave_counts = Vec::new();

    for record in records.iter().filter(|r| is_valid(r)) {
        if MonthKey::of(record.date) != month {
            continue;
        }
        if let (Some(night_bed), Some(day_bed)) = (record.night_on_bed, record.day_on_bed) {
            onbed_totals.push(night_bed + day_bed);
        }
        if let Some(count) = record.asleep_leave {
            leave_counts.push(count);
        }
    }

    (mean(&onbed_totals), mean(&leave_counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(year: i32, month: u32, day: u32) -> RawDailyRecord {
        RawDailyRecord {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            night_on_bed: Some(8.0),
            night_sleep: Some(7.0),
            sleep_respiration: Some(15.0),
            day_on_bed: Some(4.0),
            day_leave: Some(4.0),
            asleep_leave: Some(1.0),
            asleep_leave_minute: Some(20.0),
            asleep_start: Some("22:00".to_string()),
            respiration_std_dev: None,
        }
    }

    #[test]
    fn window_is_six_months_ending_at_reference() {
        let months = half_year_months(MonthKey::new(2025, 10));
        assert_eq!(months.len(), 6);
        assert_eq!(months[0], MonthKey::new(2025, 5));
        assert_eq!(months[5], MonthKey::new(2025, 10));
    }

    #[test]
    fn empty_month_is_all_null() {
        let aggregates = aggregate_half_year(MonthKey::new(2025, 10), &[], &[]);
        assert_eq!(aggregates.len(), 6);
        for agg in &aggregates {
            assert_eq!(agg.night_on_bed_hours, None);
            assert_eq!(agg.respiration, None);
            assert_eq!(agg.sleep_efficiency_pct, None);
            assert_eq!(agg.night_turn_minutes, None);
        }
    }

    #[test]
    fn valid_days_land_in_their_month_bucket() {
        let records = vec![
            record(2025, 9, 10),
            record(2025, 9, 11),
            record(2025, 10, 1),
        ];
        let aggregates = aggregate_half_year(MonthKey::new(2025, 10), &records, &[]);
        let september = &aggregates[4];
        let october = &aggregates[5];
        assert_eq!(september.night_on_bed_hours, Some(8.0));
        assert_eq!(september.onset_hour, Some(22.0));
        assert_eq!(october.night_sleep_hours, Some(7.0));
        // 7/8 efficiency.
        assert_eq!(october.sleep_efficiency_pct, Some(87.5));
    }

    #[test]
    fn invalid_and_out_of_window_days_are_skipped() {
        let mut invalid = record(2025, 10, 2);
        invalid.sleep_respiration = Some(0.0);
        let too_old = record(2024, 10, 2);
        let aggregates =
            aggregate_half_year(MonthKey::new(2025, 10), &[invalid, too_old], &[]);
        assert!(aggregates.iter().all(|a| a.night_on_bed_hours.is_none()));
    }

    #[test]
    fn turn_intervals_average_per_month() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 5).unwrap();
        let turns = vec![
            d.and_hms_opt(23, 0, 0).unwrap(),
            d.succ_opt().unwrap().and_hms_opt(2, 0, 0).unwrap(),
        ];
        let aggregates =
            aggregate_half_year(MonthKey::new(2025, 10), &[record(2025, 10, 5)], &turns);
        assert_eq!(aggregates[5].night_turn_minutes, Some(180.0));
        assert_eq!(aggregates[5].day_turn_minutes, None);
    }

    #[test]
    fn mode_aggregates_cover_only_the_reference_month() {
        let records = vec![record(2025, 10, 1), record(2025, 10, 2), record(2025, 9, 30)];
        let (onbed, leave) = mode_aggregates(MonthKey::new(2025, 10), &records);
        assert_eq!(onbed, Some(12.0));
        assert_eq!(leave, Some(1.0));

        let (onbed, leave) = mode_aggregates(MonthKey::new(2025, 8), &records);
        assert_eq!(onbed, None);
        assert_eq!(leave, None);
    }
}
