//! Per-day series assembly for one month
//!
//! Walks every calendar day of the month, keeps only valid records, and
//! builds the aligned per-day arrays the charts consume. Score inputs and
//! the classification aggregates are collected in the same pass, since
//! they draw from exactly the valid-day subset the charts show.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use log::debug;

use crate::night::{build_night_window, onset_hour};
use crate::scoring::mean;
use crate::turns::split_and_average;
use crate::types::{DailySeries, MonthKey, RawDailyRecord};
use crate::validity::is_valid;

/// Per-day arrays plus the score inputs collected along the way.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    pub series: DailySeries,
    /// Respiration variability per valid day where present
    pub std_devs: Vec<f64>,
    /// Night sleep hours per valid day where present
    pub night_sleep_hours: Vec<f64>,
    /// Sleep-period leave counts per valid day where present
    pub night_leave_counts: Vec<f64>,
    /// night_sleep / night_on_bed per valid day where the on-bed time is positive
    pub efficiencies: Vec<f64>,
    /// Daytime out-of-bed hours per valid day where present
    pub day_leave_hours: Vec<f64>,
    /// Mean of night_on_bed + day_on_bed over valid days with both present
    pub onbed_total_avg: Option<f64>,
    /// Mean sleep-period leave count over valid days
    pub night_leave_avg: Option<f64>,
}

impl SeriesBundle {
    /// Night turn averages that survived the outlier filter.
    pub fn night_turn_values(&self) -> Vec<f64> {
        self.series.night_turn_minutes.iter().flatten().copied().collect()
    }

    /// Day turn averages that survived the outlier filter.
    pub fn day_turn_values(&self) -> Vec<f64> {
        self.series.day_turn_minutes.iter().flatten().copied().collect()
    }

    /// Sleep-onset hours of valid days.
    pub fn onset_values(&self) -> Vec<f64> {
        self.series.onset_hours.iter().flatten().copied().collect()
    }

    /// Sleep-end hours (onset + night sleep) of valid days.
    pub fn sleep_end_values(&self) -> Vec<f64> {
        self.series
            .sleep_range
            .iter()
            .flatten()
            .map(|range| range[1])
            .collect()
    }

    /// Respiration values of valid days.
    pub fn respiration_values(&self) -> Vec<f64> {
        self.series.respiration.iter().flatten().copied().collect()
    }
}

/// Build the aligned per-day series for one month.
///
/// `turn_events` covers the month plus one day past its end so night
/// windows that straddle the last midnight still find their turns.
/// `longest_lying` maps a date to that day's longest continuous lying
/// stretch in hours, as produced by the duration collaborator.
pub fn build_daily_series(
    month: MonthKey,
    records: &[RawDailyRecord],
    turn_events: &[chrono::NaiveDateTime],
    longest_lying: &HashMap<NaiveDate, f64>,
) -> SeriesBundle {
    let by_date: HashMap<NaiveDate, &RawDailyRecord> =
        records.iter().map(|r| (r.date, r)).collect();

    let days = month.days_in_month() as usize;
    let mut series = DailySeries {
        labels: Vec::with_capacity(days),
        respiration: Vec::with_capacity(days),
        sleep_range: Vec::with_capacity(days),
        onset_hours: Vec::with_capacity(days),
        leave_total_hours: Vec::with_capacity(days),
        night_turn_minutes: Vec::with_capacity(days),
        day_turn_minutes: Vec::with_capacity(days),
        longest_lying_hours: Vec::with_capacity(days),
        night_leave_counts: Vec::with_capacity(days),
    };

    let mut std_devs = Vec::new();
    let mut night_sleep_hours = Vec::new();
    let mut night_leave_counts = Vec::new();
    let mut efficiencies = Vec::new();
    let mut day_leave_hours = Vec::new();
    let mut onbed_totals = Vec::new();

    let mut day = month.first_day();
    let end = month.last_day();
    while day <= end {
        series.labels.push(day);

        let record = match by_date.get(&day) {
            Some(r) if is_valid(r) => *r,
            other => {
                if other.is_some() {
                    debug!("excluding invalid day {}", day);
                }
                push_empty_day(&mut series);
                day += Duration::days(1);
                continue;
            }
        };

        if let Some(std) = record.respiration_std_dev {
            std_devs.push(std);
        }
        if let Some(sleep) = record.night_sleep {
            night_sleep_hours.push(sleep);
        }

        series.respiration.push(record.sleep_respiration);

        let onset = record.asleep_start.as_deref().and_then(onset_hour);
        series.onset_hours.push(onset);
        series.sleep_range.push(match (onset, record.night_sleep) {
            (Some(start), Some(sleep)) => Some([start, start + sleep]),
            _ => None,
        });

        series
            .leave_total_hours
            .push(match (record.day_on_bed, record.night_on_bed) {
                (Some(day_bed), Some(night_bed)) => Some((24.0 - day_bed - night_bed).max(0.0)),
                _ => None,
            });

        if let (Some(sleep), Some(on_bed)) = (record.night_sleep, record.night_on_bed) {
            if on_bed > 0.0 {
                efficiencies.push(sleep / on_bed);
            }
        }

        let window =
            build_night_window(day, record.asleep_start.as_deref(), record.night_sleep);
        let (night_turn, day_turn) = split_and_average(day, window.as_ref(), turn_events);
        series.night_turn_minutes.push(night_turn);
        series.day_turn_minutes.push(day_turn);

        // A valid day with no duration row still charts as zero hours.
        series
            .longest_lying_hours
            .push(Some(longest_lying.get(&day).copied().unwrap_or(0.0)));

        if let Some(count) = record.asleep_leave {
            night_leave_counts.push(count);
        }
        series
            .night_leave_counts
            .push(Some(record.asleep_leave.unwrap_or(0.0)));

        if let Some(leave) = record.day_leave {
            day_leave_hours.push(leave);
        }
        if let (Some(night_bed), Some(day_bed)) = (record.night_on_bed, record.day_on_bed) {
            onbed_totals.push(night_bed + day_bed);
        }

        day += Duration::days(1);
    }

    let onbed_total_avg = mean(&onbed_totals);
    let night_leave_avg = mean(&night_leave_counts);

    SeriesBundle {
        series,
        std_devs,
        night_sleep_hours,
        night_leave_counts,
        efficiencies,
        day_leave_hours,
        onbed_total_avg,
        night_leave_avg,
    }
}

fn push_empty_day(series: &mut DailySeries) {
    series.respiration.push(None);
    series.sleep_range.push(None);
    series.onset_hours.push(None);
    series.leave_total_hours.push(None);
    series.night_turn_minutes.push(None);
    series.day_turn_minutes.push(None);
    series.longest_lying_hours.push(None);
    series.night_leave_counts.push(None);
}
