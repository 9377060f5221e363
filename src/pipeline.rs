//! Pipeline orchestration
//!
//! This module provides the public API of the engine. Each entry point is
//! deterministic over its inputs: validation → derived per-day metrics →
//! scoring and classification, with no I/O and no shared state. Callers
//! fetch the rows; the engine only computes.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::classify::classify;
use crate::commentary::{ACTIVE_TREND_SUMMARY, BED_TREND_SUMMARY};
use crate::encoder::ReportEncoder;
use crate::error::EngineError;
use crate::monthly::{aggregate_half_year, half_year_months, mode_aggregates};
use crate::report::build_daily_series;
use crate::scoring::{respiration_score, rhythm_score, score_triple, sleep_quality_score, RhythmRules};
use crate::slots::month_timelines;
use crate::types::{
    BedStateEvent, HalfYearReport, MonthKey, MonthReport, RawDailyRecord, ReportMode, SlotTimeline,
};

/// Compute the full month report: per-day series, the three scores, and
/// the report mode.
///
/// `records` are the fetched daily rows for the month, `turn_events` the
/// body-turn timestamps for the month plus one day past its end, and
/// `longest_lying` the per-day longest lying stretch in hours.
pub fn month_report(
    month: MonthKey,
    records: &[RawDailyRecord],
    turn_events: &[NaiveDateTime],
    longest_lying: &HashMap<NaiveDate, f64>,
    force_mode: Option<ReportMode>,
) -> MonthReport {
    let bundle = build_daily_series(month, records, turn_events, longest_lying);

    let mode = classify(force_mode, bundle.onbed_total_avg, bundle.night_leave_avg);

    let respiration = respiration_score(&bundle.series.respiration, &bundle.std_devs);

    let rules = match mode {
        ReportMode::Active => RhythmRules::Ambulatory {
            onset_hours: bundle.onset_values(),
            end_hours: bundle.sleep_end_values(),
        },
        ReportMode::Bed => RhythmRules::BedBound {
            night_turn_minutes: bundle.night_turn_values(),
            day_turn_minutes: bundle.day_turn_values(),
            day_leave_hours: bundle.day_leave_hours.clone(),
        },
    };
    let rhythm = rhythm_score(&rules);

    let sleep_quality = sleep_quality_score(
        &bundle.night_sleep_hours,
        &bundle.night_leave_counts,
        &bundle.efficiencies,
    );

    debug!(
        "month report {}: mode={} scores=({},{},{})",
        month.label(),
        mode.as_str(),
        respiration,
        rhythm,
        sleep_quality
    );

    MonthReport {
        month,
        mode,
        scores: score_triple(respiration, rhythm, sleep_quality),
        series: bundle.series,
        onbed_total_avg: bundle.onbed_total_avg,
        night_leave_avg: bundle.night_leave_avg,
    }
}

/// Compute the six-month trend report ending at `reference`.
///
/// The mode is classified from the reference month alone, matching how
/// the monthly report for that month would classify.
pub fn half_year_report(
    reference: MonthKey,
    records: &[RawDailyRecord],
    turn_events: &[NaiveDateTime],
    force_mode: Option<ReportMode>,
) -> HalfYearReport {
    let months = half_year_months(reference);
    let aggregates = aggregate_half_year(reference, records, turn_events);

    let (onbed_avg, leave_avg) = mode_aggregates(reference, records);
    let mode = classify(force_mode, onbed_avg, leave_avg);

    HalfYearReport {
        labels: months.iter().map(|m| m.label()).collect(),
        months,
        aggregates,
        mode,
    }
}

/// Pick the half-year trend summary text for a classified mode out of the
/// month's commentary fields.
pub fn trend_summary(mode: ReportMode, commentary: &HashMap<String, String>) -> Option<String> {
    let key = match mode {
        ReportMode::Bed => BED_TREND_SUMMARY,
        ReportMode::Active => ACTIVE_TREND_SUMMARY,
    };
    commentary.get(key).cloned()
}

/// Stateless facade bundling the computations with payload encoding.
///
/// One engine instance stamps all of its payloads with the same producer
/// instance ID.
pub struct ReportEngine {
    encoder: ReportEncoder,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEngine {
    pub fn new() -> Self {
        Self {
            encoder: ReportEncoder::new(),
        }
    }

    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            encoder: ReportEncoder::with_instance_id(instance_id),
        }
    }

    /// Month report as an encoded payload.
    pub fn month_report_payload(
        &self,
        month: MonthKey,
        records: &[RawDailyRecord],
        turn_events: &[NaiveDateTime],
        longest_lying: &HashMap<NaiveDate, f64>,
        force_mode: Option<ReportMode>,
    ) -> Result<String, EngineError> {
        let report = month_report(month, records, turn_events, longest_lying, force_mode);
        self.encoder.encode("month_report", &report)
    }

    /// Half-year trend report as an encoded payload.
    pub fn half_year_payload(
        &self,
        reference: MonthKey,
        records: &[RawDailyRecord],
        turn_events: &[NaiveDateTime],
        force_mode: Option<ReportMode>,
    ) -> Result<String, EngineError> {
        let report = half_year_report(reference, records, turn_events, force_mode);
        self.encoder.encode("half_year_report", &report)
    }

    /// A month's occupancy timeline set as an encoded payload.
    pub fn timeline_payload(
        &self,
        month: MonthKey,
        events: &[BedStateEvent],
    ) -> Result<String, EngineError> {
        let timelines: Vec<SlotTimeline> = month_timelines(month, events);
        self.encoder.encode("occupancy_timelines", &timelines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawDailyRecord;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn active_record(day: u32) -> RawDailyRecord {
        RawDailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            night_on_bed: Some(8.0),
            night_sleep: Some(7.0),
            sleep_respiration: Some(15.0),
            day_on_bed: Some(1.0),
            day_leave: Some(10.0),
            asleep_leave: Some(2.0),
            asleep_leave_minute: Some(25.0),
            asleep_start: Some("22:00".to_string()),
            respiration_std_dev: Some(2.0),
        }
    }

    fn bed_record(day: u32) -> RawDailyRecord {
        RawDailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 10, day).unwrap(),
            night_on_bed: Some(10.0),
            night_sleep: Some(8.0),
            sleep_respiration: Some(14.0),
            day_on_bed: Some(9.0),
            day_leave: Some(3.0),
            asleep_leave: Some(0.0),
            asleep_leave_minute: Some(0.0),
            asleep_start: Some("21:00".to_string()),
            respiration_std_dev: Some(1.5),
        }
    }

    #[test]
    fn ambulatory_month_scores_and_classifies() {
        let records: Vec<_> = (1..=10).map(active_record).collect();
        let report = month_report(
            MonthKey::new(2025, 10),
            &records,
            &[],
            &HashMap::new(),
            None,
        );

        assert_eq!(report.mode, ReportMode::Active);
        assert_eq!(report.scores.respiration, 3);
        // Identical bedtimes every night: rhythm is perfect.
        assert_eq!(report.scores.rhythm, 3);
        assert_eq!(report.scores.sleep_quality, 3);
        assert_eq!(report.series.labels.len(), 31);
    }

    #[test]
    fn bed_bound_month_uses_turn_rules() {
        let records: Vec<_> = (1..=10).map(bed_record).collect();
        // Turns every 5 hours through each night window.
        let mut turns = Vec::new();
        for day in 1..=10 {
            let start = NaiveDate::from_ymd_opt(2025, 10, day)
                .unwrap()
                .and_hms_opt(21, 30, 0)
                .unwrap();
            turns.push(start);
            turns.push(start + Duration::hours(5));
        }
        let report = month_report(
            MonthKey::new(2025, 10),
            &records,
            &turns,
            &HashMap::new(),
            None,
        );

        assert_eq!(report.mode, ReportMode::Bed);
        // 300-minute night turns score 3, but a 3-hour mean day leave caps at 2.
        assert_eq!(report.scores.rhythm, 2);
        assert_eq!(report.onbed_total_avg, Some(19.0));
        assert_eq!(report.night_leave_avg, Some(0.0));
    }

    #[test]
    fn forced_mode_overrides_classification() {
        let records: Vec<_> = (1..=5).map(bed_record).collect();
        let report = month_report(
            MonthKey::new(2025, 10),
            &records,
            &[],
            &HashMap::new(),
            Some(ReportMode::Active),
        );
        assert_eq!(report.mode, ReportMode::Active);
    }

    #[test]
    fn empty_month_degrades_to_defaults() {
        let report = month_report(MonthKey::new(2025, 10), &[], &[], &HashMap::new(), None);
        assert_eq!(report.mode, ReportMode::Active);
        // All sub-rules neutral except the flat regression slope.
        assert_eq!(report.scores.respiration, 2);
        assert_eq!(report.scores.rhythm, 2);
        assert_eq!(report.scores.sleep_quality, 2);
        assert!(report.series.respiration.iter().all(Option::is_none));
    }

    #[test]
    fn half_year_report_spans_and_classifies() {
        let mut records: Vec<_> = (1..=10).map(bed_record).collect();
        records.push({
            let mut r = bed_record(1);
            r.date = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
            r
        });
        let report = half_year_report(MonthKey::new(2025, 10), &records, &[], None);

        assert_eq!(report.months.len(), 6);
        assert_eq!(report.labels[0], "2025/05");
        assert_eq!(report.labels[5], "2025/10");
        assert_eq!(report.mode, ReportMode::Bed);
        // July has exactly one valid day.
        assert_eq!(report.aggregates[2].night_on_bed_hours, Some(10.0));
        assert_eq!(report.aggregates[0].night_on_bed_hours, None);
    }

    #[test]
    fn trend_summary_follows_the_mode() {
        let mut commentary = HashMap::new();
        commentary.insert(BED_TREND_SUMMARY.to_string(), "stable".to_string());
        assert_eq!(
            trend_summary(ReportMode::Bed, &commentary),
            Some("stable".to_string())
        );
        assert_eq!(trend_summary(ReportMode::Active, &commentary), None);
    }

    #[test]
    fn engine_payloads_encode_their_kind() {
        let engine = ReportEngine::with_instance_id("test".to_string());
        let payload = engine
            .month_report_payload(MonthKey::new(2025, 10), &[], &[], &HashMap::new(), None)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["kind"], "month_report");
        assert_eq!(value["report"]["mode"], "active");

        let timelines = engine.timeline_payload(MonthKey::new(2025, 11), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&timelines).unwrap();
        assert_eq!(value["report"].as_array().unwrap().len(), 31);
    }
}
