//! Core types for the caretrend engine
//!
//! This module defines the data that flows through the engine: raw daily
//! records as fetched by the caller, derived windows and timelines, scores,
//! and the report structures handed to the rendering layer.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Report mode selecting which template and rule set applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Resident is predominantly bed-bound
    Bed,
    /// Resident leaves the bed regularly
    Active,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Bed => "bed",
            ReportMode::Active => "active",
        }
    }

    /// Parse an externally supplied override; anything unrecognized is no override.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bed" => Some(ReportMode::Bed),
            "active" => Some(ReportMode::Active),
            _ => None,
        }
    }
}

/// One raw daily row for a resident, as delivered by the data-fetch
/// collaborator. Every metric is optional; the engine never mutates a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDailyRecord {
    /// Calendar day the row describes
    pub date: NaiveDate,
    /// Hours on bed during the night period
    pub night_on_bed: Option<f64>,
    /// Hours asleep during the night period
    pub night_sleep: Option<f64>,
    /// Mean respiration rate while asleep (breaths/min)
    pub sleep_respiration: Option<f64>,
    /// Hours on bed during the day period
    pub day_on_bed: Option<f64>,
    /// Hours out of bed during the day period
    pub day_leave: Option<f64>,
    /// Number of bed exits during the sleep period
    pub asleep_leave: Option<f64>,
    /// Minutes out of bed during the sleep period
    pub asleep_leave_minute: Option<f64>,
    /// Raw sleep-onset value: a timestamp, a bare time, or free text
    pub asleep_start: Option<String>,
    /// Respiration variability, extracted from a nested vendor structure
    pub respiration_std_dev: Option<f64>,
}

/// A night interval for one calendar day. The end may fall on the next
/// calendar date when sleep straddles midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NightWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl NightWindow {
    /// Inclusive start, exclusive end.
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start <= t && t < self.end
    }
}

/// Number of 30-minute buckets in one timeline window
pub const SLOTS_PER_DAY: usize = 48;

/// Categorical occupancy state of one 30-minute bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// Lying on the bed (code "08")
    #[serde(rename = "08")]
    Lying,
    /// Sitting on the bed edge (code "07")
    #[serde(rename = "07")]
    Sitting,
    /// Detected off the bed (code "00")
    #[serde(rename = "00")]
    OffBed,
    /// No qualifying detection in the bucket
    #[serde(rename = "none")]
    Empty,
}

impl SlotState {
    /// Parse a detection code. Unknown codes carry no state.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "08" => Some(SlotState::Lying),
            "07" => Some(SlotState::Sitting),
            "00" => Some(SlotState::OffBed),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            SlotState::Lying => "08",
            SlotState::Sitting => "07",
            SlotState::OffBed => "00",
            SlotState::Empty => "none",
        }
    }

    /// Conflict-resolution priority within a bucket: 08 > 07 > 00 > none.
    pub fn priority(&self) -> u8 {
        match self {
            SlotState::Lying => 3,
            SlotState::Sitting => 2,
            SlotState::OffBed => 1,
            SlotState::Empty => 0,
        }
    }
}

/// One raw occupancy detection from the bed sensor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BedStateEvent {
    pub detected_at: NaiveDateTime,
    pub state: SlotState,
}

/// Occupancy timeline for the window [anchor 12:00, anchor+1 12:00),
/// always exactly [`SLOTS_PER_DAY`] buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotTimeline {
    /// Date whose noon starts the window
    pub anchor: NaiveDate,
    /// Display label, e.g. "10/31 12:00 - 11/1 12:00"
    pub label: String,
    pub slots: Vec<SlotState>,
}

/// The three independent 1-3 wellness scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTriple {
    /// Respiration stability score
    pub respiration: u8,
    /// Daily-rhythm score; rule set depends on the report mode
    pub rhythm: u8,
    /// Sleep-quality score
    pub sleep_quality: u8,
}

/// A (year, month) aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// `month` must be in 1..=12; day arithmetic on an out-of-range key
    /// panics.
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month {month} out of range");
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Shift by a signed number of months.
    pub fn shifted(self, offset: i32) -> Self {
        let base = self.year * 12 + self.month as i32 - 1 + offset;
        Self {
            year: base.div_euclid(12),
            month: (base.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month key holds a valid month")
    }

    pub fn last_day(self) -> NaiveDate {
        self.shifted(1)
            .first_day()
            .pred_opt()
            .expect("month start has a predecessor")
    }

    pub fn days_in_month(self) -> u32 {
        self.last_day().day()
    }

    /// Chart label, e.g. "2025/05"
    pub fn label(self) -> String {
        format!("{}/{:02}", self.year, self.month)
    }
}

/// Per-calendar-day arrays for one month. Every vector has one entry per
/// calendar day in the month; invalid or absent days carry `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySeries {
    pub labels: Vec<NaiveDate>,
    /// Respiration rate (breaths/min)
    pub respiration: Vec<Option<f64>>,
    /// Night rest interval as decimal hours [start, end]
    pub sleep_range: Vec<Option<[f64; 2]>>,
    /// Sleep-onset hour, after-midnight times shifted by +24
    pub onset_hours: Vec<Option<f64>>,
    /// Total out-of-bed hours: 24 - day_on_bed - night_on_bed, floored at 0
    pub leave_total_hours: Vec<Option<f64>>,
    /// Mean night turn interval (minutes)
    pub night_turn_minutes: Vec<Option<f64>>,
    /// Mean day turn interval (minutes)
    pub day_turn_minutes: Vec<Option<f64>>,
    /// Longest continuous night lying stretch (hours)
    pub longest_lying_hours: Vec<Option<f64>>,
    /// Bed exits during the sleep period
    pub night_leave_counts: Vec<Option<f64>>,
}

/// Full month report for the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthReport {
    pub month: MonthKey,
    pub mode: ReportMode,
    pub scores: ScoreTriple,
    pub series: DailySeries,
    /// Month mean of night_on_bed + day_on_bed over valid days
    pub onbed_total_avg: Option<f64>,
    /// Month mean of the sleep-period leave count over valid days
    pub night_leave_avg: Option<f64>,
}

/// Per-month means for the half-year trend charts. A month with zero
/// contributing valid days carries `None` everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: MonthKey,
    pub night_on_bed_hours: Option<f64>,
    pub night_sleep_hours: Option<f64>,
    pub respiration: Option<f64>,
    pub day_on_bed_hours: Option<f64>,
    /// 24 - day_on_bed - night_on_bed, per day then averaged
    pub leave_total_hours: Option<f64>,
    /// Sleep-period bed exits
    pub night_leave_count: Option<f64>,
    /// Sleep-period out-of-bed minutes
    pub asleep_leave_minutes: Option<f64>,
    /// Sleep-onset hour (after-midnight shifted by +24)
    pub onset_hour: Option<f64>,
    pub night_turn_minutes: Option<f64>,
    pub day_turn_minutes: Option<f64>,
    /// sum(night_sleep) / sum(night_on_bed) * 100 over the month
    pub sleep_efficiency_pct: Option<f64>,
}

/// Six-month trend report ending at the reference month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HalfYearReport {
    pub months: Vec<MonthKey>,
    /// "YYYY/MM" labels, oldest first
    pub labels: Vec<String>,
    pub aggregates: Vec<MonthlyAggregate>,
    /// Classified from the reference month only
    pub mode: ReportMode,
}
