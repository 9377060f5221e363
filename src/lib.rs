//! caretrend
//!
//! A deterministic analytics engine for bed-sensor care monitoring. The
//! engine receives already-fetched daily rows, turn detections, and
//! occupancy events, and computes monthly wellness reports: validity
//! filtering, night windows, turn-interval analysis, 30-minute occupancy
//! timelines, three 1-3 wellness scores, bed/active classification, and
//! six-month trend aggregates. It performs no network or database I/O.
//!
//! ## Quick start
//!
//! ```no_run
//! use caretrend::{MonthKey, ReportEngine};
//! use std::collections::HashMap;
//!
//! let engine = ReportEngine::new();
//! let payload = engine
//!     .month_report_payload(MonthKey::new(2025, 10), &[], &[], &HashMap::new(), None)
//!     .unwrap();
//! println!("{payload}");
//! ```

pub mod adapter;
pub mod classify;
pub mod commentary;
pub mod encoder;
pub mod error;
pub mod monthly;
pub mod night;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod slots;
pub mod turns;
pub mod types;
pub mod validity;

pub use error::EngineError;
pub use pipeline::{half_year_report, month_report, trend_summary, ReportEngine};
pub use types::{
    BedStateEvent, DailySeries, HalfYearReport, MonthKey, MonthReport, MonthlyAggregate,
    NightWindow, RawDailyRecord, ReportMode, ScoreTriple, SlotState, SlotTimeline,
};

/// Engine version stamped into encoded payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name stamped into encoded payloads
pub const PRODUCER_NAME: &str = "caretrend";
