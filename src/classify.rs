//! Report-mode classification
//!
//! Decides whether a resident's period renders with the bed-bound or the
//! ambulatory template. An explicit override always wins; otherwise the
//! decision falls out of two monthly aggregates. A missing aggregate
//! defaults the result to ambulatory.

use log::debug;

use crate::types::ReportMode;

/// Minimum mean total on-bed hours (night + day) for bed-bound reporting.
pub const BED_MODE_MIN_ONBED_HOURS: f64 = 10.0;

/// Maximum mean sleep-period bed exits for bed-bound reporting.
pub const BED_MODE_MAX_LEAVE_COUNT: f64 = 1.0;

/// Classify a reporting period.
///
/// `onbed_avg` is the mean of `night_on_bed + day_on_bed` over valid days;
/// `leave_avg` is the mean sleep-period leave count over valid days. The
/// same rule applies per reference month when producing multi-month series.
pub fn classify(
    force_mode: Option<ReportMode>,
    onbed_avg: Option<f64>,
    leave_avg: Option<f64>,
) -> ReportMode {
    if let Some(forced) = force_mode {
        debug!("report mode forced to {}", forced.as_str());
        return forced;
    }

    let mode = match (onbed_avg, leave_avg) {
        (Some(onbed), Some(leave))
            if onbed >= BED_MODE_MIN_ONBED_HOURS && leave <= BED_MODE_MAX_LEAVE_COUNT =>
        {
            ReportMode::Bed
        }
        _ => ReportMode::Active,
    };
    debug!(
        "report mode {}: onbed_avg={:?} leave_avg={:?}",
        mode.as_str(),
        onbed_avg,
        leave_avg
    );
    mode
}
