//! Wellness scoring
//!
//! Three independent 1-3 scores are produced per month: respiration,
//! daily rhythm, and sleep quality. Each score is the minimum of exactly
//! three sub-rules, so one weak sub-metric caps the whole score. A sub-rule
//! without enough data resolves to the neutral sub-score 2, diluting the
//! result toward the middle rather than biasing it either way.

use log::debug;

use crate::types::ScoreTriple;

/// Sub-score granted when a sub-rule lacks the data to judge
const NEUTRAL_SUB_SCORE: u8 = 2;

/// Arithmetic mean, `None` on an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Ordinary-least-squares slope of y against x.
///
/// Fewer than two points, or a degenerate x spread, yields a flat slope.
pub fn ols_slope(points: &[(f64, f64)]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let num: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let den: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Respiration score over a month's per-calendar-day respiration array
/// (`None` for invalid/missing days) and the collected per-day variability
/// values.
///
/// The regression x-axis is the 0-based calendar-day index within the
/// month, so gaps between valid days stretch the trend as they do on the
/// chart.
pub fn respiration_score(respiration: &[Option<f64>], std_devs: &[f64]) -> u8 {
    let values: Vec<f64> = respiration.iter().flatten().copied().collect();

    let sub1 = match mean(&values) {
        None => NEUTRAL_SUB_SCORE,
        Some(avg) if (12.0..=26.0).contains(&avg) => 3,
        Some(avg) if (9.0..12.0).contains(&avg) || (avg > 26.0 && avg <= 30.0) => 2,
        Some(_) => 1,
    };

    let sub2 = match mean(std_devs) {
        None => NEUTRAL_SUB_SCORE,
        Some(avg) if avg <= 4.0 => 3,
        Some(avg) if avg <= 5.0 => 2,
        Some(_) => 1,
    };

    let points: Vec<(f64, f64)> = respiration
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
        .collect();
    let slope = ols_slope(&points).abs();
    let sub3 = if slope <= 0.05 {
        3
    } else if slope <= 0.1 {
        2
    } else {
        1
    };

    let score = sub1.min(sub2).min(sub3);
    debug!(
        "respiration score: avg={:?} avg_std={:?} slope={:.4} subs=({},{},{}) -> {}",
        mean(&values),
        mean(std_devs),
        slope,
        sub1,
        sub2,
        sub3,
        score
    );
    score
}

/// Daily-rhythm rule set, selected once per computation by the report mode.
#[derive(Debug, Clone)]
pub enum RhythmRules {
    /// Ambulatory residents are judged on the regularity of their sleep
    /// onset and wake times (shifted decimal hours).
    Ambulatory {
        onset_hours: Vec<f64>,
        end_hours: Vec<f64>,
    },
    /// Bed-bound residents are judged on turn intervals and time spent
    /// out of bed during the day.
    BedBound {
        night_turn_minutes: Vec<f64>,
        day_turn_minutes: Vec<f64>,
        day_leave_hours: Vec<f64>,
    },
}

/// Daily-rhythm score for the applicable rule set.
pub fn rhythm_score(rules: &RhythmRules) -> u8 {
    match rules {
        RhythmRules::Ambulatory {
            onset_hours,
            end_hours,
        } => {
            let sub1 = match mean(onset_hours) {
                None => NEUTRAL_SUB_SCORE,
                Some(avg) => {
                    let m = avg.rem_euclid(24.0);
                    if (20.0..24.0).contains(&m) || (0.0..1.0).contains(&m) {
                        3
                    } else if (17.0..20.0).contains(&m) || (1.0..2.0).contains(&m) {
                        2
                    } else {
                        1
                    }
                }
            };
            let sub2 = spread_sub_score(onset_hours);
            let sub3 = spread_sub_score(end_hours);

            let score = sub1.min(sub2).min(sub3);
            debug!(
                "rhythm score (ambulatory): avg_onset={:?} subs=({},{},{}) -> {}",
                mean(onset_hours),
                sub1,
                sub2,
                sub3,
                score
            );
            score
        }
        RhythmRules::BedBound {
            night_turn_minutes,
            day_turn_minutes,
            day_leave_hours,
        } => {
            let sub1 = match mean(night_turn_minutes) {
                None => NEUTRAL_SUB_SCORE,
                Some(avg) if avg < 370.0 => 3,
                Some(avg) if avg <= 430.0 => 2,
                Some(_) => 1,
            };
            let sub2 = match mean(day_turn_minutes) {
                None => NEUTRAL_SUB_SCORE,
                Some(avg) if avg < 190.0 => 3,
                Some(avg) if avg <= 250.0 => 2,
                Some(_) => 1,
            };
            let sub3 = match mean(day_leave_hours) {
                None => NEUTRAL_SUB_SCORE,
                Some(avg) if avg > 4.0 => 3,
                Some(avg) if avg >= 2.0 => 2,
                Some(_) => 1,
            };

            let score = sub1.min(sub2).min(sub3);
            debug!(
                "rhythm score (bed-bound): night={:?} day={:?} leave={:?} subs=({},{},{}) -> {}",
                mean(night_turn_minutes),
                mean(day_turn_minutes),
                mean(day_leave_hours),
                sub1,
                sub2,
                sub3,
                score
            );
            score
        }
    }
}

/// Regularity sub-rule: spread between the earliest and latest hour.
/// Needs at least two points; up to 3 hours of spread is fine, up to 4 is
/// borderline.
fn spread_sub_score(hours: &[f64]) -> u8 {
    if hours.len() < 2 {
        return NEUTRAL_SUB_SCORE;
    }
    let min = hours.iter().copied().fold(f64::INFINITY, f64::min);
    let max = hours.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread <= 3.0 {
        3
    } else if spread <= 4.0 {
        2
    } else {
        1
    }
}

/// Sleep-quality score, identical in both report modes.
///
/// Inputs are collected over valid days only: night sleep hours,
/// sleep-period bed-exit counts, and the per-day sleep efficiency
/// (`night_sleep / night_on_bed` where the on-bed time is positive).
pub fn sleep_quality_score(
    night_sleep_hours: &[f64],
    night_leave_counts: &[f64],
    efficiencies: &[f64],
) -> u8 {
    let sub1 = match mean(night_sleep_hours) {
        None => NEUTRAL_SUB_SCORE,
        Some(avg) if (6.0..=10.0).contains(&avg) => 3,
        Some(avg) if (4.0..6.0).contains(&avg) || (avg > 10.0 && avg <= 12.0) => 2,
        Some(_) => 1,
    };

    let sub2 = match mean(night_leave_counts) {
        None => NEUTRAL_SUB_SCORE,
        Some(avg) if avg <= 5.0 => 3,
        Some(avg) if avg <= 15.0 => 2,
        Some(_) => 1,
    };

    let sub3 = match mean(efficiencies) {
        None => NEUTRAL_SUB_SCORE,
        Some(avg) if avg > 0.8 => 3,
        Some(avg) if avg >= 0.6 => 2,
        Some(_) => 1,
    };

    let score = sub1.min(sub2).min(sub3);
    debug!(
        "sleep score: avg_sleep={:?} avg_leave={:?} avg_eff={:?} subs=({},{},{}) -> {}",
        mean(night_sleep_hours),
        mean(night_leave_counts),
        mean(efficiencies),
        sub1,
        sub2,
        sub3,
        score
    );
    score
}

/// Assemble the full triple from already-computed components.
pub fn score_triple(respiration: u8, rhythm: u8, sleep_quality: u8) -> ScoreTriple {
    ScoreTriple {
        respiration,
        rhythm,
        sleep_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }

    #[test]
    fn slope_degenerates_to_flat() {
        assert_eq!(ols_slope(&[]), 0.0);
        assert_eq!(ols_slope(&[(0.0, 5.0)]), 0.0);
        assert_eq!(ols_slope(&[(1.0, 2.0), (1.0, 4.0)]), 0.0);
    }

    #[test]
    fn slope_recovers_a_linear_series() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 3.0 + 0.5 * i as f64)).collect();
        assert!((ols_slope(&points) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn steady_respiration_scores_three() {
        let series = vec![Some(15.0), Some(14.9), Some(15.1), Some(15.0)];
        let std_devs = vec![2.0, 2.0, 2.0, 2.0];
        assert_eq!(respiration_score(&series, &std_devs), 3);
    }

    #[test]
    fn respiration_mean_bands() {
        // Mean 10.0 falls in the [9, 12) borderline band.
        let series = vec![Some(10.0), Some(10.0)];
        assert_eq!(respiration_score(&series, &[]), 2);
        // Mean 8.0 is out of range.
        let series = vec![Some(8.0), Some(8.0)];
        assert_eq!(respiration_score(&series, &[]), 1);
    }

    #[test]
    fn respiration_variability_caps_the_score() {
        let series = vec![Some(15.0), Some(15.0)];
        assert_eq!(respiration_score(&series, &[4.5]), 2);
        assert_eq!(respiration_score(&series, &[6.5]), 1);
    }

    #[test]
    fn respiration_trend_caps_the_score() {
        // Rises by 0.2/day: slope well above 0.1.
        let series: Vec<Option<f64>> = (0..20).map(|i| Some(15.0 + 0.2 * i as f64)).collect();
        assert_eq!(respiration_score(&series, &[]), 1);
    }

    #[test]
    fn no_respiration_data_is_neutral() {
        assert_eq!(respiration_score(&[None, None], &[]), 2);
    }

    #[test]
    fn ambulatory_rhythm_steady_bedtimes() {
        let rules = RhythmRules::Ambulatory {
            onset_hours: vec![21.0, 21.5, 22.0],
            end_hours: vec![29.0, 29.5, 30.0],
        };
        assert_eq!(rhythm_score(&rules), 3);
    }

    #[test]
    fn ambulatory_after_midnight_mean_uses_wrapped_hour() {
        // Mean onset 24.5 -> wrapped 0.5, inside the [0, 1) good band.
        let rules = RhythmRules::Ambulatory {
            onset_hours: vec![24.0, 25.0],
            end_hours: vec![31.0, 32.0],
        };
        assert_eq!(rhythm_score(&rules), 3);
    }

    #[test]
    fn ambulatory_wide_onset_spread_caps_score() {
        let rules = RhythmRules::Ambulatory {
            onset_hours: vec![20.0, 25.0],
            end_hours: vec![28.0, 28.5],
        };
        // Mean onset 22.5 is fine, but a 5-hour spread scores 1.
        assert_eq!(rhythm_score(&rules), 1);
    }

    #[test]
    fn ambulatory_single_day_is_neutral_for_spreads() {
        let rules = RhythmRules::Ambulatory {
            onset_hours: vec![21.0],
            end_hours: vec![29.0],
        };
        // Sub1 = 3, spreads neutral at 2.
        assert_eq!(rhythm_score(&rules), 2);
    }

    #[test]
    fn bed_bound_rhythm_thresholds() {
        let good = RhythmRules::BedBound {
            night_turn_minutes: vec![300.0],
            day_turn_minutes: vec![150.0],
            day_leave_hours: vec![5.0],
        };
        assert_eq!(rhythm_score(&good), 3);

        let sparse_turns = RhythmRules::BedBound {
            night_turn_minutes: vec![500.0],
            day_turn_minutes: vec![150.0],
            day_leave_hours: vec![5.0],
        };
        assert_eq!(rhythm_score(&sparse_turns), 1);

        let borderline = RhythmRules::BedBound {
            night_turn_minutes: vec![400.0],
            day_turn_minutes: vec![200.0],
            day_leave_hours: vec![3.0],
        };
        assert_eq!(rhythm_score(&borderline), 2);
    }

    #[test]
    fn bed_bound_without_data_is_neutral() {
        let rules = RhythmRules::BedBound {
            night_turn_minutes: vec![],
            day_turn_minutes: vec![],
            day_leave_hours: vec![],
        };
        assert_eq!(rhythm_score(&rules), 2);
    }

    #[test]
    fn sleep_quality_bands() {
        assert_eq!(sleep_quality_score(&[7.0, 8.0], &[1.0, 2.0], &[0.9, 0.85]), 3);
        // 5 hours of sleep is borderline.
        assert_eq!(sleep_quality_score(&[5.0], &[1.0], &[0.9]), 2);
        // 14 bed exits on average is borderline, 16 is poor.
        assert_eq!(sleep_quality_score(&[7.0], &[14.0], &[0.9]), 2);
        assert_eq!(sleep_quality_score(&[7.0], &[16.0], &[0.9]), 1);
        // Efficiency below 0.6 is poor.
        assert_eq!(sleep_quality_score(&[7.0], &[1.0], &[0.5]), 1);
    }

    #[test]
    fn sleep_quality_without_data_is_neutral() {
        assert_eq!(sleep_quality_score(&[], &[], &[]), 2);
    }
}
