//! Aggregate derivation
//!
//! This module turns raw store rows into the ephemeral aggregates the
//! engine normalizes:
//! - A subject's windowed averages (steps/day, sleep, glucose)
//! - The population baseline ranges, one contribution per subject

use crate::scoring::{sleep_mix, target_duration_score};
use crate::types::{MetricRange, PopulationBaseline, SubjectAggregate, SubjectId};

/// Daily step average: window step sum over distinct active days.
///
/// The denominator is floored at 1 so a subject with no activity rows
/// averages to 0 rather than dividing by zero.
pub fn steps_avg_per_day(steps_sum: f64, distinct_days: u32) -> f64 {
    steps_sum / f64::from(distinct_days.max(1))
}

/// Build a subject's windowed aggregate from the three store queries
pub fn subject_aggregate(
    activity: (f64, u32),
    sleep: (f64, f64),
    glucose_avg: f64,
    sleep_target_minutes: f64,
) -> SubjectAggregate {
    let (steps_sum, distinct_days) = activity;
    let (sleep_avg_minutes, sleep_avg_quality) = sleep;

    let duration_score = target_duration_score(sleep_avg_minutes, sleep_target_minutes);

    SubjectAggregate {
        steps_avg_per_day: steps_avg_per_day(steps_sum, distinct_days),
        sleep_avg_minutes,
        sleep_avg_quality,
        sleep_mix: sleep_mix(duration_score, sleep_avg_quality),
        glucose_avg,
    }
}

/// Build the population comparison baselines from grouped store rows.
///
/// Each subject with at least one qualifying record contributes one value
/// per metric. Empty steps/sleep multisets collapse to a zero point; the
/// empty glucose multiset falls back to the scored subject's own average,
/// which forces a degenerate range and a neutral glucose sub-score.
pub fn population_baseline(
    activity_rows: &[(SubjectId, f64, u32)],
    sleep_rows: &[(SubjectId, f64, f64)],
    glucose_rows: &[(SubjectId, f64)],
    subject_glucose_avg: f64,
    sleep_target_minutes: f64,
) -> PopulationBaseline {
    let steps = MetricRange::of(
        activity_rows
            .iter()
            .map(|&(_, sum, days)| steps_avg_per_day(sum, days)),
    )
    .unwrap_or_else(|| MetricRange::point(0.0));

    let sleep = MetricRange::of(sleep_rows.iter().map(|&(_, avg_minutes, avg_quality)| {
        let duration_score = target_duration_score(avg_minutes, sleep_target_minutes);
        sleep_mix(duration_score, avg_quality)
    }))
    .unwrap_or_else(|| MetricRange::point(0.0));

    let glucose = MetricRange::of(glucose_rows.iter().map(|&(_, avg)| avg))
        .unwrap_or_else(|| MetricRange::point(subject_glucose_avg));

    PopulationBaseline {
        steps,
        sleep,
        glucose,
    }
}
