//! Scoring math
//!
//! This module holds the pure functions behind every sub-score:
//! - Min-max normalization of a subject value against the population range
//! - Target-based sleep duration scoring
//! - The duration/quality sleep blend and the composite weighting

use crate::types::MetricRange;

/// Neutral score returned when a range is empty or degenerate
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Target sleep duration in minutes (7.5 hours)
pub const SLEEP_TARGET_MINUTES: f64 = 450.0;

/// Deviation from target with no penalty (minutes)
const DURATION_DEAD_ZONE_MINUTES: f64 = 30.0;

/// Span over which the duration score decays to zero (minutes)
const DURATION_DECAY_MINUTES: f64 = 360.0;

/// Sleep blend: duration score weight vs. quality average weight
const SLEEP_DURATION_WEIGHT: f64 = 0.7;
const SLEEP_QUALITY_WEIGHT: f64 = 0.3;

/// Composite weights: activity / sleep / glucose
pub const STEPS_WEIGHT: f64 = 0.5;
pub const SLEEP_WEIGHT: f64 = 0.3;
pub const GLUCOSE_WEIGHT: f64 = 0.2;

/// Min-max normalize `value` against `range` onto a 0-100 scale.
///
/// A degenerate range (`max <= min`, which includes the empty-population
/// fallback) carries no information, so the neutral score is returned
/// instead of dividing by zero. With `reverse`, lower raw values score
/// higher (used for glucose).
pub fn normalize_minmax(value: f64, range: MetricRange, reverse: bool) -> f64 {
    if range.max <= range.min {
        return NEUTRAL_SCORE;
    }
    let mut norm = (value - range.min) / (range.max - range.min);
    if reverse {
        norm = 1.0 - norm;
    }
    norm.clamp(0.0, 1.0) * 100.0
}

/// Score sleep duration by proximity to `target` minutes.
///
/// Deviations within the 30-minute dead zone score 100; beyond it the
/// score decays linearly and reaches 0 at a 390-minute deviation.
/// Non-positive durations score 0.
pub fn target_duration_score(minutes: f64, target: f64) -> f64 {
    if minutes <= 0.0 {
        return 0.0;
    }
    let deviation = (minutes - target).abs();
    let base = if deviation <= DURATION_DEAD_ZONE_MINUTES {
        1.0
    } else {
        (1.0 - (deviation - DURATION_DEAD_ZONE_MINUTES) / DURATION_DECAY_MINUTES).max(0.0)
    };
    base * 100.0
}

/// Blend a duration-proximity score with the raw quality average
pub fn sleep_mix(duration_score: f64, quality_avg: f64) -> f64 {
    SLEEP_DURATION_WEIGHT * duration_score + SLEEP_QUALITY_WEIGHT * quality_avg
}

/// Weighted composite of the three sub-scores, rounded to 2 decimals
pub fn composite(steps_score: f64, sleep_score: f64, glucose_score: f64) -> f64 {
    let total =
        STEPS_WEIGHT * steps_score + SLEEP_WEIGHT * sleep_score + GLUCOSE_WEIGHT * glucose_score;
    round2(total)
}

/// Round to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn range(min: f64, max: f64) -> MetricRange {
        MetricRange { min, max }
    }

    #[test]
    fn test_normalize_midpoint() {
        assert_eq!(normalize_minmax(5.0, range(0.0, 10.0), false), 50.0);
    }

    #[test]
    fn test_normalize_bounds() {
        assert_eq!(normalize_minmax(10.0, range(0.0, 10.0), false), 100.0);
        assert_eq!(normalize_minmax(0.0, range(0.0, 10.0), false), 0.0);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        assert_eq!(normalize_minmax(15.0, range(0.0, 10.0), false), 100.0);
        assert_eq!(normalize_minmax(-5.0, range(0.0, 10.0), false), 0.0);
    }

    #[test]
    fn test_normalize_degenerate_range_is_neutral() {
        for value in [0.0, 5.0, 123.4] {
            assert_eq!(normalize_minmax(value, range(5.0, 5.0), false), 50.0);
            assert_eq!(normalize_minmax(value, range(5.0, 5.0), true), 50.0);
        }
        // Inverted bounds count as degenerate too
        assert_eq!(normalize_minmax(3.0, range(10.0, 0.0), false), 50.0);
    }

    #[test]
    fn test_normalize_reversed() {
        // Lower is better: value at min scores 100
        assert_eq!(normalize_minmax(0.0, range(0.0, 10.0), true), 100.0);
        assert_eq!(normalize_minmax(10.0, range(0.0, 10.0), true), 0.0);
        assert_eq!(normalize_minmax(2.5, range(0.0, 10.0), true), 75.0);
    }

    #[test]
    fn test_duration_score_at_target() {
        assert_eq!(target_duration_score(450.0, SLEEP_TARGET_MINUTES), 100.0);
    }

    #[test]
    fn test_duration_score_dead_zone() {
        assert_eq!(target_duration_score(480.0, SLEEP_TARGET_MINUTES), 100.0);
        assert_eq!(target_duration_score(420.0, SLEEP_TARGET_MINUTES), 100.0);
    }

    #[test]
    fn test_duration_score_zero_minutes() {
        assert_eq!(target_duration_score(0.0, SLEEP_TARGET_MINUTES), 0.0);
        assert_eq!(target_duration_score(-10.0, SLEEP_TARGET_MINUTES), 0.0);
    }

    #[test]
    fn test_duration_score_decays_to_zero() {
        // 840 = target + dead zone + decay span
        assert_eq!(target_duration_score(840.0, SLEEP_TARGET_MINUTES), 0.0);
        assert_eq!(target_duration_score(1000.0, SLEEP_TARGET_MINUTES), 0.0);
        // Just short of the endpoint the score is still positive
        let near_end = target_duration_score(810.0, SLEEP_TARGET_MINUTES);
        let expected = 100.0 * (1.0 - 330.0 / 360.0);
        assert!((near_end - expected).abs() < 1e-9);
    }

    #[test]
    fn test_duration_score_linear_decay() {
        // 60 minutes off target: 30 past the dead zone
        let score = target_duration_score(390.0, SLEEP_TARGET_MINUTES);
        let expected = (1.0 - 30.0 / 360.0) * 100.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sleep_mix_blend() {
        let mix = sleep_mix(100.0, 80.0);
        assert!((mix - 94.0).abs() < 1e-9);
    }

    #[test]
    fn test_composite_weights() {
        assert_eq!(composite(100.0, 100.0, 100.0), 100.0);
        assert_eq!(composite(50.0, 50.0, 50.0), 50.0);
        // 0.5*80 + 0.3*60 + 0.2*40 = 66
        assert_eq!(composite(80.0, 60.0, 40.0), 66.0);
    }

    #[test]
    fn test_composite_rounding() {
        // 0.5*33.333 + 0.3*33.333 + 0.2*33.333 = 33.333 -> 33.33
        assert_eq!(composite(33.333, 33.333, 33.333), 33.33);
    }
}
