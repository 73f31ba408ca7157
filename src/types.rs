//! Core types for the vitalscore engine
//!
//! This module defines the data structures that flow through scoring:
//! input records, per-subject aggregates, population baselines, and the
//! final score payload.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Subject identifier used to scope records
pub type SubjectId = u64;

/// Blood test kind persisted with each reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Glucose,
    Cholesterol,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestKind::Glucose => "glucose",
            TestKind::Cholesterol => "cholesterol",
        }
    }
}

/// Subject gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Subject profile record
///
/// The engine itself never reads profiles; callers use them for the
/// subject-existence check before scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
}

/// A single physical activity session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub subject_id: SubjectId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Step count for the session; missing counts as 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

/// A single sleep session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepRecord {
    pub subject_id: SubjectId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Subjective quality 0-100; missing counts as 0 in averages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

/// A single blood test reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodTestRecord {
    pub subject_id: SubjectId,
    pub measured_at: DateTime<Utc>,
    pub kind: TestKind,
    pub value: f64,
    /// Measurement unit, e.g. "mg/dL" for glucose
    pub unit: String,
}

/// Per-subject windowed aggregate, recomputed on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAggregate {
    /// Steps summed over the window divided by distinct active days
    pub steps_avg_per_day: f64,
    /// Mean sleep duration across in-window sessions (minutes)
    pub sleep_avg_minutes: f64,
    /// Mean sleep quality across in-window sessions
    pub sleep_avg_quality: f64,
    /// Blend of duration-proximity score and quality average
    pub sleep_mix: f64,
    /// Mean glucose value across in-window glucose readings
    pub glucose_avg: f64,
}

/// Observed min/max of a per-subject metric multiset
///
/// An empty multiset is represented as a degenerate range so that
/// normalization falls back to the neutral score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    /// Collapse to a single point (empty population fallback)
    pub fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Range of an iterator of per-subject values; `None` when empty
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |range, v| {
            Some(match range {
                None => Self { min: v, max: v },
                Some(r) => Self {
                    min: r.min.min(v),
                    max: r.max.max(v),
                },
            })
        })
    }
}

/// Population comparison baselines for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationBaseline {
    pub steps: MetricRange,
    pub sleep: MetricRange,
    pub glucose: MetricRange,
}

/// Raw averages and normalized sub-scores backing the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub steps_avg_per_day: f64,
    pub steps_score: f64,
    pub sleep_avg_minutes: f64,
    pub sleep_avg_quality: f64,
    pub sleep_score: f64,
    pub glucose_avg: f64,
    pub glucose_score: f64,
}

/// Composite health score payload returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// Start of the scoring window (half-open `[since, now)`)
    pub since: DateTime<Utc>,
    pub components: ScoreComponents,
    /// Weighted composite, 0-100, rounded to 2 decimals
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_range_of_values() {
        let range = MetricRange::of([3.0, 1.0, 2.0]).unwrap();
        assert_eq!(range.min, 1.0);
        assert_eq!(range.max, 3.0);
    }

    #[test]
    fn test_metric_range_empty() {
        assert!(MetricRange::of(std::iter::empty()).is_none());
    }

    #[test]
    fn test_metric_range_point() {
        let range = MetricRange::point(7.5);
        assert_eq!(range.min, range.max);
    }

    #[test]
    fn test_test_kind_serde_lowercase() {
        let json = serde_json::to_string(&TestKind::Glucose).unwrap();
        assert_eq!(json, "\"glucose\"");
        let kind: TestKind = serde_json::from_str("\"cholesterol\"").unwrap();
        assert_eq!(kind, TestKind::Cholesterol);
    }
}
