//! Score engine orchestration
//!
//! Pulls the windowed aggregates for one subject and for the population,
//! normalizes the subject against the population ranges, and folds the
//! three sub-scores into the weighted composite.
//!
//! The engine is a pure function of the store's current state: it keeps
//! nothing between calls and never mutates storage, so concurrent calls
//! for different subjects or windows are safe.

use crate::aggregate::{population_baseline, subject_aggregate};
use crate::error::ScoreError;
use crate::scoring::{composite, normalize_minmax, NEUTRAL_SCORE, SLEEP_TARGET_MINUTES};
use crate::store::MetricStore;
use crate::types::{HealthScore, ScoreComponents, SubjectId};
use chrono::{DateTime, Duration, Utc};

/// Default scoring window in days
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Largest accepted scoring window (10 years)
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Explicit engine configuration; no process-global settings
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Target sleep duration for the proximity score (minutes)
    pub sleep_target_minutes: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            sleep_target_minutes: SLEEP_TARGET_MINUTES,
        }
    }
}

/// Composite health-score engine over a [`MetricStore`]
pub struct ScoreEngine<S: MetricStore> {
    store: S,
    config: ScoreConfig,
}

impl<S: MetricStore> ScoreEngine<S> {
    /// Create an engine with default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, ScoreConfig::default())
    }

    pub fn with_config(store: S, config: ScoreConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Compute the composite health score over `[now - window_days, now)`.
    ///
    /// Subject existence is the caller's concern; an unknown subject simply
    /// scores as one with no records.
    pub fn compute(
        &self,
        subject_id: SubjectId,
        window_days: u32,
    ) -> Result<HealthScore, ScoreError> {
        self.compute_at(subject_id, window_days, Utc::now())
    }

    /// Deterministic variant of [`compute`](Self::compute) with an explicit
    /// reference instant; identical store state and `now` yield identical
    /// output.
    pub fn compute_at(
        &self,
        subject_id: SubjectId,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<HealthScore, ScoreError> {
        if window_days == 0 || window_days > MAX_WINDOW_DAYS {
            return Err(ScoreError::InvalidWindow(i64::from(window_days)));
        }
        let since = now - Duration::days(i64::from(window_days));
        let target = self.config.sleep_target_minutes;

        let subject = subject_aggregate(
            self.store.activity_totals(subject_id, since)?,
            self.store.sleep_means(subject_id, since)?,
            self.store.glucose_mean(subject_id, since)?,
            target,
        );

        let baseline = population_baseline(
            &self.store.activity_totals_by_subject(since)?,
            &self.store.sleep_means_by_subject(since)?,
            &self.store.glucose_mean_by_subject(since)?,
            subject.glucose_avg,
            target,
        );

        let steps_score = normalize_minmax(subject.steps_avg_per_day, baseline.steps, false);
        let sleep_score = normalize_minmax(subject.sleep_mix, baseline.sleep, false);
        // Without any glucose readings the reversed scale would reward the
        // zero average; pin the sub-score to neutral instead.
        let glucose_score = if subject.glucose_avg > 0.0 {
            normalize_minmax(subject.glucose_avg, baseline.glucose, true)
        } else {
            NEUTRAL_SCORE
        };

        Ok(HealthScore {
            since,
            components: ScoreComponents {
                steps_avg_per_day: subject.steps_avg_per_day,
                steps_score,
                sleep_avg_minutes: subject.sleep_avg_minutes,
                sleep_avg_quality: subject.sleep_avg_quality,
                sleep_score,
                glucose_avg: subject.glucose_avg,
                glucose_score,
            },
            score: composite(steps_score, sleep_score, glucose_score),
        })
    }
}
