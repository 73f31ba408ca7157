//! Metric storage interface
//!
//! This module defines the narrow read capability the engine consumes.
//! Any store answering these six windowed queries can back the engine;
//! the bundled [`MemoryStore`] is the reference implementation used by
//! tests and the CLI.
//!
//! Snapshot consistency between the subject and population queries of a
//! single scoring call is the store's concern. `MemoryStore` serves a
//! whole call from one immutable borrow; external stores should provide
//! at least read-committed isolation.

mod memory;

pub use memory::{Dataset, MemoryStore};

use crate::error::ScoreError;
use crate::types::SubjectId;
use chrono::{DateTime, Utc};

/// Windowed, read-only aggregate queries over health records.
///
/// All queries select records with timestamps at or after `since`.
/// Population variants return one row per subject with at least one
/// qualifying record in the window.
pub trait MetricStore {
    /// Step sum and count of distinct active calendar days for one subject
    fn activity_totals(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<(f64, u32), ScoreError>;

    /// Mean sleep duration (minutes) and mean quality for one subject;
    /// (0, 0) when the subject has no in-window sessions
    fn sleep_means(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<(f64, f64), ScoreError>;

    /// Mean glucose value for one subject; 0 when there are no readings
    fn glucose_mean(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<f64, ScoreError>;

    /// Per-subject step sums and distinct active days across the population
    fn activity_totals_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64, u32)>, ScoreError>;

    /// Per-subject mean sleep duration and quality across the population
    fn sleep_means_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64, f64)>, ScoreError>;

    /// Per-subject mean glucose values across the population
    fn glucose_mean_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64)>, ScoreError>;
}
