//! In-memory metric store
//!
//! Reference [`MetricStore`] backed by plain record vectors. Tests and the
//! CLI load a [`Dataset`] into it; production deployments would implement
//! the trait over a real database instead.

use super::MetricStore;
use crate::error::ScoreError;
use crate::types::{ActivityRecord, BloodTestRecord, SleepRecord, Subject, SubjectId, TestKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Serializable bundle of subjects and records for loading a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
    #[serde(default)]
    pub sleeps: Vec<SleepRecord>,
    #[serde(default)]
    pub blood_tests: Vec<BloodTestRecord>,
}

/// In-memory record store
///
/// Every query of one scoring call reads the same immutable state, so the
/// subject and population aggregates always observe a consistent snapshot.
/// Missing `steps` and `quality` fields are treated as 0 when aggregating,
/// matching the scoring contract for absent data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    subjects: BTreeMap<SubjectId, Subject>,
    activities: Vec<ActivityRecord>,
    sleeps: Vec<SleepRecord>,
    blood_tests: Vec<BloodTestRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a deserialized dataset
    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            subjects: dataset.subjects.into_iter().map(|s| (s.id, s)).collect(),
            activities: dataset.activities,
            sleeps: dataset.sleeps,
            blood_tests: dataset.blood_tests,
        }
    }

    /// Load a store from a JSON-encoded [`Dataset`]
    pub fn from_json(json: &str) -> Result<Self, ScoreError> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(Self::from_dataset(dataset))
    }

    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.insert(subject.id, subject);
    }

    pub fn add_activity(&mut self, record: ActivityRecord) {
        self.activities.push(record);
    }

    pub fn add_sleep(&mut self, record: SleepRecord) {
        self.sleeps.push(record);
    }

    pub fn add_blood_test(&mut self, record: BloodTestRecord) {
        self.blood_tests.push(record);
    }

    /// Caller-side existence check; the engine itself never performs it
    pub fn contains_subject(&self, subject_id: SubjectId) -> bool {
        self.subjects.contains_key(&subject_id)
    }

    pub fn subject(&self, subject_id: SubjectId) -> Option<&Subject> {
        self.subjects.get(&subject_id)
    }

    fn in_window_activities(
        &self,
        since: DateTime<Utc>,
    ) -> impl Iterator<Item = &ActivityRecord> {
        self.activities.iter().filter(move |r| r.start_time >= since)
    }

    fn in_window_sleeps(&self, since: DateTime<Utc>) -> impl Iterator<Item = &SleepRecord> {
        self.sleeps.iter().filter(move |r| r.start_time >= since)
    }

    fn in_window_glucose(
        &self,
        since: DateTime<Utc>,
    ) -> impl Iterator<Item = &BloodTestRecord> {
        self.blood_tests
            .iter()
            .filter(move |r| r.kind == TestKind::Glucose && r.measured_at >= since)
    }
}

/// Fold activity records into (step sum, distinct active days)
fn fold_activity<'a>(records: impl Iterator<Item = &'a ActivityRecord>) -> (f64, u32) {
    let mut steps_sum = 0.0;
    let mut days = BTreeSet::new();
    for record in records {
        steps_sum += f64::from(record.steps.unwrap_or(0));
        days.insert(record.start_time.date_naive());
    }
    (steps_sum, days.len() as u32)
}

/// Fold sleep records into (mean duration, mean quality); (0, 0) when empty
fn fold_sleep<'a>(records: impl Iterator<Item = &'a SleepRecord>) -> (f64, f64) {
    let mut duration_sum = 0.0;
    let mut quality_sum = 0.0;
    let mut count = 0u32;
    for record in records {
        duration_sum += f64::from(record.duration_minutes);
        quality_sum += f64::from(record.quality.unwrap_or(0));
        count += 1;
    }
    if count == 0 {
        (0.0, 0.0)
    } else {
        (duration_sum / f64::from(count), quality_sum / f64::from(count))
    }
}

/// Fold glucose readings into a mean value; 0 when empty
fn fold_glucose<'a>(records: impl Iterator<Item = &'a BloodTestRecord>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u32;
    for record in records {
        sum += record.value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

impl MetricStore for MemoryStore {
    fn activity_totals(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<(f64, u32), ScoreError> {
        Ok(fold_activity(
            self.in_window_activities(since)
                .filter(|r| r.subject_id == subject_id),
        ))
    }

    fn sleep_means(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<(f64, f64), ScoreError> {
        Ok(fold_sleep(
            self.in_window_sleeps(since)
                .filter(|r| r.subject_id == subject_id),
        ))
    }

    fn glucose_mean(
        &self,
        subject_id: SubjectId,
        since: DateTime<Utc>,
    ) -> Result<f64, ScoreError> {
        Ok(fold_glucose(
            self.in_window_glucose(since)
                .filter(|r| r.subject_id == subject_id),
        ))
    }

    fn activity_totals_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64, u32)>, ScoreError> {
        let mut grouped: BTreeMap<SubjectId, Vec<&ActivityRecord>> = BTreeMap::new();
        for record in self.in_window_activities(since) {
            grouped.entry(record.subject_id).or_default().push(record);
        }
        Ok(grouped
            .into_iter()
            .map(|(id, records)| {
                let (sum, days) = fold_activity(records.into_iter());
                (id, sum, days)
            })
            .collect())
    }

    fn sleep_means_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64, f64)>, ScoreError> {
        let mut grouped: BTreeMap<SubjectId, Vec<&SleepRecord>> = BTreeMap::new();
        for record in self.in_window_sleeps(since) {
            grouped.entry(record.subject_id).or_default().push(record);
        }
        Ok(grouped
            .into_iter()
            .map(|(id, records)| {
                let (minutes, quality) = fold_sleep(records.into_iter());
                (id, minutes, quality)
            })
            .collect())
    }

    fn glucose_mean_by_subject(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<(SubjectId, f64)>, ScoreError> {
        let mut grouped: BTreeMap<SubjectId, Vec<&BloodTestRecord>> = BTreeMap::new();
        for record in self.in_window_glucose(since) {
            grouped.entry(record.subject_id).or_default().push(record);
        }
        Ok(grouped
            .into_iter()
            .map(|(id, records)| (id, fold_glucose(records.into_iter())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn activity(subject_id: SubjectId, start: DateTime<Utc>, steps: Option<u32>) -> ActivityRecord {
        ActivityRecord {
            subject_id,
            start_time: start,
            end_time: start + Duration::minutes(45),
            steps,
            distance_km: None,
            calories: None,
        }
    }

    fn sleep(subject_id: SubjectId, start: DateTime<Utc>, minutes: u32, quality: Option<u8>) -> SleepRecord {
        SleepRecord {
            subject_id,
            start_time: start,
            end_time: start + Duration::minutes(i64::from(minutes)),
            duration_minutes: minutes,
            quality,
        }
    }

    fn blood_test(subject_id: SubjectId, at: DateTime<Utc>, kind: TestKind, value: f64) -> BloodTestRecord {
        BloodTestRecord {
            subject_id,
            measured_at: at,
            kind,
            value,
            unit: "mg/dL".to_string(),
        }
    }

    #[test]
    fn test_activity_totals_distinct_days() {
        let mut store = MemoryStore::new();
        // Two sessions on the same day, one the next day
        store.add_activity(activity(1, ts(10, 8), Some(3000)));
        store.add_activity(activity(1, ts(10, 18), Some(2000)));
        store.add_activity(activity(1, ts(11, 9), Some(4000)));

        let (sum, days) = store.activity_totals(1, ts(1, 0)).unwrap();
        assert_eq!(sum, 9000.0);
        assert_eq!(days, 2);
    }

    #[test]
    fn test_activity_missing_steps_count_zero() {
        let mut store = MemoryStore::new();
        store.add_activity(activity(1, ts(10, 8), None));
        store.add_activity(activity(1, ts(10, 18), Some(500)));

        let (sum, days) = store.activity_totals(1, ts(1, 0)).unwrap();
        assert_eq!(sum, 500.0);
        assert_eq!(days, 1);
    }

    #[test]
    fn test_window_lower_bound_inclusive() {
        let mut store = MemoryStore::new();
        store.add_activity(activity(1, ts(10, 0), Some(100)));
        store.add_activity(activity(1, ts(9, 23), Some(900)));

        // since falls exactly on the first record
        let (sum, _) = store.activity_totals(1, ts(10, 0)).unwrap();
        assert_eq!(sum, 100.0);
    }

    #[test]
    fn test_sleep_means_missing_quality() {
        let mut store = MemoryStore::new();
        store.add_sleep(sleep(1, ts(10, 22), 400, Some(80)));
        store.add_sleep(sleep(1, ts(11, 22), 440, None));

        let (minutes, quality) = store.sleep_means(1, ts(1, 0)).unwrap();
        assert_eq!(minutes, 420.0);
        // Missing quality averaged as 0: (80 + 0) / 2
        assert_eq!(quality, 40.0);
    }

    #[test]
    fn test_sleep_means_empty() {
        let store = MemoryStore::new();
        assert_eq!(store.sleep_means(1, ts(1, 0)).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_glucose_mean_filters_kind() {
        let mut store = MemoryStore::new();
        store.add_blood_test(blood_test(1, ts(10, 9), TestKind::Glucose, 90.0));
        store.add_blood_test(blood_test(1, ts(11, 9), TestKind::Glucose, 110.0));
        store.add_blood_test(blood_test(1, ts(12, 9), TestKind::Cholesterol, 220.0));

        assert_eq!(store.glucose_mean(1, ts(1, 0)).unwrap(), 100.0);
    }

    #[test]
    fn test_population_rows_grouped_per_subject() {
        let mut store = MemoryStore::new();
        store.add_activity(activity(1, ts(10, 8), Some(2000)));
        store.add_activity(activity(2, ts(10, 8), Some(8000)));
        store.add_activity(activity(2, ts(11, 8), Some(8000)));
        // Out of window, must not contribute
        store.add_activity(activity(3, ts(2, 8), Some(99999)));

        let rows = store.activity_totals_by_subject(ts(5, 0)).unwrap();
        assert_eq!(rows, vec![(1, 2000.0, 1), (2, 16000.0, 2)]);
    }

    #[test]
    fn test_dataset_round_trip() {
        let json = r#"{
            "subjects": [{"id": 1, "email": "ada@example.org", "gender": "female"}],
            "activities": [{
                "subject_id": 1,
                "start_time": "2024-03-10T08:00:00Z",
                "end_time": "2024-03-10T08:45:00Z",
                "steps": 4200
            }],
            "sleeps": [],
            "blood_tests": []
        }"#;
        let store = MemoryStore::from_json(json).unwrap();
        assert!(store.contains_subject(1));
        assert!(!store.contains_subject(2));
        let (sum, days) = store.activity_totals(1, ts(1, 0)).unwrap();
        assert_eq!((sum, days), (4200.0, 1));
    }
}
