//! Vitalscore - composite health-score engine for personal health metrics
//!
//! Vitalscore scores one subject against the population observed in the
//! same rolling window: per-subject averages for activity, sleep, and
//! blood glucose are min-max normalized against the per-subject population
//! ranges into 0-100 sub-scores, then combined into a weighted composite
//! (50% activity, 30% sleep, 20% glucose).
//!
//! ## Modules
//!
//! - **Engine**: windowed fetch → aggregate → normalize → weight-combine
//! - **Store**: the narrow read interface the engine consumes, with an
//!   in-memory reference implementation
//! - **Observation**: optional FHIR-shaped rendering of a computed score

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod observation;
pub mod scoring;
pub mod store;
pub mod types;

pub use engine::{ScoreConfig, ScoreEngine, DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
pub use error::ScoreError;
pub use store::{Dataset, MemoryStore, MetricStore};

// Payload exports
pub use observation::{build_health_observation, Observation};
pub use types::{HealthScore, ScoreComponents, SubjectId};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for CLI output
pub const PRODUCER_NAME: &str = "vitalscore";
