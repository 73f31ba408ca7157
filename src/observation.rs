//! Clinical observation rendering
//!
//! Renders a computed [`HealthScore`] into a FHIR-shaped Observation
//! resource: the composite as the primary value and the three sub-scores
//! as ordered components. This is a stateless cosmetic transform; it is
//! a pragmatic subset of FHIR, not a full resource model, and it is not
//! part of the engine's contract.

use crate::scoring::round2;
use crate::types::{HealthScore, SubjectId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const METRIC_CODE_SYSTEM: &str = "http://example.org/fhir/CodeSystem/health-metrics";
const LOINC_SYSTEM: &str = "http://loinc.org";
const UCUM_SYSTEM: &str = "http://unitsofmeasure.org";
const CATEGORY_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/observation-category";

/// LOINC code for a composite health score
const COMPOSITE_LOINC_CODE: &str = "76484-0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coding {
    pub system: String,
    pub code: String,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
    pub system: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationComponent {
    pub code: CodeableConcept,
    #[serde(rename = "valueQuantity")]
    pub value_quantity: Quantity,
}

/// FHIR-shaped Observation carrying a composite health score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    pub id: String,
    pub status: String,
    pub category: Vec<CodeableConcept>,
    pub code: CodeableConcept,
    pub subject: Reference,
    #[serde(rename = "effectiveDateTime")]
    pub effective_date_time: String,
    #[serde(rename = "valueQuantity")]
    pub value_quantity: Quantity,
    pub component: Vec<ObservationComponent>,
    pub note: Vec<Annotation>,
}

fn concept(system: &str, code: &str, display: &str) -> CodeableConcept {
    CodeableConcept {
        coding: vec![Coding {
            system: system.to_string(),
            code: code.to_string(),
            display: display.to_string(),
        }],
        text: Some(display.to_string()),
    }
}

fn points(value: f64) -> Quantity {
    Quantity {
        value: round2(value),
        unit: "points".to_string(),
        system: UCUM_SYSTEM.to_string(),
    }
}

fn component(code: &str, display: &str, value: f64) -> ObservationComponent {
    ObservationComponent {
        code: concept(METRIC_CODE_SYSTEM, code, display),
        value_quantity: points(value),
    }
}

/// Render a health score as an Observation effective at `Utc::now()`
pub fn build_health_observation(subject_id: SubjectId, score: &HealthScore) -> Observation {
    build_health_observation_at(subject_id, score, Utc::now())
}

/// Render a health score as an Observation with an explicit effective time
pub fn build_health_observation_at(
    subject_id: SubjectId,
    score: &HealthScore,
    effective_at: DateTime<Utc>,
) -> Observation {
    let c = &score.components;
    // Component order is fixed: steps, sleep, glucose
    let components = vec![
        component("steps-score", "Steps sub-score", c.steps_score),
        component("sleep-score", "Sleep sub-score", c.sleep_score),
        component("glucose-score", "Glucose sub-score", c.glucose_score),
    ];

    Observation {
        resource_type: "Observation".to_string(),
        id: Uuid::new_v4().to_string(),
        status: "final".to_string(),
        category: vec![CodeableConcept {
            coding: vec![Coding {
                system: CATEGORY_SYSTEM.to_string(),
                code: "activity".to_string(),
                display: "Activity".to_string(),
            }],
            text: None,
        }],
        code: concept(LOINC_SYSTEM, COMPOSITE_LOINC_CODE, "Composite health score"),
        subject: Reference {
            reference: format!("Patient/{subject_id}"),
        },
        effective_date_time: effective_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        value_quantity: points(score.score),
        component: components,
        note: vec![Annotation {
            text: format!("Window since {}", score.since.to_rfc3339()),
        }],
    }
}
