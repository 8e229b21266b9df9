//! Lab value record entity - one sampling event from the plant laboratory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::evaluation::Evaluation;

/// Screed binder type per EN 13813
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BinderType {
    /// Cementitious screed (Zementestrich)
    Ct,
    /// Calcium sulfate screed (Calciumsulfatestrich)
    Ca,
    /// Magnesite screed (Magnesiaestrich)
    Ma,
    /// Synthetic resin screed (Kunstharzestrich)
    Sr,
    /// Mastic asphalt screed (Gussasphaltestrich)
    As,
}

impl BinderType {
    /// EN 13813 designation
    pub fn as_str(&self) -> &'static str {
        match self {
            BinderType::Ct => "CT",
            BinderType::Ca => "CA",
            BinderType::Ma => "MA",
            BinderType::Sr => "SR",
            BinderType::As => "AS",
        }
    }
}

impl std::fmt::Display for BinderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BinderType {
    type Err = UnknownBinderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CT" => Ok(BinderType::Ct),
            "CA" => Ok(BinderType::Ca),
            "MA" => Ok(BinderType::Ma),
            "SR" => Ok(BinderType::Sr),
            "AS" => Ok(BinderType::As),
            _ => Err(UnknownBinderType(s.to_string())),
        }
    }
}

/// Validation error for binder type strings from external input
#[derive(Debug, Error)]
#[error("unknown binder type: '{0}' (valid: CT, CA, MA, SR, AS)")]
pub struct UnknownBinderType(pub String);

/// Which test regime a sampling event covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Fresh-mortar tests only (consistency, temperature, ...)
    Fresh,
    /// Hardened-mortar tests only (strength at test age)
    Hardened,
    /// Both regimes on one sample
    #[default]
    Both,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestType::Fresh => write!(f, "fresh"),
            TestType::Hardened => write!(f, "hardened"),
            TestType::Both => write!(f, "both"),
        }
    }
}

/// A single named measurement on a sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyMeasurement {
    /// Measured value (single determination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Unit of measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Declared specification string (e.g., "≥ 30 N/mm²")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,

    /// Individual replicate values (e.g., three prisms per EN 13892-2)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub individual_values: Vec<f64>,

    /// Recorded mean of the replicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,

    /// Recorded standard deviation of the replicates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,

    /// Pass/fail as determined at the instrument or bench
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<bool>,

    /// Binder type for which this property is mandatory (e.g., surface
    /// hardness for MA, bond strength for SR)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_for: Option<BinderType>,
}

impl PropertyMeasurement {
    /// Mean over the replicates, falling back to the recorded mean, then
    /// the single value
    pub fn effective_mean(&self) -> Option<f64> {
        if !self.individual_values.is_empty() {
            let n = self.individual_values.len() as f64;
            return Some(self.individual_values.iter().sum::<f64>() / n);
        }
        self.mean.or(self.value)
    }

    /// Does the block carry any usable numeric field? Blocks without one
    /// are skipped by the evaluator; absence of data is not a deviation.
    pub fn has_numeric_data(&self) -> bool {
        self.value.is_some() || self.mean.is_some() || !self.individual_values.is_empty()
    }
}

/// A lab value record - one sampling event.
///
/// Measurement fields are immutable once created; corrections go through
/// [`LabValueRecord::correct_measurements`], which bumps the revision.
/// The evaluation is derived data and is never silently overwritten:
/// re-evaluation retains the superseded verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabValueRecord {
    /// Unique identifier (SMP-...)
    pub id: EntityId,

    /// Recipe this sample belongs to
    pub recipe_id: EntityId,

    /// Production batch, if sampled from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<EntityId>,

    /// Laboratory sample designation
    pub sample_id: String,

    /// When the sample was taken
    pub sampled_at: DateTime<Utc>,

    /// Test regime covered by this record
    #[serde(default)]
    pub test_type: TestType,

    /// Test age in days (28 for standard strength testing)
    pub test_age_days: u32,

    /// Fresh-mortar measurements by property name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fresh_properties: BTreeMap<String, PropertyMeasurement>,

    /// Hardened-mortar measurements by property name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hardened_properties: BTreeMap<String, PropertyMeasurement>,

    /// Binder type of the sampled recipe
    pub binder_type: BinderType,

    /// Current conformity evaluation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<Evaluation>,

    /// Evaluations superseded by measurement corrections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superseded_evaluations: Vec<Evaluation>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Revision counter, bumped on measurement correction
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for LabValueRecord {
    const PREFIX: &'static str = "SMP";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn revision(&self) -> u32 {
        self.revision
    }
}

impl LabValueRecord {
    /// Create a new record for a sampling event
    pub fn new(
        recipe_id: EntityId,
        sample_id: impl Into<String>,
        binder_type: BinderType,
        test_age_days: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntityId::new(EntityPrefix::Smp),
            recipe_id,
            batch_id: None,
            sample_id: sample_id.into(),
            sampled_at: now,
            test_type: TestType::default(),
            test_age_days,
            fresh_properties: BTreeMap::new(),
            hardened_properties: BTreeMap::new(),
            binder_type,
            evaluation: None,
            superseded_evaluations: Vec::new(),
            created: now,
            revision: 1,
        }
    }

    /// Attach the evaluation computed at creation, or replace it after a
    /// measurement correction. A replaced verdict is retained, never
    /// silently overwritten.
    pub fn attach_evaluation(&mut self, evaluation: Evaluation) {
        if let Some(previous) = self.evaluation.replace(evaluation) {
            self.superseded_evaluations.push(previous);
        }
    }

    /// Replace measurement blocks after a lab correction. Bumps the
    /// revision; the caller is expected to re-evaluate afterwards.
    pub fn correct_measurements(
        &mut self,
        fresh: BTreeMap<String, PropertyMeasurement>,
        hardened: BTreeMap<String, PropertyMeasurement>,
    ) {
        self.fresh_properties = fresh;
        self.hardened_properties = hardened;
        self.revision += 1;
    }

    /// Total number of measured properties on this record
    pub fn property_count(&self) -> usize {
        self.fresh_properties.len() + self.hardened_properties.len()
    }
}
