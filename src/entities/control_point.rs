//! FPC control point entity - scheduled factory-production-control checks

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Where in the production flow a control point sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCategory {
    /// Raw material receiving (binder, aggregate, additives)
    IncomingMaterial,
    /// In-process checks (dosing, mixing, fresh mortar)
    Process,
    /// Finished product testing (hardened mortar)
    FinalProduct,
}

impl std::fmt::Display for ControlCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlCategory::IncomingMaterial => write!(f, "incoming_material"),
            ControlCategory::Process => write!(f, "process"),
            ControlCategory::FinalProduct => write!(f, "final_product"),
        }
    }
}

/// Annual production volume tier of the plant.
///
/// EN 13813 FPC tables scale test frequency with production volume; the
/// tier is configured per plant, not derived here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTier {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for VolumeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeTier::Low => write!(f, "low"),
            VolumeTier::Medium => write!(f, "medium"),
            VolumeTier::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for VolumeTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(VolumeTier::Low),
            "medium" => Ok(VolumeTier::Medium),
            "high" => Ok(VolumeTier::High),
            _ => Err(format!("Unknown volume tier: {}. Use low, medium, or high", s)),
        }
    }
}

/// Required test frequency for a control point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every production batch
    PerBatch,
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl Frequency {
    /// Scheduling interval: the time after an execution within which the
    /// next one is due. Calendar months/quarters/years are approximated
    /// with fixed day counts; per-batch checks are held to the daily
    /// production rhythm.
    pub fn interval(&self) -> Duration {
        match self {
            Frequency::PerBatch | Frequency::Daily => Duration::days(1),
            Frequency::Weekly => Duration::weeks(1),
            Frequency::Monthly => Duration::days(30),
            Frequency::Quarterly => Duration::days(91),
            Frequency::Annually => Duration::days(365),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::PerBatch => write!(f, "per_batch"),
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
            Frequency::Annually => write!(f, "annually"),
        }
    }
}

/// A named factory-production-control requirement.
///
/// Reference data: the catalog changes rarely, executions reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpcControlPoint {
    /// Unique identifier (CTRL-...)
    pub id: EntityId,

    /// Control point name
    pub name: String,

    /// Production-flow category
    pub category: ControlCategory,

    /// Required frequency at low production volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_low: Option<Frequency>,

    /// Required frequency at medium production volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_medium: Option<Frequency>,

    /// Required frequency at high production volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_high: Option<Frequency>,

    /// Parameters checked at this control point
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,

    /// Acceptance criteria description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acceptance_criteria: Option<String>,

    /// Is this check mandatory under EN 13813?
    #[serde(default)]
    pub mandatory: bool,

    /// Inactive control points must not be scheduled against
    #[serde(default = "default_active")]
    pub active: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Revision counter
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_active() -> bool {
    true
}

fn default_revision() -> u32 {
    1
}

impl Entity for FpcControlPoint {
    const PREFIX: &'static str = "CTRL";

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

impl FpcControlPoint {
    /// Create a new control point
    pub fn new(name: impl Into<String>, category: ControlCategory) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Ctrl),
            name: name.into(),
            category,
            frequency_low: None,
            frequency_medium: None,
            frequency_high: None,
            parameters: Vec::new(),
            acceptance_criteria: None,
            mandatory: false,
            active: true,
            created: Utc::now(),
            revision: 1,
        }
    }

    /// The standard EN 13813 control-point catalog a screed plant starts
    /// from: receiving inspection, in-process checks, and finished-product
    /// testing, with per-tier frequencies.
    pub fn standard_catalog() -> Vec<FpcControlPoint> {
        let mut catalog = Vec::new();

        let mut cp = FpcControlPoint::new(
            "Bindemittel-Eingangsprüfung",
            ControlCategory::IncomingMaterial,
        );
        cp.frequency_low = Some(Frequency::Monthly);
        cp.frequency_medium = Some(Frequency::Weekly);
        cp.frequency_high = Some(Frequency::PerBatch);
        cp.parameters = vec![
            "delivery_certificate".to_string(),
            "binder_designation".to_string(),
        ];
        cp.acceptance_criteria = Some("Lieferschein und CE-Kennzeichnung vollständig".to_string());
        cp.mandatory = true;
        catalog.push(cp);

        let mut cp = FpcControlPoint::new(
            "Zuschlag-Sieblinie",
            ControlCategory::IncomingMaterial,
        );
        cp.frequency_low = Some(Frequency::Quarterly);
        cp.frequency_medium = Some(Frequency::Monthly);
        cp.frequency_high = Some(Frequency::Weekly);
        cp.parameters = vec!["grading_curve".to_string()];
        catalog.push(cp);

        let mut cp = FpcControlPoint::new("Dosierung und Mischzeit", ControlCategory::Process);
        cp.frequency_low = Some(Frequency::Weekly);
        cp.frequency_medium = Some(Frequency::Daily);
        cp.frequency_high = Some(Frequency::PerBatch);
        cp.parameters = vec!["dosing_accuracy".to_string(), "mixing_time".to_string()];
        cp.mandatory = true;
        catalog.push(cp);

        let mut cp = FpcControlPoint::new("Frischmörtel-Konsistenz", ControlCategory::Process);
        cp.frequency_medium = Some(Frequency::Daily);
        cp.frequency_high = Some(Frequency::PerBatch);
        cp.parameters = vec!["consistency".to_string(), "temperature".to_string()];
        catalog.push(cp);

        let mut cp = FpcControlPoint::new(
            "Druckfestigkeit 28 Tage",
            ControlCategory::FinalProduct,
        );
        cp.frequency_low = Some(Frequency::Monthly);
        cp.frequency_medium = Some(Frequency::Weekly);
        cp.frequency_high = Some(Frequency::Daily);
        cp.parameters = vec!["compressive_strength".to_string()];
        cp.acceptance_criteria = Some("Deklarierte Festigkeitsklasse nach EN 13813".to_string());
        cp.mandatory = true;
        catalog.push(cp);

        let mut cp = FpcControlPoint::new(
            "Biegezugfestigkeit 28 Tage",
            ControlCategory::FinalProduct,
        );
        cp.frequency_low = Some(Frequency::Monthly);
        cp.frequency_medium = Some(Frequency::Weekly);
        cp.frequency_high = Some(Frequency::Daily);
        cp.parameters = vec!["flexural_strength".to_string()];
        cp.mandatory = true;
        catalog.push(cp);

        catalog
    }
}
