//! SPC snapshot entity - aggregate statistics for one (recipe, parameter, period)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::EntityId;

/// Long-run trend classification of a measurement series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    #[default]
    Stable,
    Increasing,
    Decreasing,
    /// Reserved: no rule currently produces this classification; kept so
    /// persisted snapshots from a future rule remain representable.
    Erratic,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Stable => write!(f, "stable"),
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Erratic => write!(f, "erratic"),
        }
    }
}

/// Aggregate SPC snapshot.
///
/// A materialized view, not an event log: recomputation for the same
/// (recipe, parameter, period) replaces the prior snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpcData {
    /// Recipe whose production line is monitored
    pub recipe_id: EntityId,

    /// Monitored parameter name (e.g., "compressive_strength")
    pub parameter: String,

    /// Period covered by the snapshot
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,

    /// Number of measurements in the period
    pub sample_count: usize,

    /// Arithmetic mean
    pub mean: f64,

    /// Sample standard deviation (Bessel-corrected)
    pub std_dev: f64,

    /// Smallest measurement
    pub min: f64,

    /// Largest measurement
    pub max: f64,

    /// One-sided process capability against the lower specification limit
    pub cp: f64,

    /// Process capability index, min of the one-sided capabilities
    pub cpk: f64,

    /// Upper control limit (mean + 3σ)
    pub ucl: f64,

    /// Lower control limit (mean - 3σ)
    pub lcl: f64,

    /// Upper warning limit (mean + 2σ)
    pub uwl: f64,

    /// Lower warning limit (mean - 2σ)
    pub lwl: f64,

    /// Trend classification over the period
    pub trend: Trend,

    /// Points strictly outside [LCL, UCL]
    pub out_of_control_points: usize,
}

impl SpcData {
    /// Is the process centered and capable at the conventional 1.33 cutoff?
    pub fn is_capable(&self) -> bool {
        self.cpk >= 1.33
    }

    /// Does the period contain any out-of-control points?
    pub fn in_control(&self) -> bool {
        self.out_of_control_points == 0
    }
}
