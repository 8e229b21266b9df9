//! Statistical process control over a measurement series
//!
//! [`compute`] turns a time-ordered series of same-parameter measurements
//! for one recipe into an [`SpcData`] snapshot: descriptive statistics,
//! Shewhart control limits at ±3σ with warning limits at ±2σ, one-sided
//! process capability against the declared lower specification limit,
//! and a half-series trend classification.
//!
//! The capability form is one-sided by design: EN 13813 declares "at
//! least" thresholds, so there is no upper specification limit to close
//! the interval. A zero-variance series saturates Cp/Cpk to infinity
//! rather than dividing by zero.

pub mod store;

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::EntityId;
use crate::entities::spc_data::{SpcData, Trend};

pub use store::{SpcKey, SpcStore};

/// Minimum series length for statistically meaningful capability figures
pub const MIN_SAMPLES: usize = 3;

/// Errors from an SPC computation
#[derive(Debug, Error, Diagnostic)]
pub enum SpcError {
    #[error("insufficient samples for SPC: got {got}, need at least {min}")]
    #[diagnostic(
        code(estrich_qc::spc::insufficient_samples),
        help("collect more measurements for the period before recomputing")
    )]
    InsufficientSamples { got: usize, min: usize },

    #[error("invalid SPC input: {0}")]
    #[diagnostic(code(estrich_qc::spc::invalid_input))]
    InvalidInput(String),
}

/// Compute the SPC snapshot for one (recipe, parameter) series over a
/// period. The series must be time-ordered; the caller upserts the
/// result keyed by (recipe, parameter, period).
pub fn compute(
    recipe_id: EntityId,
    parameter: impl Into<String>,
    series: &[f64],
    lower_spec_limit: f64,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Result<SpcData, SpcError> {
    let n = series.len();
    if n < MIN_SAMPLES {
        return Err(SpcError::InsufficientSamples {
            got: n,
            min: MIN_SAMPLES,
        });
    }
    if let Some(bad) = series.iter().find(|v| !v.is_finite()) {
        return Err(SpcError::InvalidInput(format!(
            "non-finite measurement in series: {}",
            bad
        )));
    }
    if !lower_spec_limit.is_finite() {
        return Err(SpcError::InvalidInput(format!(
            "non-finite lower specification limit: {}",
            lower_spec_limit
        )));
    }

    let mean = series.iter().sum::<f64>() / n as f64;

    // Bessel-corrected sample variance
    let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let std_dev = variance.sqrt();

    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let ucl = mean + 3.0 * std_dev;
    let lcl = mean - 3.0 * std_dev;
    let uwl = mean + 2.0 * std_dev;
    let lwl = mean - 2.0 * std_dev;

    // One-sided capability: no upper specification limit exists for
    // "at least" style thresholds. Zero variance saturates.
    let (cp, cpk) = if std_dev > 0.0 {
        let lower_capability = (mean - lower_spec_limit) / (3.0 * std_dev);
        let upper_capability = (ucl - mean) / (3.0 * std_dev);
        (lower_capability, lower_capability.min(upper_capability))
    } else {
        (f64::INFINITY, f64::INFINITY)
    };

    let trend = classify_trend(series, std_dev);

    let out_of_control_points = series.iter().filter(|&&x| x < lcl || x > ucl).count();

    Ok(SpcData {
        recipe_id,
        parameter: parameter.into(),
        period_start,
        period_end,
        sample_count: n,
        mean,
        std_dev,
        min,
        max,
        cp,
        cpk,
        ucl,
        lcl,
        uwl,
        lwl,
        trend,
        out_of_control_points,
    })
}

/// Half-series trend: compare the first-half mean against the
/// second-half mean; a shift larger than one standard deviation counts
/// as a trend. This rule cannot produce [`Trend::Erratic`].
fn classify_trend(series: &[f64], std_dev: f64) -> Trend {
    let mid = series.len() / 2;
    let (first, second) = series.split_at(mid);

    let first_mean = first.iter().sum::<f64>() / first.len() as f64;
    let second_mean = second.iter().sum::<f64>() / second.len() as f64;
    let shift = second_mean - first_mean;

    if shift.abs() > std_dev {
        if shift > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    } else {
        Trend::Stable
    }
}
