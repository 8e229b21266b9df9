//! Factory-production-control scheduling
//!
//! Maps control points to their required test frequency for a plant's
//! production-volume tier and classifies execution records against the
//! schedule. Pure lookups over reference data plus execution history;
//! the surrounding application decides when to run them (batch job or
//! page load) and what to do with the labels.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::control_point::{FpcControlPoint, Frequency, VolumeTier};
use crate::entities::execution::{ExecutionStatus, FpcExecution};

/// Schedule classification of an execution record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Within the frequency interval, follow-up still open
    OnSchedule,
    /// The next execution was due before the evaluation date
    Overdue,
    /// Within the interval, check passed and approved
    Compliant,
}

impl std::fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleStatus::OnSchedule => write!(f, "on_schedule"),
            ScheduleStatus::Overdue => write!(f, "overdue"),
            ScheduleStatus::Compliant => write!(f, "compliant"),
        }
    }
}

/// Errors from schedule classification
#[derive(Debug, Error, Diagnostic)]
pub enum ScheduleError {
    /// Inactive control points must never be scheduled against
    #[error("control point '{name}' is inactive and cannot be scheduled")]
    #[diagnostic(
        code(estrich_qc::fpc::inactive),
        help("reactivate the control point or remove it from the schedule")
    )]
    InactiveControlPoint { name: String },
}

/// Resolve the required test frequency of a control point for a volume
/// tier. Falls back to the medium-tier frequency when the tier-specific
/// field is absent, then to the default.
pub fn resolve_frequency(control_point: &FpcControlPoint, tier: VolumeTier) -> Frequency {
    let tier_specific = match tier {
        VolumeTier::Low => control_point.frequency_low,
        VolumeTier::Medium => control_point.frequency_medium,
        VolumeTier::High => control_point.frequency_high,
    };
    tier_specific
        .or(control_point.frequency_medium)
        .unwrap_or_default()
}

/// Classify an execution record against its control point's schedule as
/// of a given date.
pub fn classify_execution(
    execution: &FpcExecution,
    control_point: &FpcControlPoint,
    tier: VolumeTier,
    as_of: DateTime<Utc>,
) -> Result<ScheduleStatus, ScheduleError> {
    if !control_point.active {
        return Err(ScheduleError::InactiveControlPoint {
            name: control_point.name.clone(),
        });
    }

    let frequency = resolve_frequency(control_point, tier);
    let next_due = execution.execution_date + frequency.interval();

    if as_of > next_due {
        return Ok(ScheduleStatus::Overdue);
    }
    if execution.passed && execution.status == ExecutionStatus::Approved {
        return Ok(ScheduleStatus::Compliant);
    }
    Ok(ScheduleStatus::OnSchedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::control_point::ControlCategory;
    use chrono::Duration;

    fn control_point() -> FpcControlPoint {
        let mut cp = FpcControlPoint::new("Druckfestigkeit 28 Tage", ControlCategory::FinalProduct);
        cp.frequency_low = Some(Frequency::Monthly);
        cp.frequency_medium = Some(Frequency::Weekly);
        cp.frequency_high = Some(Frequency::Daily);
        cp
    }

    fn execution(cp: &FpcControlPoint, days_ago: i64) -> FpcExecution {
        let mut exec = FpcExecution::new(cp.id.clone(), "m.weber", true);
        exec.execution_date = Utc::now() - Duration::days(days_ago);
        exec
    }

    #[test]
    fn test_resolve_frequency_per_tier() {
        let cp = control_point();
        assert_eq!(resolve_frequency(&cp, VolumeTier::Low), Frequency::Monthly);
        assert_eq!(resolve_frequency(&cp, VolumeTier::Medium), Frequency::Weekly);
        assert_eq!(resolve_frequency(&cp, VolumeTier::High), Frequency::Daily);
    }

    #[test]
    fn test_resolve_frequency_falls_back_to_medium() {
        let mut cp = FpcControlPoint::new("Frischmörtel-Konsistenz", ControlCategory::Process);
        cp.frequency_medium = Some(Frequency::Daily);

        assert_eq!(resolve_frequency(&cp, VolumeTier::Low), Frequency::Daily);
        assert_eq!(resolve_frequency(&cp, VolumeTier::High), Frequency::Daily);
    }

    #[test]
    fn test_resolve_frequency_default_when_unset() {
        let cp = FpcControlPoint::new("Sichtprüfung", ControlCategory::Process);
        assert_eq!(resolve_frequency(&cp, VolumeTier::Low), Frequency::default());
    }

    #[test]
    fn test_overdue_execution() {
        let cp = control_point();
        // weekly at medium tier, last run 10 days ago
        let exec = execution(&cp, 10);
        let status = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap();
        assert_eq!(status, ScheduleStatus::Overdue);
    }

    #[test]
    fn test_on_schedule_execution() {
        let cp = control_point();
        // weekly at medium tier, last run 2 days ago, not yet approved
        let exec = execution(&cp, 2);
        let status = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap();
        assert_eq!(status, ScheduleStatus::OnSchedule);
    }

    #[test]
    fn test_compliant_execution() {
        let cp = control_point();
        let mut exec = execution(&cp, 2);
        exec.submit_for_review().unwrap();
        exec.approve("k.fischer").unwrap();

        let status = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap();
        assert_eq!(status, ScheduleStatus::Compliant);
    }

    #[test]
    fn test_failed_check_is_not_compliant() {
        let cp = control_point();
        let mut exec = FpcExecution::new(cp.id.clone(), "m.weber", false);
        exec.execution_date = Utc::now() - Duration::days(2);
        exec.submit_for_review().unwrap();
        exec.approve("k.fischer").unwrap();

        let status = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap();
        assert_eq!(status, ScheduleStatus::OnSchedule);
    }

    #[test]
    fn test_tier_changes_classification() {
        let cp = control_point();
        // 10 days ago: overdue at weekly (medium) but fine at monthly (low)
        let exec = execution(&cp, 10);

        let medium = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap();
        let low = classify_execution(&exec, &cp, VolumeTier::Low, Utc::now()).unwrap();
        assert_eq!(medium, ScheduleStatus::Overdue);
        assert_eq!(low, ScheduleStatus::OnSchedule);
    }

    #[test]
    fn test_inactive_control_point_rejected() {
        let mut cp = control_point();
        cp.active = false;
        let exec = execution(&cp, 2);

        let err = classify_execution(&exec, &cp, VolumeTier::Medium, Utc::now()).unwrap_err();
        assert!(matches!(err, ScheduleError::InactiveControlPoint { .. }));
    }
}
