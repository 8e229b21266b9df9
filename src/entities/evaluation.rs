//! Evaluation entity - conformity verdict for one lab value record

use serde::{Deserialize, Serialize};

/// Severity of a conformity finding.
///
/// Ordered so that the overall result of an evaluation is simply the
/// maximum over all contributing checks: `Fail > Warning > Pass`. Every
/// property class merges through this ordering; none may downgrade a
/// previously recorded severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Pass,
    Warning,
    Fail,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Pass => write!(f, "pass"),
            Severity::Warning => write!(f, "warning"),
            Severity::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pass" => Ok(Severity::Pass),
            "warning" => Ok(Severity::Warning),
            "fail" => Ok(Severity::Fail),
            _ => Err(format!("Unknown severity: {}. Use pass, warning, or fail", s)),
        }
    }
}

/// Conformity verdict for one lab value record.
///
/// Derived data: only the conformity evaluator produces these, and a
/// record's evaluation is replaced (with the prior one retained on the
/// record) rather than mutated in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Evaluation {
    /// Maximum severity over all contributing checks
    pub overall_result: Severity,

    /// Deviation descriptions, in the order the checks ran
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deviations: Vec<String>,

    /// Action required from production, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<String>,

    /// Result of the individual-replicate check (dual-threshold
    /// properties only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_check: Option<bool>,

    /// Result of the replicate-mean check (dual-threshold properties only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_check: Option<bool>,
}

impl Evaluation {
    /// Does this evaluation require alerting?
    pub fn is_fail(&self) -> bool {
        self.overall_result == Severity::Fail
    }

    /// Check if any deviations were recorded
    pub fn has_deviations(&self) -> bool {
        !self.deviations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Fail > Severity::Warning);
        assert!(Severity::Warning > Severity::Pass);
        assert_eq!(Severity::Fail.max(Severity::Pass), Severity::Fail);
        assert_eq!(Severity::Pass.max(Severity::Warning), Severity::Warning);
    }

    #[test]
    fn test_severity_serialization() {
        let eval = Evaluation {
            overall_result: Severity::Warning,
            ..Default::default()
        };
        let yaml = serde_yml::to_string(&eval).unwrap();
        assert!(yaml.contains("overall_result: warning"));
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("fail".parse::<Severity>().unwrap(), Severity::Fail);
        assert_eq!("PASS".parse::<Severity>().unwrap(), Severity::Pass);
        assert!("marginal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_evaluation_roundtrip() {
        let eval = Evaluation {
            overall_result: Severity::Fail,
            deviations: vec!["Einzelwert unter 85% der Spezifikation".to_string()],
            required_action: Some("Charge sperren".to_string()),
            individual_check: Some(false),
            mean_check: Some(true),
        };

        let yaml = serde_yml::to_string(&eval).unwrap();
        let parsed: Evaluation = serde_yml::from_str(&yaml).unwrap();

        assert!(parsed.is_fail());
        assert_eq!(parsed.deviations.len(), 1);
        assert_eq!(parsed.individual_check, Some(false));
    }
}
