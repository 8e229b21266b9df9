//! Conformity evaluation against the declared performance class
//!
//! Implements the EN 13813 two-tier acceptance rule: strength-style
//! properties are checked replicate-by-replicate at 85% of the declared
//! threshold and on the mean at 95%, fresh-mortar and wear-resistance
//! properties contribute their bench verdicts, and binder-type-mandatory
//! properties (surface hardness for MA, bond strength for SR) escalate to
//! a hard fail when violated on the binder they are mandatory for.
//!
//! [`evaluate`] is a pure function of the record: no I/O, no hidden
//! state, deterministic — the same record always yields the same
//! [`Evaluation`].

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::evaluation::{Evaluation, Severity};
use crate::entities::lab_value::{LabValueRecord, PropertyMeasurement};
use crate::spec::{ParseError, Specification};

/// Individual replicates must reach this fraction of the declared threshold
const INDIVIDUAL_FACTOR: f64 = 0.85;

/// The replicate mean must reach this fraction of the declared threshold
const MEAN_FACTOR: f64 = 0.95;

/// Mutually exclusive wear-resistance test methods (one per recipe)
const WEAR_METHODS: [&str; 3] = ["wear_bohme", "wear_bca", "wear_rollrad"];

const SURFACE_HARDNESS: &str = "surface_hardness";
const BOND_STRENGTH: &str = "bond_strength";

/// Required-action texts as surfaced to the plant
const ACTION_QUARANTINE: &str = "Charge sperren, Ursachenanalyse durchführen";
const ACTION_MONITOR: &str = "Produktion überwachen, Mittelwert unter 95% der Spezifikation";
const ACTION_RECIPE_REVIEW: &str = "Rezeptur überprüfen, Material nicht konform";
const ACTION_MA_MANDATORY: &str = "MA-Estrich nicht konform! Oberflächenhärte ist Pflicht";
const ACTION_SR_MANDATORY: &str = "SR-Estrich nicht konform! Haftzugfestigkeit ist Pflicht";

/// Errors from evaluating a record
#[derive(Debug, Error, Diagnostic)]
pub enum EvaluationError {
    /// A declared specification string could not be parsed. Always
    /// surfaced: a swallowed parse failure would silently mis-evaluate
    /// conformity.
    #[error("invalid specification on property '{property}'")]
    #[diagnostic(code(estrich_qc::conformity::specification))]
    Specification {
        property: String,
        #[source]
        #[diagnostic_source]
        source: ParseError,
    },
}

/// Severity-ordered accumulator for the evaluation.
///
/// All checks merge through [`EvaluationBuilder::raise`]; the overall
/// result is the maximum severity seen, so no check can downgrade
/// another and no check needs an "already failed" guard. The required
/// action follows the highest-severity check that supplied one.
#[derive(Debug, Default)]
struct EvaluationBuilder {
    severity: Severity,
    deviations: Vec<String>,
    action: Option<(Severity, String)>,
    individual_check: Option<bool>,
    mean_check: Option<bool>,
}

impl EvaluationBuilder {
    fn raise(&mut self, severity: Severity) {
        self.severity = self.severity.max(severity);
    }

    fn deviation(&mut self, description: String) {
        self.deviations.push(description);
    }

    /// Attach a required action at the given severity. A higher-severity
    /// action replaces a lower one; the first wins at equal severity.
    fn require_action(&mut self, severity: Severity, text: &str) {
        match &self.action {
            Some((held, _)) if *held >= severity => {}
            _ => self.action = Some((severity, text.to_string())),
        }
    }

    fn record_individual_check(&mut self, passed: bool) {
        self.individual_check = Some(self.individual_check.unwrap_or(true) && passed);
    }

    fn record_mean_check(&mut self, passed: bool) {
        self.mean_check = Some(self.mean_check.unwrap_or(true) && passed);
    }

    fn finish(self) -> Evaluation {
        Evaluation {
            overall_result: self.severity,
            deviations: self.deviations,
            required_action: self.action.map(|(_, text)| text),
            individual_check: self.individual_check,
            mean_check: self.mean_check,
        }
    }
}

/// Evaluate one lab value record against its declared specifications and
/// the binder-type-specific mandatory rules.
pub fn evaluate(record: &LabValueRecord) -> Result<Evaluation, EvaluationError> {
    let mut eval = EvaluationBuilder::default();

    // Strength-style hardened properties: two-tier threshold rule.
    for (name, m) in &record.hardened_properties {
        if is_wear_method(name) || name == SURFACE_HARDNESS || name == BOND_STRENGTH {
            continue;
        }
        let Some(spec_str) = &m.specification else {
            continue;
        };
        if !m.has_numeric_data() {
            // a block without usable numbers is skipped, not a deviation
            continue;
        }
        let spec =
            Specification::parse(spec_str).map_err(|source| EvaluationError::Specification {
                property: name.clone(),
                source,
            })?;
        check_dual_threshold(name, m, &spec, &mut eval);
    }

    // Fresh-mortar properties carry a bench verdict.
    for (name, m) in &record.fresh_properties {
        if m.passed == Some(false) {
            eval.deviation(format!("Frischmörtel {}: Grenzwert nicht eingehalten", name));
            eval.raise(Severity::Warning);
        }
    }

    // Wear resistance: no warning tier, failures are durability-critical.
    for name in WEAR_METHODS {
        if let Some(m) = record.hardened_properties.get(name) {
            if m.passed == Some(false) {
                eval.deviation(format!("Verschleißwiderstand ({}): nicht konform", name));
                eval.require_action(Severity::Fail, ACTION_RECIPE_REVIEW);
                eval.raise(Severity::Fail);
            }
        }
    }

    // Binder-type-mandatory properties.
    if let Some(m) = record.hardened_properties.get(SURFACE_HARDNESS) {
        check_mandatory(record, SURFACE_HARDNESS, m, ACTION_MA_MANDATORY, &mut eval);
    }
    if let Some(m) = record.hardened_properties.get(BOND_STRENGTH) {
        check_mandatory(record, BOND_STRENGTH, m, ACTION_SR_MANDATORY, &mut eval);
    }

    Ok(eval.finish())
}

fn is_wear_method(name: &str) -> bool {
    WEAR_METHODS.contains(&name)
}

/// EN 13813 two-tier acceptance: every replicate against 85% of the
/// declared threshold, the mean against 95%. The declared comparator is
/// data and applies to the scaled thresholds as declared.
fn check_dual_threshold(
    name: &str,
    m: &PropertyMeasurement,
    spec: &Specification,
    eval: &mut EvaluationBuilder,
) {
    let unit = m.unit.as_deref().unwrap_or(&spec.unit);

    if !m.individual_values.is_empty() {
        let individual_limit = INDIVIDUAL_FACTOR * spec.value;
        let violations: Vec<f64> = m
            .individual_values
            .iter()
            .copied()
            .filter(|v| !spec.comparator.compare(*v, individual_limit))
            .collect();

        if violations.is_empty() {
            eval.record_individual_check(true);
        } else {
            eval.record_individual_check(false);
            for v in violations {
                eval.deviation(format!(
                    "{}: Einzelwert {:.1} {} verletzt 85%-Grenze ({} {:.2} {})",
                    name, v, unit, spec.comparator, individual_limit, unit
                ));
            }
            eval.require_action(Severity::Fail, ACTION_QUARANTINE);
            eval.raise(Severity::Fail);
        }
    }

    if let Some(mean) = m.effective_mean() {
        let mean_limit = MEAN_FACTOR * spec.value;
        if spec.comparator.compare(mean, mean_limit) {
            eval.record_mean_check(true);
        } else {
            eval.record_mean_check(false);
            eval.deviation(format!(
                "{}: Mittelwert {:.2} {} verletzt 95%-Grenze ({} {:.2} {})",
                name, mean, unit, spec.comparator, mean_limit, unit
            ));
            eval.require_action(Severity::Warning, ACTION_MONITOR);
            eval.raise(Severity::Warning);
        }
    }
}

/// Surface hardness and bond strength: a failed check escalates to a
/// hard fail when the property is mandatory for the record's binder.
fn check_mandatory(
    record: &LabValueRecord,
    name: &str,
    m: &PropertyMeasurement,
    mandatory_action: &str,
    eval: &mut EvaluationBuilder,
) {
    if m.passed != Some(false) {
        return;
    }
    eval.deviation(format!("{}: Prüfung nicht bestanden", name));
    match m.mandatory_for {
        Some(binder) if binder == record.binder_type => {
            eval.require_action(Severity::Fail, mandatory_action);
            eval.raise(Severity::Fail);
        }
        _ => eval.raise(Severity::Warning),
    }
}
