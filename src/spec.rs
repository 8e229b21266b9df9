//! Declared-class specification parsing
//!
//! EN 13813 performance classes are declared as free-text thresholds such
//! as `"≥ 30 N/mm²"` (compressive strength class C30). All string-munging
//! lives here so the conformity evaluator never touches free text; a
//! specification that fails to parse is surfaced to the caller, never
//! silently defaulted.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Comparison operator of a declared specification.
///
/// EN 13813 thresholds are "at least" style, so `≥` is what the standard
/// produces today, but the comparator is data: a declared `≤` (e.g. a
/// wear-abrasion limit) evaluates with the declared direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    GreaterOrEqual,
    LessOrEqual,
    Greater,
    Less,
    Equal,
}

impl Comparator {
    /// Apply the comparator: does `value` satisfy `value <cmp> threshold`?
    pub fn compare(&self, value: f64, threshold: f64) -> bool {
        match self {
            Comparator::GreaterOrEqual => value >= threshold,
            Comparator::LessOrEqual => value <= threshold,
            Comparator::Greater => value > threshold,
            Comparator::Less => value < threshold,
            Comparator::Equal => value == threshold,
        }
    }

    /// Canonical symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::GreaterOrEqual => "≥",
            Comparator::LessOrEqual => "≤",
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::Equal => "=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "≥" | ">=" => Ok(Comparator::GreaterOrEqual),
            "≤" | "<=" => Ok(Comparator::LessOrEqual),
            ">" => Ok(Comparator::Greater),
            "<" => Ok(Comparator::Less),
            "=" | "==" => Ok(Comparator::Equal),
            _ => Err(ParseError::UnknownComparator {
                comparator: s.to_string(),
            }),
        }
    }
}

/// A structured declared-performance threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Comparison direction
    pub comparator: Comparator,

    /// Numeric threshold
    pub value: f64,

    /// Unit of the threshold (e.g., "N/mm²")
    pub unit: String,
}

impl Specification {
    /// Parse a specification string of the form `"<comparator> <number> <unit>"`.
    ///
    /// Decimal commas are accepted (`"≥ 1,5 N/mm²"`) since lab exports in
    /// German locales carry them.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        let [cmp, num, unit] = tokens.as_slice() else {
            return Err(ParseError::MalformedSpecification {
                input: input.to_string(),
                tokens: tokens.len(),
            });
        };

        let comparator = cmp.parse()?;
        let value = num
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber {
                input: input.to_string(),
                number: num.to_string(),
            })?;

        Ok(Self {
            comparator,
            value,
            unit: unit.to_string(),
        })
    }

    /// Check whether a measured value meets this specification
    pub fn is_met(&self, measured: f64) -> bool {
        self.comparator.compare(measured, self.value)
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.comparator, self.value, self.unit)
    }
}

impl FromStr for Specification {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specification::parse(s)
    }
}

/// Errors from parsing a declared specification string
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("malformed specification '{input}': expected 3 tokens (comparator, number, unit), found {tokens}")]
    #[diagnostic(
        code(estrich_qc::spec::malformed),
        help("declare the class as e.g. \"≥ 30 N/mm²\"")
    )]
    MalformedSpecification { input: String, tokens: usize },

    #[error("unknown comparator '{comparator}'")]
    #[diagnostic(
        code(estrich_qc::spec::comparator),
        help("supported comparators: ≥, ≤, >, <, = (ASCII >= and <= are accepted)")
    )]
    UnknownComparator { comparator: String },

    #[error("invalid numeric threshold '{number}' in specification '{input}'")]
    #[diagnostic(code(estrich_qc::spec::number))]
    InvalidNumber { input: String, number: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compressive_strength_class() {
        let spec = Specification::parse("≥ 30 N/mm²").unwrap();
        assert_eq!(spec.comparator, Comparator::GreaterOrEqual);
        assert_eq!(spec.value, 30.0);
        assert_eq!(spec.unit, "N/mm²");
    }

    #[test]
    fn test_parse_ascii_comparator() {
        let spec = Specification::parse(">= 4.0 N/mm²").unwrap();
        assert_eq!(spec.comparator, Comparator::GreaterOrEqual);
        assert_eq!(spec.value, 4.0);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let spec = Specification::parse("≥ 1,5 N/mm²").unwrap();
        assert_eq!(spec.value, 1.5);
    }

    #[test]
    fn test_parse_upper_bound_comparator() {
        // wear abrasion classes are "at most" thresholds
        let spec = Specification::parse("≤ 22 cm³/50cm²").unwrap();
        assert!(spec.is_met(15.0));
        assert!(!spec.is_met(25.0));
    }

    #[test]
    fn test_is_met_honors_declared_direction() {
        let spec = Specification::parse("≥ 30 N/mm²").unwrap();
        assert!(spec.is_met(30.0));
        assert!(spec.is_met(31.2));
        assert!(!spec.is_met(29.9));
    }

    #[test]
    fn test_wrong_token_count_rejected() {
        let err = Specification::parse("≥ 30").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedSpecification { tokens: 2, .. }
        ));

        let err = Specification::parse("≥ 30 N/mm² extra").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MalformedSpecification { tokens: 4, .. }
        ));
    }

    #[test]
    fn test_unknown_comparator_rejected() {
        let err = Specification::parse("~ 30 N/mm²").unwrap_err();
        assert!(matches!(err, ParseError::UnknownComparator { .. }));
    }

    #[test]
    fn test_invalid_number_rejected() {
        let err = Specification::parse("≥ thirty N/mm²").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { .. }));
    }

    #[test]
    fn test_display_roundtrip() {
        let spec = Specification::parse("≥ 30 N/mm²").unwrap();
        let parsed: Specification = spec.to_string().parse().unwrap();
        assert_eq!(spec, parsed);
    }
}
