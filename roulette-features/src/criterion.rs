//! Typed predicates over a single input value.

use crate::definition::CriterionDefinition;
use crate::error::{EvaluationError, LoadError};
use crate::group::{Group, GroupCatalog};
use crate::input::{coerce_to_bool, coerce_to_i64, coerce_to_string};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// A predicate over one coerced input value.
///
/// Values that cannot be coerced to the criterion's type never match.
#[derive(Debug, Clone)]
pub enum Criterion {
    /// Input is a boolean equal to the expected value
    Bool(bool),
    /// Input is an integer in the set
    NumberSet(HashSet<i64>),
    /// Input is an integer in `[min_inclusive, max_exclusive)`
    NumberRange { min_inclusive: i64, max_exclusive: i64 },
    /// Input is a string equal to a literal or matching a pattern
    String(StringMatcher),
    /// Input is a string contained in the group
    Group(Arc<Group>),
    /// Declared without matching semantics; evaluation reports it unsupported
    Semver(String),
}

impl Criterion {
    /// Compile a criterion definition.
    ///
    /// Regex patterns are compiled here; group references are resolved
    /// against `groups`.
    pub fn from_definition(
        def: &CriterionDefinition,
        groups: &GroupCatalog,
    ) -> Result<Self, LoadError> {
        match def {
            CriterionDefinition::BoolMatch { expected } => Ok(Criterion::Bool(*expected)),
            CriterionDefinition::NumericMatch { expected } => {
                Ok(Criterion::NumberSet(expected.iter().copied().collect()))
            }
            CriterionDefinition::NumberRange {
                min_inclusive,
                max_exclusive,
            } => Ok(Criterion::NumberRange {
                min_inclusive: *min_inclusive,
                max_exclusive: *max_exclusive,
            }),
            CriterionDefinition::StringMatch {
                expected,
                regex,
                case_sensitive,
            } => Ok(Criterion::String(StringMatcher::new(
                expected.clone(),
                regex,
                *case_sensitive,
            )?)),
            CriterionDefinition::Group { group_id } => groups
                .get(group_id)
                .map(Criterion::Group)
                .ok_or_else(|| LoadError::UnknownGroup(group_id.clone())),
            CriterionDefinition::Semver { expression } => {
                Ok(Criterion::Semver(expression.clone()))
            }
            CriterionDefinition::DayOfWeek(_) => {
                Err(LoadError::UnsupportedCriterion("day_of_week"))
            }
        }
    }

    /// Test a resolved input value.
    pub fn matches(&self, value: &Value) -> Result<bool, EvaluationError> {
        let matched = match self {
            Criterion::Bool(expected) => coerce_to_bool(value) == Some(*expected),
            Criterion::NumberSet(expected) => {
                coerce_to_i64(value).is_some_and(|n| expected.contains(&n))
            }
            Criterion::NumberRange {
                min_inclusive,
                max_exclusive,
            } => coerce_to_i64(value).is_some_and(|n| n >= *min_inclusive && n < *max_exclusive),
            Criterion::String(matcher) => {
                coerce_to_string(value).is_some_and(|s| matcher.is_match(&s))
            }
            Criterion::Group(group) => coerce_to_string(value).is_some_and(|s| group.contains(&s)),
            Criterion::Semver(_) => {
                return Err(EvaluationError::UnsupportedCriterion(self.kind()));
            }
        };
        Ok(matched)
    }

    /// Short kind name, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Criterion::Bool(_) => "bool_match",
            Criterion::NumberSet(_) => "numeric_match",
            Criterion::NumberRange { .. } => "number_range",
            Criterion::String(_) => "string_match",
            Criterion::Group(_) => "group",
            Criterion::Semver(_) => "semver",
        }
    }
}

/// Literal and pattern matching for string criteria.
#[derive(Debug, Clone)]
pub struct StringMatcher {
    literals: Vec<String>,
    patterns: Vec<Regex>,
    case_sensitive: bool,
}

impl StringMatcher {
    /// Compile the patterns. Case-insensitive literals are folded once here.
    pub fn new(
        literals: Vec<String>,
        patterns: &[String],
        case_sensitive: bool,
    ) -> Result<Self, LoadError> {
        let literals = if case_sensitive {
            literals
        } else {
            literals.into_iter().map(|l| l.to_lowercase()).collect()
        };

        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|err| LoadError::InvalidRegex {
                    pattern: pattern.clone(),
                    message: err.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            literals,
            patterns,
            case_sensitive,
        })
    }

    /// Literal equality under the case rule, else an unanchored pattern search.
    pub fn is_match(&self, input: &str) -> bool {
        let literal_hit = if self.case_sensitive {
            self.literals.iter().any(|l| l == input)
        } else {
            let folded = input.to_lowercase();
            self.literals.iter().any(|l| *l == folded)
        };

        literal_hit || self.patterns.iter().any(|p| p.is_match(input))
    }
}
