//! Conjunctions of criteria over one input path.

use crate::criterion::Criterion;
use crate::definition::RuleDefinition;
use crate::error::{EvaluationError, LoadError};
use crate::group::GroupCatalog;
use crate::input::{Input, InputPath};

/// Criteria that must all accept the value at `path`.
#[derive(Debug, Clone)]
pub struct Rule {
    path: InputPath,
    criteria: Vec<Criterion>,
}

impl Rule {
    pub fn new(path: InputPath, criteria: Vec<Criterion>) -> Self {
        Self { path, criteria }
    }

    pub fn from_definition(def: &RuleDefinition, groups: &GroupCatalog) -> Result<Self, LoadError> {
        let criteria = def
            .criteria
            .iter()
            .map(|c| Criterion::from_definition(c, groups))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(InputPath::parse(&def.path), criteria))
    }

    pub fn path(&self) -> &InputPath {
        &self.path
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// Satisfied iff the path resolves and every criterion accepts the value.
    ///
    /// Criteria are tested in order and the first rejection short-circuits.
    pub fn is_satisfied_by(&self, input: &Input) -> Result<bool, EvaluationError> {
        let Some(value) = self.path.resolve(input) else {
            return Ok(false);
        };

        for criterion in &self.criteria {
            if !criterion.matches(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
