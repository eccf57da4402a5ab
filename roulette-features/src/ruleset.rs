//! Gated rule groups that delegate to a variant assigner.

use crate::assigner::{AssignmentMethod, VariantAssigner, VariantWeight};
use crate::definition::RulesetDefinition;
use crate::error::{EvaluationError, LoadError};
use crate::group::GroupCatalog;
use crate::hashing::{self, HashPrimitive};
use crate::input::Input;
use crate::rule::Rule;
use std::collections::HashSet;

/// A named, ordered list of rules behind an enabled flag and an exposure gate.
#[derive(Debug, Clone)]
pub struct Ruleset {
    name: String,
    enabled: bool,
    exposure: f64,
    rules: Vec<Rule>,
    assigner: VariantAssigner,
}

impl Ruleset {
    /// Build a ruleset. `exposure` must lie in `[0, 1]`.
    pub fn new(
        name: impl Into<String>,
        enabled: bool,
        exposure: f64,
        rules: Vec<Rule>,
        assigner: VariantAssigner,
    ) -> Result<Self, LoadError> {
        let name = name.into();
        if !(0.0..=1.0).contains(&exposure) {
            return Err(LoadError::InvalidExposure {
                ruleset: name,
                exposure,
            });
        }

        Ok(Self {
            name,
            enabled,
            exposure,
            rules,
            assigner,
        })
    }

    /// Compile a ruleset definition. Every weighted variant must be one of `variants`.
    pub fn from_definition(
        def: &RulesetDefinition,
        method: AssignmentMethod,
        hash: HashPrimitive,
        groups: &GroupCatalog,
        variants: &HashSet<&str>,
    ) -> Result<Self, LoadError> {
        let rules = def
            .rules
            .iter()
            .map(|r| Rule::from_definition(r, groups))
            .collect::<Result<Vec<_>, _>>()?;

        let mut assigner = VariantAssigner::new(method, hash);
        for vw in &def.variant_weights {
            if !variants.contains(vw.variant.as_str()) {
                return Err(LoadError::UnknownVariant(vw.variant.clone()));
            }
            assigner.add_variant(VariantWeight::new(vw.variant.clone(), vw.weight));
        }

        Self::new(
            def.name.clone(),
            def.enabled,
            def.exposure_percentage,
            rules,
            assigner,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn exposure(&self) -> f64 {
        self.exposure
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn assigner(&self) -> &VariantAssigner {
        &self.assigner
    }

    /// Whether a partition hash falls inside the exposed share of the hash space.
    pub fn is_exposed(&self, partition_hash: u64) -> bool {
        hashing::within_share(partition_hash, self.exposure)
    }

    /// Evaluate against one input.
    ///
    /// Returns the assigned variant when the ruleset is enabled, the
    /// partition is exposed and every rule is satisfied.
    pub fn evaluate(
        &self,
        input: &Input,
        salted_partition_value: &str,
        partition_hash: u64,
    ) -> Result<Option<&str>, EvaluationError> {
        if !self.enabled || !self.is_exposed(partition_hash) {
            return Ok(None);
        }

        for rule in &self.rules {
            if !rule.is_satisfied_by(input)? {
                return Ok(None);
            }
        }

        self.assigner.assign(salted_partition_value).map(Some)
    }
}
