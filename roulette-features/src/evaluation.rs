//! Per-call evaluation results with match reasoning.

use crate::error::{EvaluationError, HashError};
use crate::feature::FeatureId;
use crate::input::Input;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Why an evaluation ended with its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Nothing matched; the default variant applies
    None,
    /// The partition value is pinned in the static assignment table
    StaticAssignment,
    /// A ruleset matched
    Ruleset,
    /// A precondition failed before any ruleset match could be kept
    PreconditionFailed,
    /// A ruleset matched but a precondition failed
    PreconditionFailedWithMatch,
}

/// Detail on why an evaluation is unmatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    Disabled,
    MissingPartitionValue { path: String },
    NonStringPartitionValue { path: String },
    NoRulesetMatched,
    UnsupportedCriterion { ruleset: String, criterion: String },
    UnimplementedAssigner { ruleset: String, assigner: String },
    EmptyAssigner { ruleset: String },
    MissingPreconditionTarget { target: FeatureId },
    PreconditionUnsatisfied { target: FeatureId },
}

impl Diagnostic {
    pub(crate) fn from_error(ruleset: &str, err: EvaluationError) -> Self {
        let ruleset = ruleset.to_string();
        match err {
            EvaluationError::UnsupportedCriterion(criterion) => Diagnostic::UnsupportedCriterion {
                ruleset,
                criterion: criterion.to_string(),
            },
            EvaluationError::UnimplementedAssigner(assigner) => {
                Diagnostic::UnimplementedAssigner {
                    ruleset,
                    assigner: assigner.to_string(),
                }
            }
            EvaluationError::Hash(HashError::Empty) => Diagnostic::EmptyAssigner { ruleset },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Disabled => write!(f, "feature disabled"),
            Diagnostic::MissingPartitionValue { path } => {
                write!(f, "partition value missing at '{}'", path)
            }
            Diagnostic::NonStringPartitionValue { path } => {
                write!(f, "partition value at '{}' is not a string or integer", path)
            }
            Diagnostic::NoRulesetMatched => write!(f, "no ruleset matched"),
            Diagnostic::UnsupportedCriterion { ruleset, criterion } => {
                write!(f, "ruleset '{}' uses unsupported criterion '{}'", ruleset, criterion)
            }
            Diagnostic::UnimplementedAssigner { ruleset, assigner } => {
                write!(f, "ruleset '{}' uses unimplemented assigner '{}'", ruleset, assigner)
            }
            Diagnostic::EmptyAssigner { ruleset } => {
                write!(f, "ruleset '{}' has no variants to assign", ruleset)
            }
            Diagnostic::MissingPreconditionTarget { target } => {
                write!(f, "precondition target {} not found", target)
            }
            Diagnostic::PreconditionUnsatisfied { target } => {
                write!(f, "precondition on {} not satisfied", target)
            }
        }
    }
}

/// The outcome of evaluating one feature for one input.
///
/// Built fresh for every call and only changed while that call's
/// orchestration runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    feature_id: FeatureId,
    feature_name: String,
    feature_version: u64,
    input: Arc<Input>,
    partition_value: Option<String>,
    partition_hash: Option<u64>,
    reason: MatchReason,
    variant: String,
    matched_ruleset: Option<String>,
    diagnostic: Option<Diagnostic>,
}

impl Evaluation {
    pub(crate) fn unmatched(
        feature_id: FeatureId,
        feature_name: &str,
        feature_version: u64,
        default_variant: &str,
        input: Arc<Input>,
    ) -> Self {
        Self {
            feature_id,
            feature_name: feature_name.to_string(),
            feature_version,
            input,
            partition_value: None,
            partition_hash: None,
            reason: MatchReason::None,
            variant: default_variant.to_string(),
            matched_ruleset: None,
            diagnostic: None,
        }
    }

    pub fn feature_id(&self) -> FeatureId {
        self.feature_id
    }

    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    pub fn feature_version(&self) -> u64 {
        self.feature_version
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// The partition value resolved from the input, if any.
    pub fn partition_value(&self) -> Option<&str> {
        self.partition_value.as_deref()
    }

    /// Hash of the salted partition value; absent when no ruleset scan ran.
    pub fn partition_hash(&self) -> Option<u64> {
        self.partition_hash
    }

    pub fn reason(&self) -> MatchReason {
        self.reason
    }

    pub fn variant_name(&self) -> &str {
        &self.variant
    }

    /// Set for [`MatchReason::Ruleset`] and [`MatchReason::PreconditionFailedWithMatch`].
    pub fn matched_ruleset_name(&self) -> Option<&str> {
        self.matched_ruleset.as_deref()
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    /// Matched by a ruleset or a static assignment.
    pub fn is_matched(&self) -> bool {
        matches!(
            self.reason,
            MatchReason::Ruleset | MatchReason::StaticAssignment
        )
    }

    pub(crate) fn set_partition_value(&mut self, value: String) {
        self.partition_value = Some(value);
    }

    pub(crate) fn set_partition_hash(&mut self, hash: u64) {
        self.partition_hash = Some(hash);
    }

    pub(crate) fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.diagnostic = Some(diagnostic);
    }

    pub(crate) fn assign(&mut self, reason: MatchReason, variant: &str, ruleset: Option<&str>) {
        self.reason = reason;
        self.variant = variant.to_string();
        self.matched_ruleset = ruleset.map(str::to_string);
        self.diagnostic = None;
    }

    /// Revert to the default variant after a precondition failure.
    ///
    /// The matched ruleset survives only for
    /// [`MatchReason::PreconditionFailedWithMatch`].
    pub(crate) fn fail_precondition(
        &mut self,
        reason: MatchReason,
        default_variant: &str,
        diagnostic: Diagnostic,
    ) {
        self.reason = reason;
        self.variant = default_variant.to_string();
        if reason != MatchReason::PreconditionFailedWithMatch {
            self.matched_ruleset = None;
        }
        self.diagnostic = Some(diagnostic);
    }
}
