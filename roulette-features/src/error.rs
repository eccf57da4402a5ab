//! Error types for loading and evaluating features.

use thiserror::Error;

/// Result type for feature loading.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Structural defect in a feature definition.
///
/// Any of these rejects the whole feature; the rest of a refresh proceeds
/// without it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    /// The definition could not be decoded at all (unknown kind tag, wrong type).
    #[error("Malformed feature definition: {0}")]
    Malformed(String),

    /// Feature or precondition identifier is not a UUID.
    #[error("Invalid feature identifier '{0}'")]
    InvalidIdentifier(String),

    /// Partition key path is empty.
    #[error("Feature '{0}' has no partition key")]
    MissingPartitionKey(String),

    /// Two variants share a name.
    #[error("Duplicate variant '{0}'")]
    DuplicateVariant(String),

    /// No variant is flagged as default.
    #[error("Feature '{0}' has no default variant")]
    NoDefaultVariant(String),

    /// More than one variant is flagged as default.
    #[error("Feature '{feature}' has {count} default variants")]
    MultipleDefaultVariants {
        /// Feature name.
        feature: String,
        /// Number of variants flagged as default.
        count: usize,
    },

    /// A static assignment or variant weight names an undeclared variant.
    #[error("Unknown variant '{0}'")]
    UnknownVariant(String),

    /// A string criterion pattern failed to compile.
    #[error("Invalid regex '{pattern}': {message}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// Compiler message.
        message: String,
    },

    /// A group criterion references a group missing from the catalog.
    #[error("Unknown group '{0}'")]
    UnknownGroup(String),

    /// A criterion kind that cannot be loaded.
    #[error("Unsupported criterion '{0}'")]
    UnsupportedCriterion(&'static str),

    /// Hash spec names no usable method.
    #[error("Unsupported hash method '{0}'")]
    UnsupportedHashMethod(String),

    /// Ruleset exposure is outside `[0, 1]`.
    #[error("Ruleset '{ruleset}' has invalid exposure {exposure}")]
    InvalidExposure {
        /// Ruleset name.
        ruleset: String,
        /// The rejected exposure.
        exposure: f64,
    },

    /// Exclusive group percentage is outside `[0, 100]`.
    #[error("Invalid exclusive group percentage {0}")]
    InvalidPercentage(i64),
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        LoadError::Malformed(err.to_string())
    }
}

/// Errors from the rendezvous ring.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HashError {
    /// Lookup on a ring with no nodes.
    #[error("Rendezvous ring has no nodes")]
    Empty,
}

/// Evaluation-time failures.
///
/// These never escape [`Feature::evaluate`](crate::Feature::evaluate); they are
/// turned into a [`Diagnostic`](crate::Diagnostic) on an unmatched evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Criterion kind declared but without matching semantics.
    #[error("Criterion '{0}' is not supported at evaluation time")]
    UnsupportedCriterion(&'static str),

    /// Variant assigner strategy without an implementation.
    #[error("Variant assigner '{0}' is not implemented")]
    UnimplementedAssigner(&'static str),

    /// Assigner has no variants to choose from.
    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Errors from the feature registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A refresh introduced a precondition cycle and was rejected.
    #[error("Precondition cycle detected: {}", .path.join(" -> "))]
    Cycle {
        /// Feature names from the cycle root back to the repeated feature.
        path: Vec<String>,
    },
}
