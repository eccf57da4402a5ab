//! Serializable feature and group definitions.
//!
//! These mirror what the definitions service sends. They are plain data;
//! [`Feature::from_definition`](crate::Feature::from_definition) validates
//! and compiles them into an immutable [`Feature`](crate::Feature).

use crate::error::LoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A feature as delivered by the definitions service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDefinition {
    /// Feature UUID
    pub id: String,

    /// Unique feature name
    pub name: String,

    /// Owning domain
    #[serde(default)]
    pub domain: String,

    /// Monotonic definition version
    #[serde(default)]
    pub version: u64,

    /// Salt mixed into partition values before hashing
    #[serde(default)]
    pub salt: u64,

    /// Dot-delimited path of the partition value in the input record
    pub partition_key: String,

    /// Whether the feature is evaluated at all
    #[serde(default)]
    pub enabled: bool,

    /// Whether callers should record every exposure
    #[serde(default)]
    pub track_all_exposures: bool,

    /// Declared variants; exactly one is the default
    pub variants: Vec<VariantDefinition>,

    /// Exact partition value overrides
    #[serde(default)]
    pub static_assignments: Vec<StaticAssignmentDefinition>,

    /// Rulesets in priority order
    #[serde(default)]
    pub rulesets: Vec<RulesetDefinition>,

    /// Dependencies on other features
    #[serde(default)]
    pub preconditions: Vec<PreconditionDefinition>,

    /// Hashing method and primitive
    pub hash_spec: HashSpecDefinition,
}

impl FeatureDefinition {
    /// Decode a definition from raw JSON.
    ///
    /// Unknown criterion or precondition kinds surface here as
    /// [`LoadError::Malformed`].
    pub fn from_value(value: Value) -> Result<Self, LoadError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// A named variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDefinition {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Pins one partition value to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAssignmentDefinition {
    pub partition_value: String,
    pub variant: String,
}

/// A gated, ordered group of rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetDefinition {
    pub name: String,

    #[serde(default)]
    pub enabled: bool,

    /// Share of the partition space eligible for this ruleset, in `[0, 1]`
    pub exposure_percentage: f64,

    #[serde(default)]
    pub rules: Vec<RuleDefinition>,

    #[serde(default)]
    pub variant_weights: Vec<VariantWeightDefinition>,
}

/// Weight of one variant within a ruleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantWeightDefinition {
    pub variant: String,
    pub weight: u32,
}

/// Criteria applied to one input path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub path: String,
    #[serde(default)]
    pub criteria: Vec<CriterionDefinition>,
}

/// One criterion, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionDefinition {
    BoolMatch {
        expected: bool,
    },
    NumericMatch {
        expected: Vec<i64>,
    },
    NumberRange {
        min_inclusive: i64,
        max_exclusive: i64,
    },
    StringMatch {
        #[serde(default)]
        expected: Vec<String>,
        #[serde(default)]
        regex: Vec<String>,
        #[serde(default)]
        case_sensitive: bool,
    },
    Group {
        group_id: String,
    },
    Semver {
        expression: String,
    },
    /// Accepted on the wire, rejected at load.
    DayOfWeek(Value),
}

/// A dependency on another feature's evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreconditionDefinition {
    /// Target feature UUID
    pub feature_id: String,
    pub kind: PreconditionKindDefinition,
}

/// Precondition kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionKindDefinition {
    /// Target must (true) or must not (false) be matched
    ShouldBeAssigned(bool),
    AllowedVariants {
        #[serde(default)]
        variant_names: Vec<String>,
        #[serde(default)]
        disallowed_variant_names: Vec<String>,
    },
    ExclusiveGroup {
        percentage: i64,
        #[serde(default)]
        allowed_variants: Vec<String>,
    },
}

/// Hashing configuration of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashSpecDefinition {
    /// `simple` or `weighted_rendezvous`
    pub method: String,
    /// `xxhash` (default) or `fnv1a`
    #[serde(default)]
    pub primitive: Option<String>,
}

/// A named set of string values referenced by group criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub values: Vec<String>,
}
