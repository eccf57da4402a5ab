//! Feature Flag Evaluation for Roulette
//!
//! Deterministic, allocation-light evaluation of feature flags and
//! experiments against caller-supplied input records.
//!
//! # Features
//!
//! - 🎯 **Targeting Rules** - Typed criteria over nested input fields
//! - 🎲 **Exposure Gates** - Stable percentage rollouts per partition value
//! - 📊 **Variant Assignment** - Weighted rendezvous hashing over variants
//! - 🔗 **Preconditions** - Features gated on other features' outcomes
//! - 🔄 **Snapshots** - Cycle-checked, atomically swapped feature sets
//!
//! # Quick Start
//!
//! ```
//! use roulette_features::*;
//! use serde_json::json;
//!
//! let registry = FeatureRegistry::new();
//! let feature = Feature::from_value(json!({
//!     "id": "6f1c1a52-0c55-4c5e-9c43-9d6f6d3f8a10",
//!     "name": "button-color",
//!     "salt": 3,
//!     "partition_key": "$.user.id",
//!     "enabled": true,
//!     "variants": [
//!         {"name": "grey", "is_default": true},
//!         {"name": "red"},
//!         {"name": "blue"}
//!     ],
//!     "rulesets": [{
//!         "name": "canada",
//!         "enabled": true,
//!         "exposure_percentage": 1.0,
//!         "rules": [{"path": "country", "criteria": [{"string_match": {"expected": ["CA"]}}]}],
//!         "variant_weights": [
//!             {"variant": "red", "weight": 1},
//!             {"variant": "blue", "weight": 1}
//!         ]
//!     }],
//!     "hash_spec": {"method": "weighted_rendezvous", "primitive": "xxhash"}
//! }), &GroupCatalog::new()).unwrap();
//! registry.apply([feature]).unwrap();
//!
//! let input = to_input(json!({"user": {"id": "u-1"}, "country": "ca"})).unwrap();
//! let eval = registry.evaluate("button-color", input).unwrap();
//! assert_eq!(eval.reason(), MatchReason::Ruleset);
//! assert_ne!(eval.variant_name(), "grey");
//! ```
//!
//! # Rendezvous Hashing
//!
//! ```
//! use roulette_features::{HashPrimitive, WeightedRendezvous};
//!
//! let mut ring = WeightedRendezvous::new(HashPrimitive::XxHash);
//! ring.add("a");
//! ring.add_weighted("b", 2.0);
//! let node = ring.lookup("some-key").unwrap();
//! assert!(node == "a" || node == "b");
//! ```

pub mod assigner;
pub mod criterion;
pub mod cycle;
pub mod definition;
pub mod error;
pub mod evaluation;
pub mod feature;
pub mod group;
pub mod hashing;
pub mod input;
pub mod precondition;
pub mod registry;
pub mod rule;
pub mod ruleset;

pub use assigner::{AssignmentMethod, VariantAssigner, VariantWeight};
pub use criterion::{Criterion, StringMatcher};
pub use cycle::CycleDetector;
pub use definition::{
    CriterionDefinition, FeatureDefinition, GroupDefinition, HashSpecDefinition,
    PreconditionDefinition, PreconditionKindDefinition, RuleDefinition, RulesetDefinition,
    StaticAssignmentDefinition, VariantDefinition, VariantWeightDefinition,
};
pub use error::{EvaluationError, HashError, LoadError, RegistryError, Result};
pub use evaluation::{Diagnostic, Evaluation, MatchReason};
pub use feature::{EvaluationMemo, Feature, FeatureId, Variant};
pub use group::{Group, GroupCatalog};
pub use hashing::{HashPrimitive, Node, WeightedRendezvous};
pub use input::{Input, InputPath, to_input};
pub use precondition::{Precondition, PreconditionKind};
pub use registry::{FeatureLookup, FeatureRegistry, FeatureSet};
pub use rule::Rule;
pub use ruleset::Ruleset;
