//! Features and the per-call evaluation orchestrator.

use crate::assigner::AssignmentMethod;
use crate::definition::FeatureDefinition;
use crate::error::LoadError;
use crate::evaluation::{Diagnostic, Evaluation, MatchReason};
use crate::group::GroupCatalog;
use crate::hashing::HashPrimitive;
use crate::input::{Input, InputPath, coerce_to_string};
use crate::precondition::Precondition;
use crate::registry::FeatureLookup;
use crate::ruleset::Ruleset;
use roulette_log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identifier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(Uuid);

impl FeatureId {
    /// Parse a UUID string.
    pub fn parse(id: &str) -> Result<Self, LoadError> {
        Uuid::parse_str(id)
            .map(FeatureId)
            .map_err(|_| LoadError::InvalidIdentifier(id.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for FeatureId {
    fn from(uuid: Uuid) -> Self {
        FeatureId(uuid)
    }
}

impl FromStr for FeatureId {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureId::parse(s)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named outcome of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    name: String,
    is_default: bool,
}

impl Variant {
    pub fn new(name: impl Into<String>, is_default: bool) -> Self {
        Self {
            name: name.into(),
            is_default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }
}

/// An immutable, validated feature.
///
/// Built once from a [`FeatureDefinition`] and shared behind an `Arc`; any
/// number of threads may evaluate it concurrently.
///
/// # Examples
///
/// ```
/// use roulette_features::{Feature, FeatureSet, GroupCatalog, MatchReason, to_input};
/// use serde_json::json;
///
/// let feature = Feature::from_value(json!({
///     "id": "6f1c1a52-0c55-4c5e-9c43-9d6f6d3f8a10",
///     "name": "new-checkout",
///     "partition_key": "user_id",
///     "enabled": true,
///     "variants": [{"name": "off", "is_default": true}, {"name": "on"}],
///     "rulesets": [{
///         "name": "everyone",
///         "enabled": true,
///         "exposure_percentage": 1.0,
///         "variant_weights": [{"variant": "on", "weight": 1}]
///     }],
///     "hash_spec": {"method": "weighted_rendezvous"}
/// }), &GroupCatalog::new()).unwrap();
///
/// let input = to_input(json!({"user_id": "u-1"})).unwrap();
/// let eval = feature.evaluate(input, &FeatureSet::default());
/// assert_eq!(eval.reason(), MatchReason::Ruleset);
/// assert_eq!(eval.variant_name(), "on");
/// ```
#[derive(Debug, Clone)]
pub struct Feature {
    id: FeatureId,
    name: String,
    domain: String,
    version: u64,
    salt: u64,
    partition_key: InputPath,
    enabled: bool,
    track_all_exposures: bool,
    variants: Vec<Variant>,
    default_variant: usize,
    static_assignments: HashMap<String, String>,
    rulesets: Vec<Ruleset>,
    preconditions: Vec<Precondition>,
    hash: HashPrimitive,
    method: AssignmentMethod,
}

impl Feature {
    /// Validate and compile a definition.
    ///
    /// Group criteria are resolved against `groups`. Any defect rejects the
    /// whole feature.
    pub fn from_definition(def: &FeatureDefinition, groups: &GroupCatalog) -> Result<Self, LoadError> {
        let id = FeatureId::parse(&def.id)?;

        let partition_key = InputPath::parse(&def.partition_key);
        if def.partition_key.is_empty() || partition_key.segments().is_empty() {
            return Err(LoadError::MissingPartitionKey(def.name.clone()));
        }

        let mut names = HashSet::with_capacity(def.variants.len());
        for variant in &def.variants {
            if !names.insert(variant.name.as_str()) {
                return Err(LoadError::DuplicateVariant(variant.name.clone()));
            }
        }

        let defaults: Vec<usize> = def
            .variants
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_default)
            .map(|(i, _)| i)
            .collect();
        let default_variant = match defaults.as_slice() {
            [single] => *single,
            [] => return Err(LoadError::NoDefaultVariant(def.name.clone())),
            many => {
                return Err(LoadError::MultipleDefaultVariants {
                    feature: def.name.clone(),
                    count: many.len(),
                });
            }
        };

        let mut static_assignments = HashMap::with_capacity(def.static_assignments.len());
        for assignment in &def.static_assignments {
            if !names.contains(assignment.variant.as_str()) {
                return Err(LoadError::UnknownVariant(assignment.variant.clone()));
            }
            static_assignments.insert(
                assignment.partition_value.clone(),
                assignment.variant.clone(),
            );
        }

        let method = AssignmentMethod::from_name(&def.hash_spec.method)?;
        let hash = match def.hash_spec.primitive.as_deref() {
            Some("fnv1a") => HashPrimitive::Fnv1a,
            _ => HashPrimitive::XxHash,
        };

        let rulesets = def
            .rulesets
            .iter()
            .map(|r| Ruleset::from_definition(r, method, hash, groups, &names))
            .collect::<Result<Vec<_>, _>>()?;

        let preconditions = def
            .preconditions
            .iter()
            .map(Precondition::from_definition)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: def.name.clone(),
            domain: def.domain.clone(),
            version: def.version,
            salt: def.salt,
            partition_key,
            enabled: def.enabled,
            track_all_exposures: def.track_all_exposures,
            variants: def
                .variants
                .iter()
                .map(|v| Variant::new(v.name.clone(), v.is_default))
                .collect(),
            default_variant,
            static_assignments,
            rulesets,
            preconditions,
            hash,
            method,
        })
    }

    /// Decode and compile a raw JSON definition.
    pub fn from_value(value: Value, groups: &GroupCatalog) -> Result<Self, LoadError> {
        Self::from_definition(&FeatureDefinition::from_value(value)?, groups)
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn salt(&self) -> u64 {
        self.salt
    }

    pub fn partition_key(&self) -> &InputPath {
        &self.partition_key
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn track_all_exposures(&self) -> bool {
        self.track_all_exposures
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn default_variant(&self) -> &Variant {
        &self.variants[self.default_variant]
    }

    /// Partition value to variant name overrides.
    pub fn static_assignments(&self) -> &HashMap<String, String> {
        &self.static_assignments
    }

    pub fn rulesets(&self) -> &[Ruleset] {
        &self.rulesets
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn hash_primitive(&self) -> HashPrimitive {
        self.hash
    }

    pub fn assignment_method(&self) -> AssignmentMethod {
        self.method
    }

    /// Evaluate for one input record, resolving precondition targets through `features`.
    ///
    /// Never fails: every problem degrades to an unmatched evaluation with
    /// the default variant and a [`Diagnostic`].
    pub fn evaluate<L>(&self, input: impl Into<Arc<Input>>, features: &L) -> Evaluation
    where
        L: FeatureLookup + ?Sized,
    {
        let mut memo = EvaluationMemo::new(input);
        self.evaluate_in(features, &mut memo)
    }

    /// Evaluate within an existing per-call memo.
    ///
    /// A feature already present in `memo` is not evaluated again.
    pub fn evaluate_in<L>(&self, features: &L, memo: &mut EvaluationMemo) -> Evaluation
    where
        L: FeatureLookup + ?Sized,
    {
        if let Some(done) = memo.get(&self.id) {
            return done.clone();
        }

        let mut eval = self.evaluate_without_preconditions(Arc::clone(memo.input()));
        memo.record(self.id, eval.clone());

        if !eval.is_matched() || eval.reason() == MatchReason::StaticAssignment {
            return eval;
        }

        let mut missing = None;
        let mut unsatisfied = None;
        for precondition in &self.preconditions {
            let target_id = precondition.target();
            let Some(target) = features.by_id(&target_id) else {
                warn!(
                    "Feature '{}' precondition target {} not found",
                    self.name, target_id
                );
                missing.get_or_insert(target_id);
                continue;
            };

            let target_eval = target.evaluate_in(features, memo);
            if !precondition.is_satisfied_by(&target_eval) {
                unsatisfied.get_or_insert(target_id);
            }
        }

        let default = self.default_variant().name();
        if let Some(target) = missing {
            eval.fail_precondition(
                MatchReason::PreconditionFailed,
                default,
                Diagnostic::MissingPreconditionTarget { target },
            );
        } else if let Some(target) = unsatisfied {
            eval.fail_precondition(
                MatchReason::PreconditionFailedWithMatch,
                default,
                Diagnostic::PreconditionUnsatisfied { target },
            );
        }

        memo.finalize(self.id, eval.clone());
        eval
    }

    fn evaluate_without_preconditions(&self, input: Arc<Input>) -> Evaluation {
        let mut eval = Evaluation::unmatched(
            self.id,
            &self.name,
            self.version,
            self.default_variant().name(),
            input,
        );

        if !self.enabled {
            trace!("Feature '{}' is disabled", self.name);
            eval.diagnose(Diagnostic::Disabled);
            return eval;
        }

        let partition_value = match self.partition_key.resolve(eval.input()) {
            None => Err(Diagnostic::MissingPartitionValue {
                path: self.partition_key.to_string(),
            }),
            Some(value) => coerce_to_string(value)
                .map(|v| v.into_owned())
                .ok_or_else(|| Diagnostic::NonStringPartitionValue {
                    path: self.partition_key.to_string(),
                }),
        };
        let partition_value = match partition_value {
            Ok(value) => value,
            Err(diagnostic) => {
                warn!("Feature '{}': {}", self.name, diagnostic);
                eval.diagnose(diagnostic);
                return eval;
            }
        };

        if let Some(variant) = self.static_assignments.get(&partition_value) {
            eval.set_partition_value(partition_value);
            eval.assign(MatchReason::StaticAssignment, variant, None);
            return eval;
        }

        let salted = format!("{}{}", self.salt, partition_value);
        let partition_hash = self.hash.hash_str(&salted);
        eval.set_partition_value(partition_value);
        eval.set_partition_hash(partition_hash);

        for ruleset in &self.rulesets {
            match ruleset.evaluate(eval.input(), &salted, partition_hash) {
                Ok(Some(variant)) => {
                    trace!(
                        "Feature '{}' matched ruleset '{}' with variant '{}'",
                        self.name,
                        ruleset.name(),
                        variant
                    );
                    eval.assign(MatchReason::Ruleset, variant, Some(ruleset.name()));
                    return eval;
                }
                Ok(None) => {}
                Err(err) => {
                    let diagnostic = Diagnostic::from_error(ruleset.name(), err);
                    warn!("Feature '{}': {}", self.name, diagnostic);
                    eval.diagnose(diagnostic);
                    return eval;
                }
            }
        }

        eval.diagnose(Diagnostic::NoRulesetMatched);
        eval
    }
}

/// Evaluations computed during one top-level call, keyed by feature id.
///
/// Shared dependencies are evaluated once per call.
#[derive(Debug, Clone)]
pub struct EvaluationMemo {
    input: Arc<Input>,
    evaluations: HashMap<FeatureId, Evaluation>,
    order: Vec<FeatureId>,
}

impl EvaluationMemo {
    pub fn new(input: impl Into<Arc<Input>>) -> Self {
        Self {
            input: input.into(),
            evaluations: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn input(&self) -> &Arc<Input> {
        &self.input
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Evaluation> {
        self.evaluations.get(id)
    }

    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    /// Features in the order their evaluation started.
    pub fn evaluation_order(&self) -> &[FeatureId] {
        &self.order
    }

    /// How many times `id` was evaluated during this call.
    pub fn times_evaluated(&self, id: &FeatureId) -> usize {
        self.order.iter().filter(|seen| *seen == id).count()
    }

    fn record(&mut self, id: FeatureId, eval: Evaluation) {
        self.order.push(id);
        self.evaluations.insert(id, eval);
    }

    fn finalize(&mut self, id: FeatureId, eval: Evaluation) {
        self.evaluations.insert(id, eval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::GroupDefinition;
    use crate::input::to_input;
    use crate::registry::FeatureSet;
    use serde_json::json;

    const A: &str = "00000000-0000-4000-8000-00000000000a";
    const B: &str = "00000000-0000-4000-8000-00000000000b";
    const C: &str = "00000000-0000-4000-8000-00000000000c";
    const D: &str = "00000000-0000-4000-8000-00000000000d";

    fn definition(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "salt": 11,
            "partition_key": "$.user.id",
            "enabled": true,
            "variants": [{"name": "control", "is_default": true}, {"name": "treatment"}],
            "rulesets": [{
                "name": "everyone",
                "enabled": true,
                "exposure_percentage": 1.0,
                "variant_weights": [{"variant": "treatment", "weight": 1}]
            }],
            "hash_spec": {"method": "weighted_rendezvous", "primitive": "xxhash"}
        })
    }

    fn requires(mut def: Value, targets: &[&str]) -> Value {
        def["preconditions"] = targets
            .iter()
            .map(|t| json!({"feature_id": t, "kind": {"should_be_assigned": true}}))
            .collect();
        def
    }

    fn load(def: Value) -> Feature {
        Feature::from_value(def, &GroupCatalog::new()).unwrap()
    }

    fn set(defs: Vec<Value>) -> FeatureSet {
        FeatureSet::from_features(1, defs.into_iter().map(load))
    }

    fn user(id: &str) -> Input {
        to_input(json!({"user": {"id": id}, "country": "CA"})).unwrap()
    }

    #[test]
    fn test_ruleset_match() {
        let feature = load(definition(A, "a"));
        let eval = feature.evaluate(user("u-1"), &FeatureSet::default());
        assert_eq!(eval.reason(), MatchReason::Ruleset);
        assert_eq!(eval.variant_name(), "treatment");
        assert_eq!(eval.matched_ruleset_name(), Some("everyone"));
        assert_eq!(eval.partition_value(), Some("u-1"));
        assert_eq!(
            eval.partition_hash(),
            Some(HashPrimitive::XxHash.hash_str("11u-1"))
        );
        assert!(eval.diagnostic().is_none());
    }

    #[test]
    fn test_integer_partition_value() {
        let feature = load(definition(A, "a"));
        let input = to_input(json!({"user": {"id": 42}})).unwrap();
        let eval = feature.evaluate(input, &FeatureSet::default());
        assert_eq!(eval.partition_value(), Some("42"));
        assert!(eval.is_matched());
    }

    #[test]
    fn test_disabled_and_no_ruleset_are_distinct() {
        let mut disabled = definition(A, "a");
        disabled["enabled"] = json!(false);
        let eval = load(disabled).evaluate(user("u-1"), &FeatureSet::default());
        assert_eq!(eval.reason(), MatchReason::None);
        assert_eq!(eval.diagnostic(), Some(&Diagnostic::Disabled));

        let mut closed = definition(A, "a");
        closed["rulesets"][0]["exposure_percentage"] = json!(0.0);
        let eval = load(closed).evaluate(user("u-1"), &FeatureSet::default());
        assert_eq!(eval.reason(), MatchReason::None);
        assert_eq!(eval.variant_name(), "control");
        assert_eq!(eval.diagnostic(), Some(&Diagnostic::NoRulesetMatched));
    }

    #[test]
    fn test_missing_partition_value() {
        let feature = load(definition(A, "a"));
        let input = to_input(json!({"user": {"name": "x"}})).unwrap();
        let eval = feature.evaluate(input, &FeatureSet::default());
        assert_eq!(eval.reason(), MatchReason::None);
        assert_eq!(eval.variant_name(), "control");
        assert_eq!(
            eval.diagnostic(),
            Some(&Diagnostic::MissingPartitionValue {
                path: "$.user.id".to_string()
            })
        );

        let input = to_input(json!({"user": {"id": true}})).unwrap();
        let eval = feature.evaluate(input, &FeatureSet::default());
        assert!(matches!(
            eval.diagnostic(),
            Some(Diagnostic::NonStringPartitionValue { .. })
        ));
    }

    #[test]
    fn test_static_assignment_wins_and_skips_preconditions() {
        // "everyone" would assign treatment to any user
        let mut def = definition(A, "a");
        def["static_assignments"] = json!([{"partition_value": "qa", "variant": "control"}]);
        let open = set(vec![def.clone()]);
        let a = open.by_name("a").unwrap();

        let eval = a.evaluate(user("u-1"), &open);
        assert_eq!(eval.reason(), MatchReason::Ruleset);
        assert_eq!(eval.variant_name(), "treatment");

        let eval = a.evaluate(user("qa"), &open);
        assert_eq!(eval.reason(), MatchReason::StaticAssignment);
        assert!(eval.is_matched());
        assert_eq!(eval.variant_name(), "control");
        assert_eq!(eval.matched_ruleset_name(), None);
        assert!(eval.partition_hash().is_none());

        let gated = set(vec![requires(def, &[B])]);
        let a = gated.by_name("a").unwrap();
        let mut memo = EvaluationMemo::new(user("qa"));
        let eval = a.evaluate_in(&gated, &mut memo);
        assert_eq!(eval.reason(), MatchReason::StaticAssignment);
        assert_eq!(eval.variant_name(), "control");
        // B is missing, but was never consulted
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_precondition_on_unmatched_target() {
        let mut b = definition(B, "b");
        b["enabled"] = json!(false);
        let features = set(vec![requires(definition(A, "a"), &[B]), b]);

        let eval = features.by_name("a").unwrap().evaluate(user("u-1"), &features);
        assert_eq!(eval.reason(), MatchReason::PreconditionFailedWithMatch);
        assert_eq!(eval.variant_name(), "control");
        assert_eq!(eval.matched_ruleset_name(), Some("everyone"));
        assert!(!eval.is_matched());
    }

    #[test]
    fn test_precondition_on_matched_target() {
        let features = set(vec![requires(definition(A, "a"), &[B]), definition(B, "b")]);
        let eval = features.by_name("a").unwrap().evaluate(user("u-1"), &features);
        assert_eq!(eval.reason(), MatchReason::Ruleset);
        assert_eq!(eval.variant_name(), "treatment");
    }

    #[test]
    fn test_missing_precondition_target() {
        let features = set(vec![requires(definition(A, "a"), &[B])]);
        let eval = features.by_name("a").unwrap().evaluate(user("u-1"), &features);
        assert_eq!(eval.reason(), MatchReason::PreconditionFailed);
        assert_eq!(eval.variant_name(), "control");
        assert!(eval.matched_ruleset_name().is_none());
        assert_eq!(
            eval.diagnostic(),
            Some(&Diagnostic::MissingPreconditionTarget {
                target: FeatureId::parse(B).unwrap()
            })
        );
    }

    #[test]
    fn test_diamond_evaluates_shared_dependency_once() {
        let features = set(vec![
            requires(definition(A, "a"), &[B, C]),
            requires(definition(B, "b"), &[D]),
            requires(definition(C, "c"), &[D]),
            definition(D, "d"),
        ]);

        let mut memo = EvaluationMemo::new(user("u-1"));
        let eval = features
            .by_name("a")
            .unwrap()
            .evaluate_in(&features, &mut memo);

        assert_eq!(eval.reason(), MatchReason::Ruleset);
        let d = FeatureId::parse(D).unwrap();
        assert_eq!(memo.times_evaluated(&d), 1);
        assert_eq!(memo.len(), 4);
        assert_eq!(memo.evaluation_order().len(), 4);
    }

    #[test]
    fn test_salt_decorrelates_features() {
        let mut salted = definition(A, "a");
        salted["salt"] = json!(12);
        let eval_a = load(definition(A, "a")).evaluate(user("u-1"), &FeatureSet::default());
        let eval_b = load(salted).evaluate(user("u-1"), &FeatureSet::default());
        assert_ne!(eval_a.partition_hash(), eval_b.partition_hash());
    }

    #[test]
    fn test_semver_and_simple_degrade() {
        let mut semver = definition(A, "a");
        semver["rulesets"][0]["rules"] =
            json!([{"path": "country", "criteria": [{"semver": {"expression": "^1"}}]}]);
        let eval = load(semver).evaluate(user("u-1"), &FeatureSet::default());
        assert_eq!(eval.reason(), MatchReason::None);
        assert_eq!(
            eval.diagnostic(),
            Some(&Diagnostic::UnsupportedCriterion {
                ruleset: "everyone".to_string(),
                criterion: "semver".to_string()
            })
        );

        let mut simple = definition(A, "a");
        simple["hash_spec"]["method"] = json!("simple");
        let feature = load(simple);
        assert_eq!(feature.assignment_method(), AssignmentMethod::Simple);
        let eval = feature.evaluate(user("u-1"), &FeatureSet::default());
        assert_eq!(eval.variant_name(), "control");
        assert!(matches!(
            eval.diagnostic(),
            Some(Diagnostic::UnimplementedAssigner { .. })
        ));
    }

    #[test]
    fn test_group_criterion_resolves_from_catalog() {
        let mut def = definition(A, "a");
        def["rulesets"][0]["rules"] =
            json!([{"path": "user.id", "criteria": [{"group": {"group_id": "staff"}}]}]);

        let mut groups = GroupCatalog::new();
        groups.extend_from_definitions(&[GroupDefinition {
            id: "staff".to_string(),
            version: 1,
            values: vec!["u-7".to_string()],
        }]);
        let feature = Feature::from_value(def.clone(), &groups).unwrap();
        assert!(feature.evaluate(user("u-7"), &FeatureSet::default()).is_matched());
        assert!(!feature.evaluate(user("u-8"), &FeatureSet::default()).is_matched());

        let err = Feature::from_value(def, &GroupCatalog::new()).unwrap_err();
        assert_eq!(err, LoadError::UnknownGroup("staff".to_string()));
    }

    #[test]
    fn test_load_rejections() {
        let reject = |patch: &dyn Fn(&mut Value)| {
            let mut def = definition(A, "a");
            patch(&mut def);
            Feature::from_value(def, &GroupCatalog::new()).unwrap_err()
        };

        assert_eq!(
            reject(&|d| d["id"] = json!("nope")),
            LoadError::InvalidIdentifier("nope".to_string())
        );
        assert_eq!(
            reject(&|d| d["partition_key"] = json!("")),
            LoadError::MissingPartitionKey("a".to_string())
        );
        assert_eq!(
            reject(&|d| d["variants"] = json!([{"name": "x", "is_default": true}, {"name": "x"}])),
            LoadError::DuplicateVariant("x".to_string())
        );
        assert_eq!(
            reject(&|d| d["variants"] = json!([{"name": "control"}, {"name": "treatment"}])),
            LoadError::NoDefaultVariant("a".to_string())
        );
        assert_eq!(
            reject(&|d| d["variants"][1]["is_default"] = json!(true)),
            LoadError::MultipleDefaultVariants {
                feature: "a".to_string(),
                count: 2
            }
        );
        assert_eq!(
            reject(&|d| d["static_assignments"] =
                json!([{"partition_value": "qa", "variant": "ghost"}])),
            LoadError::UnknownVariant("ghost".to_string())
        );
        assert_eq!(
            reject(&|d| d["hash_spec"]["method"] = json!("modulo")),
            LoadError::UnsupportedHashMethod("modulo".to_string())
        );
        assert!(matches!(
            reject(&|d| d["rulesets"][0]["rules"] =
                json!([{"path": "x", "criteria": [{"string_match": {"regex": ["("]}}]}])),
            LoadError::InvalidRegex { .. }
        ));
        assert!(matches!(
            reject(&|d| d["rulesets"][0]["rules"] =
                json!([{"path": "x", "criteria": [{"always": {}}]}])),
            LoadError::Malformed(_)
        ));
    }

    #[test]
    fn test_feature_id_display_round_trips() {
        let id: FeatureId = A.parse().unwrap();
        assert_eq!(id.to_string(), A);
        assert_eq!(FeatureId::parse(&id.to_string()), Ok(id));
    }
}
