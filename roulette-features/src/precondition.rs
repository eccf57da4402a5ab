//! Cross-feature dependencies, referenced by feature id.

use crate::definition::{PreconditionDefinition, PreconditionKindDefinition};
use crate::error::LoadError;
use crate::evaluation::Evaluation;
use crate::feature::FeatureId;
use crate::hashing;
use std::collections::HashSet;

/// A condition on another feature's evaluation for the same input.
///
/// The target is a lookup key, resolved through a
/// [`FeatureLookup`](crate::FeatureLookup) at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    target: FeatureId,
    kind: PreconditionKind,
}

/// What a precondition requires of its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionKind {
    /// Target must (or must not) be matched
    Assignment { should_be_assigned: bool },

    /// Target's variant must be allowed (an empty set allows any) and not disallowed
    Variant {
        allowed: HashSet<String>,
        disallowed: HashSet<String>,
    },

    /// Target must be matched, with an allowed variant, inside the first
    /// `percentage` percent of the partition hash space. A percentage of 0
    /// never passes, even for a statically assigned target
    ExclusiveGroup {
        percentage: u8,
        allowed_variants: HashSet<String>,
    },
}

impl Precondition {
    pub fn new(target: FeatureId, kind: PreconditionKind) -> Self {
        Self { target, kind }
    }

    pub fn from_definition(def: &PreconditionDefinition) -> Result<Self, LoadError> {
        let target = FeatureId::parse(&def.feature_id)?;

        let kind = match &def.kind {
            PreconditionKindDefinition::ShouldBeAssigned(should_be_assigned) => {
                PreconditionKind::Assignment {
                    should_be_assigned: *should_be_assigned,
                }
            }
            PreconditionKindDefinition::AllowedVariants {
                variant_names,
                disallowed_variant_names,
            } => PreconditionKind::Variant {
                allowed: variant_names.iter().cloned().collect(),
                disallowed: disallowed_variant_names.iter().cloned().collect(),
            },
            PreconditionKindDefinition::ExclusiveGroup {
                percentage,
                allowed_variants,
            } => {
                let percentage = u8::try_from(*percentage)
                    .ok()
                    .filter(|p| *p <= 100)
                    .ok_or(LoadError::InvalidPercentage(*percentage))?;
                PreconditionKind::ExclusiveGroup {
                    percentage,
                    allowed_variants: allowed_variants.iter().cloned().collect(),
                }
            }
        };

        Ok(Self::new(target, kind))
    }

    pub fn target(&self) -> FeatureId {
        self.target
    }

    pub fn kind(&self) -> &PreconditionKind {
        &self.kind
    }

    /// Test the target feature's evaluation.
    pub fn is_satisfied_by(&self, target: &Evaluation) -> bool {
        match &self.kind {
            PreconditionKind::Assignment { should_be_assigned } => {
                target.is_matched() == *should_be_assigned
            }
            PreconditionKind::Variant {
                allowed,
                disallowed,
            } => {
                let variant = target.variant_name();
                (allowed.is_empty() || allowed.contains(variant)) && !disallowed.contains(variant)
            }
            PreconditionKind::ExclusiveGroup {
                percentage,
                allowed_variants,
            } => {
                if *percentage == 0 || !target.is_matched() {
                    return false;
                }
                if !allowed_variants.is_empty() && !allowed_variants.contains(target.variant_name())
                {
                    return false;
                }
                // static assignments carry no hash and skip the slice check
                target
                    .partition_hash()
                    .is_none_or(|hash| hashing::within_share(hash, f64::from(*percentage) / 100.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::MatchReason;
    use crate::input::Input;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    const TARGET: &str = "9b2f7d1e-1111-4a3b-8c2d-000000000001";

    fn load(kind: serde_json::Value) -> Result<Precondition, LoadError> {
        let def: PreconditionDefinition =
            serde_json::from_value(json!({"feature_id": TARGET, "kind": kind})).unwrap();
        Precondition::from_definition(&def)
    }

    fn target_eval(variant: Option<&str>, hash: Option<u64>) -> Evaluation {
        let mut eval = Evaluation::unmatched(
            FeatureId::from(Uuid::nil()),
            "target",
            1,
            "control",
            Arc::new(Input::new()),
        );
        if let Some(hash) = hash {
            eval.set_partition_hash(hash);
        }
        match (variant, hash) {
            (Some(v), Some(_)) => eval.assign(MatchReason::Ruleset, v, Some("rs")),
            (Some(v), None) => eval.assign(MatchReason::StaticAssignment, v, None),
            (None, _) => {}
        }
        eval
    }

    #[test]
    fn test_load_rejects_bad_target_and_percentage() {
        let def: PreconditionDefinition = serde_json::from_value(json!({
            "feature_id": "not-a-uuid",
            "kind": {"should_be_assigned": true}
        }))
        .unwrap();
        assert_eq!(
            Precondition::from_definition(&def),
            Err(LoadError::InvalidIdentifier("not-a-uuid".to_string()))
        );

        let err = load(json!({"exclusive_group": {"percentage": 101}})).unwrap_err();
        assert_eq!(err, LoadError::InvalidPercentage(101));
        let err = load(json!({"exclusive_group": {"percentage": -1}})).unwrap_err();
        assert_eq!(err, LoadError::InvalidPercentage(-1));
    }

    #[test]
    fn test_assignment() {
        let must = load(json!({"should_be_assigned": true})).unwrap();
        let must_not = load(json!({"should_be_assigned": false})).unwrap();
        assert_eq!(must.target().to_string(), TARGET);

        let matched = target_eval(Some("treatment"), Some(5));
        let unmatched = target_eval(None, None);
        assert!(must.is_satisfied_by(&matched));
        assert!(!must.is_satisfied_by(&unmatched));
        assert!(!must_not.is_satisfied_by(&matched));
        assert!(must_not.is_satisfied_by(&unmatched));
    }

    #[test]
    fn test_variant_allow_and_deny() {
        let allow = load(json!({"allowed_variants": {"variant_names": ["treatment"]}})).unwrap();
        assert!(allow.is_satisfied_by(&target_eval(Some("treatment"), Some(5))));
        assert!(!allow.is_satisfied_by(&target_eval(None, None)));

        let deny = load(json!({"allowed_variants": {"disallowed_variant_names": ["control"]}}))
            .unwrap();
        assert!(deny.is_satisfied_by(&target_eval(Some("treatment"), Some(5))));
        // an unmatched target carries the default variant
        assert!(!deny.is_satisfied_by(&target_eval(None, None)));
    }

    #[test]
    fn test_exclusive_group() {
        let half = load(json!({"exclusive_group": {"percentage": 50, "allowed_variants": ["treatment"]}}))
            .unwrap();
        assert!(half.is_satisfied_by(&target_eval(Some("treatment"), Some(u64::MAX / 4))));
        assert!(!half.is_satisfied_by(&target_eval(Some("treatment"), Some(u64::MAX / 4 * 3))));
        assert!(!half.is_satisfied_by(&target_eval(Some("other"), Some(0))));
        assert!(!half.is_satisfied_by(&target_eval(None, None)));
        assert!(half.is_satisfied_by(&target_eval(Some("treatment"), None)));

        let none = load(json!({"exclusive_group": {"percentage": 0}})).unwrap();
        assert!(!none.is_satisfied_by(&target_eval(Some("treatment"), Some(0))));
    }

    #[test]
    fn test_exclusive_group_zero_percent_closes_static_targets() {
        let none = load(json!({"exclusive_group": {"percentage": 0}})).unwrap();
        let all = load(json!({"exclusive_group": {"percentage": 100}})).unwrap();
        let pinned = target_eval(Some("treatment"), None);
        assert_eq!(pinned.reason(), MatchReason::StaticAssignment);

        assert!(!none.is_satisfied_by(&pinned));
        assert!(all.is_satisfied_by(&pinned));
    }
}
