//! Precondition cycle detection.

use crate::error::RegistryError;
use crate::feature::{Feature, FeatureId};
use crate::registry::FeatureLookup;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Visiting,
    Visited,
}

/// Three-color depth-first search over the precondition graph.
///
/// Colors persist across [`check`](Self::check) calls, so checking every
/// feature of a set visits each feature once. Precondition targets missing
/// from the lookup are not edges.
pub struct CycleDetector<'a, L: ?Sized> {
    features: &'a L,
    colors: HashMap<FeatureId, Color>,
}

impl<'a, L> CycleDetector<'a, L>
where
    L: FeatureLookup + ?Sized,
{
    pub fn new(features: &'a L) -> Self {
        Self {
            features,
            colors: HashMap::new(),
        }
    }

    /// Check the graph reachable from `root`.
    ///
    /// On a cycle the error path runs from `root` to the repeated feature,
    /// so `a -> b -> a` is reported as `["a", "b", "a"]`.
    pub fn check(&mut self, root: &Feature) -> Result<(), RegistryError> {
        let mut stack = Vec::new();
        self.visit(root, &mut stack)
    }

    /// Check several roots in order, stopping at the first cycle.
    pub fn check_all<'f>(
        &mut self,
        roots: impl IntoIterator<Item = &'f Feature>,
    ) -> Result<(), RegistryError> {
        roots.into_iter().try_for_each(|root| self.check(root))
    }

    fn visit(&mut self, feature: &Feature, stack: &mut Vec<String>) -> Result<(), RegistryError> {
        match self.colors.get(&feature.id()) {
            Some(Color::Visited) => return Ok(()),
            Some(Color::Visiting) => {
                let mut path = stack.clone();
                path.push(feature.name().to_string());
                return Err(RegistryError::Cycle { path });
            }
            None => {}
        }

        self.colors.insert(feature.id(), Color::Visiting);
        stack.push(feature.name().to_string());

        for precondition in feature.preconditions() {
            if let Some(target) = self.features.by_id(&precondition.target()) {
                self.visit(&target, stack)?;
            }
        }

        stack.pop();
        self.colors.insert(feature.id(), Color::Visited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupCatalog;
    use crate::registry::FeatureSet;
    use serde_json::json;

    fn id(n: u8) -> String {
        format!("00000000-0000-4000-8000-0000000000{:02x}", n)
    }

    fn feature(n: u8, name: &str, targets: &[u8]) -> Feature {
        let preconditions: Vec<_> = targets
            .iter()
            .map(|t| json!({"feature_id": id(*t), "kind": {"should_be_assigned": true}}))
            .collect();
        Feature::from_value(
            json!({
                "id": id(n),
                "name": name,
                "partition_key": "id",
                "variants": [{"name": "off", "is_default": true}],
                "preconditions": preconditions,
                "hash_spec": {"method": "weighted_rendezvous"}
            }),
            &GroupCatalog::new(),
        )
        .unwrap()
    }

    fn detect(set: &FeatureSet, root: &str) -> Result<(), RegistryError> {
        let root = set.by_name(root).unwrap();
        CycleDetector::new(set).check(&root)
    }

    #[test]
    fn test_two_node_cycle_path() {
        let set = FeatureSet::from_features(1, [feature(1, "a", &[2]), feature(2, "b", &[1])]);
        assert_eq!(
            detect(&set, "a"),
            Err(RegistryError::Cycle {
                path: vec!["a".to_string(), "b".to_string(), "a".to_string()]
            })
        );
    }

    #[test]
    fn test_self_reference() {
        let set = FeatureSet::from_features(1, [feature(1, "a", &[1])]);
        let err = detect(&set, "a").unwrap_err();
        assert_eq!(err.to_string(), "Precondition cycle detected: a -> a");
    }

    #[test]
    fn test_diamond_is_acyclic() {
        let set = FeatureSet::from_features(
            1,
            [
                feature(1, "a", &[2, 3]),
                feature(2, "b", &[4]),
                feature(3, "c", &[4]),
                feature(4, "d", &[]),
            ],
        );
        assert_eq!(detect(&set, "a"), Ok(()));
    }

    #[test]
    fn test_cycle_below_root() {
        let set = FeatureSet::from_features(
            1,
            [
                feature(1, "a", &[2]),
                feature(2, "b", &[3]),
                feature(3, "c", &[2]),
            ],
        );
        assert_eq!(
            detect(&set, "a"),
            Err(RegistryError::Cycle {
                path: vec![
                    "a".to_string(),
                    "b".to_string(),
                    "c".to_string(),
                    "b".to_string()
                ]
            })
        );
    }

    #[test]
    fn test_missing_target_is_not_an_edge() {
        let set = FeatureSet::from_features(1, [feature(1, "a", &[9])]);
        assert_eq!(detect(&set, "a"), Ok(()));
    }

    #[test]
    fn test_check_all_reuses_colors() {
        let set = FeatureSet::from_features(
            1,
            [feature(1, "a", &[2]), feature(2, "b", &[]), feature(3, "c", &[3])],
        );
        let a = set.by_name("a").unwrap();
        let b = set.by_name("b").unwrap();
        let c = set.by_name("c").unwrap();

        let mut detector = CycleDetector::new(&set);
        assert_eq!(detector.check_all([a.as_ref(), b.as_ref()]), Ok(()));
        assert!(detector.check(&c).is_err());
    }
}
