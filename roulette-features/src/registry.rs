//! Versioned feature snapshots with atomic refresh.

use crate::cycle::CycleDetector;
use crate::error::RegistryError;
use crate::evaluation::Evaluation;
use crate::feature::{Feature, FeatureId};
use crate::input::Input;
use parking_lot::{Mutex, RwLock};
use roulette_log::{Level, debug, error, event};
use std::collections::HashMap;
use std::sync::Arc;

/// Identifier and name lookup of features.
///
/// Implementations must be safe to call while a refresh is in progress, and
/// a returned feature must stay valid for as long as the caller holds it.
pub trait FeatureLookup {
    fn by_id(&self, id: &FeatureId) -> Option<Arc<Feature>>;
    fn by_name(&self, name: &str) -> Option<Arc<Feature>>;
}

/// An immutable set of features indexed by id and by name.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    version: u64,
    by_id: HashMap<FeatureId, Arc<Feature>>,
    by_name: HashMap<String, FeatureId>,
}

impl FeatureSet {
    /// Build a snapshot. A later feature replaces an earlier one with the same id.
    pub fn from_features(version: u64, features: impl IntoIterator<Item = Feature>) -> Self {
        let mut set = Self {
            version,
            ..Self::default()
        };
        for feature in features {
            set.upsert(Arc::new(feature));
        }
        set
    }

    /// Monotonic snapshot version, bumped on every accepted refresh.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Feature>> {
        self.by_id.values()
    }

    /// Feature names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluate the named feature, or `None` when it is not in this snapshot.
    pub fn evaluate(&self, name: &str, input: impl Into<Arc<Input>>) -> Option<Evaluation> {
        self.by_name(name)
            .map(|feature| feature.evaluate(input, self))
    }

    fn upsert(&mut self, feature: Arc<Feature>) {
        if let Some(previous) = self.by_id.get(&feature.id())
            && previous.name() != feature.name()
            && self.by_name.get(previous.name()) == Some(&feature.id())
        {
            self.by_name.remove(previous.name());
        }
        self.by_name.insert(feature.name().to_string(), feature.id());
        self.by_id.insert(feature.id(), feature);
    }

    /// Fail on the first precondition cycle, visiting roots in name order.
    fn detect_cycles(&self) -> Result<(), RegistryError> {
        let mut detector = CycleDetector::new(self);
        let mut roots: Vec<&Arc<Feature>> = self.by_id.values().collect();
        roots.sort_by(|a, b| a.name().cmp(b.name()));
        detector.check_all(roots.into_iter().map(Arc::as_ref))
    }
}

impl FeatureLookup for FeatureSet {
    fn by_id(&self, id: &FeatureId) -> Option<Arc<Feature>> {
        self.by_id.get(id).cloned()
    }

    fn by_name(&self, name: &str) -> Option<Arc<Feature>> {
        self.by_name
            .get(name)
            .and_then(|id| self.by_id.get(id))
            .cloned()
    }
}

/// Shared registry serving the current [`FeatureSet`].
///
/// Reads clone the snapshot `Arc` under a short read lock. Refreshes build
/// and validate a candidate off to the side and only take the write lock
/// to swap it in, so a reader never sees a partial update.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    current: RwLock<Arc<FeatureSet>>,
    writer: Mutex<()>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot currently being served.
    #[inline]
    pub fn snapshot(&self) -> Arc<FeatureSet> {
        self.current.read().clone()
    }

    /// Upsert a batch of features into a copy of the current snapshot.
    ///
    /// The candidate is swapped in only if its precondition graph is
    /// acyclic; otherwise the current snapshot keeps serving.
    pub fn apply(&self, batch: impl IntoIterator<Item = Feature>) -> Result<u64, RegistryError> {
        let _writer = self.writer.lock();
        let current = self.snapshot();

        let mut candidate = FeatureSet::clone(&current);
        candidate.version = current.version + 1;
        let mut applied = 0usize;
        for feature in batch {
            debug!("Staging feature '{}' v{}", feature.name(), feature.version());
            candidate.upsert(Arc::new(feature));
            applied += 1;
        }

        self.swap_in(candidate, applied)
    }

    /// Replace the whole snapshot with `features`.
    pub fn replace(&self, features: impl IntoIterator<Item = Feature>) -> Result<u64, RegistryError> {
        let _writer = self.writer.lock();
        let version = self.snapshot().version + 1;
        let candidate = FeatureSet::from_features(version, features);
        let applied = candidate.len();

        self.swap_in(candidate, applied)
    }

    /// Evaluate the named feature against a single snapshot.
    pub fn evaluate(&self, name: &str, input: impl Into<Arc<Input>>) -> Option<Evaluation> {
        self.snapshot().evaluate(name, input)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    fn swap_in(&self, candidate: FeatureSet, applied: usize) -> Result<u64, RegistryError> {
        if let Err(err) = candidate.detect_cycles() {
            error!("Rejected feature refresh: {}", err);
            return Err(err);
        }

        let version = candidate.version;
        let total = candidate.len();
        *self.current.write() = Arc::new(candidate);

        event!(Level::Info, "Feature refresh applied";
            version = version,
            applied = applied,
            total = total,
        );
        Ok(version)
    }
}

impl FeatureLookup for FeatureRegistry {
    fn by_id(&self, id: &FeatureId) -> Option<Arc<Feature>> {
        self.snapshot().by_id(id)
    }

    fn by_name(&self, name: &str) -> Option<Arc<Feature>> {
        self.snapshot().by_name(name)
    }
}
