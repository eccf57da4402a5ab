//! Variant assignment strategies.

use crate::error::{EvaluationError, LoadError};
use crate::hashing::{HashPrimitive, WeightedRendezvous};

/// Strategy named by a feature's hash spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentMethod {
    /// Ordered weight-table bucketing
    Simple,
    /// Weighted rendezvous hashing over variant names
    WeightedRendezvous,
}

impl AssignmentMethod {
    /// Parse the wire name of a hash method.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        match name {
            "simple" => Ok(AssignmentMethod::Simple),
            "weighted_rendezvous" => Ok(AssignmentMethod::WeightedRendezvous),
            other => Err(LoadError::UnsupportedHashMethod(other.to_string())),
        }
    }
}

/// A variant name with its integer weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantWeight {
    pub name: String,
    pub weight: u32,
}

impl VariantWeight {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Picks a variant for a salted partition value.
#[derive(Debug, Clone)]
pub enum VariantAssigner {
    /// Weights are recorded but assignment is not implemented; every
    /// `assign` reports [`EvaluationError::UnimplementedAssigner`].
    Simple {
        hash: HashPrimitive,
        weights: Vec<VariantWeight>,
    },
    WeightedRendezvous(WeightedRendezvous),
}

impl VariantAssigner {
    pub fn new(method: AssignmentMethod, hash: HashPrimitive) -> Self {
        match method {
            AssignmentMethod::Simple => VariantAssigner::Simple {
                hash,
                weights: Vec::new(),
            },
            AssignmentMethod::WeightedRendezvous => {
                VariantAssigner::WeightedRendezvous(WeightedRendezvous::new(hash))
            }
        }
    }

    /// Register a variant. Called once per variant while loading.
    pub fn add_variant(&mut self, variant: VariantWeight) {
        match self {
            VariantAssigner::Simple { weights, .. } => weights.push(variant),
            VariantAssigner::WeightedRendezvous(ring) => {
                ring.add_weighted(variant.name, f64::from(variant.weight))
            }
        }
    }

    /// Assign a variant to a salted partition value.
    pub fn assign(&self, partition_value: &str) -> Result<&str, EvaluationError> {
        match self {
            VariantAssigner::Simple { .. } => {
                Err(EvaluationError::UnimplementedAssigner(self.kind()))
            }
            VariantAssigner::WeightedRendezvous(ring) => Ok(ring.lookup(partition_value)?),
        }
    }

    pub fn hash_primitive(&self) -> HashPrimitive {
        match self {
            VariantAssigner::Simple { hash, .. } => *hash,
            VariantAssigner::WeightedRendezvous(ring) => ring.hash_primitive(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            VariantAssigner::Simple { .. } => "simple",
            VariantAssigner::WeightedRendezvous(_) => "weighted_rendezvous",
        }
    }
}
