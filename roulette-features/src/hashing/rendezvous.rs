//! Weighted rendezvous (highest random weight) hashing.
//!
//! Every lookup scores each node with `-weight / ln(u)`, where `u` is the
//! mixed `(key, node)` hash normalized into `(0, 1)`, and picks the highest
//! score. A node wins with probability proportional to its weight, and a key
//! only moves when its winning node is removed or reweighted.

use crate::error::HashError;
use crate::hashing::HashPrimitive;

/// Weight given to nodes added through [`WeightedRendezvous::add`].
pub const DEFAULT_WEIGHT: f64 = 1.0;

const MIX_MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// A named, weighted node in the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    hash: u64,
    weight: f64,
}

impl Node {
    /// Node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Precomputed hash of the node name.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Selection weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

/// Weighted consistent hashing over named nodes.
///
/// Nodes are kept sorted by name so that insertion, update and removal are
/// binary searches and iteration order is stable.
///
/// ```
/// use roulette_features::{HashPrimitive, WeightedRendezvous};
///
/// let mut ring = WeightedRendezvous::new(HashPrimitive::XxHash);
/// ring.add_weighted("control", 1.0);
/// ring.add_weighted("treatment", 1.0);
///
/// let node = ring.lookup("user-42").unwrap();
/// assert!(node == "control" || node == "treatment");
/// ```
#[derive(Debug, Clone)]
pub struct WeightedRendezvous {
    hash: HashPrimitive,
    nodes: Vec<Node>,
}

impl WeightedRendezvous {
    /// Create an empty ring hashing with `hash`.
    pub fn new(hash: HashPrimitive) -> Self {
        Self {
            hash,
            nodes: Vec::new(),
        }
    }

    /// Insert a node with the default weight, or reset an existing node to it.
    pub fn add(&mut self, name: impl Into<String>) {
        self.add_weighted(name, DEFAULT_WEIGHT);
    }

    /// Insert a node, or update the weight of an existing node with this name.
    pub fn add_weighted(&mut self, name: impl Into<String>, weight: f64) {
        let name = name.into();
        match self.position(&name) {
            Ok(ix) => self.nodes[ix].weight = weight,
            Err(ix) => {
                let hash = self.hash.hash_str(&name);
                self.nodes.insert(ix, Node { name, hash, weight });
            }
        }
    }

    /// Remove a node. Returns `false` when no node had this name.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Ok(ix) => {
                self.nodes.remove(ix);
                true
            }
            Err(_) => false,
        }
    }

    /// Pick the node with the highest score for `key`.
    ///
    /// Ties keep the first node in name order.
    pub fn lookup(&self, key: &str) -> Result<&str, HashError> {
        let key_hash = self.hash.hash_str(key);

        let mut best: Option<(&Node, f64)> = None;
        for node in &self.nodes {
            let score = score(key_hash, node.hash, node.weight);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                Some(_) if score.is_nan() => {}
                _ => best = Some((node, score)),
            }
        }

        best.map(|(node, _)| node.name.as_str())
            .ok_or(HashError::Empty)
    }

    /// Nodes in name order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Node names in name order.
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The hash primitive used for keys and node names.
    pub fn hash_primitive(&self) -> HashPrimitive {
        self.hash
    }

    fn position(&self, name: &str) -> Result<usize, usize> {
        self.nodes.binary_search_by(|n| n.name.as_str().cmp(name))
    }
}

#[inline]
fn score(key_hash: u64, node_hash: u64, weight: f64) -> f64 {
    let normalized = mix(key_hash, node_hash) as f64 / u64::MAX as f64;
    -weight / normalized.ln()
}

/// xorshift* mix of the two hashes.
#[inline]
fn mix(a: u64, b: u64) -> u64 {
    let mut x = a ^ b;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    x.wrapping_mul(MIX_MULTIPLIER)
}
