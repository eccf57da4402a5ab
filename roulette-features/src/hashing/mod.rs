//! Hashing primitives and weighted rendezvous hashing.

pub mod provider;
pub mod rendezvous;

pub use provider::HashPrimitive;
pub use rendezvous::{Node, WeightedRendezvous};

/// Whether `hash` falls in the lowest `share` of the 64-bit hash space.
///
/// A share of zero or less never matches; a share of one always does.
pub fn within_share(hash: u64, share: f64) -> bool {
    if share <= 0.0 {
        return false;
    }
    hash as f64 <= share * u64::MAX as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_share_bounds() {
        assert!(!within_share(0, 0.0));
        assert!(within_share(u64::MAX, 1.0));
        assert!(within_share(u64::MAX / 4, 0.3));
        assert!(!within_share(u64::MAX / 2, 0.3));
    }
}
