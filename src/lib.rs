// Roulette - Feature flag and experiment evaluation for Rust
//
// This library evaluates feature flags deterministically against input records,
// with weighted rendezvous variant assignment and cross-feature preconditions.

// Re-export core functionality
pub use roulette_features::*;

// Re-export logging
pub use roulette_log;

// Re-export optional crates
#[cfg(feature = "client")]
pub use roulette_client;

/// Prelude for common imports.
///
/// ```
/// use roulette::prelude::*;
/// ```
pub mod prelude {
    pub use roulette_features::{
        Diagnostic, Evaluation, Feature, FeatureId, FeatureLookup, FeatureRegistry, FeatureSet,
        GroupCatalog, HashPrimitive, Input, LoadError, MatchReason, RegistryError,
        WeightedRendezvous, to_input,
    };

    #[cfg(feature = "client")]
    pub use roulette_client::{ClientConfig, ClientError, RouletteApi, RouletteClient};
}
