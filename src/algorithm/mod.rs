//! Replica Load Balance Algorithms
//!
//! Strategies that pick one read data source out of the currently enabled
//! candidates of a logical group. Algorithms know nothing about disabled
//! state or write targets: the caller filters candidates and guarantees the
//! slice is non-empty.
//!
//! Built-in types:
//! - `ROUND_ROBIN`: per-group rotating counter (the default algorithm)
//! - `RANDOM`: uniform random pick
//! - `WEIGHT`: smooth weighted round-robin driven by per-data-source weights

mod random;
mod registry;
mod round_robin;
mod weight;

use std::fmt::Debug;

pub use random::RandomAlgorithm;
pub use registry::{AlgorithmConstructor, AlgorithmRegistry};
pub use round_robin::RoundRobinAlgorithm;
pub use weight::WeightAlgorithm;

/// Strategy choosing one replica for a routing request
pub trait LoadBalanceAlgorithm: Send + Sync + Debug {
    /// Choose one of `candidates` for `group_name`.
    ///
    /// `candidates` is never empty and may differ in size between calls as
    /// replicas are disabled and re-enabled.
    fn choose<'a>(&self, group_name: &str, candidates: &'a [String]) -> &'a str;

    /// Algorithm type name, as used in configuration
    fn type_name(&self) -> &'static str;
}
