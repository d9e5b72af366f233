//! Algorithm Registry
//!
//! Builds load balance algorithms by type name. A registry is created once
//! at startup and handed to whatever constructs rules; it also owns the
//! shared default algorithm used by groups with no resolvable balancer.

use std::collections::HashMap;
use std::sync::Arc;

use super::{LoadBalanceAlgorithm, RandomAlgorithm, RoundRobinAlgorithm, WeightAlgorithm};
use crate::config::{AlgorithmConfig, Props};
use crate::error::{Error, Result};

/// Builds an algorithm instance from its properties
pub type AlgorithmConstructor = fn(&Props) -> Result<Arc<dyn LoadBalanceAlgorithm>>;

/// Type-name keyed algorithm factory
#[derive(Clone)]
pub struct AlgorithmRegistry {
    /// Constructors keyed by upper-cased type name
    constructors: HashMap<String, AlgorithmConstructor>,
    /// Instance shared by every group that falls back to the default
    default_algorithm: Arc<dyn LoadBalanceAlgorithm>,
}

impl AlgorithmRegistry {
    /// Create an empty registry with the given default algorithm
    pub fn new(default_algorithm: Arc<dyn LoadBalanceAlgorithm>) -> Self {
        Self {
            constructors: HashMap::new(),
            default_algorithm,
        }
    }

    /// Registry with RANDOM, ROUND_ROBIN and WEIGHT, defaulting to ROUND_ROBIN
    pub fn builtin() -> Self {
        let mut registry = Self::new(Arc::new(RoundRobinAlgorithm::new()));
        registry.register(RoundRobinAlgorithm::TYPE, |_| {
            Ok(Arc::new(RoundRobinAlgorithm::new()))
        });
        registry.register(RandomAlgorithm::TYPE, |_| Ok(Arc::new(RandomAlgorithm::new())));
        registry.register(WeightAlgorithm::TYPE, |props| {
            Ok(Arc::new(WeightAlgorithm::from_props(props)?))
        });
        registry
    }

    /// Register (or replace) a constructor for an algorithm type
    pub fn register(&mut self, algorithm_type: &str, constructor: AlgorithmConstructor) {
        self.constructors
            .insert(algorithm_type.to_ascii_uppercase(), constructor);
    }

    /// Replace the default algorithm instance
    pub fn with_default(mut self, default_algorithm: Arc<dyn LoadBalanceAlgorithm>) -> Self {
        self.default_algorithm = default_algorithm;
        self
    }

    /// Check if an algorithm type is registered (case-insensitive)
    pub fn contains(&self, algorithm_type: &str) -> bool {
        self.constructors
            .contains_key(&algorithm_type.to_ascii_uppercase())
    }

    /// Build an algorithm from a declarative definition
    pub fn create(&self, config: &AlgorithmConfig) -> Result<Arc<dyn LoadBalanceAlgorithm>> {
        let constructor = self
            .constructors
            .get(&config.algorithm_type.to_ascii_uppercase())
            .ok_or_else(|| Error::UnknownAlgorithmType(config.algorithm_type.clone()))?;
        constructor(&config.props)
    }

    /// Shared default algorithm instance
    pub fn default_algorithm(&self) -> Arc<dyn LoadBalanceAlgorithm> {
        Arc::clone(&self.default_algorithm)
    }
}

impl std::fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("AlgorithmRegistry")
            .field("types", &types)
            .field("default_algorithm", &self.default_algorithm.type_name())
            .finish()
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FirstAlgorithm;

    impl LoadBalanceAlgorithm for FirstAlgorithm {
        fn choose<'a>(&self, _group_name: &str, candidates: &'a [String]) -> &'a str {
            &candidates[0]
        }

        fn type_name(&self) -> &'static str {
            "FIRST"
        }
    }

    #[test]
    fn test_builtin_types() {
        let registry = AlgorithmRegistry::builtin();

        for algorithm_type in ["ROUND_ROBIN", "RANDOM", "WEIGHT"] {
            let algorithm = registry.create(&AlgorithmConfig::new(algorithm_type)).unwrap();
            assert_eq!(algorithm.type_name(), algorithm_type);
        }
        assert_eq!(registry.default_algorithm().type_name(), "ROUND_ROBIN");
    }

    #[test]
    fn test_type_lookup_is_case_insensitive() {
        let registry = AlgorithmRegistry::builtin();
        assert!(registry.contains("round_robin"));

        let algorithm = registry.create(&AlgorithmConfig::new("random")).unwrap();
        assert_eq!(algorithm.type_name(), "RANDOM");
    }

    #[test]
    fn test_unknown_type() {
        let registry = AlgorithmRegistry::builtin();
        let err = registry.create(&AlgorithmConfig::new("FASTEST")).unwrap_err();
        assert!(matches!(err, Error::UnknownAlgorithmType(t) if t == "FASTEST"));
    }

    #[test]
    fn test_weight_props_forwarded() {
        let registry = AlgorithmRegistry::builtin();
        let config = AlgorithmConfig::new("WEIGHT").with_prop("r1", "zero");
        assert!(matches!(
            registry.create(&config),
            Err(Error::InvalidAlgorithmProperty { .. })
        ));
    }

    #[test]
    fn test_custom_registration_and_default() {
        let mut registry = AlgorithmRegistry::builtin().with_default(Arc::new(FirstAlgorithm));
        registry.register("first", |_| Ok(Arc::new(FirstAlgorithm)));

        assert!(registry.contains("FIRST"));
        assert_eq!(registry.default_algorithm().type_name(), "FIRST");

        let algorithm = registry.create(&AlgorithmConfig::new("First")).unwrap();
        let candidates = vec!["r2".to_string(), "r1".to_string()];
        assert_eq!(algorithm.choose("pr_ds", &candidates), "r2");
    }

    #[test]
    fn test_default_instance_is_shared() {
        let registry = AlgorithmRegistry::builtin();
        assert!(Arc::ptr_eq(
            &registry.default_algorithm(),
            &registry.default_algorithm()
        ));
    }
}
