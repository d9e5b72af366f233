//! RwSplit - Read/Write-Splitting Routing Rules
//!
//! Routes logical database operations to physical data sources: writes go
//! to a group's single write data source, reads are spread across its
//! replicas by a pluggable load balance algorithm.
//!
//! # Architecture
//!
//! A `ReadWriteSplittingRule` is built once per configuration generation
//! from either a declarative config (algorithms created through an
//! `AlgorithmRegistry`) or pre-built algorithm instances. Its topology never
//! changes afterwards; health events only toggle the per-group disabled
//! sets, which routing reads as point-in-time snapshots.
//!
//! # Features
//!
//! - Round-robin, random and weighted round-robin replica balancing
//! - Silent fallback to the registry's default algorithm for unknown names
//! - Reads fall back to the write data source when all replicas are disabled
//! - Lock-light routing safe under concurrent health-state changes
//! - Physical-to-logical data source mapping for health event translation

pub mod algorithm;
pub mod config;
pub mod error;
pub mod rule;

pub use config::RwSplitConfig;
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::algorithm::{AlgorithmRegistry, LoadBalanceAlgorithm};
    pub use crate::config::{
        AlgorithmConfig, AlgorithmProvidedRuleConfig, DataSourceRuleConfig,
        ReadWriteSplittingRuleConfig, RwSplitConfig,
    };
    pub use crate::error::{Error, Result};
    pub use crate::rule::{DataSourceRule, OperationKind, ReadWriteSplittingRule, RuleChangedEvent};
}
