//! RwSplit Configuration
//!
//! This module provides configuration structures for read/write-splitting
//! rules: the declarative form loaded from TOML, the pre-built form used by
//! programmatic callers, and the file-level settings around them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::algorithm::LoadBalanceAlgorithm;
use crate::error::{Error, Result};

/// Algorithm properties (key/value strings, as written in the config file)
pub type Props = BTreeMap<String, String>;

/// Main RwSplit configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RwSplitConfig {
    /// Read/write-splitting rule definition
    #[serde(flatten)]
    pub rule: ReadWriteSplittingRuleConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Declarative read/write-splitting rule configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadWriteSplittingRuleConfig {
    /// Logical data source groups
    #[serde(default)]
    pub data_sources: Vec<DataSourceRuleConfig>,

    /// Named load balancer algorithm definitions
    #[serde(default)]
    pub load_balancers: BTreeMap<String, AlgorithmConfig>,
}

/// One logical group: a write data source plus its read replicas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRuleConfig {
    /// Logical group name
    pub name: String,

    /// Physical data source receiving all writes
    pub write_data_source_name: String,

    /// Physical data sources eligible for reads, in configured order
    #[serde(default)]
    pub read_data_source_names: Vec<String>,

    /// Name of the load balancer in `load_balancers` (default algorithm if absent)
    #[serde(default)]
    pub load_balancer_name: Option<String>,
}

impl DataSourceRuleConfig {
    /// Create a group configuration without a load balancer name
    pub fn new(
        name: impl Into<String>,
        write_data_source_name: impl Into<String>,
        read_data_source_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            write_data_source_name: write_data_source_name.into(),
            read_data_source_names,
            load_balancer_name: None,
        }
    }

    /// Set the load balancer name
    pub fn with_load_balancer(mut self, name: impl Into<String>) -> Self {
        self.load_balancer_name = Some(name.into());
        self
    }
}

/// Declarative algorithm definition, resolved through an `AlgorithmRegistry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    /// Algorithm type (e.g. ROUND_ROBIN, RANDOM, WEIGHT)
    #[serde(rename = "type")]
    pub algorithm_type: String,

    /// Algorithm-specific properties
    #[serde(default)]
    pub props: Props,
}

impl AlgorithmConfig {
    /// Create an algorithm definition with no properties
    pub fn new(algorithm_type: impl Into<String>) -> Self {
        Self {
            algorithm_type: algorithm_type.into(),
            props: Props::new(),
        }
    }

    /// Add a property
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Rule configuration whose algorithms were already instantiated by the caller
#[derive(Debug, Clone, Default)]
pub struct AlgorithmProvidedRuleConfig {
    /// Logical data source groups
    pub data_sources: Vec<DataSourceRuleConfig>,

    /// Pre-built load balancer instances by name
    pub load_balancers: HashMap<String, Arc<dyn LoadBalanceAlgorithm>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Validate a group list: non-empty, named, with a write data source, no duplicates
pub fn validate_data_sources(data_sources: &[DataSourceRuleConfig]) -> Result<()> {
    if data_sources.is_empty() {
        return Err(Error::Config(
            "read/write-splitting data source rules cannot be empty".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(data_sources.len());
    for each in data_sources {
        if each.name.trim().is_empty() {
            return Err(Error::Config("data source rule name cannot be empty".into()));
        }
        if each.write_data_source_name.trim().is_empty() {
            return Err(Error::Config(format!(
                "data source rule `{}`: write_data_source_name cannot be empty",
                each.name
            )));
        }
        if !seen.insert(each.name.as_str()) {
            return Err(Error::DuplicateDataSourceRule(each.name.clone()));
        }
    }

    Ok(())
}

impl RwSplitConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: RwSplitConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validate_data_sources(&self.rule.data_sources)?;

        for (name, algorithm) in &self.rule.load_balancers {
            if algorithm.algorithm_type.trim().is_empty() {
                return Err(Error::Config(format!(
                    "load balancer `{}`: type cannot be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Sample configuration written by `rwsplit init`
    pub fn sample() -> &'static str {
        r#"# RwSplit configuration

[logging]
level = "info"
format = "pretty"

[[data_sources]]
name = "primary_ds"
write_data_source_name = "write_ds"
read_data_source_names = ["read_ds_0", "read_ds_1"]
load_balancer_name = "round_robin"

[[data_sources]]
name = "reporting_ds"
write_data_source_name = "write_ds"
read_data_source_names = ["read_ds_1", "read_ds_2"]
load_balancer_name = "weighted"

[load_balancers.round_robin]
type = "ROUND_ROBIN"

[load_balancers.weighted]
type = "WEIGHT"
props = { read_ds_1 = "1", read_ds_2 = "3" }
"#
    }
}
