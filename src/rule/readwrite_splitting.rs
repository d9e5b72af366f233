//! Read/Write-Splitting Rule
//!
//! Aggregate of every logical group in one configuration generation.
//! Topology and balancer bindings are fixed at construction; only the
//! per-group disabled sets change afterwards.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use super::{DataSourceRule, OperationKind, RuleChangedEvent};
use crate::algorithm::{AlgorithmRegistry, LoadBalanceAlgorithm};
use crate::config::{
    validate_data_sources, AlgorithmProvidedRuleConfig, DataSourceRuleConfig,
    ReadWriteSplittingRuleConfig,
};
use crate::error::{Error, Result};

/// Read/write-splitting rule over a set of logical groups
#[derive(Debug)]
pub struct ReadWriteSplittingRule {
    /// Load balancers by configured name
    load_balancers: HashMap<String, Arc<dyn LoadBalanceAlgorithm>>,
    /// Groups in configuration order
    data_source_rules: Vec<DataSourceRule>,
    /// Group name -> index into `data_source_rules`
    index: HashMap<String, usize>,
}

impl ReadWriteSplittingRule {
    /// Build from a declarative configuration, creating balancers through `registry`
    pub fn new(config: &ReadWriteSplittingRuleConfig, registry: &AlgorithmRegistry) -> Result<Self> {
        validate_data_sources(&config.data_sources)?;

        let mut load_balancers = HashMap::with_capacity(config.load_balancers.len());
        for (name, algorithm) in &config.load_balancers {
            load_balancers.insert(name.clone(), registry.create(algorithm)?);
        }

        Self::build(&config.data_sources, load_balancers, registry)
    }

    /// Build from a configuration whose balancers were already instantiated
    pub fn from_provided(
        config: AlgorithmProvidedRuleConfig,
        registry: &AlgorithmRegistry,
    ) -> Result<Self> {
        validate_data_sources(&config.data_sources)?;
        Self::build(&config.data_sources, config.load_balancers, registry)
    }

    fn build(
        data_sources: &[DataSourceRuleConfig],
        load_balancers: HashMap<String, Arc<dyn LoadBalanceAlgorithm>>,
        registry: &AlgorithmRegistry,
    ) -> Result<Self> {
        let mut data_source_rules = Vec::with_capacity(data_sources.len());
        let mut index = HashMap::with_capacity(data_sources.len());

        for each in data_sources {
            let load_balancer = Self::resolve_load_balancer(each, &load_balancers, registry);
            if index.insert(each.name.clone(), data_source_rules.len()).is_some() {
                return Err(Error::DuplicateDataSourceRule(each.name.clone()));
            }
            data_source_rules.push(DataSourceRule::new(each, load_balancer));
        }

        tracing::info!(
            groups = data_source_rules.len(),
            load_balancers = load_balancers.len(),
            "Read/write-splitting rule built"
        );

        Ok(Self {
            load_balancers,
            data_source_rules,
            index,
        })
    }

    /// Named balancer if present, otherwise the registry default
    fn resolve_load_balancer(
        config: &DataSourceRuleConfig,
        load_balancers: &HashMap<String, Arc<dyn LoadBalanceAlgorithm>>,
        registry: &AlgorithmRegistry,
    ) -> Arc<dyn LoadBalanceAlgorithm> {
        let named = config
            .load_balancer_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .and_then(|name| load_balancers.get(name));

        match named {
            Some(load_balancer) => Arc::clone(load_balancer),
            None => {
                let default = registry.default_algorithm();
                tracing::debug!(
                    group = %config.name,
                    load_balancer = ?config.load_balancer_name,
                    algorithm = default.type_name(),
                    "Load balancer not found, using default algorithm"
                );
                default
            }
        }
    }

    /// All logical group names, in configuration order
    pub fn all_group_names(&self) -> Vec<&str> {
        self.data_source_rules.iter().map(DataSourceRule::name).collect()
    }

    /// The first configured group, for callers that manage exactly one group
    pub fn single_group(&self) -> &DataSourceRule {
        // Construction rejects empty group lists
        &self.data_source_rules[0]
    }

    /// Find a group by logical name
    pub fn find_group(&self, name: &str) -> Option<&DataSourceRule> {
        self.index.get(name).map(|&idx| &self.data_source_rules[idx])
    }

    /// Iterate over all groups in configuration order
    pub fn groups(&self) -> impl Iterator<Item = &DataSourceRule> {
        self.data_source_rules.iter()
    }

    /// Named load balancer instance
    pub fn load_balancer(&self, name: &str) -> Option<&Arc<dyn LoadBalanceAlgorithm>> {
        self.load_balancers.get(name)
    }

    /// Logical to physical mapping, merged over every group
    pub fn data_source_mapper(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut result = BTreeMap::new();
        for each in &self.data_source_rules {
            result.extend(each.data_source_mapping());
        }
        result
    }

    /// Physical data source name -> logical groups referencing it
    pub fn physical_to_logical_mapping(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut result: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (group, members) in self.data_source_mapper() {
            for member in members {
                result.entry(member).or_default().insert(group.clone());
            }
        }
        result
    }

    /// Resolve the physical target of an operation on a named group
    pub fn route(&self, group: &str, kind: OperationKind) -> Result<String> {
        self.find_group(group)
            .map(|rule| rule.resolve_target(kind))
            .ok_or_else(|| Error::DataSourceRuleNotFound(group.to_string()))
    }

    /// Apply a runtime change notification
    pub fn apply_health_event(&self, event: &RuleChangedEvent) -> usize {
        match event {
            RuleChangedEvent::DataSourceDisabled {
                data_source_name,
                disabled,
            } => self.update_disabled_state(data_source_name, *disabled),
        }
    }

    /// Broadcast a disable/enable transition to every group.
    ///
    /// Returns the number of groups whose disabled set changed.
    pub fn update_disabled_state(&self, data_source_name: &str, disabled: bool) -> usize {
        let changed = self
            .data_source_rules
            .iter()
            .filter(|rule| rule.update_disabled_state(data_source_name, disabled))
            .count();

        if changed == 0 {
            tracing::debug!(
                data_source = %data_source_name,
                disabled,
                "Health event did not change any group"
            );
        }
        changed
    }
}
