//! Data Source Rule
//!
//! Static topology of one logical group plus its runtime disabled set.

use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use crate::algorithm::LoadBalanceAlgorithm;
use crate::config::DataSourceRuleConfig;

/// Kind of logical operation being routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Read,
    Write,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Read => write!(f, "read"),
            OperationKind::Write => write!(f, "write"),
        }
    }
}

/// Routing rule for one logical data source group
#[derive(Debug)]
pub struct DataSourceRule {
    /// Logical group name
    name: String,
    /// Physical data source receiving writes
    write_data_source_name: String,
    /// Physical read replicas, in configured order
    read_data_source_names: Vec<String>,
    /// Balancer bound at construction
    load_balancer: Arc<dyn LoadBalanceAlgorithm>,
    /// Members currently marked unhealthy
    disabled_data_source_names: RwLock<HashSet<String>>,
}

impl DataSourceRule {
    /// Create a rule from a group configuration and its resolved balancer
    pub fn new(config: &DataSourceRuleConfig, load_balancer: Arc<dyn LoadBalanceAlgorithm>) -> Self {
        Self {
            name: config.name.clone(),
            write_data_source_name: config.write_data_source_name.clone(),
            read_data_source_names: config.read_data_source_names.clone(),
            load_balancer,
            disabled_data_source_names: RwLock::new(HashSet::new()),
        }
    }

    /// Logical group name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write data source name
    pub fn write_data_source_name(&self) -> &str {
        &self.write_data_source_name
    }

    /// Configured read data source names (including disabled ones)
    pub fn read_data_source_names(&self) -> &[String] {
        &self.read_data_source_names
    }

    /// Bound load balancer
    pub fn load_balancer(&self) -> &Arc<dyn LoadBalanceAlgorithm> {
        &self.load_balancer
    }

    /// Check if a physical name is the write source or one of the replicas
    pub fn contains(&self, data_source_name: &str) -> bool {
        self.write_data_source_name == data_source_name
            || self.read_data_source_names.iter().any(|n| n == data_source_name)
    }

    /// Check if a data source is currently disabled
    pub fn is_disabled(&self, data_source_name: &str) -> bool {
        self.disabled_data_source_names.read().contains(data_source_name)
    }

    /// Snapshot of the disabled set
    pub fn disabled_data_source_names(&self) -> BTreeSet<String> {
        self.disabled_data_source_names.read().iter().cloned().collect()
    }

    /// Snapshot of read data sources that are not disabled, in configured order
    pub fn enabled_read_data_source_names(&self) -> Vec<String> {
        let disabled = self.disabled_data_source_names.read();
        self.read_data_source_names
            .iter()
            .filter(|n| !disabled.contains(n.as_str()))
            .cloned()
            .collect()
    }

    /// Logical to physical mapping for this group: `{name: write ∪ reads}`
    pub fn data_source_mapping(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut members = BTreeSet::new();
        members.insert(self.write_data_source_name.clone());
        members.extend(self.read_data_source_names.iter().cloned());

        let mut result = BTreeMap::new();
        result.insert(self.name.clone(), members);
        result
    }

    /// Pick the physical data source that should serve a read.
    ///
    /// Falls back to the write data source when no replica is enabled.
    pub fn resolve_read_target(&self) -> String {
        let enabled = {
            let disabled = self.disabled_data_source_names.read();
            if disabled.is_empty() {
                None
            } else {
                Some(
                    self.read_data_source_names
                        .iter()
                        .filter(|n| !disabled.contains(n.as_str()))
                        .cloned()
                        .collect::<Vec<_>>(),
                )
            }
        };

        let candidates = enabled.as_deref().unwrap_or(&self.read_data_source_names);
        if candidates.is_empty() {
            if !self.read_data_source_names.is_empty() {
                tracing::warn!(
                    group = %self.name,
                    write = %self.write_data_source_name,
                    "All read data sources disabled, routing read to write data source"
                );
            }
            return self.write_data_source_name.clone();
        }

        self.load_balancer.choose(&self.name, candidates).to_string()
    }

    /// Pick the physical data source for an operation
    pub fn resolve_target(&self, kind: OperationKind) -> String {
        match kind {
            OperationKind::Write => self.write_data_source_name.clone(),
            OperationKind::Read => self.resolve_read_target(),
        }
    }

    /// Mark a member data source disabled or enabled.
    ///
    /// Names that do not belong to this group are ignored. Returns whether
    /// the disabled set changed.
    pub fn update_disabled_state(&self, data_source_name: &str, disabled: bool) -> bool {
        if !self.contains(data_source_name) {
            return false;
        }

        let changed = {
            let mut set = self.disabled_data_source_names.write();
            if disabled {
                set.insert(data_source_name.to_string())
            } else {
                set.remove(data_source_name)
            }
        };

        if changed {
            tracing::info!(
                group = %self.name,
                data_source = %data_source_name,
                disabled,
                "Data source state changed"
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::RoundRobinAlgorithm;

    fn rule(reads: &[&str]) -> DataSourceRule {
        let config = DataSourceRuleConfig::new(
            "pr_ds",
            "write_ds",
            reads.iter().map(|r| r.to_string()).collect(),
        );
        DataSourceRule::new(&config, Arc::new(RoundRobinAlgorithm::new()))
    }

    #[test]
    fn test_round_robin_read_targets() {
        let rule = rule(&["r1", "r2", "r3"]);

        assert_eq!(rule.resolve_read_target(), "r1");
        assert_eq!(rule.resolve_read_target(), "r2");
        assert_eq!(rule.resolve_read_target(), "r3");
        assert_eq!(rule.resolve_read_target(), "r1");
    }

    #[test]
    fn test_single_replica_disabled_falls_back_to_write() {
        let rule = rule(&["r1"]);
        assert_eq!(rule.resolve_read_target(), "r1");

        assert!(rule.update_disabled_state("r1", true));
        assert_eq!(rule.resolve_read_target(), "write_ds");
    }

    #[test]
    fn test_no_replicas_reads_from_write() {
        let rule = rule(&[]);
        assert_eq!(rule.resolve_read_target(), "write_ds");
    }

    #[test]
    fn test_writes_go_to_write_data_source() {
        let rule = rule(&["r1", "r2"]);
        assert_eq!(rule.resolve_target(OperationKind::Write), "write_ds");
        assert_eq!(rule.resolve_target(OperationKind::Read), "r1");

        // Disabling the write source does not redirect writes
        rule.update_disabled_state("write_ds", true);
        assert_eq!(rule.resolve_target(OperationKind::Write), "write_ds");
    }

    #[test]
    fn test_disabled_replica_skipped() {
        let rule = rule(&["r1", "r2", "r3"]);
        rule.update_disabled_state("r2", true);

        assert_eq!(rule.enabled_read_data_source_names(), vec!["r1", "r3"]);
        for _ in 0..6 {
            assert_ne!(rule.resolve_read_target(), "r2");
        }
    }

    #[test]
    fn test_disable_enable_idempotent() {
        let rule = rule(&["r1", "r2"]);

        assert!(rule.update_disabled_state("r1", true));
        assert!(!rule.update_disabled_state("r1", true));
        assert_eq!(rule.disabled_data_source_names().len(), 1);
        assert!(rule.is_disabled("r1"));

        assert!(rule.update_disabled_state("r1", false));
        assert!(!rule.update_disabled_state("r1", false));
        assert!(!rule.is_disabled("r1"));
        assert_eq!(rule.enabled_read_data_source_names(), vec!["r1", "r2"]);
    }

    #[test]
    fn test_unknown_name_ignored() {
        let rule = rule(&["r1"]);
        assert!(!rule.update_disabled_state("other_ds", true));
        assert!(rule.disabled_data_source_names().is_empty());
    }

    #[test]
    fn test_data_source_mapping() {
        let rule = rule(&["r1", "r2"]);
        let mapping = rule.data_source_mapping();

        assert_eq!(mapping.len(), 1);
        let members: Vec<&str> = mapping["pr_ds"].iter().map(String::as_str).collect();
        assert_eq!(members, vec!["r1", "r2", "write_ds"]);
    }

    #[test]
    fn test_concurrent_routing_and_health_events() {
        let rule = rule(&["r1", "r2", "r3"]);
        let allowed = ["r1", "r2", "r3", "write_ds"];

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..2000 {
                        let target = rule.resolve_read_target();
                        assert!(allowed.contains(&target.as_str()));
                    }
                });
            }
            for name in ["r1", "r2", "r3"] {
                let rule = &rule;
                s.spawn(move || {
                    for i in 0..500 {
                        rule.update_disabled_state(name, i % 2 == 0);
                    }
                });
            }
        });

        // Each toggler ends on an enable
        assert!(rule.disabled_data_source_names().is_empty());
        assert_eq!(rule.enabled_read_data_source_names().len(), 3);
    }
}
