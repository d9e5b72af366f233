//! Round-robin load balancing.

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::LoadBalanceAlgorithm;

/// Round-robin selector.
/// Keeps one rotating counter per logical group, so groups sharing this
/// instance do not disturb each other's cycle.
#[derive(Debug, Default)]
pub struct RoundRobinAlgorithm {
    counters: DashMap<String, AtomicUsize>,
}

impl RoundRobinAlgorithm {
    pub const TYPE: &'static str = "ROUND_ROBIN";

    pub fn new() -> Self {
        Self::default()
    }

    fn next_count(&self, group_name: &str) -> usize {
        if let Some(counter) = self.counters.get(group_name) {
            return counter.fetch_add(1, Ordering::Relaxed);
        }
        self.counters
            .entry(group_name.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
    }
}

impl LoadBalanceAlgorithm for RoundRobinAlgorithm {
    fn choose<'a>(&self, group_name: &str, candidates: &'a [String]) -> &'a str {
        // Counter wraps on overflow; the modulo keeps the index in bounds.
        let idx = self.next_count(group_name) % candidates.len();
        &candidates[idx]
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE
    }
}
