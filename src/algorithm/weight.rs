//! Weighted round-robin load balancing.
//!
//! Uses the smooth weighted round-robin scheme: every pick adds each
//! candidate's weight to its running score, takes the highest score and
//! subtracts the total weight from the winner. Over a full cycle each
//! candidate is picked in proportion to its weight, without bursts.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::LoadBalanceAlgorithm;
use crate::config::Props;
use crate::error::{Error, Result};

/// Weight applied to candidates with no configured weight
const DEFAULT_WEIGHT: u32 = 1;

/// Weighted round-robin selector.
/// Weights are keyed by physical data source name.
#[derive(Debug, Default)]
pub struct WeightAlgorithm {
    weights: HashMap<String, u32>,
    /// Running scores per logical group
    scores: DashMap<String, Mutex<HashMap<String, i64>>>,
}

impl WeightAlgorithm {
    pub const TYPE: &'static str = "WEIGHT";

    pub fn new(weights: HashMap<String, u32>) -> Self {
        Self {
            weights,
            scores: DashMap::new(),
        }
    }

    /// Build from properties of the form `data_source_name = "weight"`.
    pub fn from_props(props: &Props) -> Result<Self> {
        let mut weights = HashMap::with_capacity(props.len());
        for (key, value) in props {
            let weight: u32 = value.trim().parse().map_err(|_| Error::InvalidAlgorithmProperty {
                algorithm: Self::TYPE.to_string(),
                key: key.clone(),
                reason: format!("`{}` is not a non-negative integer", value),
            })?;
            if weight == 0 {
                return Err(Error::InvalidAlgorithmProperty {
                    algorithm: Self::TYPE.to_string(),
                    key: key.clone(),
                    reason: "weight must be positive".to_string(),
                });
            }
            weights.insert(key.clone(), weight);
        }
        Ok(Self::new(weights))
    }

    /// Configured weight of a data source
    pub fn weight_of(&self, data_source_name: &str) -> u32 {
        self.weights
            .get(data_source_name)
            .copied()
            .unwrap_or(DEFAULT_WEIGHT)
    }

    fn pick(&self, scores: &mut HashMap<String, i64>, candidates: &[String]) -> usize {
        let mut total: i64 = 0;
        let mut best_idx = 0;
        let mut best_score = i64::MIN;

        for (idx, candidate) in candidates.iter().enumerate() {
            let weight = i64::from(self.weight_of(candidate));
            total += weight;

            if !scores.contains_key(candidate.as_str()) {
                scores.insert(candidate.clone(), 0);
            }
            if let Some(score) = scores.get_mut(candidate.as_str()) {
                *score += weight;
                if *score > best_score {
                    best_score = *score;
                    best_idx = idx;
                }
            }
        }

        if let Some(score) = scores.get_mut(candidates[best_idx].as_str()) {
            *score -= total;
        }
        best_idx
    }

    fn choose_index(&self, group_name: &str, candidates: &[String]) -> usize {
        if let Some(entry) = self.scores.get(group_name) {
            let mut scores = entry.lock();
            return self.pick(&mut scores, candidates);
        }
        let entry = self.scores.entry(group_name.to_string()).or_default();
        let mut scores = entry.lock();
        self.pick(&mut scores, candidates)
    }
}

impl LoadBalanceAlgorithm for WeightAlgorithm {
    fn choose<'a>(&self, group_name: &str, candidates: &'a [String]) -> &'a str {
        if candidates.len() == 1 {
            return &candidates[0];
        }

        &candidates[self.choose_index(group_name, candidates)]
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn weighted(pairs: &[(&str, &str)]) -> WeightAlgorithm {
        let props: Props = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        WeightAlgorithm::from_props(&props).unwrap()
    }

    #[test]
    fn test_weight_distribution() {
        let lb = weighted(&[("r1", "5"), ("r2", "1"), ("r3", "1")]);
        let candidates = names(&["r1", "r2", "r3"]);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for _ in 0..70 {
            *counts.entry(lb.choose("pr_ds", &candidates)).or_default() += 1;
        }

        assert_eq!(counts["r1"], 50);
        assert_eq!(counts["r2"], 10);
        assert_eq!(counts["r3"], 10);
    }

    #[test]
    fn test_weight_smooth_sequence() {
        let lb = weighted(&[("r1", "2"), ("r2", "1")]);
        let candidates = names(&["r1", "r2"]);

        let picks: Vec<&str> = (0..6).map(|_| lb.choose("pr_ds", &candidates)).collect();
        assert_eq!(picks, vec!["r1", "r2", "r1", "r1", "r2", "r1"]);
    }

    #[test]
    fn test_unlisted_candidates_default_weight() {
        let lb = weighted(&[]);
        let candidates = names(&["r1", "r2"]);

        assert_eq!(lb.weight_of("r1"), DEFAULT_WEIGHT);
        assert_eq!(lb.choose("pr_ds", &candidates), "r1");
        assert_eq!(lb.choose("pr_ds", &candidates), "r2");
    }

    #[test]
    fn test_candidates_change_between_calls() {
        let lb = weighted(&[("r1", "3"), ("r2", "1")]);
        let full = names(&["r1", "r2"]);
        let only_r2 = names(&["r2"]);

        lb.choose("pr_ds", &full);
        assert_eq!(lb.choose("pr_ds", &only_r2), "r2");
        let chosen = lb.choose("pr_ds", &full);
        assert!(chosen == "r1" || chosen == "r2");
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let zero: Props = [("r1".to_string(), "0".to_string())].into_iter().collect();
        assert!(matches!(
            WeightAlgorithm::from_props(&zero),
            Err(Error::InvalidAlgorithmProperty { .. })
        ));

        let text: Props = [("r1".to_string(), "heavy".to_string())].into_iter().collect();
        assert!(matches!(
            WeightAlgorithm::from_props(&text),
            Err(Error::InvalidAlgorithmProperty { key, .. }) if key == "r1"
        ));
    }
}
