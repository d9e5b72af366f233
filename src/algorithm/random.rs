//! Random load balancing.

use rand::Rng;

use super::LoadBalanceAlgorithm;

/// Uniform random selector. Not cryptographically strong.
#[derive(Debug, Default)]
pub struct RandomAlgorithm;

impl RandomAlgorithm {
    pub const TYPE: &'static str = "RANDOM";

    pub fn new() -> Self {
        Self
    }
}

impl LoadBalanceAlgorithm for RandomAlgorithm {
    fn choose<'a>(&self, _group_name: &str, candidates: &'a [String]) -> &'a str {
        let idx = rand::thread_rng().gen_range(0..candidates.len());
        &candidates[idx]
    }

    fn type_name(&self) -> &'static str {
        Self::TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_stays_in_candidates() {
        let lb = RandomAlgorithm::new();
        let candidates = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];

        for _ in 0..200 {
            let chosen = lb.choose("pr_ds", &candidates);
            assert!(candidates.iter().any(|c| c == chosen));
        }
    }

    #[test]
    fn test_random_single_candidate() {
        let lb = RandomAlgorithm::new();
        let candidates = vec!["only".to_string()];
        assert_eq!(lb.choose("pr_ds", &candidates), "only");
    }
}
