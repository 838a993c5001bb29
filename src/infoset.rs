//! Information-set store: regret and cumulative-strategy vectors keyed by
//! `(player, canonical-hand, board, history)`, with regret-matching.

use crate::canonical::CanonicalHand;
use crate::card::Board;
use crate::game::Position;
use rustc_hash::FxHashMap;

/// Build the stable string key for an information set.
pub fn info_key(player: Position, hand: CanonicalHand, board: &Board, history: &str) -> String {
    format!("{}|{}|{}|{}", player, hand, board, history)
}

/// One information set's cumulative regret and strategy vectors, indexed
/// in lockstep with that node's legal-action list.
#[derive(Debug, Clone, Default)]
struct InfoSetEntry {
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
}

/// Regret and strategy-sum storage for every visited information set.
#[derive(Debug, Clone, Default)]
pub struct InfoSetStore {
    entries: FxHashMap<String, InfoSetEntry>,
}

impl InfoSetStore {
    /// An empty store.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Number of distinct information sets visited so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether any information set has been visited.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current regret-matching strategy for `key` over `num_actions`
    /// actions, accumulating `strategy_sum += realization_weight * sigma`
    /// as a side effect (the "on read" accumulation from spec §4.5).
    pub fn strategy(&mut self, key: &str, num_actions: usize, realization_weight: f64) -> Vec<f64> {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| InfoSetEntry {
                regret_sum: vec![0.0; num_actions],
                strategy_sum: vec![0.0; num_actions],
            });
        debug_assert_eq!(entry.regret_sum.len(), num_actions, "action set changed for {}", key);

        let sigma = regret_match(&entry.regret_sum);
        for (i, &p) in sigma.iter().enumerate() {
            entry.strategy_sum[i] += realization_weight * p;
        }
        sigma
    }

    /// Add a regret update for each action at `key` (already weighted by
    /// opponent reach probability per spec §4.6).
    pub fn add_regret(&mut self, key: &str, regret_updates: &[f64]) {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| InfoSetEntry {
                regret_sum: vec![0.0; regret_updates.len()],
                strategy_sum: vec![0.0; regret_updates.len()],
            });
        for (r, &delta) in entry.regret_sum.iter_mut().zip(regret_updates) {
            *r += delta;
        }
    }

    /// The average strategy for `key` (the Nash-equilibrium approximation
    /// used for output), uniform over `num_actions` if unvisited.
    pub fn average_strategy(&self, key: &str, num_actions: usize) -> Vec<f64> {
        match self.entries.get(key) {
            Some(entry) => {
                let total: f64 = entry.strategy_sum.iter().sum();
                if total > 0.0 {
                    entry.strategy_sum.iter().map(|&x| x / total).collect()
                } else {
                    uniform(num_actions)
                }
            }
            None => uniform(num_actions),
        }
    }

    /// Snapshot every current average strategy, used to compute the
    /// convergence metric between checkpoints.
    pub fn snapshot(&self) -> FxHashMap<String, Vec<f64>> {
        self.entries
            .iter()
            .map(|(k, v)| {
                let total: f64 = v.strategy_sum.iter().sum();
                let avg = if total > 0.0 {
                    v.strategy_sum.iter().map(|&x| x / total).collect()
                } else {
                    uniform(v.strategy_sum.len())
                };
                (k.clone(), avg)
            })
            .collect()
    }

    /// Average L1 change in per-node average strategy against a prior
    /// `snapshot()`, averaged over the number of info sets compared.
    pub fn convergence_since(&self, previous: &FxHashMap<String, Vec<f64>>) -> f64 {
        let current = self.snapshot();
        if current.is_empty() {
            return 0.0;
        }
        let mut total_change = 0.0;
        for (key, new_strategy) in &current {
            let old_strategy = previous.get(key);
            let change: f64 = match old_strategy {
                Some(old) => new_strategy
                    .iter()
                    .zip(old.iter())
                    .map(|(a, b)| (a - b).abs())
                    .sum(),
                None => {
                    let uniform_prob = 1.0 / new_strategy.len() as f64;
                    new_strategy.iter().map(|&p| (p - uniform_prob).abs()).sum()
                }
            };
            total_change += change;
        }
        total_change / current.len() as f64
    }
}

fn regret_match(regret_sum: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regret_sum.iter().map(|&r| r.max(0.0)).collect();
    let total: f64 = positive.iter().sum();
    if total > 0.0 {
        positive.iter().map(|&r| r / total).collect()
    } else {
        uniform(regret_sum.len())
    }
}

fn uniform(num_actions: usize) -> Vec<f64> {
    if num_actions == 0 {
        Vec::new()
    } else {
        vec![1.0 / num_actions as f64; num_actions]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unvisited_infoset_is_uniform() {
        let store = InfoSetStore::new();
        let sigma = store.average_strategy("missing", 3);
        assert_eq!(sigma, vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn strategy_sums_to_one() {
        let mut store = InfoSetStore::new();
        let sigma = store.strategy("k", 3, 1.0);
        let sum: f64 = sigma.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(sigma.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn positive_regret_skews_strategy_toward_that_action() {
        let mut store = InfoSetStore::new();
        store.add_regret("k", &[10.0, 0.0]);
        let sigma = store.strategy("k", 2, 1.0);
        assert!(sigma[0] > sigma[1]);
    }

    #[test]
    fn average_strategy_matches_accumulated_reach() {
        let mut store = InfoSetStore::new();
        store.add_regret("k", &[1.0, 0.0]);
        store.strategy("k", 2, 1.0);
        store.add_regret("k", &[1.0, 0.0]);
        store.strategy("k", 2, 1.0);
        let avg = store.average_strategy("k", 2);
        let sum: f64 = avg.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn convergence_against_empty_snapshot_counts_new_infosets() {
        let mut store = InfoSetStore::new();
        store.strategy("k", 2, 1.0);
        let empty = FxHashMap::default();
        assert!(store.convergence_since(&empty) > 0.0);
    }
}
