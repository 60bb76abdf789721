//! Shared regret table and regret-matching strategy derivation.
//!
//! The table is the only cross-thread mutable state during training: every
//! worker reads strategies from it and applies regret updates to it. It is
//! backed by a sharded concurrent map so that inserting a new information set
//! is atomic (one initialisation vector even when several workers discover
//! the same infoset simultaneously) and per-action read-modify-write updates
//! happen under the shard lock, never losing writes.

use std::hash::BuildHasherDefault;

use dashmap::DashMap;
use rand::Rng;
use rustc_hash::{FxHashMap, FxHasher};

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Value every regret slot starts at when an infoset is first observed.
///
/// Optimistic initialisation: equal positive regrets make the first derived
/// strategy uniform, which biases early self-play toward exploration.
pub const INITIAL_REGRET: f64 = 10.0;

/// Concurrent mapping from information-set key to cumulative positive
/// regrets, one slot per legal action in `legal_actions` order.
///
/// Vector length is fixed at first observation. Every update clamps slots at
/// zero, so stored regrets are always non-negative.
#[derive(Debug, Default)]
pub struct RegretTable {
    regrets: FxDashMap<String, Vec<f64>>,
}

impl RegretTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            regrets: FxDashMap::default(),
        }
    }

    /// Number of information sets observed so far.
    pub fn len(&self) -> usize {
        self.regrets.len()
    }

    /// Whether no information set has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.regrets.is_empty()
    }

    /// Drop every stored regret vector.
    pub fn clear(&self) {
        self.regrets.clear();
    }

    /// Current strategy for an infoset by positive-regret matching.
    ///
    /// Inserts a fresh `INITIAL_REGRET` vector if the infoset is new; the
    /// insert is atomic with respect to concurrent lookups of the same key.
    pub fn strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        let entry = self
            .regrets
            .entry(info_key.to_owned())
            .or_insert_with(|| vec![INITIAL_REGRET; num_actions]);
        debug_assert_eq!(
            entry.len(),
            num_actions,
            "action count changed for infoset {}",
            info_key
        );
        regret_match(&entry)
    }

    /// Apply one regret update per action: `r <- max(0, r + delta)`.
    ///
    /// The whole vector is updated under the shard lock, so concurrent
    /// updates to the same infoset serialize rather than losing writes.
    pub fn apply_regrets(&self, info_key: &str, deltas: &[f64]) {
        let mut entry = self
            .regrets
            .entry(info_key.to_owned())
            .or_insert_with(|| vec![INITIAL_REGRET; deltas.len()]);
        debug_assert_eq!(entry.len(), deltas.len());
        for (slot, delta) in entry.iter_mut().zip(deltas) {
            debug_assert!(delta.is_finite(), "non-finite regret delta {}", delta);
            *slot = (*slot + delta).max(0.0);
        }
    }

    /// Regret vector for one infoset, if it has been observed.
    pub fn regrets(&self, info_key: &str) -> Option<Vec<f64>> {
        self.regrets.get(info_key).map(|entry| entry.value().clone())
    }

    /// Deep copy of every infoset's regret vector.
    ///
    /// Later table mutations do not affect the returned map; this is the
    /// basis of frozen-strategy snapshots.
    pub fn snapshot(&self) -> FxHashMap<String, Vec<f64>> {
        self.regrets
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// All entries sorted lexicographically by key, for checkpoint writing.
    pub fn export_sorted(&self) -> Vec<(String, Vec<f64>)> {
        let mut entries = self.snapshot().into_iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Insert a regret vector verbatim, replacing any existing entry.
    ///
    /// Only used when restoring a checkpoint.
    pub fn restore(&self, info_key: String, regrets: Vec<f64>) {
        self.regrets.insert(info_key, regrets);
    }
}

/// Positive-regret matching over a regret vector.
///
/// Plays action `i` with probability `max(r_i, 0) / sum` when the sum of
/// positive regrets is non-zero, uniform otherwise.
pub fn regret_match(regrets: &[f64]) -> Vec<f64> {
    let positive: Vec<f64> = regrets.iter().map(|&r| r.max(0.0)).collect();
    let sum: f64 = positive.iter().sum();
    if sum > 0.0 {
        positive.iter().map(|&r| r / sum).collect()
    } else {
        vec![1.0 / regrets.len() as f64; regrets.len()]
    }
}

/// Sample an action index from a strategy distribution.
///
/// Walks the cumulative mass until it exceeds a uniform draw; falls through
/// to the last index so floating-point rounding can never run off the end.
pub fn sample_index<R: Rng>(strategy: &[f64], rng: &mut R) -> usize {
    let u: f64 = rng.gen();
    let mut cumulative = 0.0;
    for (i, &p) in strategy.iter().enumerate() {
        cumulative += p;
        if u < cumulative {
            return i;
        }
    }
    strategy.len() - 1
}
