//! Players: the frozen-strategy player and the uniform-random baseline.
//!
//! A player is anything that can pick one of the legal actions given the
//! acting seat and the information-set key. The evaluator drives complete
//! games between two players; the learner produces [`FrozenPlayer`]
//! snapshots of its regret table.

use rand::Rng;
use rustc_hash::FxHashMap;

use crate::cfr::game::Action;
use crate::cfr::table::{regret_match, sample_index};

/// Decision surface consumed by the evaluators.
pub trait Player<A: Action> {
    /// Pick one of `actions` for `seat` at the infoset `info_key`.
    ///
    /// `actions` is never empty. The player may not mutate shared state;
    /// randomness comes from the caller-owned `rng` so players stay usable
    /// from parallel evaluation workers.
    fn choose<R: Rng>(&self, seat: usize, info_key: &str, actions: &[A], rng: &mut R) -> A;
}

/// Immutable snapshot of a regret table, taken at a point in time.
///
/// Mutations to the learner's live table after the snapshot do not show up
/// here: freezing deep-copies every regret vector.
#[derive(Debug, Clone)]
pub struct FrozenStrategy {
    regrets: FxHashMap<String, Vec<f64>>,
}

impl FrozenStrategy {
    pub(crate) fn new(regrets: FxHashMap<String, Vec<f64>>) -> Self {
        Self { regrets }
    }

    /// Strategy for an infoset by positive-regret matching on the snapshot.
    ///
    /// Infosets the learner never visited play uniform.
    pub fn strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        match self.regrets.get(info_key) {
            Some(regrets) if regrets.len() == num_actions => regret_match(regrets),
            _ => vec![1.0 / num_actions as f64; num_actions],
        }
    }

    /// Number of infosets captured in the snapshot.
    pub fn len(&self) -> usize {
        self.regrets.len()
    }

    /// Whether the snapshot captured no infosets.
    pub fn is_empty(&self) -> bool {
        self.regrets.is_empty()
    }
}

/// Plays the regret-matching strategy of a frozen snapshot.
#[derive(Debug, Clone)]
pub struct FrozenPlayer {
    strategy: FrozenStrategy,
}

impl FrozenPlayer {
    /// Wrap a snapshot for play.
    pub fn new(strategy: FrozenStrategy) -> Self {
        Self { strategy }
    }

    /// The underlying snapshot.
    pub fn strategy(&self) -> &FrozenStrategy {
        &self.strategy
    }
}

impl<A: Action> Player<A> for FrozenPlayer {
    fn choose<R: Rng>(&self, _seat: usize, info_key: &str, actions: &[A], rng: &mut R) -> A {
        let strategy = self.strategy.strategy(info_key, actions.len());
        actions[sample_index(&strategy, rng)]
    }
}

/// Uniform-random baseline player.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPlayer;

impl<A: Action> Player<A> for RandomPlayer {
    fn choose<R: Rng>(&self, _seat: usize, _info_key: &str, actions: &[A], rng: &mut R) -> A {
        actions[rng.gen_range(0..actions.len())]
    }
}
