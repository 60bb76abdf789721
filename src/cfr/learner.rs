//! Parallel external-sampling CFR learner.
//!
//! Training runs many self-play rollouts concurrently against one shared
//! [`RegretTable`]. Each iteration designates a training player, deals a
//! fresh game from the prototype, and traverses it: opponent nodes sample a
//! single action from the current strategy (with epsilon exploration), while
//! training-player nodes expand every action and accumulate
//! opponent-reach-weighted counterfactual regrets.
//!
//! The learner plays the current regret-matching iterate; it keeps no
//! time-averaged policy. Frozen snapshots therefore capture the current
//! iterate, not the historical average.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::cfr::checkpoint::{self, CheckpointError};
use crate::cfr::config::{LearnerConfig, TrainStats};
use crate::cfr::game::Game;
use crate::cfr::player::{FrozenPlayer, FrozenStrategy};
use crate::cfr::table::{regret_match, sample_index, RegretTable};

/// External-sampling CFR learner over a game prototype.
pub struct CfrLearner<G: Game> {
    game: G,
    config: LearnerConfig,
    table: RegretTable,
    pool: rayon::ThreadPool,
    iterations: u64,
    base_seed: u64,
}

impl<G: Game> CfrLearner<G> {
    /// Create a learner for `game`.
    ///
    /// Panics if the configuration is invalid or the worker pool cannot be
    /// built.
    pub fn new(game: G, config: LearnerConfig) -> Self {
        config.validate().expect("invalid learner configuration");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .build()
            .expect("failed to build training thread pool");
        let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self {
            game,
            config,
            table: RegretTable::new(),
            pool,
            iterations: 0,
            base_seed,
        }
    }

    /// Short stable name of this learner kind, used in checkpoint filenames.
    pub fn name(&self) -> &'static str {
        "cfr"
    }

    /// The game prototype being trained on.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// The active configuration.
    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Total training iterations completed over the learner's lifetime.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Number of information sets discovered so far.
    pub fn num_info_sets(&self) -> usize {
        self.table.len()
    }

    /// Current regret-matching strategy at an infoset, uniform if the
    /// learner has not visited it. Read-only: never inserts.
    pub fn strategy(&self, info_key: &str, num_actions: usize) -> Vec<f64> {
        match self.table.regrets(info_key) {
            Some(regrets) if regrets.len() == num_actions => regret_match(&regrets),
            _ => vec![1.0 / num_actions as f64; num_actions],
        }
    }

    /// Run `iterations` training iterations on the worker pool.
    ///
    /// Iteration `i` (counted over the learner's lifetime) trains player
    /// `i % 2`; the other player's actions are sampled. Each worker seeds its
    /// own RNG and deals its own copy of the game, so the only shared state
    /// is the regret table.
    pub fn train(&mut self, iterations: u64) -> TrainStats {
        let start = Instant::now();
        let first = self.iterations;
        let completed = AtomicU64::new(first);

        let this = &*self;
        this.pool.install(|| {
            (0..iterations).into_par_iter().for_each(|offset| {
                let iteration = first + offset;
                let mut rng = StdRng::seed_from_u64(this.base_seed.wrapping_add(iteration));
                let trainee = (iteration % this.game.num_players() as u64) as usize;

                let state = this.game.deal(&mut rng);
                this.traverse(state, [1.0, 1.0], trainee, &mut rng);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if this.config.progress_every > 0 && done % this.config.progress_every == 0 {
                    info!(
                        "{}: iteration {} ({} infosets)",
                        this.game.name(),
                        done,
                        this.table.len()
                    );
                }
            });
        });

        self.iterations += iterations;
        let elapsed = start.elapsed().as_secs_f64();
        TrainStats {
            iterations: self.iterations,
            info_sets: self.table.len(),
            elapsed_seconds: elapsed,
            iterations_per_second: if elapsed > 0.0 {
                iterations as f64 / elapsed
            } else {
                0.0
            },
        }
    }

    /// One recursive external-sampling traversal.
    ///
    /// Returns the expected payoff pair of the subtree under current play.
    /// `reach` tracks each player's own-action probability along the path;
    /// sampled opponent moves and forced single actions do not change it.
    fn traverse<R: Rng>(
        &self,
        mut state: G::State,
        reach: [f64; 2],
        trainee: usize,
        rng: &mut R,
    ) -> [f64; 2] {
        let (player, actions) = loop {
            if self.game.is_terminal(&state) {
                return self.game.payouts(&state);
            }

            let player = self.game.player_to_act(&state);
            let actions = self.game.legal_actions(&state);
            debug_assert!(!actions.is_empty(), "non-terminal state with no actions");

            if player != trainee {
                let info_key = self.game.info_key(&state);
                let strategy = self.table.strategy(&info_key, actions.len());
                let index = if rng.gen::<f64>() < self.config.exploration {
                    rng.gen_range(0..actions.len())
                } else {
                    sample_index(&strategy, rng)
                };
                state = self.game.apply(&state, &actions[index]);
                continue;
            }

            if actions.len() == 1 {
                state = self.game.apply(&state, &actions[0]);
                continue;
            }

            break (player, actions);
        };

        let info_key = self.game.info_key(&state);
        let strategy = self.table.strategy(&info_key, actions.len());

        let mut node_util = [0.0f64; 2];
        let mut action_utils = vec![[0.0f64; 2]; actions.len()];
        for (i, action) in actions.iter().enumerate() {
            let child = self.game.apply(&state, action);
            let mut child_reach = reach;
            child_reach[player] *= strategy[i];
            let util = self.traverse(child, child_reach, trainee, rng);
            action_utils[i] = util;
            for (j, u) in util.iter().enumerate() {
                node_util[j] += strategy[i] * u;
            }
        }

        // Counterfactual weight: the product of the other players' reach
        // probabilities along the path.
        let weight = reach[1 - player];
        let deltas: Vec<f64> = action_utils
            .iter()
            .map(|util| weight * (util[player] - node_util[player]))
            .collect();
        self.table.apply_regrets(&info_key, &deltas);

        node_util
    }

    /// Snapshot the current iterate as an immutable player.
    pub fn freeze(&self) -> FrozenPlayer {
        FrozenPlayer::new(FrozenStrategy::new(self.table.snapshot()))
    }

    /// Write the regret table to `path` in the chunked checkpoint format.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        checkpoint::save(path, &self.table)
    }

    /// Replace the regret table with the checkpoint at `path`.
    ///
    /// On any load failure the table is left empty, a single warning is
    /// logged, and the error is returned; callers continue from scratch.
    pub fn load(&mut self, path: &Path) -> Result<(), CheckpointError> {
        match checkpoint::load(path) {
            Ok(entries) => {
                self.table.clear();
                for (key, regrets) in entries {
                    self.table.restore(key, regrets);
                }
                info!(
                    "{}: loaded {} infosets from {}",
                    self.game.name(),
                    self.table.len(),
                    path.display()
                );
                Ok(())
            }
            Err(e) => {
                warn!("could not load checkpoint {}: {}", path.display(), e);
                self.table.clear();
                Err(e)
            }
        }
    }

    pub(crate) fn table(&self) -> &RegretTable {
        &self.table
    }
}
