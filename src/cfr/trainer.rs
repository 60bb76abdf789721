//! Training driver: repeatedly train, checkpoint, freeze, and evaluate.
//!
//! The trainer owns a learner and runs it in steps. After every step it
//! saves the regret table, freezes the current iterate, and scores the
//! frozen player against a uniform-random baseline and against the previous
//! snapshot, reporting how much the last step actually helped.

use std::path::{Path, PathBuf};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cfr::checkpoint::CheckpointError;
use crate::cfr::config::TrainerConfig;
use crate::cfr::game::Game;
use crate::cfr::learner::CfrLearner;
use crate::cfr::player::{FrozenPlayer, Player, RandomPlayer};

/// Average seat-0 payoff over `hands` complete games between two players.
pub fn play_match<G, P0, P1, R>(game: &G, p0: &P0, p1: &P1, hands: u32, rng: &mut R) -> f64
where
    G: Game,
    P0: Player<G::Action>,
    P1: Player<G::Action>,
    R: Rng,
{
    let mut total = 0.0;
    for _ in 0..hands {
        let mut state = game.deal(rng);
        while !game.is_terminal(&state) {
            let seat = game.player_to_act(&state);
            let actions = game.legal_actions(&state);
            let info_key = game.info_key(&state);
            let action = if seat == 0 {
                p0.choose(seat, &info_key, &actions, rng)
            } else {
                p1.choose(seat, &info_key, &actions, rng)
            };
            state = game.apply(&state, &action);
        }
        total += game.payouts(&state)[0];
    }
    total / f64::from(hands)
}

/// Sampled evaluation of a frozen snapshot.
///
/// Every field is the average payoff of seat 0 in that matchup, so
/// "as P1" numbers are negative when the snapshot in seat 1 is winning.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Snapshot in seat 0 versus the uniform-random baseline.
    pub vs_random_as_p0: f64,
    /// Uniform-random baseline in seat 0 versus the snapshot.
    pub vs_random_as_p1: f64,
    /// Snapshot against itself; a sanity figure that should hover near the
    /// game's seat-0 value.
    pub self_play: f64,
    /// Snapshot in seat 0 versus the previous snapshot.
    pub vs_previous_as_p0: f64,
    /// Previous snapshot in seat 0 versus the snapshot.
    pub vs_previous_as_p1: f64,
}

impl EvalReport {
    /// How much the newest step helped against the previous snapshot.
    ///
    /// Positive means the current snapshot extracts more from its
    /// predecessor than the predecessor extracts from it.
    pub fn improvement(&self) -> f64 {
        self.vs_previous_as_p0 - self.vs_previous_as_p1
    }
}

/// Score `current` against the random baseline, itself, and `previous`.
pub fn evaluate<G: Game, R: Rng>(
    game: &G,
    current: &FrozenPlayer,
    previous: &FrozenPlayer,
    hands: u32,
    rng: &mut R,
) -> EvalReport {
    let random = RandomPlayer;
    EvalReport {
        vs_random_as_p0: play_match(game, current, &random, hands, rng),
        vs_random_as_p1: play_match(game, &random, current, hands, rng),
        self_play: play_match(game, current, current, hands, rng),
        vs_previous_as_p0: play_match(game, current, previous, hands, rng),
        vs_previous_as_p1: play_match(game, previous, current, hands, rng),
    }
}

/// Drives a learner through train/save/freeze/evaluate steps.
pub struct Trainer<G: Game> {
    learner: CfrLearner<G>,
    config: TrainerConfig,
    path: PathBuf,
}

impl<G: Game> Trainer<G> {
    /// Create a trainer around `learner`.
    ///
    /// The checkpoint path defaults to `"{game}_{learner}.regrets"` in the
    /// working directory unless the configuration overrides it. Panics on an
    /// invalid configuration.
    pub fn new(learner: CfrLearner<G>, config: TrainerConfig) -> Self {
        config.validate().expect("invalid trainer configuration");
        let path = config.checkpoint.clone().unwrap_or_else(|| {
            PathBuf::from(format!("{}_{}.regrets", learner.game().name(), learner.name()))
        });
        Self {
            learner,
            config,
            path,
        }
    }

    /// Where checkpoints are written.
    pub fn checkpoint_path(&self) -> &Path {
        &self.path
    }

    /// The wrapped learner.
    pub fn learner(&self) -> &CfrLearner<G> {
        &self.learner
    }

    /// Consume the trainer, returning the learner.
    pub fn into_learner(self) -> CfrLearner<G> {
        self.learner
    }

    /// Run the full training loop up to the configured iteration budget.
    ///
    /// Resumes from the checkpoint when one exists (an unreadable checkpoint
    /// is logged and discarded, and training starts from an empty table).
    /// Save failures propagate: a partial file on disk is acceptable because
    /// the loader rejects it on the next run.
    pub fn run(&mut self) -> Result<(), CheckpointError> {
        if self.path.exists() {
            // A corrupt checkpoint has already been warned about and
            // cleared by the learner; continue from empty.
            let _ = self.learner.load(&self.path);
        }

        let mut rng = match self.learner.config().seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(0x5eed)),
            None => StdRng::from_entropy(),
        };

        let game = self.learner.game().clone();
        let mut previous = self.learner.freeze();
        let mut remaining = self.config.max_iterations;

        while remaining > 0 {
            let step = self.config.iterations_per_save.min(remaining);
            let stats = self.learner.train(step);
            remaining -= step;

            self.learner.save(&self.path)?;
            let current = self.learner.freeze();

            let report = evaluate(&game, &current, &previous, self.config.eval_hands, &mut rng);
            info!(
                "{}: {} iterations, {} infosets, {:.0} it/s",
                game.name(),
                stats.iterations,
                stats.info_sets,
                stats.iterations_per_second
            );
            info!(
                "{}: vs random {:+.4}/{:+.4}, self-play {:+.4}, vs previous {:+.4}/{:+.4}, improvement {:+.4}",
                game.name(),
                report.vs_random_as_p0,
                report.vs_random_as_p1,
                report.self_play,
                report.vs_previous_as_p0,
                report.vs_previous_as_p1,
                report.improvement()
            );

            previous = current;
        }

        Ok(())
    }
}
