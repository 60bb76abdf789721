//! Configuration for the learner and the trainer loop, plus training stats.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for [`CfrLearner`](crate::cfr::learner::CfrLearner).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Probability of replacing an opponent's sampled action with a uniform
    /// one during traversal.
    pub exploration: f64,

    /// Maximum number of worker threads training in parallel.
    pub parallelism: usize,

    /// Emit a progress log line every this many completed iterations.
    /// Zero disables progress logging.
    pub progress_every: u64,

    /// Base seed for the per-iteration worker RNGs. `None` seeds from
    /// entropy, making runs non-reproducible.
    pub seed: Option<u64>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            exploration: 0.05,
            parallelism: 32,
            progress_every: 100_000,
            seed: None,
        }
    }
}

impl LearnerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the exploration probability, clamped to [0, 1].
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration.clamp(0.0, 1.0);
        self
    }

    /// Builder method: set the worker-thread bound.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Builder method: set the progress-log cadence.
    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every;
        self
    }

    /// Builder method: set the base RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Ok(())
    }
}

/// Configuration for the [`Trainer`](crate::cfr::trainer::Trainer) loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Iterations per training step; the table is saved and re-frozen after
    /// each step.
    pub iterations_per_save: u64,

    /// Total iterations before the loop stops.
    pub max_iterations: u64,

    /// Complete games sampled per matchup when evaluating a snapshot.
    pub eval_hands: u32,

    /// Checkpoint path override. `None` derives a filename from the game
    /// and learner names in the working directory.
    pub checkpoint: Option<PathBuf>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            iterations_per_save: 100_000,
            max_iterations: 1_000_000,
            eval_hands: 10_000,
            checkpoint: None,
        }
    }
}

impl TrainerConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the step size between saves.
    pub fn with_iterations_per_save(mut self, iterations: u64) -> Self {
        self.iterations_per_save = iterations;
        self
    }

    /// Builder method: set the iteration budget.
    pub fn with_max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Builder method: set the number of evaluation games per matchup.
    pub fn with_eval_hands(mut self, hands: u32) -> Self {
        self.eval_hands = hands;
        self
    }

    /// Builder method: set an explicit checkpoint path.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations_per_save == 0 {
            return Err(ConfigError::ZeroStepSize);
        }
        Ok(())
    }
}

/// Errors from validating a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Exploration probability outside [0, 1].
    #[error("exploration probability {0} is out of range [0, 1]")]
    InvalidExploration(f64),

    /// Parallelism of zero would never run a worker.
    #[error("parallelism must be at least 1")]
    ZeroParallelism,

    /// A zero step size would make the trainer loop forever.
    #[error("iterations per save must be at least 1")]
    ZeroStepSize,
}

/// Statistics from a training call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainStats {
    /// Total iterations completed over the learner's lifetime.
    pub iterations: u64,

    /// Unique information sets discovered so far.
    pub info_sets: usize,

    /// Wall-clock seconds spent in the last training call.
    pub elapsed_seconds: f64,

    /// Iteration throughput of the last training call.
    pub iterations_per_second: f64,
}
