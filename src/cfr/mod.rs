//! Core CFR engine.
//!
//! The engine splits into a small set of parts:
//!
//! - [`game`]: the contract every trainable game implements.
//! - [`table`]: the shared concurrent regret table and regret matching.
//! - [`learner`]: parallel external-sampling CFR over a game prototype.
//! - [`player`]: frozen-snapshot and random players for evaluation.
//! - [`checkpoint`]: the chunked on-disk regret format.
//! - [`trainer`]: the train/save/freeze/evaluate driver loop.
//! - [`config`]: learner and trainer knobs plus training stats.
//!
//! Training converges in the sense of regret matching over cumulative
//! positive regrets; the played policy is always derived from the current
//! regrets, so frozen snapshots are the current iterate rather than a
//! time-averaged policy.

pub mod checkpoint;
pub mod config;
pub mod game;
pub mod learner;
pub mod player;
pub mod table;
pub mod trainer;

pub use checkpoint::CheckpointError;
pub use config::{ConfigError, LearnerConfig, TrainStats, TrainerConfig};
pub use game::{Action, Game};
pub use learner::CfrLearner;
pub use player::{FrozenPlayer, FrozenStrategy, Player, RandomPlayer};
pub use table::RegretTable;
pub use trainer::{evaluate, play_match, EvalReport, Trainer};
