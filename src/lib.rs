//! # Bluff Solver
//!
//! A Counterfactual Regret Minimization (CFR) engine for two-player
//! zero-sum games with imperfect information, with two bluffing games as
//! built-in workloads: a 13-card single-bet poker with a raise, and
//! two-player five-dice Liar's Dice.
//!
//! ## Features
//!
//! - **Generic game contract**: any game implementing [`Game`] can be
//!   trained.
//! - **Parallel training**: external-sampling CFR iterations run on a
//!   bounded thread pool against one shared concurrent regret table.
//! - **Frozen snapshots**: freeze the table at any point into an immutable
//!   player for evaluation or play.
//! - **Crash-safe checkpoints**: the regret table saves to chunked text
//!   files and reloads across runs; a corrupt checkpoint is rejected and
//!   training restarts from scratch.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bluff_solver::cfr::{CfrLearner, LearnerConfig, Trainer, TrainerConfig};
//! use bluff_solver::games::Kuhn13;
//!
//! // Train directly...
//! let mut learner = CfrLearner::new(Kuhn13::new(), LearnerConfig::default());
//! let stats = learner.train(100_000);
//! println!("{} infosets after {} iterations", stats.info_sets, stats.iterations);
//! let player = learner.freeze();
//!
//! // ...or drive the full train/save/freeze/evaluate loop.
//! let learner = CfrLearner::new(Kuhn13::new(), LearnerConfig::default());
//! let mut trainer = Trainer::new(learner, TrainerConfig::default());
//! trainer.run().unwrap();
//! # let _ = player;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     Trainer (driver loop)                 │
//! │   train K iterations → save → freeze → evaluate → repeat  │
//! └───────────────────────────────────────────────────────────┘
//!                │                            │
//!                ▼                            ▼
//! ┌──────────────────────────────┐  ┌───────────────────────┐
//! │    CfrLearner (parallel)     │  │ FrozenPlayer / Random │
//! │  workers ──> RegretTable <── │  │   vs game playouts    │
//! └──────────────────────────────┘  └───────────────────────┘
//!                │ implements Game
//!                ▼
//!      ┌─────────┴──────────┐
//!      ▼                    ▼
//! ┌─────────┐         ┌────────────┐
//! │ Kuhn-13 │         │ Liar's Dice│
//! └─────────┘         └────────────┘
//! ```

#![warn(missing_docs)]

pub mod cfr;
pub mod games;

pub use cfr::{
    Action, CfrLearner, CheckpointError, ConfigError, EvalReport, FrozenPlayer, FrozenStrategy,
    Game, LearnerConfig, Player, RandomPlayer, RegretTable, TrainStats, Trainer, TrainerConfig,
};
