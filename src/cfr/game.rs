//! Game trait definition for the CFR learner.
//!
//! Any two-player zero-sum game that implements the `Game` trait can be
//! trained with the learner in this crate. The trait is a deliberately small
//! capability set: deal, query, act, terminal test, payout, information key.
//! Dealing private information is folded into [`Game::deal`]; there are no
//! separate chance nodes.

use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

/// Trait for actions a player can take.
///
/// Actions are opaque per-game symbols. The learner only needs equality (to
/// index regret vectors) and a stable string rendering for logs and tests.
pub trait Action: Copy + Eq + Hash + Debug + Send + Sync {
    /// Stable, human-readable name for this action.
    fn name(&self) -> String;
}

/// The game contract consumed by the learner and the evaluators.
///
/// A `Game` value is an immutable prototype describing the rules; all mutable
/// information lives in `Game::State`. States are plain values: cloning one
/// is the deep copy the training workers rely on, and [`Game::apply`] returns
/// a fresh state rather than mutating its input, so a shared prototype is
/// never written to.
///
/// # Contract
///
/// - `legal_actions` is deterministic in the state and empty iff the state is
///   terminal.
/// - `payouts` returns a zero-sum pair and must only be called on terminal
///   states.
/// - `info_key` is a total function of everything the acting player knows:
///   two states the acting player cannot distinguish must produce the same
///   key, and keys never contain tabs or newlines (the checkpoint format is
///   line- and tab-delimited).
///
/// Calling `apply` on a terminal state, `apply` with an illegal action, or
/// `payouts` on a non-terminal state is a programmer error and panics.
pub trait Game: Clone + Send + Sync {
    /// Complete game state, including both players' private information.
    type State: Clone + Debug + Send + Sync;

    /// Action type for this game.
    type Action: Action;

    /// Short stable name, used to derive checkpoint filenames.
    fn name(&self) -> &'static str;

    /// Deal a fresh game: private information randomized, empty history,
    /// player 0 to act.
    fn deal<R: Rng>(&self, rng: &mut R) -> Self::State;

    /// Number of players. The training strategy in this crate assumes two.
    fn num_players(&self) -> usize {
        2
    }

    /// Index of the player to act. Panics on terminal states.
    fn player_to_act(&self, state: &Self::State) -> usize;

    /// Ordered, deterministic list of legal actions. Empty iff terminal.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action, returning the successor state.
    ///
    /// Panics if the state is terminal or the action is not legal.
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Whether the game has ended.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Zero-sum payoff pair `[p0, p1]`. Panics on non-terminal states.
    fn payouts(&self, state: &Self::State) -> [f64; 2];

    /// Information-set key for the acting player.
    ///
    /// The learner treats the key as an opaque string; it must be stable
    /// across runs so checkpoints stay compatible.
    fn info_key(&self, state: &Self::State) -> String;
}
