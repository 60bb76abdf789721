//! Thirteen-card single-bet poker with a raise.
//!
//! A Kuhn-style game scaled to a full 13-rank deck:
//!
//! - Deck of 13 distinct ranks, deuce (2) through ace (14). Each player is
//!   dealt one card without replacement and antes 1.
//! - Player 0 may BET or CHECK. After a CHECK the second player faces the
//!   same choice; a second CHECK in a row ends the hand at showdown.
//! - Facing a BET, a player may CALLBET (showdown), FOLD, or RAISE.
//! - Facing a RAISE, a player may CALLRAISE (showdown) or FOLD.
//! - BET adds 1 to the actor's pot contribution, RAISE adds 3, CALLBET adds
//!   1, CALLRAISE adds 2.
//!
//! The winner takes the pot: their payout is the pot minus their own
//! contribution, the loser's is minus their contribution.

use rand::Rng;

use crate::cfr::game::{Action, Game};

/// Highest rank in the deck (ace).
pub const MAX_RANK: u8 = 14;
/// Lowest rank in the deck (deuce).
pub const MIN_RANK: u8 = 2;

/// Actions in 13-card poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Open the betting for 1.
    Bet,
    /// Decline to bet; two checks in a row go to showdown.
    Check,
    /// Call an outstanding bet for 1 and go to showdown.
    CallBet,
    /// Concede the pot.
    Fold,
    /// Raise an outstanding bet by 3.
    Raise,
    /// Call an outstanding raise for 2 and go to showdown.
    CallRaise,
}

impl KuhnAction {
    /// One-letter code used in information-set keys.
    fn letter(&self) -> char {
        match self {
            KuhnAction::Bet => 'b',
            KuhnAction::Check => 'x',
            KuhnAction::CallBet => 'c',
            KuhnAction::Fold => 'f',
            KuhnAction::Raise => 'r',
            KuhnAction::CallRaise => 'a',
        }
    }
}

impl Action for KuhnAction {
    fn name(&self) -> String {
        match self {
            KuhnAction::Bet => "BET",
            KuhnAction::Check => "CHECK",
            KuhnAction::CallBet => "CALLBET",
            KuhnAction::Fold => "FOLD",
            KuhnAction::Raise => "RAISE",
            KuhnAction::CallRaise => "CALLRAISE",
        }
        .to_string()
    }
}

/// Complete state of one 13-card poker hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kuhn13State {
    /// Private card per player, ranks 2..=14.
    pub cards: [u8; 2],
    /// Public action history.
    pub history: Vec<KuhnAction>,
    /// Pot contribution per player, antes included.
    pub pot: [i32; 2],
    /// Seat to act while the hand is live.
    pub to_act: usize,
    /// Winning seat once the hand has ended.
    pub winner: Option<usize>,
}

/// The 13-card poker game.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kuhn13;

impl Kuhn13 {
    /// Create the game.
    pub fn new() -> Self {
        Self
    }

    fn showdown_winner(state: &Kuhn13State) -> usize {
        // Cards are dealt without replacement, so never equal.
        if state.cards[0] > state.cards[1] {
            0
        } else {
            1
        }
    }
}

impl Game for Kuhn13 {
    type State = Kuhn13State;
    type Action = KuhnAction;

    fn name(&self) -> &'static str {
        "kuhn13"
    }

    fn deal<R: Rng>(&self, rng: &mut R) -> Self::State {
        let mut deck: Vec<u8> = (MIN_RANK..=MAX_RANK).collect();
        // Partial Fisher-Yates: only the first two positions are used.
        for i in 0..2 {
            let j = rng.gen_range(i..deck.len());
            deck.swap(i, j);
        }
        Kuhn13State {
            cards: [deck[0], deck[1]],
            history: Vec::new(),
            pot: [1, 1],
            to_act: 0,
            winner: None,
        }
    }

    fn player_to_act(&self, state: &Self::State) -> usize {
        assert!(!self.is_terminal(state), "no player to act in a finished hand");
        state.to_act
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        match state.history.last() {
            // Opening decision, or the second player after a lone check.
            None | Some(KuhnAction::Check) => vec![KuhnAction::Bet, KuhnAction::Check],
            Some(KuhnAction::Bet) => {
                vec![KuhnAction::CallBet, KuhnAction::Fold, KuhnAction::Raise]
            }
            Some(KuhnAction::Raise) => vec![KuhnAction::CallRaise, KuhnAction::Fold],
            Some(last) => unreachable!("live hand after terminal action {:?}", last),
        }
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        assert!(!self.is_terminal(state), "move in a finished hand");
        assert!(
            self.legal_actions(state).contains(action),
            "illegal action {:?} after {:?}",
            action,
            state.history
        );

        let actor = state.to_act;
        let mut next = state.clone();
        next.history.push(*action);
        match action {
            KuhnAction::Bet => {
                next.pot[actor] += 1;
                next.to_act = 1 - actor;
            }
            KuhnAction::Check => {
                if state.history.last() == Some(&KuhnAction::Check) {
                    next.winner = Some(Self::showdown_winner(&next));
                } else {
                    next.to_act = 1 - actor;
                }
            }
            KuhnAction::CallBet => {
                next.pot[actor] += 1;
                next.winner = Some(Self::showdown_winner(&next));
            }
            KuhnAction::CallRaise => {
                next.pot[actor] += 2;
                next.winner = Some(Self::showdown_winner(&next));
            }
            KuhnAction::Raise => {
                next.pot[actor] += 3;
                next.to_act = 1 - actor;
            }
            KuhnAction::Fold => {
                next.winner = Some(1 - actor);
            }
        }
        next
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.winner.is_some()
    }

    fn payouts(&self, state: &Self::State) -> [f64; 2] {
        let winner = state.winner.expect("payout on a live hand");
        let total = state.pot[0] + state.pot[1];
        let mut payouts = [0.0; 2];
        payouts[winner] = f64::from(total - state.pot[winner]);
        payouts[1 - winner] = f64::from(-state.pot[1 - winner]);
        payouts
    }

    fn info_key(&self, state: &Self::State) -> String {
        let mut key = format!("{}:", state.cards[state.to_act]);
        for action in &state.history {
            key.push(action.letter());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::cfr::config::LearnerConfig;
    use crate::cfr::learner::CfrLearner;
    use crate::cfr::player::{Player, RandomPlayer};
    use crate::cfr::trainer::play_match;

    fn dealt(p0: u8, p1: u8) -> Kuhn13State {
        Kuhn13State {
            cards: [p0, p1],
            history: Vec::new(),
            pot: [1, 1],
            to_act: 0,
            winner: None,
        }
    }

    fn play(game: &Kuhn13, start: Kuhn13State, actions: &[KuhnAction]) -> Kuhn13State {
        actions
            .iter()
            .fold(start, |state, action| game.apply(&state, action))
    }

    #[test]
    fn check_check_goes_to_showdown() {
        let game = Kuhn13::new();
        let state = play(&game, dealt(14, 2), &[KuhnAction::Check, KuhnAction::Check]);
        assert!(game.is_terminal(&state));
        assert_eq!(game.payouts(&state), [1.0, -1.0]);
    }

    #[test]
    fn bet_call_pays_the_pot_to_the_better_card() {
        let game = Kuhn13::new();
        let state = play(&game, dealt(2, 14), &[KuhnAction::Bet, KuhnAction::CallBet]);
        assert!(game.is_terminal(&state));
        assert_eq!(state.pot, [2, 2]);
        assert_eq!(game.payouts(&state), [-2.0, 2.0]);
    }

    #[test]
    fn bet_raise_call_builds_a_four_chip_pot() {
        let game = Kuhn13::new();
        let state = play(
            &game,
            dealt(13, 12),
            &[KuhnAction::Bet, KuhnAction::Raise, KuhnAction::CallRaise],
        );
        assert!(game.is_terminal(&state));
        assert_eq!(state.pot, [4, 4]);
        assert_eq!(game.payouts(&state), [4.0, -4.0]);
    }

    #[test]
    fn folding_to_a_bet_after_checking_concedes_the_antes() {
        // Check, bet, fold: the third action belongs to seat 0, so seat 0
        // is the folder and seat 1 collects the pot.
        let game = Kuhn13::new();
        let state = play(
            &game,
            dealt(12, 13),
            &[KuhnAction::Check, KuhnAction::Bet, KuhnAction::Fold],
        );
        assert!(game.is_terminal(&state));
        assert_eq!(state.pot, [1, 2]);
        assert_eq!(state.winner, Some(1));
        assert_eq!(game.payouts(&state), [-1.0, 1.0]);
    }

    #[test]
    fn legality_follows_the_last_public_action() {
        let game = Kuhn13::new();
        let start = dealt(10, 4);

        assert_eq!(
            game.legal_actions(&start),
            vec![KuhnAction::Bet, KuhnAction::Check]
        );
        let checked = game.apply(&start, &KuhnAction::Check);
        assert_eq!(
            game.legal_actions(&checked),
            vec![KuhnAction::Bet, KuhnAction::Check]
        );
        let bet = game.apply(&start, &KuhnAction::Bet);
        assert_eq!(
            game.legal_actions(&bet),
            vec![KuhnAction::CallBet, KuhnAction::Fold, KuhnAction::Raise]
        );
        let raised = game.apply(&bet, &KuhnAction::Raise);
        assert_eq!(
            game.legal_actions(&raised),
            vec![KuhnAction::CallRaise, KuhnAction::Fold]
        );

        let folded = game.apply(&raised, &KuhnAction::Fold);
        assert!(game.legal_actions(&folded).is_empty());
    }

    #[test]
    #[should_panic(expected = "illegal action")]
    fn raising_without_a_bet_panics() {
        let game = Kuhn13::new();
        game.apply(&dealt(10, 4), &KuhnAction::Raise);
    }

    #[test]
    #[should_panic(expected = "finished hand")]
    fn moving_in_a_finished_hand_panics() {
        let game = Kuhn13::new();
        let state = play(&game, dealt(14, 2), &[KuhnAction::Check, KuhnAction::Check]);
        game.apply(&state, &KuhnAction::Check);
    }

    #[test]
    fn actions_are_deterministic_across_clones() {
        let game = Kuhn13::new();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let mut state = game.deal(&mut rng);
            while !game.is_terminal(&state) {
                assert_eq!(game.legal_actions(&state), game.legal_actions(&state.clone()));
                let actions = game.legal_actions(&state);
                let choice = actions[rng.gen_range(0..actions.len())];
                state = game.apply(&state, &choice);
            }
        }
    }

    #[test]
    fn random_playouts_are_zero_sum_with_clean_info_keys() {
        let game = Kuhn13::new();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..10_000 {
            let mut state = game.deal(&mut rng);
            while !game.is_terminal(&state) {
                let key = game.info_key(&state);
                assert!(!key.contains('\t') && !key.contains('\n'), "dirty key {:?}", key);
                let actions = game.legal_actions(&state);
                let choice = actions[rng.gen_range(0..actions.len())];
                state = game.apply(&state, &choice);
            }
            let payouts = game.payouts(&state);
            assert_eq!(payouts[0] + payouts[1], 0.0);
        }
    }

    #[test]
    fn info_keys_separate_exactly_what_the_actor_knows() {
        use std::collections::HashMap;

        let game = Kuhn13::new();
        let histories: [&[KuhnAction]; 6] = [
            &[],
            &[KuhnAction::Check],
            &[KuhnAction::Bet],
            &[KuhnAction::Check, KuhnAction::Bet],
            &[KuhnAction::Bet, KuhnAction::Raise],
            &[KuhnAction::Check, KuhnAction::Bet, KuhnAction::Raise],
        ];

        // Key -> (actor's card, history letters); the key must be a
        // bijection with that pair over every reachable live state.
        let mut seen: HashMap<String, (u8, Vec<KuhnAction>)> = HashMap::new();
        for p0 in MIN_RANK..=MAX_RANK {
            for p1 in MIN_RANK..=MAX_RANK {
                if p0 == p1 {
                    continue;
                }
                for history in histories {
                    let state = play(&game, dealt(p0, p1), history);
                    let known = (state.cards[state.to_act], history.to_vec());
                    let key = game.info_key(&state);
                    match seen.get(&key) {
                        Some(prior) => assert_eq!(prior, &known, "key {:?} collides", key),
                        None => {
                            seen.insert(key, known);
                        }
                    }
                }
            }
        }
        // 13 cards x 6 histories.
        assert_eq!(seen.len(), 13 * 6);
    }

    #[test]
    fn trained_learner_beats_random_from_both_seats() {
        let config = LearnerConfig::default()
            .with_seed(42)
            .with_parallelism(8)
            .with_progress_every(0);
        let mut learner = CfrLearner::new(Kuhn13::new(), config);
        learner.train(150_000);
        let frozen = learner.freeze();

        let game = Kuhn13::new();
        let mut rng = StdRng::seed_from_u64(1234);
        let as_p0 = play_match(&game, &frozen, &RandomPlayer, 10_000, &mut rng);
        let as_p1 = play_match(&game, &RandomPlayer, &frozen, 10_000, &mut rng);
        assert!(as_p0 > 0.2, "seat-0 edge over random too small: {}", as_p0);
        assert!(-as_p1 > 0.2, "seat-1 edge over random too small: {}", -as_p1);
    }

    #[test]
    fn self_play_value_is_near_zero() {
        let config = LearnerConfig::default()
            .with_seed(42)
            .with_parallelism(8)
            .with_progress_every(0);
        let mut learner = CfrLearner::new(Kuhn13::new(), config);
        learner.train(150_000);
        let frozen = learner.freeze();

        let game = Kuhn13::new();
        let mut rng = StdRng::seed_from_u64(4321);
        let value = play_match(&game, &frozen, &frozen, 10_000, &mut rng);
        assert!(value.abs() < 0.2, "self-play value drifted: {}", value);
    }

    #[test]
    fn frozen_player_only_picks_legal_actions() {
        let config = LearnerConfig::default()
            .with_seed(5)
            .with_parallelism(2)
            .with_progress_every(0);
        let mut learner = CfrLearner::new(Kuhn13::new(), config);
        learner.train(1_000);
        let frozen = learner.freeze();

        let game = Kuhn13::new();
        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..500 {
            let mut state = game.deal(&mut rng);
            while !game.is_terminal(&state) {
                let actions = game.legal_actions(&state);
                let key = game.info_key(&state);
                let choice = frozen.choose(state.to_act, &key, &actions, &mut rng);
                assert!(actions.contains(&choice));
                state = game.apply(&state, &choice);
            }
        }
    }
}
