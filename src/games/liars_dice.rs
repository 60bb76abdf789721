//! Two-player five-dice Liar's Dice.
//!
//! Each player rolls five dice and hides them. Players alternate making
//! bids `(count, face)` claiming that at least `count` dice of `face` are
//! showing across both hands; every bid must be strictly greater than the
//! previous one in `(count, face)` order. Once a bid is on the table the
//! acting player may instead end the game:
//!
//! - CHALLENGE claims the bid is not met. The bidder wins if the actual
//!   count reaches the bid, otherwise the challenger wins.
//! - SPOT_ON claims the bid is met exactly. The caller wins on an exact
//!   match, otherwise the bidder wins.
//!
//! After 20 bids only CHALLENGE and SPOT_ON remain. When a standing bid
//! cannot possibly be truthful given the actor's own dice, the challenge is
//! forced: it is the only legal action.
//!
//! The information set deliberately forgets old bids: players condition on
//! their own hand, a turn-limit marker, and a sliding window of the three
//! most recent bids. The game's own bookkeeping (total bids, standing bid)
//! stays exact.

use std::hash::BuildHasherDefault;
use std::sync::LazyLock;

use dashmap::DashMap;
use rand::Rng;
use rustc_hash::FxHasher;

use crate::cfr::game::{Action, Game};

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Dice rolled by each player.
pub const DICE_PER_PLAYER: usize = 5;

/// Total bids allowed before only the terminal calls remain.
pub const MAX_BIDS: u32 = 20;

/// Bids remembered by the information set, most recent first.
const WINDOW: usize = 3;

// Window codes: bids occupy 1..=36, terminal calls get the two codes above,
// zero marks an empty slot.
const CHALLENGE_CODE: u8 = 37;
const SPOT_ON_CODE: u8 = 38;

/// A claim that at least `count` dice of `face` are showing across both
/// hands. Ordered lexicographically by `(count, face)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bid {
    /// Claimed number of dice, 1..=6.
    pub count: u8,
    /// Claimed face, 1..=6.
    pub face: u8,
}

impl Bid {
    /// Create a bid. Panics outside the 1..=6 ranges.
    pub fn new(count: u8, face: u8) -> Self {
        assert!((1..=6).contains(&count), "bid count {} out of range", count);
        assert!((1..=6).contains(&face), "bid face {} out of range", face);
        Self { count, face }
    }

    fn code(self) -> u8 {
        (self.count - 1) * 6 + self.face
    }

    /// Every bid in ascending `(count, face)` order.
    fn all() -> impl Iterator<Item = Bid> {
        (1..=6).flat_map(|count| (1..=6).map(move |face| Bid { count, face }))
    }
}

/// Actions in Liar's Dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiceAction {
    /// Raise the standing bid.
    Bid(Bid),
    /// Claim the standing bid is not met; ends the game.
    Challenge,
    /// Claim the standing bid is met exactly; ends the game.
    SpotOn,
}

impl DiceAction {
    fn window_code(self) -> u8 {
        match self {
            DiceAction::Bid(bid) => bid.code(),
            DiceAction::Challenge => CHALLENGE_CODE,
            DiceAction::SpotOn => SPOT_ON_CODE,
        }
    }
}

impl Action for DiceAction {
    fn name(&self) -> String {
        match self {
            DiceAction::Bid(bid) => format!("{}x{}", bid.count, bid.face),
            DiceAction::Challenge => "CHALLENGE".to_string(),
            DiceAction::SpotOn => "SPOT_ON".to_string(),
        }
    }
}

/// Process-wide cache of per-face die counts, keyed by (packed hand, face).
///
/// Built lazily on first use and never invalidated: the count is a pure
/// function of its key. `legal_actions` hits this on every pruning check,
/// so recomputing would sit on the traversal hot path. A racing recompute
/// of the same key is benign; both writers store the same value.
static FACE_COUNTS: LazyLock<FxDashMap<(u32, u8), u32>> = LazyLock::new(FxDashMap::default);

/// Dice in the packed `hand` showing `face`.
fn face_count(hand: u32, face: u8) -> u32 {
    if let Some(count) = FACE_COUNTS.get(&(hand, face)) {
        return *count;
    }
    let mut rest = hand;
    let mut count = 0;
    while rest > 0 {
        if rest % 10 == u32::from(face) {
            count += 1;
        }
        rest /= 10;
    }
    FACE_COUNTS.insert((hand, face), count);
    count
}

/// Roll five dice and pack them as descending digits, e.g. {6,6,5,2,1}
/// becomes 66521. The packing is lossless because face order carries no
/// information.
fn roll_hand<R: Rng>(rng: &mut R) -> u32 {
    let mut faces = [0u8; DICE_PER_PLAYER];
    for face in &mut faces {
        *face = rng.gen_range(1..=6);
    }
    faces.sort_unstable_by(|a, b| b.cmp(a));
    faces.iter().fold(0u32, |hand, &f| hand * 10 + u32::from(f))
}

/// Complete state of one Liar's Dice game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiarsDiceState {
    /// Packed hand per player.
    pub hands: [u32; 2],
    /// Exact number of bids made so far.
    pub bids_made: u32,
    /// The standing bid, if any.
    pub last_bid: Option<Bid>,
    /// Sliding window of the three most recent action codes, most recent
    /// first, zero-padded.
    pub window: [u8; WINDOW],
    /// Seat to act while the game is live.
    pub to_act: usize,
    /// Winning seat once the game has ended.
    pub winner: Option<usize>,
}

/// The Liar's Dice game.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiarsDice;

impl LiarsDice {
    /// Create the game.
    pub fn new() -> Self {
        Self
    }

    /// Dice showing `face` across both hands.
    fn actual_count(state: &LiarsDiceState, face: u8) -> u32 {
        face_count(state.hands[0], face) + face_count(state.hands[1], face)
    }

    /// Whether the standing bid cannot possibly be truthful from the
    /// actor's point of view: more dice claimed than the opponent's five
    /// plus the actor's own matching dice.
    fn bid_impossible(state: &LiarsDiceState, bid: Bid) -> bool {
        let own = face_count(state.hands[state.to_act], bid.face);
        u32::from(bid.count) > (DICE_PER_PLAYER as u32) + own
    }
}

impl Game for LiarsDice {
    type State = LiarsDiceState;
    type Action = DiceAction;

    fn name(&self) -> &'static str {
        "liars_dice"
    }

    fn deal<R: Rng>(&self, rng: &mut R) -> Self::State {
        LiarsDiceState {
            hands: [roll_hand(rng), roll_hand(rng)],
            bids_made: 0,
            last_bid: None,
            window: [0; WINDOW],
            to_act: 0,
            winner: None,
        }
    }

    fn player_to_act(&self, state: &Self::State) -> usize {
        assert!(!self.is_terminal(state), "no player to act in a finished game");
        state.to_act
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        if state.bids_made >= MAX_BIDS {
            return vec![DiceAction::Challenge, DiceAction::SpotOn];
        }
        match state.last_bid {
            Some(last) => {
                if Self::bid_impossible(state, last) {
                    // Not a strategic hint: the impossible bid simply makes
                    // every response other than the challenge illegal.
                    return vec![DiceAction::Challenge];
                }
                let mut actions: Vec<DiceAction> = Bid::all()
                    .filter(|bid| *bid > last)
                    .map(DiceAction::Bid)
                    .collect();
                actions.push(DiceAction::Challenge);
                actions.push(DiceAction::SpotOn);
                actions
            }
            None => Bid::all().map(DiceAction::Bid).collect(),
        }
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        assert!(!self.is_terminal(state), "move in a finished game");
        assert!(
            self.legal_actions(state).contains(action),
            "illegal action {:?} on bid {:?}",
            action,
            state.last_bid
        );

        let actor = state.to_act;
        let mut next = state.clone();
        // The window shifts for terminal calls too; resolution reads
        // `last_bid`, which stays exact.
        next.window = [action.window_code(), state.window[0], state.window[1]];

        match action {
            DiceAction::Bid(bid) => {
                next.last_bid = Some(*bid);
                next.bids_made += 1;
                next.to_act = 1 - actor;
            }
            DiceAction::Challenge => {
                let bid = state.last_bid.expect("challenge without a standing bid");
                let actual = Self::actual_count(state, bid.face);
                let bidder = 1 - actor;
                next.winner = Some(if actual >= u32::from(bid.count) {
                    bidder
                } else {
                    actor
                });
            }
            DiceAction::SpotOn => {
                let bid = state.last_bid.expect("spot-on without a standing bid");
                let actual = Self::actual_count(state, bid.face);
                let bidder = 1 - actor;
                next.winner = Some(if actual == u32::from(bid.count) {
                    actor
                } else {
                    bidder
                });
            }
        }
        next
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.winner.is_some()
    }

    fn payouts(&self, state: &Self::State) -> [f64; 2] {
        let winner = state.winner.expect("payout on a live game");
        let mut payouts = [-1.0; 2];
        payouts[winner] = 1.0;
        payouts
    }

    fn info_key(&self, state: &Self::State) -> String {
        format!(
            "{}|{}|{:02},{:02},{:02}",
            state.hands[state.to_act],
            if state.bids_made >= MAX_BIDS { "L" } else { "" },
            state.window[0],
            state.window[1],
            state.window[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::cfr::config::LearnerConfig;
    use crate::cfr::learner::CfrLearner;

    // P0 holds {3,3,2,1,1}, P1 holds {6,5,4,3,2}.
    fn fixed_deal() -> LiarsDiceState {
        LiarsDiceState {
            hands: [33211, 65432],
            bids_made: 0,
            last_bid: None,
            window: [0; WINDOW],
            to_act: 0,
            winner: None,
        }
    }

    #[test]
    fn face_counts_read_packed_hands() {
        assert_eq!(face_count(66521, 6), 2);
        assert_eq!(face_count(66521, 5), 1);
        assert_eq!(face_count(66521, 3), 0);
        assert_eq!(face_count(33211, 1), 2);
        assert_eq!(face_count(33211, 3), 2);
        // Cached value must agree on a second read.
        assert_eq!(face_count(66521, 6), 2);
    }

    #[test]
    fn rolled_hands_pack_five_descending_digits() {
        let game = LiarsDice::new();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let state = game.deal(&mut rng);
            for hand in state.hands {
                let mut digits = Vec::new();
                let mut rest = hand;
                while rest > 0 {
                    digits.push((rest % 10) as u8);
                    rest /= 10;
                }
                assert_eq!(digits.len(), DICE_PER_PLAYER);
                // Digits come out least-significant first, so they ascend.
                assert!(digits.windows(2).all(|w| w[0] <= w[1]));
                assert!(digits.iter().all(|&d| (1..=6).contains(&d)));
            }
        }
    }

    #[test]
    fn opening_actions_are_all_bids() {
        let game = LiarsDice::new();
        let actions = game.legal_actions(&fixed_deal());
        assert_eq!(actions.len(), 36);
        assert!(actions.iter().all(|a| matches!(a, DiceAction::Bid(_))));
        // Ascending (count, face) order fixes the regret-slot layout.
        assert_eq!(actions[0], DiceAction::Bid(Bid::new(1, 1)));
        assert_eq!(actions[35], DiceAction::Bid(Bid::new(6, 6)));
    }

    #[test]
    fn a_standing_bid_opens_every_strictly_greater_bid_and_both_calls() {
        let game = LiarsDice::new();
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(1, 1)));
        assert_eq!(state.to_act, 1);

        let actions = game.legal_actions(&state);
        assert!(actions.contains(&DiceAction::Challenge));
        assert!(actions.contains(&DiceAction::SpotOn));
        let bids: Vec<Bid> = actions
            .iter()
            .filter_map(|a| match a {
                DiceAction::Bid(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(bids.len(), 35);
        assert!(bids.iter().all(|b| *b > Bid::new(1, 1)));
    }

    #[test]
    fn bid_ordering_is_lexicographic() {
        assert!(Bid::new(1, 6) < Bid::new(2, 1));
        assert!(Bid::new(2, 3) < Bid::new(2, 4));
        assert!(Bid::new(6, 6) > Bid::new(5, 6));
    }

    #[test]
    fn twenty_bids_leave_only_the_terminal_calls() {
        let game = LiarsDice::new();
        let mut state = fixed_deal();
        state.bids_made = MAX_BIDS;
        state.last_bid = Some(Bid::new(6, 6));
        state.window = [36, 35, 34];
        assert_eq!(
            game.legal_actions(&state),
            vec![DiceAction::Challenge, DiceAction::SpotOn]
        );
        assert!(game.info_key(&state).contains("|L|"));
    }

    #[test]
    fn impossible_bid_forces_the_challenge() {
        let game = LiarsDice::new();
        // P1 (hand 65432) holds one 6, so a claim of six 6s is still
        // possible (6 <= 5 + 1) and nothing is forced.
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(6, 6)));
        assert!(game.legal_actions(&state).contains(&DiceAction::SpotOn));

        // P0 (hand 33211) holds no 6s: six 6s exceeds 5 + 0.
        let mut state = fixed_deal();
        state.last_bid = Some(Bid::new(6, 6));
        state.bids_made = 1;
        state.window = [Bid::new(6, 6).code(), 0, 0];
        state.to_act = 0;
        assert_eq!(game.legal_actions(&state), vec![DiceAction::Challenge]);
    }

    #[test]
    fn challenge_resolution_counts_both_hands() {
        let game = LiarsDice::new();
        // Threes across 33211 and 65432: 2 + 1 = 3.
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(3, 3)));

        // Actual (3) >= claimed (3): the bidder P0 wins the challenge.
        let challenged = game.apply(&state, &DiceAction::Challenge);
        assert_eq!(challenged.winner, Some(0));
        assert_eq!(game.payouts(&challenged), [1.0, -1.0]);
        // The terminal call does not switch the acting seat.
        assert_eq!(challenged.to_act, state.to_act);

        // Claim one more than reality and the challenger wins.
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(4, 3)));
        let challenged = game.apply(&state, &DiceAction::Challenge);
        assert_eq!(challenged.winner, Some(1));
        assert_eq!(game.payouts(&challenged), [-1.0, 1.0]);
    }

    #[test]
    fn spot_on_needs_an_exact_count() {
        let game = LiarsDice::new();
        // Exactly three 3s: spot-on caller (P1) wins.
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(3, 3)));
        let called = game.apply(&state, &DiceAction::SpotOn);
        assert_eq!(called.winner, Some(1));

        // Two 2s exist, claiming one: not exact, bidder wins.
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(1, 2)));
        let called = game.apply(&state, &DiceAction::SpotOn);
        assert_eq!(called.winner, Some(0));
    }

    #[test]
    fn window_tracks_the_three_most_recent_actions() {
        let game = LiarsDice::new();
        let mut state = fixed_deal();
        let bids = [Bid::new(1, 1), Bid::new(1, 4), Bid::new(2, 2), Bid::new(3, 1)];
        for bid in bids {
            state = game.apply(&state, &DiceAction::Bid(bid));
        }
        assert_eq!(
            state.window,
            [Bid::new(3, 1).code(), Bid::new(2, 2).code(), Bid::new(1, 4).code()]
        );
        assert_eq!(state.bids_made, 4);
        assert_eq!(state.last_bid, Some(Bid::new(3, 1)));

        // Old bids fall out of the key, but exact bookkeeping remains.
        assert_eq!(game.info_key(&state), "33211||13,08,04");

        // The terminal call shifts the window too.
        let challenged = game.apply(&state, &DiceAction::Challenge);
        assert_eq!(challenged.window[0], CHALLENGE_CODE);
        assert_eq!(challenged.last_bid, Some(Bid::new(3, 1)));
    }

    #[test]
    fn info_key_shows_only_the_actors_hand() {
        let game = LiarsDice::new();
        let p0_key = game.info_key(&fixed_deal());
        assert!(p0_key.starts_with("33211|"));

        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(1, 1)));
        let p1_key = game.info_key(&state);
        assert!(p1_key.starts_with("65432|"));
        assert_ne!(p0_key, p1_key);
    }

    #[test]
    #[should_panic(expected = "illegal action")]
    fn lower_bids_are_rejected() {
        let game = LiarsDice::new();
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(3, 3)));
        game.apply(&state, &DiceAction::Bid(Bid::new(3, 3)));
    }

    #[test]
    #[should_panic(expected = "finished game")]
    fn moving_after_the_challenge_panics() {
        let game = LiarsDice::new();
        let state = game.apply(&fixed_deal(), &DiceAction::Bid(Bid::new(3, 3)));
        let done = game.apply(&state, &DiceAction::Challenge);
        game.apply(&done, &DiceAction::Challenge);
    }

    #[test]
    fn random_playouts_are_zero_sum_with_clean_info_keys() {
        let game = LiarsDice::new();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..2_000 {
            let mut state = game.deal(&mut rng);
            while !game.is_terminal(&state) {
                let key = game.info_key(&state);
                assert!(!key.contains('\t') && !key.contains('\n'), "dirty key {:?}", key);
                let actions = game.legal_actions(&state);
                assert_eq!(actions, game.legal_actions(&state.clone()));
                let choice = actions[rng.gen_range(0..actions.len())];
                state = game.apply(&state, &choice);
            }
            let payouts = game.payouts(&state);
            assert_eq!(payouts[0] + payouts[1], 0.0);
            assert_eq!(payouts[0].abs(), 1.0);
        }
    }

    #[test]
    fn learner_trains_on_liars_dice() {
        let config = LearnerConfig::default()
            .with_seed(99)
            .with_parallelism(8)
            .with_progress_every(0);
        let mut learner = CfrLearner::new(LiarsDice::new(), config);
        let stats = learner.train(100);
        assert_eq!(stats.iterations, 100);
        assert!(stats.info_sets > 0);
    }
}
