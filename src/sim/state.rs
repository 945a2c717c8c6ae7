//! Table state and core game types
//!
//! Everything the presentation layer reads lives on [`Table`]. Phase changes
//! happen only through the transition functions in `tick.rs`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::economy::{HouseBank, PlayerWallet};
use super::house::HousePolicy;
use super::orchestrator::RollOrchestrator;
use super::round::RoundTracker;
use crate::tuning::{TableRules, Tuning};

/// Undrained notifications beyond which dice impacts are dropped
pub const MAX_QUEUED_EVENTS: usize = 256;

/// Who is acting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Player,
    House,
}

/// Current phase of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to pick a bet
    Betting,
    /// Player rolls or stands
    PlayerTurn,
    /// House auto-plays against the player's total
    HouseTurn,
    /// Session ended; only restart leaves this phase
    GameOver,
}

/// Selectable bet sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetTier {
    Small,
    Large,
}

impl BetTier {
    pub fn amount(&self, rules: &TableRules) -> u32 {
        match self {
            BetTier::Small => rules.small_bet,
            BetTier::Large => rules.large_bet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnOutcome {
    #[default]
    Ongoing,
    Bust,
    Stood,
    Won,
}

/// One participant's turn within a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub owner: Actor,
    /// Sum of every pair rolled this turn
    pub total: u32,
    pub rolls: u32,
    pub outcome: TurnOutcome,
}

impl Turn {
    pub fn new(owner: Actor) -> Self {
        Self {
            owner,
            total: 0,
            rolls: 0,
            outcome: TurnOutcome::Ongoing,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.owner);
    }

    pub fn is_ongoing(&self) -> bool {
        self.outcome == TurnOutcome::Ongoing
    }

    /// Add a pair sum; returns the new total
    pub fn add_roll(&mut self, sum: u32) -> u32 {
        self.total += sum;
        self.rolls += 1;
        self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Player cannot cover the chosen (or smallest) bet
    PlayerBroke,
    /// House has no money left; the player wins the session
    HouseBroke,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableEvent {
    PhaseChanged(GamePhase),
    BetPlaced { amount: u32 },
    RollStarted { actor: Actor },
    DieImpact { die: u32, speed: f32 },
    RollResolved { actor: Actor, a: u8, b: u8, total: u32 },
    PlayerStood { total: u32 },
    PlayerBust { total: u32 },
    HouseWon { total: u32, target: u32 },
    HouseBust { total: u32, payout: u32 },
    RoundChanged(u32),
    GameOver(GameOverReason),
    Restarted,
}

/// The whole game: money, turns, dice and pacing
#[derive(Debug)]
pub struct Table {
    pub(super) tuning: Tuning,
    pub(super) seed: u64,
    pub(super) rng: Pcg32,
    pub(super) phase: GamePhase,
    pub(super) rounds: RoundTracker,
    pub(super) player: PlayerWallet,
    pub(super) house: HouseBank,
    pub(super) player_turn: Turn,
    pub(super) house_turn: Turn,
    pub(super) house_policy: HousePolicy,
    pub(super) dice: RollOrchestrator,
    /// Actor whose requested pair roll the table is waiting on
    pub(super) awaiting_roll: Option<Actor>,
    /// Guards turn hand-offs against re-entry
    pub(super) processing_turn: bool,
    /// Seconds until the next betting phase
    pub(super) next_round_in: Option<f32>,
    pub(super) game_over: Option<GameOverReason>,
    pub(super) events: Vec<TableEvent>,
    pub(super) time_ticks: u64,
}

impl Table {
    /// New table with its own round tracker
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self::with_rounds(tuning, seed, RoundTracker::new())
    }

    /// New table driving a caller-supplied round tracker
    pub fn with_rounds(tuning: Tuning, seed: u64, rounds: RoundTracker) -> Self {
        let rules = &tuning.rules;
        let player = PlayerWallet::new(rules.player_starting_money);
        let house = HouseBank::new(rules.house_starting_money, rules.win_multiplier);
        let house_policy = HousePolicy::new(rules.bust_limit, rules.auto_roll_delay);
        let dice = RollOrchestrator::new(&tuning);

        log::info!("Table opened with seed {}", seed);

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Betting,
            rounds,
            player,
            house,
            player_turn: Turn::new(Actor::Player),
            house_turn: Turn::new(Actor::House),
            house_policy,
            dice,
            awaiting_roll: None,
            processing_turn: false,
            next_round_in: None,
            game_over: None,
            events: Vec::new(),
            time_ticks: 0,
            tuning,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn rules(&self) -> &TableRules {
        &self.tuning.rules
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.rounds.current()
    }

    /// Be told about every round change (including the reset on restart)
    pub fn subscribe_rounds(&mut self, listener: impl FnMut(u32) + 'static) {
        self.rounds.subscribe(listener);
    }

    pub fn player_balance(&self) -> u32 {
        self.player.balance()
    }

    pub fn house_balance(&self) -> u32 {
        self.house.balance()
    }

    /// Bet riding on the current round (0 before the first bet)
    pub fn bet(&self) -> u32 {
        self.player.bet()
    }

    pub fn player_turn(&self) -> &Turn {
        &self.player_turn
    }

    pub fn house_turn(&self) -> &Turn {
        &self.house_turn
    }

    pub fn player_total(&self) -> u32 {
        self.player_turn.total
    }

    pub fn house_total(&self) -> u32 {
        self.house_turn.total
    }

    /// Score of whoever is acting (what the score display shows)
    pub fn turn_total(&self) -> u32 {
        match self.phase {
            GamePhase::PlayerTurn => self.player_turn.total,
            GamePhase::HouseTurn => self.house_turn.total,
            GamePhase::Betting | GamePhase::GameOver => 0,
        }
    }

    /// Player's frozen total while the house plays
    pub fn house_target(&self) -> Option<u32> {
        (self.phase == GamePhase::HouseTurn).then(|| self.house_policy.target())
    }

    pub fn is_roll_in_flight(&self) -> bool {
        self.dice.is_busy()
    }

    /// A round has resolved and the next betting phase is pending
    pub fn is_between_rounds(&self) -> bool {
        self.next_round_in.is_some()
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over
    }

    pub fn dice(&self) -> &RollOrchestrator {
        &self.dice
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Take all notifications produced since the last drain
    ///
    /// Call once per frame. Dice impacts stop queueing once
    /// [`MAX_QUEUED_EVENTS`] notifications are waiting; game events always queue.
    pub fn drain_events(&mut self) -> Vec<TableEvent> {
        std::mem::take(&mut self.events)
    }
}
