//! Fixed timestep simulation tick
//!
//! Turn flow, wagering and pacing. Player inputs arrive as a [`TickInput`];
//! the house and the idle-mode autopilot are driven from inside the tick.

use super::die::DieEvent;
use super::house::HouseDecision;
use super::orchestrator::PairRoll;
use super::state::{
    Actor, BetTier, GameOverReason, GamePhase, MAX_QUEUED_EVENTS, Table, TableEvent, TurnOutcome,
};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Bet button pressed
    pub bet: Option<BetTier>,
    /// Roll button pressed
    pub roll: bool,
    /// Stand button pressed
    pub stand: bool,
    /// Start a fresh session
    pub restart: bool,
    /// Idle/demo mode - AI plays the player's side
    pub idle_mode: bool,
}

/// Advance the table by one fixed timestep
pub fn tick(table: &mut Table, input: &TickInput, dt: f32) {
    table.tick(input, dt);
}

impl Table {
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if input.restart {
            self.restart();
        }

        let mut input = input.clone();
        if input.idle_mode {
            self.autopilot(&mut input);
        }
        let input = &input;

        if let Some(tier) = input.bet {
            self.place_bet(tier);
        }
        if input.roll {
            self.player_roll();
        }
        if input.stand {
            self.player_stand();
        }

        self.time_ticks += 1;

        let mut die_events = Vec::new();
        let finished = self.dice.tick(dt, &mut self.rng, &mut die_events);
        for event in die_events {
            if let DieEvent::Impact { die, speed } = event {
                if self.events.len() < MAX_QUEUED_EVENTS {
                    self.events.push(TableEvent::DieImpact { die, speed });
                }
            }
        }
        if let Some(pair) = finished {
            self.apply_pair_roll(pair);
        }

        if self.phase == GamePhase::HouseTurn
            && self.house_turn.is_ongoing()
            && self.house_policy.tick(dt)
        {
            self.house_roll();
        }

        if let Some(remaining) = self.next_round_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.next_round_in = None;
                self.start_new_round();
            } else {
                self.next_round_in = Some(remaining);
            }
        }
    }

    /// Press the player's buttons: small bets, roll until the stand threshold
    fn autopilot(&self, input: &mut TickInput) {
        match self.phase {
            GamePhase::Betting => input.bet = Some(BetTier::Small),
            GamePhase::PlayerTurn if self.player_turn.is_ongoing() && !self.dice.is_busy() => {
                if self.player_turn.total < self.tuning.rules.autopilot_stand_at {
                    input.roll = true;
                } else {
                    input.stand = true;
                }
            }
            _ => {}
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.events.push(TableEvent::PhaseChanged(phase));
    }

    /// Wager one of the two tiers and start the player's turn
    pub fn place_bet(&mut self, tier: BetTier) -> bool {
        if self.phase != GamePhase::Betting {
            log::warn!("Bet ignored: not in betting phase ({:?})", self.phase);
            return false;
        }

        let amount = tier.amount(&self.tuning.rules);
        match self.player.place_bet(amount) {
            Ok(bet) => {
                self.house.receive_bet(bet);
                self.events.push(TableEvent::BetPlaced { amount: bet });
                self.player_turn.reset();
                self.house_turn.reset();
                self.start_player_turn();
                true
            }
            Err(err) => {
                log::info!("Player cannot place bet: {}", err);
                self.enter_game_over(GameOverReason::PlayerBroke);
                false
            }
        }
    }

    /// Throw both dice for the player
    pub fn player_roll(&mut self) -> bool {
        if self.phase != GamePhase::PlayerTurn || !self.player_turn.is_ongoing() {
            log::warn!("Roll ignored: not the player's turn");
            return false;
        }
        if self.dice.is_busy() {
            log::warn!("Roll ignored: dice already rolling");
            return false;
        }
        self.request_roll(Actor::Player)
    }

    /// Freeze the player's total and hand over to the house
    pub fn player_stand(&mut self) -> bool {
        if self.phase != GamePhase::PlayerTurn || !self.player_turn.is_ongoing() {
            log::warn!("Stand ignored: not the player's turn");
            return false;
        }
        if self.dice.is_busy() {
            log::warn!("Stand ignored: dice still rolling");
            return false;
        }

        self.player_turn.outcome = TurnOutcome::Stood;
        let total = self.player_turn.total;
        log::info!("Player stands with {}", total);
        self.events.push(TableEvent::PlayerStood { total });
        self.dice.refresh_idle_positions();
        self.end_player_turn()
    }

    fn request_roll(&mut self, actor: Actor) -> bool {
        if !self.dice.request_for(actor) {
            return false;
        }
        self.awaiting_roll = Some(actor);
        self.events.push(TableEvent::RollStarted { actor });
        true
    }

    fn house_roll(&mut self) {
        if self.dice.is_busy() {
            // Stale throw still settling
            log::debug!("House roll deferred: dice busy");
            self.house_policy.schedule_roll();
            return;
        }
        self.request_roll(Actor::House);
    }

    fn start_player_turn(&mut self) -> bool {
        if self.phase == GamePhase::PlayerTurn {
            log::warn!("Player turn already started");
            return false;
        }
        log::info!("Player's turn");
        self.set_phase(GamePhase::PlayerTurn);
        true
    }

    fn end_player_turn(&mut self) -> bool {
        if self.phase != GamePhase::PlayerTurn {
            log::warn!("Cannot end player turn from {:?}", self.phase);
            return false;
        }
        if self.processing_turn {
            log::warn!("Turn hand-off already in progress");
            return false;
        }
        self.processing_turn = true;
        let started = self.start_house_turn();
        self.processing_turn = false;
        started
    }

    fn start_house_turn(&mut self) -> bool {
        if self.phase == GamePhase::HouseTurn {
            log::warn!("House turn already started");
            return false;
        }
        self.house_turn.reset();
        self.set_phase(GamePhase::HouseTurn);
        self.house_policy.begin(self.player_turn.total);
        true
    }

    fn end_house_turn(&mut self) -> bool {
        if self.phase != GamePhase::HouseTurn {
            log::warn!("Cannot end house turn from {:?}", self.phase);
            return false;
        }
        if self.processing_turn {
            log::warn!("Turn hand-off already in progress");
            return false;
        }
        self.processing_turn = true;
        self.house_policy.cancel();
        self.dice.refresh_idle_positions();
        self.check_game_over();
        self.processing_turn = false;
        true
    }

    /// Fold a finished pair roll into the turn that asked for it
    pub(crate) fn apply_pair_roll(&mut self, pair: PairRoll) {
        if self.awaiting_roll.take() != Some(pair.actor) {
            log::warn!(
                "Discarding stale {:?} roll {} + {}",
                pair.actor,
                pair.a,
                pair.b
            );
            return;
        }

        match pair.actor {
            Actor::Player => {
                if self.phase != GamePhase::PlayerTurn || !self.player_turn.is_ongoing() {
                    log::warn!("Discarding player roll outside the player's turn");
                    return;
                }
                let total = self.player_turn.add_roll(pair.sum());
                log::info!(
                    "Player rolled {} + {} = {}. Total: {}",
                    pair.a,
                    pair.b,
                    pair.sum(),
                    total
                );
                self.push_resolved(pair, total);

                let bust_limit = self.tuning.rules.bust_limit;
                if total > bust_limit {
                    self.player_bust();
                } else if total == bust_limit {
                    log::info!("Player hit {} - standing automatically", bust_limit);
                    self.player_stand();
                }
            }
            Actor::House => {
                if self.phase != GamePhase::HouseTurn || !self.house_turn.is_ongoing() {
                    log::warn!("Discarding house roll outside the house's turn");
                    return;
                }
                let total = self.house_turn.add_roll(pair.sum());
                log::info!(
                    "House rolled {} + {} = {}. Total: {}",
                    pair.a,
                    pair.b,
                    pair.sum(),
                    total
                );
                self.push_resolved(pair, total);

                match self.house_policy.after_roll(total) {
                    HouseDecision::RollAgain => {}
                    HouseDecision::Bust => self.house_bust(),
                    HouseDecision::Win => self.house_wins(),
                }
            }
        }
    }

    fn push_resolved(&mut self, pair: PairRoll, total: u32) {
        self.events.push(TableEvent::RollResolved {
            actor: pair.actor,
            a: pair.a,
            b: pair.b,
            total,
        });
    }

    /// Player went over the limit: the bet stays with the house
    fn player_bust(&mut self) {
        self.player_turn.outcome = TurnOutcome::Bust;
        let total = self.player_turn.total;
        log::info!(
            "Player BUST with {} - house keeps the bet of {}",
            total,
            self.player.bet()
        );
        self.events.push(TableEvent::PlayerBust { total });
        self.dice.refresh_idle_positions();
        self.check_game_over();
    }

    fn house_wins(&mut self) {
        self.house_turn.outcome = TurnOutcome::Won;
        self.events.push(TableEvent::HouseWon {
            total: self.house_turn.total,
            target: self.house_policy.target(),
        });
        self.end_house_turn();
    }

    /// House went over the limit: it pays the bet back plus winnings
    fn house_bust(&mut self) {
        self.house_turn.outcome = TurnOutcome::Bust;
        let payout = self.house.pay_winnings(self.player.bet());
        self.player.add_money(payout);
        self.events.push(TableEvent::HouseBust {
            total: self.house_turn.total,
            payout,
        });
        self.end_house_turn();
    }

    /// End the session if either side is out of money, otherwise schedule the next round
    fn check_game_over(&mut self) {
        if self.player.balance() < self.tuning.rules.smallest_bet() {
            self.enter_game_over(GameOverReason::PlayerBroke);
        } else if self.house.is_broke() {
            self.enter_game_over(GameOverReason::HouseBroke);
        } else {
            self.next_round_in = Some(self.tuning.rules.new_round_delay);
        }
    }

    fn enter_game_over(&mut self, reason: GameOverReason) {
        if self.phase == GamePhase::GameOver {
            log::warn!("Game already over");
            return;
        }
        match reason {
            GameOverReason::PlayerBroke => {
                log::info!("GAME OVER - player is out of money ({})", self.player.balance())
            }
            GameOverReason::HouseBroke => {
                log::info!("GAME OVER - the house is broke, player wins the session")
            }
        }
        self.house_policy.cancel();
        self.next_round_in = None;
        self.game_over = Some(reason);
        self.set_phase(GamePhase::GameOver);
        self.events.push(TableEvent::GameOver(reason));
    }

    fn start_new_round(&mut self) -> bool {
        if matches!(self.phase, GamePhase::Betting | GamePhase::GameOver) {
            log::warn!("New round ignored in {:?}", self.phase);
            return false;
        }
        let round = self.rounds.count_up();
        self.player_turn.reset();
        self.house_turn.reset();
        self.events.push(TableEvent::RoundChanged(round));
        self.set_phase(GamePhase::Betting);
        true
    }

    /// Fresh session: starting money, round 1, betting phase
    ///
    /// A roll in flight keeps animating; its result is discarded on arrival.
    pub fn restart(&mut self) {
        log::info!("Restarting session");
        self.player.reset();
        self.house.reset();
        self.player_turn.reset();
        self.house_turn.reset();
        self.house_policy.cancel();
        self.awaiting_roll = None;
        self.processing_turn = false;
        self.next_round_in = None;
        self.game_over = None;
        self.rounds.reset();
        if !self.dice.is_busy() {
            self.dice.refresh_idle_positions();
        }
        self.events.push(TableEvent::Restarted);
        self.events.push(TableEvent::RoundChanged(self.rounds.current()));
        self.set_phase(GamePhase::Betting);
    }
}
