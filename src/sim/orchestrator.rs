//! Pair roll orchestration
//!
//! Owns the two shared dice and the target zone. A pair roll triggers both
//! dice together and completes only once the slower of the two is back at
//! rest; the two dice run independent timers.

use std::fmt;

use glam::Vec3;
use rand::Rng;

use super::die::{Die, DieEvent};
use super::state::Actor;
use super::target_zone::TargetZone;
use crate::tuning::{DiceLayout, Tuning};

/// Continuation for a finished pair roll
pub type PairCallback = Box<dyn FnOnce(u8, u8)>;

/// A request to roll both dice
pub struct RollRequest {
    pub actor: Actor,
    pub launch_a: Vec3,
    pub launch_b: Vec3,
    pub on_complete: Option<PairCallback>,
}

impl RollRequest {
    pub fn new(actor: Actor, launch_a: Vec3, launch_b: Vec3) -> Self {
        Self {
            actor,
            launch_a,
            launch_b,
            on_complete: None,
        }
    }

    pub fn on_complete(mut self, callback: impl FnOnce(u8, u8) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for RollRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollRequest")
            .field("actor", &self.actor)
            .field("launch_a", &self.launch_a)
            .field("launch_b", &self.launch_b)
            .field("has_callback", &self.on_complete.is_some())
            .finish()
    }
}

/// Result of a completed pair roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairRoll {
    pub actor: Actor,
    pub a: u8,
    pub b: u8,
}

impl PairRoll {
    pub fn sum(&self) -> u32 {
        self.a as u32 + self.b as u32
    }
}

struct Pending {
    actor: Actor,
    on_complete: Option<PairCallback>,
}

pub struct RollOrchestrator {
    dice: [Die; 2],
    zone: Option<TargetZone>,
    layout: DiceLayout,
    pending: Option<Pending>,
}

impl fmt::Debug for RollOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollOrchestrator")
            .field("dice", &self.dice)
            .field("zone", &self.zone)
            .field("busy", &self.pending.is_some())
            .finish()
    }
}

impl RollOrchestrator {
    /// Spawn both dice at their idle positions
    pub fn new(tuning: &Tuning) -> Self {
        let layout = tuning.layout.clone();
        let mut dice = [
            Die::new(1, layout.idle[0], &tuning.dice),
            Die::new(2, layout.idle[1], &tuning.dice),
        ];
        for die in &mut dice {
            die.place_at_idle();
        }
        let zone = tuning
            .zone
            .enabled
            .then(|| TargetZone::from_tuning(&tuning.zone));

        Self {
            dice,
            zone,
            layout,
            pending: None,
        }
    }

    pub fn dice(&self) -> &[Die; 2] {
        &self.dice
    }

    #[cfg(test)]
    pub(crate) fn dice_mut(&mut self) -> &mut [Die; 2] {
        &mut self.dice
    }

    pub fn zone(&self) -> Option<&TargetZone> {
        self.zone.as_ref()
    }

    /// Replace (or remove) the target zone; without one dice aim at the origin
    pub fn set_zone(&mut self, zone: Option<TargetZone>) {
        self.zone = zone;
    }

    /// Launch points for an actor's throw
    pub fn launch_points(&self, actor: Actor) -> [Vec3; 2] {
        match actor {
            Actor::Player => self.layout.player_launch,
            Actor::House => self.layout.house_launch,
        }
    }

    /// A pair roll is outstanding
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Actor whose pair roll is outstanding
    pub fn pending_actor(&self) -> Option<Actor> {
        self.pending.as_ref().map(|p| p.actor)
    }

    /// Start a pair roll. Rejected while one is outstanding.
    pub fn request_pair_roll(&mut self, request: RollRequest) -> bool {
        if self.pending.is_some() {
            log::warn!(
                "Pair roll for {:?} rejected: a roll is already in flight",
                request.actor
            );
            return false;
        }

        if self.dice.iter().any(Die::is_rolling) {
            log::warn!(
                "Pair roll for {:?} rejected: a die is still rolling",
                request.actor
            );
            return false;
        }

        let [a, b] = &mut self.dice;
        if !(a.roll_from_launch(request.launch_a) && b.roll_from_launch(request.launch_b)) {
            log::warn!("Pair roll for {:?} rejected by a die", request.actor);
            return false;
        }

        log::debug!("Pair roll started for {:?}", request.actor);
        self.pending = Some(Pending {
            actor: request.actor,
            on_complete: request.on_complete,
        });
        true
    }

    /// Convenience: roll from the actor's launch points
    pub fn request_for(&mut self, actor: Actor) -> bool {
        let [launch_a, launch_b] = self.launch_points(actor);
        self.request_pair_roll(RollRequest::new(actor, launch_a, launch_b))
    }

    /// Send idle dice back to their rest positions
    pub fn refresh_idle_positions(&mut self) {
        for die in &mut self.dice {
            die.return_to_idle();
        }
    }

    /// Advance both dice; returns the pair once both are back at rest
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        rng: &mut R,
        events: &mut Vec<DieEvent>,
    ) -> Option<PairRoll> {
        for die in &mut self.dice {
            die.tick(dt, self.zone.as_mut(), rng, events);
        }

        if self.pending.is_none() || self.dice.iter().any(Die::is_rolling) {
            return None;
        }

        let pending = self.pending.take()?;
        let result = PairRoll {
            actor: pending.actor,
            a: self.dice[0].last_value(),
            b: self.dice[1].last_value(),
        };
        log::debug!(
            "Pair roll for {:?} complete: {} + {} = {}",
            result.actor,
            result.a,
            result.b,
            result.sum()
        );
        if let Some(callback) = pending.on_complete {
            callback(result.a, result.b);
        }
        Some(result)
    }
}
