//! House auto-play policy
//!
//! The house keeps rolling until it matches or beats the player's frozen
//! total, or busts. There is no other strategy.

/// What the house does after a roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseDecision {
    RollAgain,
    Bust,
    /// Matched or beat the target without busting
    Win,
}

/// Decide from the running total
pub fn decide(total: u32, target: u32, bust_limit: u32) -> HouseDecision {
    if total > bust_limit {
        HouseDecision::Bust
    } else if total >= target {
        HouseDecision::Win
    } else {
        HouseDecision::RollAgain
    }
}

/// Paces the house's rolls
#[derive(Debug, Clone, PartialEq)]
pub struct HousePolicy {
    target: u32,
    bust_limit: u32,
    roll_delay: f32,
    /// Seconds until the next roll is due; `None` when no roll is scheduled
    countdown: Option<f32>,
}

impl HousePolicy {
    pub fn new(bust_limit: u32, roll_delay: f32) -> Self {
        Self {
            target: 0,
            bust_limit,
            roll_delay,
            countdown: None,
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Start a house turn against the player's frozen total
    pub fn begin(&mut self, target: u32) {
        self.target = target;
        log::info!("House turn started - must match or beat {}", target);
        self.schedule_roll();
    }

    pub fn schedule_roll(&mut self) {
        self.countdown = Some(self.roll_delay);
    }

    pub fn cancel(&mut self) {
        self.countdown = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.countdown.is_some()
    }

    /// Advance the delay; true exactly once when the scheduled roll is due
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.countdown {
            Some(remaining) if remaining - dt <= 0.0 => {
                self.countdown = None;
                true
            }
            Some(remaining) => {
                self.countdown = Some(remaining - dt);
                false
            }
            None => false,
        }
    }

    /// Decide after a roll, scheduling the next one when needed
    pub fn after_roll(&mut self, total: u32) -> HouseDecision {
        let decision = decide(total, self.target, self.bust_limit);
        match decision {
            HouseDecision::RollAgain => {
                log::info!(
                    "House has {}, needs to match or beat {}. Rolling again...",
                    total,
                    self.target
                );
                self.schedule_roll();
            }
            HouseDecision::Bust => log::info!("House BUST with {}", total),
            HouseDecision::Win => log::info!(
                "House wins with {} (matched or beat player's {})",
                total,
                self.target
            ),
        }
        decision
    }
}
