//! Croak & Roll - A dice-rolling twenty-one wagering game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (dice physics, roll orchestration, table state machine)
//! - `tuning`: Data-driven game balance and dice physics parameters

pub mod sim;
pub mod tuning;

pub use tuning::{DiceLayout, DiceTuning, TableRules, Tuning, TuningError, ZoneTuning};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World "up" direction (unit vector)
    pub const WORLD_UP: Vec3 = Vec3::Y;
    /// Gravity magnitude (m/s²)
    pub const GRAVITY: f32 = 9.81;
    /// Table surface height
    pub const FLOOR_HEIGHT: f32 = 0.0;

    /// Dice launch defaults
    pub const LAUNCH_ANGLE_DEG: f32 = 45.0;
    pub const ROLL_FORCE: f32 = 1.0;
    pub const ROLL_FORCE_RANDOMNESS: f32 = 0.5;
    pub const ROLL_TORQUE: f32 = 10.0;

    /// Die lifecycle timings (seconds)
    pub const SETTLE_TIME: f32 = 3.0;
    pub const MOVE_LERP_DURATION: f32 = 0.5;
    pub const LAUNCH_PAUSE: f32 = 0.2;

    /// Collision sound gating
    pub const COLLISION_COOLDOWN: f32 = 0.1;
    pub const MIN_COLLISION_VELOCITY: f32 = 0.5;

    /// Die body
    pub const DIE_HALF_EXTENT: f32 = 0.25;
    pub const DIE_RESTITUTION: f32 = 0.35;
    pub const DIE_FRICTION: f32 = 0.6;
    pub const LINEAR_DAMPING: f32 = 0.05;
    pub const ANGULAR_DAMPING: f32 = 0.4;

    /// Target zone (plane dimensions)
    pub const TARGET_ZONE_WIDTH: f32 = 2.0;
    pub const TARGET_ZONE_HEIGHT: f32 = 2.0;

    /// Money rules
    pub const STARTING_MONEY: u32 = 1000;
    pub const SMALL_BET: u32 = 50;
    pub const LARGE_BET: u32 = 200;
    pub const WIN_MULTIPLIER: f32 = 1.5;
    /// Anything above this busts
    pub const BUST_LIMIT: u32 = 21;

    /// Pacing (seconds)
    pub const AUTO_ROLL_DELAY: f32 = 1.0;
    pub const NEW_ROUND_DELAY: f32 = 1.5;

    /// Autopilot player stands once its total reaches this
    pub const AUTOPILOT_STAND_AT: u32 = 16;
}

/// Split a displacement into (horizontal vector, vertical offset) relative to `up`
#[inline]
pub fn split_vertical(displacement: Vec3, up: Vec3) -> (Vec3, f32) {
    let vertical = displacement.dot(up);
    (displacement - up * vertical, vertical)
}

/// Linear interpolation progress for a timed move, clamped to [0, 1]
#[inline]
pub fn lerp_progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}
