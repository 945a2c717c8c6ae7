//! Game tuning and rule parameters
//!
//! Every field defaults to the matching constant in [`crate::consts`]. A tuning
//! file is plain JSON; missing fields fall back to defaults.

use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Physics and timing parameters for a single die
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceTuning {
    /// Gravity magnitude (always pulls against `WORLD_UP`)
    pub gravity: f32,
    /// Launch elevation in degrees
    pub launch_angle_deg: f32,
    /// Multiplier applied to the solved launch speed
    pub roll_force: f32,
    /// Per-axis velocity jitter bound
    pub roll_force_randomness: f32,
    /// Per-axis torque impulse bound
    pub roll_torque: f32,
    /// Time in flight before the face is read
    pub settle_time: f32,
    /// Duration of kinematic moves (to launch, back to idle)
    pub move_lerp_duration: f32,
    /// Pause at the launch point before the throw
    pub launch_pause: f32,
    pub collision_cooldown: f32,
    pub min_collision_velocity: f32,
    pub half_extent: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl Default for DiceTuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            launch_angle_deg: LAUNCH_ANGLE_DEG,
            roll_force: ROLL_FORCE,
            roll_force_randomness: ROLL_FORCE_RANDOMNESS,
            roll_torque: ROLL_TORQUE,
            settle_time: SETTLE_TIME,
            move_lerp_duration: MOVE_LERP_DURATION,
            launch_pause: LAUNCH_PAUSE,
            collision_cooldown: COLLISION_COOLDOWN,
            min_collision_velocity: MIN_COLLISION_VELOCITY,
            half_extent: DIE_HALF_EXTENT,
            restitution: DIE_RESTITUTION,
            friction: DIE_FRICTION,
        }
    }
}

impl DiceTuning {
    /// Launch angle in radians
    pub fn launch_angle(&self) -> f32 {
        self.launch_angle_deg.to_radians()
    }
}

/// Wagering and pacing rules for the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    pub player_starting_money: u32,
    pub house_starting_money: u32,
    pub small_bet: u32,
    pub large_bet: u32,
    /// House pays `bet + round(bet * win_multiplier)` when it busts
    pub win_multiplier: f32,
    pub bust_limit: u32,
    /// Delay before each house roll
    pub auto_roll_delay: f32,
    /// Delay between a resolved round and the next betting phase
    pub new_round_delay: f32,
    pub autopilot_stand_at: u32,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            player_starting_money: STARTING_MONEY,
            house_starting_money: STARTING_MONEY,
            small_bet: SMALL_BET,
            large_bet: LARGE_BET,
            win_multiplier: WIN_MULTIPLIER,
            bust_limit: BUST_LIMIT,
            auto_roll_delay: AUTO_ROLL_DELAY,
            new_round_delay: NEW_ROUND_DELAY,
            autopilot_stand_at: AUTOPILOT_STAND_AT,
        }
    }
}

impl TableRules {
    /// Cheapest bet a player must be able to afford to keep playing
    pub fn smallest_bet(&self) -> u32 {
        self.small_bet.min(self.large_bet)
    }
}

/// Placement of the target zone plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneTuning {
    /// Enables aiming at the zone; without it dice aim at the world origin
    pub enabled: bool,
    pub origin: Vec3,
    /// Maps the zone's local XY plane into the world
    pub rotation: Quat,
    pub width: f32,
    pub height: f32,
}

impl Default for ZoneTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            origin: Vec3::new(0.0, FLOOR_HEIGHT, 0.0),
            // Lay the local XY plane flat on the table
            rotation: Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            width: TARGET_ZONE_WIDTH,
            height: TARGET_ZONE_HEIGHT,
        }
    }
}

/// Rest and launch positions for the shared pair of dice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiceLayout {
    pub idle: [Vec3; 2],
    pub player_launch: [Vec3; 2],
    pub house_launch: [Vec3; 2],
}

impl Default for DiceLayout {
    fn default() -> Self {
        let rest = FLOOR_HEIGHT + DIE_HALF_EXTENT;
        Self {
            idle: [Vec3::new(-3.0, rest, 0.4), Vec3::new(-3.0, rest, -0.4)],
            player_launch: [Vec3::new(-0.4, 1.0, -2.5), Vec3::new(0.4, 1.0, -2.5)],
            house_launch: [Vec3::new(-0.4, 1.0, 2.5), Vec3::new(0.4, 1.0, 2.5)],
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub dice: DiceTuning,
    pub rules: TableRules,
    pub zone: ZoneTuning,
    pub layout: DiceLayout,
}

impl Tuning {
    /// Parse tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for writing a starting tuning file)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let tuning = Tuning::default();
        assert_eq!(tuning.rules.small_bet, SMALL_BET);
        assert_eq!(tuning.rules.large_bet, LARGE_BET);
        assert_eq!(tuning.rules.bust_limit, 21);
        assert!((tuning.dice.launch_angle() - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let tuning = Tuning::from_json(r#"{ "rules": { "small_bet": 10 } }"#).unwrap();
        assert_eq!(tuning.rules.small_bet, 10);
        assert_eq!(tuning.rules.large_bet, LARGE_BET);
        assert_eq!(tuning.dice, DiceTuning::default());
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_smallest_bet() {
        let rules = TableRules {
            small_bet: 300,
            large_bet: 100,
            ..Default::default()
        };
        assert_eq!(rules.smallest_bet(), 100);
    }
}
