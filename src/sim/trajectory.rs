//! Launch trajectory solving
//!
//! Finds the launch velocity that carries a die from a launch point through a
//! target point under constant gravity at a fixed elevation angle.
//!
//! Uses the projectile equation with elevation correction:
//! `y = x·tanθ − g·x² / (2·v²·cos²θ)`, solved for `v`.

use glam::Vec3;
use rand::Rng;

use crate::split_vertical;
use crate::tuning::DiceTuning;

/// Denominators at or below this use the fallback formula
const DENOMINATOR_EPSILON: f32 = 0.001;
/// Lower bound on sin(2θ) in the fallback formula
const MIN_SIN_2THETA: f32 = 0.1;

/// Inputs to the solver (all fixed per throw)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParams {
    pub gravity: f32,
    /// Elevation angle (radians)
    pub angle: f32,
    pub force_multiplier: f32,
    pub up: Vec3,
    /// Per-axis velocity jitter bound
    pub velocity_jitter: f32,
    /// Per-axis torque impulse bound
    pub torque_jitter: f32,
}

impl LaunchParams {
    pub fn from_tuning(tuning: &DiceTuning, up: Vec3) -> Self {
        Self {
            gravity: tuning.gravity.abs(),
            angle: tuning.launch_angle(),
            force_multiplier: tuning.roll_force,
            up,
            velocity_jitter: tuning.roll_force_randomness.abs(),
            torque_jitter: tuning.roll_torque.abs(),
        }
    }
}

/// A planned throw: linear velocity and angular impulse
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub velocity: Vec3,
    pub torque: Vec3,
}

/// Required launch speed (before the force multiplier)
pub fn solve_launch_speed(launch: Vec3, target: Vec3, gravity: f32, angle: f32, up: Vec3) -> f32 {
    let (horizontal, dy) = split_vertical(target - launch, up);
    let d = horizontal.length();

    let cos = angle.cos();
    let numerator = gravity * d * d;
    let denominator = 2.0 * cos * cos * (d * angle.tan() - dy);

    if denominator > DENOMINATOR_EPSILON {
        (numerator / denominator).sqrt()
    } else {
        // Target behind, straight below, or too steep for this angle
        let sin_2theta = (2.0 * angle).sin().max(MIN_SIN_2THETA);
        (d * gravity / sin_2theta).sqrt()
    }
}

/// Deterministic launch velocity through `target` (no jitter)
pub fn launch_velocity(launch: Vec3, target: Vec3, params: &LaunchParams) -> Vec3 {
    let speed = solve_launch_speed(launch, target, params.gravity, params.angle, params.up)
        * params.force_multiplier;

    let (horizontal, _) = split_vertical(target - launch, params.up);
    let direction = horizontal.normalize_or_zero();

    direction * (speed * params.angle.cos()) + params.up * (speed * params.angle.sin())
}

/// Uniform per-axis jitter in `[-bound, bound]`
pub fn random_axes<R: Rng + ?Sized>(rng: &mut R, bound: f32) -> Vec3 {
    let bound = bound.abs();
    Vec3::new(
        rng.random_range(-bound..=bound),
        rng.random_range(-bound..=bound),
        rng.random_range(-bound..=bound),
    )
}

/// Full throw: solved velocity plus velocity jitter and an independent torque impulse
pub fn plan_launch<R: Rng + ?Sized>(
    launch: Vec3,
    target: Vec3,
    params: &LaunchParams,
    rng: &mut R,
) -> Launch {
    let velocity = launch_velocity(launch, target, params) + random_axes(rng, params.velocity_jitter);
    let torque = random_axes(rng, params.torque_jitter);
    Launch { velocity, torque }
}
