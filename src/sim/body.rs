//! Minimal rigid body for a die
//!
//! Semi-implicit Euler with a single infinite floor plane. Good enough to give
//! a thrown die a believable tumble; the face is read from wherever the
//! orientation ends up after the settle timer.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{ANGULAR_DAMPING, LINEAR_DAMPING};

/// Floor contact produced during integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Speed along the floor normal at impact
    pub relative_speed: f32,
    pub point: Vec3,
}

/// Environment the body integrates against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyEnv {
    pub gravity: f32,
    pub up: Vec3,
    pub floor_height: f32,
    pub restitution: f32,
    pub friction: f32,
}

/// Cube-shaped rigid body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub half_extent: f32,
    /// Kinematic bodies ignore forces and are moved directly
    pub kinematic: bool,
    pub use_gravity: bool,
}

impl RigidBody {
    pub fn new(position: Vec3, half_extent: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            half_extent,
            kinematic: true,
            use_gravity: false,
        }
    }

    /// Make kinematic and stop all motion
    pub fn freeze(&mut self) {
        self.kinematic = true;
        self.use_gravity = false;
        self.clear_velocities();
    }

    pub fn clear_velocities(&mut self) {
        self.linear_velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Uniform-density cube, unit mass: I = m·s²/6 with s the edge length
    fn inverse_inertia(&self) -> f32 {
        let edge = (self.half_extent * 2.0).max(1e-3);
        6.0 / (edge * edge)
    }

    /// Instantaneous angular impulse
    pub fn apply_torque_impulse(&mut self, torque: Vec3) {
        if self.kinematic {
            return;
        }
        self.angular_velocity += torque * self.inverse_inertia();
    }

    /// Advance one step; returns the floor contact if the body hit it this step
    pub fn integrate(&mut self, dt: f32, env: &BodyEnv) -> Option<Contact> {
        if self.kinematic {
            return None;
        }

        if self.use_gravity {
            self.linear_velocity -= env.up * env.gravity * dt;
        }
        self.linear_velocity *= (1.0 - LINEAR_DAMPING * dt).max(0.0);
        self.angular_velocity *= (1.0 - ANGULAR_DAMPING * dt).max(0.0);

        self.position += self.linear_velocity * dt;
        let spin = Quat::from_scaled_axis(self.angular_velocity * dt);
        self.rotation = (spin * self.rotation).normalize();

        self.resolve_floor(env)
    }

    fn resolve_floor(&mut self, env: &BodyEnv) -> Option<Contact> {
        let rest_height = env.floor_height + self.half_extent;
        let height = self.position.dot(env.up);
        if height >= rest_height {
            return None;
        }

        // Push back onto the surface
        self.position += env.up * (rest_height - height);

        let normal_speed = self.linear_velocity.dot(env.up);
        if normal_speed >= 0.0 {
            return None;
        }

        let normal = env.up * normal_speed;
        let tangent = self.linear_velocity - normal;
        // Reflect the normal component, scrub the tangential one
        self.linear_velocity = tangent * (1.0 - env.friction).max(0.0) - normal * env.restitution;
        self.angular_velocity *= (1.0 - env.friction * 0.5).max(0.0);

        Some(Contact {
            relative_speed: -normal_speed,
            point: self.position - env.up * self.half_extent,
        })
    }
}
