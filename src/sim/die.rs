//! Single die lifecycle
//!
//! A die is an explicit state machine advanced by [`Die::tick`]:
//!
//! ```text
//! Idle ─roll_from_launch─▶ MovingToLaunch ─▶ AwaitingLaunch ─▶ InFlight
//!   ▲                                          ▲ (roll)             │ settle timer
//!   └──────────────── ReturningToIdle ◀── face read ◀───────────────┘
//! ```
//!
//! Kinematic moves interpolate position; only `InFlight` is physics-driven.
//! The face is read once when the settle timer expires, and the completion
//! callback fires when the die is back at rest.

use std::fmt;

use glam::{Quat, Vec3};
use rand::Rng;

use super::body::{BodyEnv, RigidBody};
use super::face::{FaceError, FaceMarkers, resolve_face};
use super::target_zone::TargetZone;
use super::trajectory::{LaunchParams, plan_launch};
use crate::consts::{FLOOR_HEIGHT, SIM_DT, WORLD_UP};
use crate::lerp_progress;
use crate::tuning::DiceTuning;

/// Invoked with the face value when a roll finishes
pub type RollCallback = Box<dyn FnMut(u8)>;

/// Lifecycle state of a die
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DieState {
    /// Kinematic, resting at the idle position
    Idle,
    /// Kinematic move toward the launch point
    MovingToLaunch { from: Vec3, to: Vec3, elapsed: f32 },
    /// Physics-active at the launch point, waiting to be thrown
    AwaitingLaunch { launch: Vec3, remaining: f32 },
    /// Physics-driven until the settle timer expires
    InFlight { elapsed: f32 },
    /// Kinematic move back to the idle position
    ReturningToIdle {
        from: Vec3,
        elapsed: f32,
        /// Arrival ends the current roll
        finishes_roll: bool,
    },
}

/// Things a die reports while ticking
#[derive(Debug, Clone, PartialEq)]
pub enum DieEvent {
    Launched { die: u32, velocity: Vec3 },
    /// Collision strong enough (and far enough from the last) to be heard
    Impact { die: u32, speed: f32 },
    FaceRead { die: u32, value: u8 },
    FaceFailed { die: u32, error: FaceError },
    RollComplete { die: u32, value: u8 },
}

pub struct Die {
    id: u32,
    state: DieState,
    body: RigidBody,
    idle_position: Vec3,
    faces: Option<FaceMarkers>,
    last_value: u8,
    rolling: bool,
    tuning: DiceTuning,
    /// Ticks seen since creation
    time_ticks: u64,
    /// Tick of the last voiced impact
    last_impact: Option<u64>,
    on_roll_complete: Option<RollCallback>,
}

impl fmt::Debug for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Die")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("position", &self.body.position)
            .field("last_value", &self.last_value)
            .field("rolling", &self.rolling)
            .finish_non_exhaustive()
    }
}

impl Die {
    /// New die resting at `idle_position` with standard d6 markers
    pub fn new(id: u32, idle_position: Vec3, tuning: &DiceTuning) -> Self {
        Self {
            id,
            state: DieState::Idle,
            body: RigidBody::new(idle_position, tuning.half_extent),
            idle_position,
            faces: Some(FaceMarkers::d6(tuning.half_extent)),
            last_value: 0,
            rolling: false,
            tuning: tuning.clone(),
            time_ticks: 0,
            last_impact: None,
            on_roll_complete: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn state(&self) -> DieState {
        self.state
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn rotation(&self) -> Quat {
        self.body.rotation
    }

    pub fn idle_position(&self) -> Vec3 {
        self.idle_position
    }

    pub fn last_value(&self) -> u8 {
        self.last_value
    }

    /// True from the roll request until the die is back at rest
    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// True while a kinematic move is in progress
    pub fn is_moving(&self) -> bool {
        matches!(
            self.state,
            DieState::MovingToLaunch { .. } | DieState::ReturningToIdle { .. }
        )
    }

    pub fn set_faces(&mut self, faces: Option<FaceMarkers>) {
        self.faces = faces;
    }

    pub fn set_on_roll_complete(&mut self, callback: Option<RollCallback>) {
        self.on_roll_complete = callback;
    }

    /// Swap physics and timing parameters (applies from the next state change)
    pub fn set_tuning(&mut self, tuning: &DiceTuning) {
        self.tuning = tuning.clone();
        self.body.half_extent = tuning.half_extent;
    }

    /// Change where the die rests (takes effect on the next return)
    pub fn set_idle_position(&mut self, position: Vec3) {
        self.idle_position = position;
    }

    /// Snap to the idle position, kinematic and upright
    pub fn place_at_idle(&mut self) {
        self.body.position = self.idle_position;
        self.body.rotation = Quat::IDENTITY;
        self.body.freeze();
        self.state = DieState::Idle;
    }

    /// Throw from the current position. Ignored while rolling.
    pub fn roll(&mut self) -> bool {
        if self.rolling {
            log::debug!("Die {} roll ignored: already rolling", self.id);
            return false;
        }
        self.rolling = true;
        self.body.kinematic = false;
        self.body.use_gravity = false;
        self.body.clear_velocities();
        self.state = DieState::AwaitingLaunch {
            launch: self.body.position,
            remaining: 0.0,
        };
        true
    }

    /// Move to `launch`, pause, then throw. Ignored while rolling.
    pub fn roll_from_launch(&mut self, launch: Vec3) -> bool {
        if self.rolling {
            log::debug!("Die {} roll ignored: already rolling", self.id);
            return false;
        }
        self.rolling = true;
        self.body.freeze();
        self.state = DieState::MovingToLaunch {
            from: self.body.position,
            to: launch,
            elapsed: 0.0,
        };
        true
    }

    /// Send an idle die home. Ignored while rolling or already moving.
    pub fn return_to_idle(&mut self) -> bool {
        if self.rolling || self.is_moving() {
            return false;
        }
        self.begin_return(false);
        true
    }

    /// Collision handler. Returns true when the impact should be voiced.
    ///
    /// The cooldown is counted in fixed `SIM_DT` ticks.
    pub fn on_collision(&mut self, relative_speed: f32) -> bool {
        if !self.rolling {
            return false;
        }
        if let Some(last) = self.last_impact {
            let since = (self.time_ticks - last) as f32 * SIM_DT;
            if since < self.tuning.collision_cooldown {
                return false;
            }
        }
        if relative_speed < self.tuning.min_collision_velocity {
            return false;
        }
        self.last_impact = Some(self.time_ticks);
        true
    }

    fn body_env(&self) -> BodyEnv {
        BodyEnv {
            gravity: self.tuning.gravity.abs(),
            up: WORLD_UP,
            floor_height: FLOOR_HEIGHT,
            restitution: self.tuning.restitution,
            friction: self.tuning.friction,
        }
    }

    /// Advance one step
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        zone: Option<&mut TargetZone>,
        rng: &mut R,
        events: &mut Vec<DieEvent>,
    ) {
        self.time_ticks += 1;

        match self.state {
            DieState::Idle => {}

            DieState::MovingToLaunch { from, to, elapsed } => {
                let elapsed = elapsed + dt;
                let t = lerp_progress(elapsed, self.tuning.move_lerp_duration);
                self.body.position = from.lerp(to, t);

                if t >= 1.0 {
                    // Physics-active at the launch point, but held until thrown
                    self.body.position = to;
                    self.body.kinematic = false;
                    self.body.use_gravity = false;
                    self.body.clear_velocities();
                    self.state = DieState::AwaitingLaunch {
                        launch: to,
                        remaining: self.tuning.launch_pause,
                    };
                } else {
                    self.state = DieState::MovingToLaunch { from, to, elapsed };
                }
            }

            DieState::AwaitingLaunch { launch, remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.throw(launch, zone, rng, events);
                    self.state = DieState::InFlight { elapsed: 0.0 };
                } else {
                    self.state = DieState::AwaitingLaunch { launch, remaining };
                }
            }

            DieState::InFlight { elapsed } => {
                let elapsed = elapsed + dt;
                let env = self.body_env();
                if let Some(contact) = self.body.integrate(dt, &env) {
                    if self.on_collision(contact.relative_speed) {
                        events.push(DieEvent::Impact {
                            die: self.id,
                            speed: contact.relative_speed,
                        });
                    }
                }

                if elapsed >= self.tuning.settle_time {
                    self.read_face(events);
                    self.begin_return(true);
                } else {
                    self.state = DieState::InFlight { elapsed };
                }
            }

            DieState::ReturningToIdle {
                from,
                elapsed,
                finishes_roll,
            } => {
                let elapsed = elapsed + dt;
                let t = lerp_progress(elapsed, self.tuning.move_lerp_duration);
                self.body.position = from.lerp(self.idle_position, t);

                if t >= 1.0 {
                    self.body.position = self.idle_position;
                    self.body.freeze();
                    self.state = DieState::Idle;
                    if finishes_roll {
                        self.finish_roll(events);
                    }
                } else {
                    self.state = DieState::ReturningToIdle {
                        from,
                        elapsed,
                        finishes_roll,
                    };
                }
            }
        }
    }

    fn throw<R: Rng + ?Sized>(
        &mut self,
        launch: Vec3,
        zone: Option<&mut TargetZone>,
        rng: &mut R,
        events: &mut Vec<DieEvent>,
    ) {
        let target = match zone {
            Some(zone) => zone.sample_point(rng),
            None => Vec3::ZERO,
        };
        let params = LaunchParams::from_tuning(&self.tuning, WORLD_UP);
        let plan = plan_launch(launch, target, &params, rng);

        self.body.position = launch;
        self.body.rotation = random_rotation(rng);
        self.body.kinematic = false;
        self.body.use_gravity = true;
        self.body.clear_velocities();
        self.body.linear_velocity = plan.velocity;
        self.body.apply_torque_impulse(plan.torque);

        log::debug!(
            "Die {} thrown from {:?} toward {:?} at {:?}",
            self.id,
            launch,
            target,
            plan.velocity
        );
        events.push(DieEvent::Launched {
            die: self.id,
            velocity: plan.velocity,
        });
    }

    fn read_face(&mut self, events: &mut Vec<DieEvent>) {
        match resolve_face(
            self.faces.as_ref(),
            self.body.position,
            self.body.rotation,
            WORLD_UP,
        ) {
            Ok(value) => {
                self.last_value = value;
                log::debug!("Die {} rolled: {}", self.id, value);
                events.push(DieEvent::FaceRead { die: self.id, value });
            }
            Err(error) => {
                log::error!("Die {} face detection failed: {}", self.id, error);
                self.last_value = 0;
                events.push(DieEvent::FaceFailed { die: self.id, error });
            }
        }
    }

    fn begin_return(&mut self, finishes_roll: bool) {
        self.body.freeze();
        self.state = DieState::ReturningToIdle {
            from: self.body.position,
            elapsed: 0.0,
            finishes_roll,
        };
    }

    fn finish_roll(&mut self, events: &mut Vec<DieEvent>) {
        self.rolling = false;
        let value = self.last_value;
        events.push(DieEvent::RollComplete { die: self.id, value });
        if let Some(callback) = self.on_roll_complete.as_mut() {
            callback(value);
        }
    }
}

/// Uniformly distributed random orientation
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    use std::f32::consts::TAU;

    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    let u3: f32 = rng.random();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
        b * (TAU * u3).cos(),
    )
    .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn fast_tuning() -> DiceTuning {
        DiceTuning {
            settle_time: 0.5,
            move_lerp_duration: 0.1,
            launch_pause: 0.05,
            ..Default::default()
        }
    }

    fn run_until_idle(die: &mut Die, rng: &mut Pcg32, events: &mut Vec<DieEvent>) -> u32 {
        let mut zone = TargetZone::default();
        let mut ticks = 0;
        while die.is_rolling() {
            die.tick(SIM_DT, Some(&mut zone), rng, events);
            ticks += 1;
            assert!(ticks < 10_000, "die never finished rolling");
        }
        ticks
    }

    #[test]
    fn test_roll_from_launch_walks_all_states() {
        let mut die = Die::new(1, Vec3::new(-3.0, 0.25, 0.0), &fast_tuning());
        let mut rng = Pcg32::seed_from_u64(5);
        let mut zone = TargetZone::default();
        let mut events = Vec::new();

        assert!(die.roll_from_launch(Vec3::new(0.0, 1.0, -2.5)));
        assert!(matches!(die.state(), DieState::MovingToLaunch { .. }));
        assert!(die.body().kinematic);

        let mut seen_awaiting = false;
        let mut seen_flight = false;
        let mut seen_return = false;
        while die.is_rolling() {
            die.tick(SIM_DT, Some(&mut zone), &mut rng, &mut events);
            match die.state() {
                DieState::AwaitingLaunch { .. } => {
                    seen_awaiting = true;
                    assert!(!die.body().kinematic);
                    assert!(!die.body().use_gravity);
                }
                DieState::InFlight { .. } => {
                    seen_flight = true;
                    assert!(die.body().use_gravity);
                }
                DieState::ReturningToIdle { .. } => seen_return = true,
                _ => {}
            }
        }

        assert!(seen_awaiting && seen_flight && seen_return);
        assert_eq!(die.state(), DieState::Idle);
        assert_eq!(die.position(), die.idle_position());
        assert!(die.body().kinematic);
        assert!((1..=6).contains(&die.last_value()));
        assert!(zone.last_sampled().is_some());
    }

    #[test]
    fn test_callback_fires_once_per_roll() {
        let mut die = Die::new(1, Vec3::new(-3.0, 0.25, 0.0), &fast_tuning());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        die.set_on_roll_complete(Some(Box::new(move |v| sink.borrow_mut().push(v))));

        let mut rng = Pcg32::seed_from_u64(9);
        let mut events = Vec::new();
        die.roll_from_launch(Vec3::new(0.0, 1.0, -2.5));
        run_until_idle(&mut die, &mut rng, &mut events);

        // Extra ticks while idle must not re-fire
        let mut zone = TargetZone::default();
        for _ in 0..60 {
            die.tick(SIM_DT, Some(&mut zone), &mut rng, &mut events);
        }

        assert_eq!(calls.borrow().as_slice(), &[die.last_value()]);
        let completions = events
            .iter()
            .filter(|e| matches!(e, DieEvent::RollComplete { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_roll_while_rolling_is_noop() {
        let mut die = Die::new(1, Vec3::ZERO, &fast_tuning());
        assert!(die.roll_from_launch(Vec3::new(0.0, 1.0, -2.5)));
        let state = die.state();
        assert!(!die.roll());
        assert!(!die.roll_from_launch(Vec3::new(5.0, 1.0, 5.0)));
        assert_eq!(die.state(), state);
    }

    #[test]
    fn test_roll_in_place_skips_move() {
        let start = Vec3::new(0.0, 1.0, -2.0);
        let mut die = Die::new(1, start, &fast_tuning());
        let mut rng = Pcg32::seed_from_u64(2);
        let mut zone = TargetZone::default();
        let mut events = Vec::new();

        assert!(die.roll());
        die.tick(SIM_DT, Some(&mut zone), &mut rng, &mut events);
        assert!(matches!(die.state(), DieState::InFlight { .. }));
        assert!(matches!(events[0], DieEvent::Launched { die: 1, .. }));

        run_until_idle(&mut die, &mut rng, &mut events);
        assert!((1..=6).contains(&die.last_value()));
    }

    #[test]
    fn test_settle_timer_is_fixed() {
        let tuning = fast_tuning();
        let mut die = Die::new(1, Vec3::ZERO, &tuning);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut zone = TargetZone::default();
        let mut events = Vec::new();

        die.roll();
        die.tick(SIM_DT, Some(&mut zone), &mut rng, &mut events);
        let mut flight_ticks = 0;
        while matches!(die.state(), DieState::InFlight { .. }) {
            die.tick(SIM_DT, Some(&mut zone), &mut rng, &mut events);
            flight_ticks += 1;
        }
        let expected = (tuning.settle_time / SIM_DT).ceil() as i32;
        assert!((flight_ticks - expected).abs() <= 1, "{flight_ticks} vs {expected}");
    }

    #[test]
    fn test_missing_faces_reads_zero_and_still_completes() {
        let mut die = Die::new(4, Vec3::ZERO, &fast_tuning());
        die.set_faces(None);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut events = Vec::new();
        die.roll_from_launch(Vec3::new(0.0, 1.0, -2.5));
        run_until_idle(&mut die, &mut rng, &mut events);

        assert_eq!(die.last_value(), 0);
        assert!(events.iter().any(|e| matches!(
            e,
            DieEvent::FaceFailed {
                die: 4,
                error: FaceError::MissingMarkers
            }
        )));
        assert!(events.contains(&DieEvent::RollComplete { die: 4, value: 0 }));
    }

    #[test]
    fn test_collision_cooldown() {
        // High enough that the short flight below never reaches the floor
        let mut die = Die::new(1, Vec3::new(0.0, 5.0, 0.0), &fast_tuning());
        assert!(!die.on_collision(5.0), "idle dice are silent");

        die.roll();
        assert!(die.on_collision(5.0));
        assert!(!die.on_collision(5.0), "inside cooldown");

        let mut rng = Pcg32::seed_from_u64(0);
        let mut events = Vec::new();
        // Advance the clock past the cooldown without a zone
        for _ in 0..20 {
            die.tick(SIM_DT, None, &mut rng, &mut events);
        }
        assert!(!die.on_collision(0.1), "too soft");
        assert!(die.on_collision(5.0));
    }

    #[test]
    fn test_collision_cooldown_after_long_session() {
        let mut die = Die::new(1, Vec3::new(0.0, 5.0, 0.0), &fast_tuning());
        // Roughly nine years of play at 120 Hz
        die.time_ticks = 1 << 35;
        die.roll();
        assert!(die.on_collision(5.0));
        assert!(!die.on_collision(5.0), "inside cooldown");

        let mut rng = Pcg32::seed_from_u64(0);
        let mut events = Vec::new();
        for _ in 0..20 {
            die.tick(SIM_DT, None, &mut rng, &mut events);
        }
        assert!(die.on_collision(5.0), "cooldown expires late in a session");
    }

    #[test]
    fn test_return_to_idle_ignored_while_rolling() {
        let mut die = Die::new(1, Vec3::new(-3.0, 0.25, 0.0), &fast_tuning());
        die.roll_from_launch(Vec3::new(0.0, 1.0, -2.5));
        assert!(!die.return_to_idle());
    }

    #[test]
    fn test_return_to_idle_moves_displaced_die_home() {
        let idle = Vec3::new(-3.0, 0.25, 0.0);
        let mut die = Die::new(1, idle, &fast_tuning());
        die.set_idle_position(Vec3::new(-3.0, 0.25, 1.0));
        assert!(die.return_to_idle());
        assert!(!die.return_to_idle(), "already moving");

        let mut rng = Pcg32::seed_from_u64(0);
        let mut events = Vec::new();
        for _ in 0..30 {
            die.tick(SIM_DT, None, &mut rng, &mut events);
        }
        assert_eq!(die.state(), DieState::Idle);
        assert_eq!(die.position(), Vec3::new(-3.0, 0.25, 1.0));
        assert!(events.is_empty(), "manual return is not a roll");
    }

    #[test]
    fn test_random_rotation_is_unit() {
        let mut rng = Pcg32::seed_from_u64(77);
        for _ in 0..100 {
            assert!(random_rotation(&mut rng).is_normalized());
        }
    }
}
