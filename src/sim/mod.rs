//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (die A before die B)
//! - No rendering or platform dependencies

pub mod body;
pub mod die;
pub mod economy;
pub mod face;
pub mod house;
pub mod orchestrator;
pub mod round;
pub mod state;
pub mod target_zone;
pub mod tick;
pub mod trajectory;

pub use body::{BodyEnv, Contact, RigidBody};
pub use die::{Die, DieEvent, DieState, random_rotation};
pub use economy::{EconomyError, HouseBank, PlayerWallet, payout_owed, winnings};
pub use face::{FaceError, FaceMarker, FaceMarkers, resolve_face};
pub use house::{HouseDecision, HousePolicy, decide};
pub use orchestrator::{PairRoll, RollOrchestrator, RollRequest};
pub use round::RoundTracker;
pub use state::{
    Actor, BetTier, GameOverReason, GamePhase, MAX_QUEUED_EVENTS, Table, TableEvent, Turn,
    TurnOutcome,
};
pub use target_zone::TargetZone;
pub use tick::{TickInput, tick};
pub use trajectory::{Launch, LaunchParams, launch_velocity, plan_launch, solve_launch_speed};
