//! # bf_core - Turn rules and AI for a button football game
//!
//! Decides what a flick turn means once the physics world settles, how many
//! touches each side has left, and what a computer-controlled team plays next.
//! Rigid-body physics, rendering and input stay in the host engine; this crate
//! only consumes collision/boundary events and reads disk positions.
//!
//! ## Features
//! - Latched per-turn flags resolved into a restart (throw-in, corner, goal
//!   kick, free kick, penalty, kickoff)
//! - Global and per-disk touch budgets
//! - Three AI policies (Dummy, Fuzzy, Decourt) behind one trait
//! - Calibrated distance → force lookup
//! - Compact checksummed saves and replicated rule results

// Allow unused code for features under development
#![allow(dead_code)]
// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]
// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]
// AI helpers take board, pitch and side together
#![allow(clippy::too_many_arguments)]

pub mod engine;
pub mod error;
pub mod models;
pub mod net;
pub mod save;
pub mod session;

pub use engine::ai::{make_policy, Action, ActionKind, AiContext, AiPolicy, PolicyKind, Step};
pub use engine::config::EngineConfig;
pub use engine::force::{DistanceCalibrationTable, ForceCalculator, ForceVector};
pub use engine::rules::{RuleEngine, RuleSnapshot, RuleState, TurnOutcome};
pub use error::{CoreError, Result};
pub use models::{Board, DiskId, PitchConfig, TeamSide, Vec2};
pub use session::{MatchSession, PhysicsEvent, WorldProbe};
