//! Force calculation: turning an intent into the flick vector
//!
//! The physics engine is not invertible in closed form, so distances are
//! mapped to force lengths through a table fitted offline against it, then
//! scaled by a few playtest-tuned multipliers.

pub mod calculator;
pub mod calibration;

pub use calculator::{ForceCalculator, ForceVector};
pub use calibration::{CalibrationPoint, DistanceCalibrationTable};

/// Extra pace when the target only needs to be passed through, not reached
/// and stopped at.
pub const FREE_ROLL_FACTOR: f32 = 1.4;

/// Boost when the disk starts almost touching the ball.
pub const CLOSE_CONTACT_FACTOR: f32 = 2.8;

/// Disk-to-ball gap below which `CLOSE_CONTACT_FACTOR` applies.
pub const CLOSE_CONTACT_GAP: f32 = 0.5;

/// Uniform scale on every ball-redirect force.
pub const REDIRECT_FORCE_SCALE: f32 = 1.14;

/// Widest cut a disk can put on the ball (degrees).
pub const MAX_CUT_ANGLE_DEG: f32 = 70.0;

/// Floor on the momentum share transferred by an oblique hit.
pub const MIN_TRANSFER: f32 = 0.35;
