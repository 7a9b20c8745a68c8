//! Tuning for the computer-controlled policies

use serde::{Deserialize, Serialize};

/// Thresholds for the phase-based ("Decourt") policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecourtConfig {
    /// Disks evaluated per decision
    pub max_candidates: usize,
    /// Ball counts as "behind" within this angle of the backward direction (deg)
    pub turn_around_max_angle_deg: f32,
    pub turn_around_max_distance: f32,
    /// Ball counts as "ahead" within this angle of the attack direction (deg)
    pub advance_max_angle_deg: f32,
    /// No dribbling once the ball is this close to the opponent goal
    pub advance_min_goal_distance: f32,
    /// Length of one dribble push
    pub advance_step: f32,
    pub shoot_max_distance: f32,
    /// Minimum goal factor (0..1) for a shot from open play
    pub shoot_min_goal_factor: f32,
    pub pass_max_distance: f32,
    /// Receiver must be at least this far ahead of the ball
    pub pass_min_forward: f32,
    /// Largest cut between the strike direction and the pass direction (deg)
    pub pass_max_touch_angle_deg: f32,
    pub side_opening_max_distance: f32,
    pub side_opening_min_lateral: f32,
    /// Gap left behind the ball when repositioning a disk
    pub reposition_gap: f32,
    pub reposition_max_travel: f32,
    /// Length of a direct clearance out of the own area
    pub clearance_distance: f32,
    /// How far off its line the keeper steps towards the ball
    pub keeper_step_out: f32,
}

impl Default for DecourtConfig {
    fn default() -> Self {
        Self {
            max_candidates: 5,
            turn_around_max_angle_deg: 40.0,
            turn_around_max_distance: 12.0,
            advance_max_angle_deg: 45.0,
            advance_min_goal_distance: 25.0,
            advance_step: 8.0,
            shoot_max_distance: 45.0,
            shoot_min_goal_factor: 0.35,
            pass_max_distance: 40.0,
            pass_min_forward: 4.0,
            pass_max_touch_angle_deg: 60.0,
            side_opening_max_distance: 20.0,
            side_opening_min_lateral: 4.0,
            reposition_gap: 1.5,
            reposition_max_travel: 20.0,
            clearance_distance: 35.0,
            keeper_step_out: 2.0,
        }
    }
}

/// Factor weights for the scoring ("Fuzzy") policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyWeights {
    pub distance_to_ball: f32,
    pub near_goal: f32,
    pub angle: f32,
    pub blocked_penalty: f32,
    /// Beyond this distance a disk gets no distance credit
    pub far_distance: f32,
}

impl Default for FuzzyWeights {
    fn default() -> Self {
        Self {
            distance_to_ball: 0.35,
            near_goal: 0.30,
            angle: 0.25,
            blocked_penalty: 0.50,
            far_distance: 40.0,
        }
    }
}
