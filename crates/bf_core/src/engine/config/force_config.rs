//! Force calculation tuning

use serde::{Deserialize, Serialize};

use crate::engine::force::{
    CLOSE_CONTACT_FACTOR, CLOSE_CONTACT_GAP, FREE_ROLL_FACTOR, MAX_CUT_ANGLE_DEG,
    REDIRECT_FORCE_SCALE,
};

/// Multipliers applied on top of the calibrated distance→force lookup.
///
/// Defaults are the playtest-tuned values; presets must not touch them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    pub free_roll_factor: f32,
    pub close_contact_factor: f32,
    pub close_contact_gap: f32,
    pub redirect_scale: f32,
    /// Largest cut angle the disk can put on the ball (deg)
    pub max_cut_angle_deg: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            free_roll_factor: FREE_ROLL_FACTOR,
            close_contact_factor: CLOSE_CONTACT_FACTOR,
            close_contact_gap: CLOSE_CONTACT_GAP,
            redirect_scale: REDIRECT_FORCE_SCALE,
            max_cut_angle_deg: MAX_CUT_ANGLE_DEG,
        }
    }
}
