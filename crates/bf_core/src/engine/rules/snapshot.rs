//! Persisted rule state

use serde::{Deserialize, Serialize};

use super::types::RuleState;
use crate::models::{DiskId, Score, TeamSide, Vec2};

/// Everything the rule engine needs to resume a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub state: RuleState,
    pub active: TeamSide,
    pub upper: TeamSide,
    pub half: u8,
    pub remaining_global_touches: u8,
    pub remaining_disk_touches: u8,
    /// Disk whose individual touch count overrides the default
    pub current_disk: Option<DiskId>,
    pub will_shoot: bool,
    pub last_ball_toucher: Option<TeamSide>,
    pub set_piece_at: Option<Vec2>,
    pub score: Score,
    pub turns_played: u32,
}

impl RuleSnapshot {
    /// Structural checks that need no engine configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.half > 2 {
            return Err(format!("half {} out of range", self.half));
        }
        if self.remaining_disk_touches > self.remaining_global_touches {
            return Err(format!(
                "disk touches {} exceed global touches {}",
                self.remaining_disk_touches, self.remaining_global_touches
            ));
        }
        if let Some(disk) = self.current_disk {
            if !disk.is_valid() || disk.is_keeper() {
                return Err(format!("current disk {} cannot act", disk));
            }
        }
        if let Some(at) = self.set_piece_at {
            if !(at.x.is_finite() && at.y.is_finite()) {
                return Err("set piece position is not finite".to_string());
            }
        }
        Ok(())
    }
}
