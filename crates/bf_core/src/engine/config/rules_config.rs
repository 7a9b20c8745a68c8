//! Touch limits of the ruleset

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Touches a team may play in one possession (reference ruleset: 12)
    pub max_global_touches: u8,
    /// Consecutive touches for one disk in open play (reference ruleset: 3)
    pub open_play_disk_touches: u8,
    /// Touches for the taker of a kickoff or set piece
    pub restart_disk_touches: u8,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self { max_global_touches: 12, open_play_disk_touches: 3, restart_disk_touches: 1 }
    }
}

impl RulesConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_global_touches == 0 {
            return Err("max_global_touches must be at least 1".to_string());
        }
        if self.open_play_disk_touches == 0 || self.restart_disk_touches == 0 {
            return Err("disk touches must be at least 1".to_string());
        }
        if self.open_play_disk_touches > self.max_global_touches
            || self.restart_disk_touches > self.max_global_touches
        {
            return Err("disk touches exceed the global budget".to_string());
        }
        Ok(())
    }
}
