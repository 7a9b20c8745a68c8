//! Touch budgeting for the team in possession
//!
//! Two counters: touches left for the whole possession and touches left for
//! the disk currently acting. Only the current disk carries an individual
//! count; any other disk starts fresh when it becomes current.
//!
//! Invariant: `0 <= remaining_disk <= remaining_global`.

use serde::{Deserialize, Serialize};

use super::types::RuleState;
use crate::engine::config::RulesConfig;
use crate::models::DiskId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchBudget {
    limits: RulesConfig,
    remaining_global: u8,
    remaining_disk: u8,
    current_disk: Option<DiskId>,
}

impl TouchBudget {
    pub fn new(limits: RulesConfig) -> Self {
        let remaining_global = limits.max_global_touches;
        let remaining_disk = limits.restart_disk_touches.min(remaining_global);
        Self { limits, remaining_global, remaining_disk, current_disk: None }
    }

    pub fn max_global_touches(&self) -> u8 {
        self.limits.max_global_touches
    }

    /// Open play allows several consecutive touches; restarts allow one.
    pub fn max_disk_touches(&self, state: RuleState) -> u8 {
        if state == RuleState::Normal {
            self.limits.open_play_disk_touches
        } else {
            self.limits.restart_disk_touches
        }
    }

    pub fn remaining_global(&self) -> u8 {
        self.remaining_global
    }

    pub fn remaining_disk(&self) -> u8 {
        self.remaining_disk
    }

    pub fn current_disk(&self) -> Option<DiskId> {
        self.current_disk
    }

    /// Touches `disk` could still play if selected now.
    pub fn remaining_for(&self, disk: DiskId, state: RuleState) -> u8 {
        if self.current_disk == Some(disk) {
            self.remaining_disk
        } else {
            self.max_disk_touches(state).min(self.remaining_global)
        }
    }

    pub fn can_act(&self, disk: DiskId) -> bool {
        if self.remaining_global == 0 {
            return false;
        }
        !(self.current_disk == Some(disk) && self.remaining_disk == 0)
    }

    /// Charge one touch to `disk`. Selecting a different disk makes it current
    /// with a fresh per-disk budget. Returns false without mutating anything
    /// when the disk has nothing left.
    pub fn use_disk(&mut self, disk: DiskId, state: RuleState) -> bool {
        if !self.can_act(disk) {
            return false;
        }
        if self.current_disk != Some(disk) {
            self.current_disk = Some(disk);
            self.remaining_disk = self.max_disk_touches(state).min(self.remaining_global);
        }
        self.remaining_disk = self.remaining_disk.saturating_sub(1);
        self.remaining_global = self.remaining_global.saturating_sub(1);
        true
    }

    /// Charge one touch played directly on the ball.
    pub fn use_ball(&mut self) -> bool {
        if self.remaining_global == 0 {
            return false;
        }
        self.remaining_global -= 1;
        self.remaining_disk = self.remaining_disk.min(self.remaining_global);
        true
    }

    /// Full budget for a new possession.
    pub fn reset(&mut self, state: RuleState) {
        self.remaining_global = self.limits.max_global_touches;
        self.remaining_disk = self.max_disk_touches(state).min(self.remaining_global);
        self.current_disk = None;
    }

    /// Budget after a turn was resolved into `state`.
    pub fn after_turn(&mut self, state: RuleState, changed_ball_owner: bool) {
        if changed_ball_owner {
            self.reset(state);
        } else if state.is_dead_ball() {
            // Same team restarts: any disk may take it
            self.current_disk = None;
            self.remaining_global = self.remaining_global.max(1);
            self.remaining_disk = self.max_disk_touches(state).min(self.remaining_global);
        }
    }

    /// Overwrite the counters from persisted or replicated state.
    pub fn restore(
        &mut self,
        remaining_global: u8,
        remaining_disk: u8,
        current_disk: Option<DiskId>,
    ) -> Result<(), String> {
        if remaining_global > self.limits.max_global_touches {
            return Err(format!(
                "remaining global touches {} exceed limit {}",
                remaining_global, self.limits.max_global_touches
            ));
        }
        if remaining_disk > remaining_global {
            return Err(format!(
                "remaining disk touches {} exceed global touches {}",
                remaining_disk, remaining_global
            ));
        }
        self.remaining_global = remaining_global;
        self.remaining_disk = remaining_disk;
        self.current_disk = current_disk;
        Ok(())
    }
}
