use serde::{Deserialize, Serialize};

use super::team::TeamSide;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u8,
    pub away: u8,
}

impl Score {
    pub fn add_goal(&mut self, side: TeamSide) {
        match side {
            TeamSide::Home => self.home = self.home.saturating_add(1),
            TeamSide::Away => self.away = self.away.saturating_add(1),
        }
    }

    pub fn of(&self, side: TeamSide) -> u8 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }
}

/// Half counter and elapsed play time within the current half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchClock {
    /// 1 or 2; 0 before kickoff
    pub half: u8,
    pub elapsed_secs: f32,
    pub half_length_secs: f32,
}

impl Default for MatchClock {
    fn default() -> Self {
        Self { half: 0, elapsed_secs: 0.0, half_length_secs: 15.0 * 60.0 }
    }
}

impl MatchClock {
    pub fn start_half(&mut self, first: bool) {
        self.half = if first { 1 } else { 2 };
        self.elapsed_secs = 0.0;
    }

    /// Advance play time; returns true once the half has run out.
    pub fn advance(&mut self, dt_secs: f32) -> bool {
        if dt_secs > 0.0 {
            self.elapsed_secs = (self.elapsed_secs + dt_secs).min(self.half_length_secs);
        }
        self.is_half_over()
    }

    pub fn is_half_over(&self) -> bool {
        self.elapsed_secs >= self.half_length_secs
    }

    pub fn is_full_time(&self) -> bool {
        self.half >= 2 && self.is_half_over()
    }
}
