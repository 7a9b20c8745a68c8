//! Board snapshot: where every piece and the ball currently rest
//!
//! The physics layer owns motion; the board only mirrors final positions so
//! rules and AI can read them.

use serde::{Deserialize, Serialize};

use super::geometry::{distance, vec2, Vec2};
use super::pitch::PitchConfig;
use super::team::{Controller, Disk, DiskId, Team, TeamSide, KEEPER_SLOT};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec2,
}

/// Field-disk formation as (lateral offset, depth from own byline).
const KICKOFF_FORMATION: [(f32, f32); 10] = [
    (-24.0, 14.0),
    (-8.0, 12.0),
    (8.0, 12.0),
    (24.0, 14.0),
    (-26.0, 30.0),
    (-9.0, 28.0),
    (9.0, 28.0),
    (26.0, 30.0),
    (-5.0, 56.0),
    (5.0, 56.0),
];

/// Keeper depth from its own byline.
const KEEPER_DEPTH: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub pitch: PitchConfig,
    pub teams: [Team; 2],
    pub ball: Ball,
}

impl Board {
    pub fn new(pitch: PitchConfig, home: Team, away: Team) -> Self {
        Self { pitch, teams: [home, away], ball: Ball { position: Vec2::zeros() } }
    }

    /// Both teams in their kickoff formation, ball on the centre spot.
    pub fn kickoff_layout(pitch: PitchConfig, home: Controller, away: Controller) -> Self {
        let mut board = Self::new(
            pitch,
            Team::new(TeamSide::Home, "Home", home),
            Team::new(TeamSide::Away, "Away", away),
        );
        board.reset_formation(TeamSide::Home);
        board.reset_formation(TeamSide::Away);
        board
    }

    /// Put every piece of both teams back into formation for a kickoff, given
    /// which team defends the upper byline.
    pub fn reset_for_kickoff(&mut self, upper: TeamSide) {
        for side in [TeamSide::Home, TeamSide::Away] {
            let defends_upper = side == upper;
            self.place_formation(side, defends_upper);
        }
        self.ball.position = self.pitch.center();
    }

    fn reset_formation(&mut self, side: TeamSide) {
        self.place_formation(side, side == TeamSide::Home);
    }

    fn place_formation(&mut self, side: TeamSide, defends_upper: bool) {
        let pitch = self.pitch;
        let own_byline = pitch.goal_center(defends_upper).y;
        let inward = pitch.inward(defends_upper);
        let team = self.team_mut(side);
        for (slot, (x, depth)) in KICKOFF_FORMATION.iter().enumerate() {
            team.disks[slot].position = vec2(*x, own_byline + inward * depth);
        }
        team.disks[KEEPER_SLOT as usize].position = vec2(0.0, own_byline + inward * KEEPER_DEPTH);
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        &self.teams[side.index()]
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        &mut self.teams[side.index()]
    }

    pub fn disk(&self, id: DiskId) -> Option<&Disk> {
        self.team(id.side).disk(id.slot)
    }

    pub fn position(&self, id: DiskId) -> Option<Vec2> {
        self.disk(id).map(|d| d.position)
    }

    pub fn set_position(&mut self, id: DiskId, position: Vec2) -> Result<()> {
        let disk = self
            .team_mut(id.side)
            .disk_mut(id.slot)
            .ok_or(CoreError::UnknownDisk(id))?;
        disk.position = position;
        Ok(())
    }

    pub fn ball_position(&self) -> Vec2 {
        self.ball.position
    }

    pub fn radius_of(&self, id: DiskId) -> f32 {
        if id.is_keeper() {
            self.pitch.keeper_radius
        } else {
            self.pitch.disk_radius
        }
    }

    /// Every piece on the table, home first.
    pub fn all_disks(&self) -> impl Iterator<Item = &Disk> {
        self.teams.iter().flat_map(|t| t.disks.iter())
    }

    /// Field disk of `side` closest to the ball (lowest slot on ties).
    pub fn nearest_to_ball(&self, side: TeamSide) -> Option<DiskId> {
        let ball = self.ball.position;
        let mut best: Option<(DiskId, f32)> = None;
        for disk in self.team(side).field_disks() {
            let d = distance(disk.position, ball);
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((disk.id, d)),
            }
        }
        best.map(|(id, _)| id)
    }

    pub fn validate(&self) -> Result<()> {
        self.pitch.validate().map_err(CoreError::InvalidConfig)?;
        for (idx, team) in self.teams.iter().enumerate() {
            let expected = if idx == 0 { TeamSide::Home } else { TeamSide::Away };
            if team.side != expected {
                return Err(CoreError::InvalidConfig(format!(
                    "team at index {} is {}",
                    idx, team.side
                )));
            }
            team.validate().map_err(CoreError::InvalidConfig)?;
        }
        Ok(())
    }
}
