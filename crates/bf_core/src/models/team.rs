use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Vec2;
use crate::engine::ai::PolicyKind;

/// Number of field disks per team (the keeper comes on top).
pub const FIELD_DISKS: usize = 10;
/// Roster slot reserved for the keeper.
pub const KEEPER_SLOT: u8 = 10;
/// Field disks plus keeper.
pub const ROSTER_SIZE: usize = FIELD_DISKS + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// Array index for per-team storage.
    pub fn index(&self) -> usize {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TeamSide::Home => write!(f, "home"),
            TeamSide::Away => write!(f, "away"),
        }
    }
}

/// Identity of a disk or keeper: team plus roster slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiskId {
    pub side: TeamSide,
    pub slot: u8,
}

impl DiskId {
    pub fn new(side: TeamSide, slot: u8) -> Self {
        Self { side, slot }
    }

    pub fn keeper(side: TeamSide) -> Self {
        Self { side, slot: KEEPER_SLOT }
    }

    pub fn is_keeper(&self) -> bool {
        self.slot == KEEPER_SLOT
    }

    pub fn is_valid(&self) -> bool {
        (self.slot as usize) < ROSTER_SIZE
    }
}

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_keeper() {
            write!(f, "{}:keeper", self.side)
        } else {
            write!(f, "{}:{}", self.side, self.slot)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Disk {
    pub id: DiskId,
    pub position: Vec2,
}

/// Who picks the moves for a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai(PolicyKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub side: TeamSide,
    pub name: String,
    pub controller: Controller,
    /// Ten field disks followed by the keeper
    pub disks: Vec<Disk>,
    /// Disk that acted most recently while this team had the ball
    #[serde(default)]
    pub last_active_disk: Option<DiskId>,
}

impl Team {
    /// Team with every piece at the origin; positions are filled in by a layout.
    pub fn new(side: TeamSide, name: impl Into<String>, controller: Controller) -> Self {
        let disks = (0..ROSTER_SIZE as u8)
            .map(|slot| Disk { id: DiskId::new(side, slot), position: Vec2::zeros() })
            .collect();
        Self { side, name: name.into(), controller, disks, last_active_disk: None }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self.controller, Controller::Ai(_))
    }

    pub fn disk(&self, slot: u8) -> Option<&Disk> {
        self.disks.get(slot as usize)
    }

    pub fn disk_mut(&mut self, slot: u8) -> Option<&mut Disk> {
        self.disks.get_mut(slot as usize)
    }

    pub fn keeper(&self) -> Option<&Disk> {
        self.disk(KEEPER_SLOT)
    }

    /// Field disks only (keeper excluded).
    pub fn field_disks(&self) -> impl Iterator<Item = &Disk> {
        self.disks.iter().filter(|d| !d.id.is_keeper())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.disks.len() != ROSTER_SIZE {
            return Err(format!(
                "team {} has {} pieces, expected {}",
                self.side,
                self.disks.len(),
                ROSTER_SIZE
            ));
        }
        for (slot, disk) in self.disks.iter().enumerate() {
            if disk.id != DiskId::new(self.side, slot as u8) {
                return Err(format!("team {} slot {} holds {}", self.side, slot, disk.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_team_roster() {
        let team = Team::new(TeamSide::Away, "Away", Controller::Human);
        assert_eq!(team.disks.len(), ROSTER_SIZE);
        assert_eq!(team.field_disks().count(), FIELD_DISKS);
        assert!(team.keeper().map(|k| k.id.is_keeper()).unwrap_or(false));
        assert!(team.validate().is_ok());
    }

    #[test]
    fn test_disk_id_display() {
        assert_eq!(DiskId::new(TeamSide::Home, 3).to_string(), "home:3");
        assert_eq!(DiskId::keeper(TeamSide::Away).to_string(), "away:keeper");
    }
}
