//! Rule System Types
//!
//! Restart taxonomy, per-turn latches and the outcome of a turn resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{TeamSide, Vec2};

/// Phase of play the active team is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleState {
    /// Kickoff from the centre spot
    #[default]
    Middle,
    /// Open play
    Normal,
    ThrowIn,
    CornerKick,
    GoalKick,
    FreeKick,
    PenaltyKick,
}

impl RuleState {
    /// Kickoff and every set piece.
    pub fn is_dead_ball(&self) -> bool {
        !matches!(self, RuleState::Normal)
    }

    pub fn is_set_piece(&self) -> bool {
        matches!(
            self,
            RuleState::ThrowIn
                | RuleState::CornerKick
                | RuleState::GoalKick
                | RuleState::FreeKick
                | RuleState::PenaltyKick
        )
    }

    /// Short message shown to the players when the state is entered.
    pub fn announcement(&self) -> &'static str {
        match self {
            RuleState::Middle => "Kick-off",
            RuleState::Normal => "Play on",
            RuleState::ThrowIn => "Throw-in",
            RuleState::CornerKick => "Corner kick",
            RuleState::GoalKick => "Goal kick",
            RuleState::FreeKick => "Free kick",
            RuleState::PenaltyKick => "Penalty kick",
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.announcement())
    }
}

/// What the ball did during a turn. Latched: the first write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BallAction {
    #[default]
    None,
    ExitedSide,
    ExitedByline,
    EnteredGoal,
}

/// First thing the acting disk touched this turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FirstContact {
    Ball,
    OwnDisk,
    /// Foul; the collision point decides free kick vs penalty
    EnemyDisk { at: Vec2 },
}

/// Ball event latched for the turn together with where it happened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallEvent {
    pub action: BallAction,
    pub at: Vec2,
    /// Byline crossed / goal entered (true = upper byline)
    pub upper: bool,
    /// Last team to touch the ball when the event happened
    pub last_toucher: Option<TeamSide>,
}

/// Per-turn latches, cleared at turn start and consumed by the resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnFlags {
    pub first_contact: Option<FirstContact>,
    pub ball_event: Option<BallEvent>,
}

impl TurnFlags {
    pub fn ball_first(&self) -> bool {
        matches!(self.first_contact, Some(FirstContact::Ball))
    }

    pub fn own_disk_first(&self) -> bool {
        matches!(self.first_contact, Some(FirstContact::OwnDisk))
    }

    pub fn enemy_disk_first(&self) -> bool {
        matches!(self.first_contact, Some(FirstContact::EnemyDisk { .. }))
    }

    pub fn ball_action(&self) -> BallAction {
        self.ball_event.map(|e| e.action).unwrap_or_default()
    }

    /// Latch the first contact; returns false when already latched.
    pub fn latch_contact(&mut self, contact: FirstContact) -> bool {
        if self.first_contact.is_some() {
            return false;
        }
        self.first_contact = Some(contact);
        true
    }

    /// Latch the ball event; returns false when already latched.
    pub fn latch_ball_event(&mut self, event: BallEvent) -> bool {
        if self.ball_event.is_some() {
            return false;
        }
        self.ball_event = Some(event);
        true
    }
}

/// Result of `ball_at_final_position`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub state: RuleState,
    /// Team allowed to act next
    pub active: TeamSide,
    pub changed_ball_owner: bool,
    /// Where the ball must be placed for the restart, if any
    pub set_piece_at: Option<Vec2>,
    /// Team credited with a goal this turn
    pub goal: Option<TeamSide>,
}

impl TurnOutcome {
    pub fn is_goal(&self) -> bool {
        self.goal.is_some()
    }
}
