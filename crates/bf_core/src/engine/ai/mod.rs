//! # Computer-controlled teams
//!
//! A policy looks at the board and the rule state, picks one disk (or the
//! ball itself) and produces the flick to apply. It sees exactly what a human
//! player sees and queries the same touch budget the rule engine enforces.
//!
//! ## Policies
//!
//! | Kind | Decision |
//! |------|----------|
//! | `Dummy` | nearest disk shoots if it can, otherwise walks up to the ball |
//! | `Fuzzy` | weighted 0..1 scoring of every action kind for every disk |
//! | `Decourt` | resumable five-phase search with a fixed action ranking |
//!
//! `select_action` may return `Step::Pending` while a policy spreads its work
//! over several calls; once it returns `Step::Done` the choice is frozen until
//! `clear_selected_action`.

pub mod decourt;
pub mod dummy;
pub mod fuzzy;
pub mod helpers;
pub mod path;

pub use decourt::{DecourtPolicy, Phase};
pub use dummy::DummyPolicy;
pub use fuzzy::FuzzyPolicy;
pub use path::{ClearPath, PathCache, SegmentClearance};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::config::EngineConfig;
use crate::engine::force::{ForceCalculator, ForceVector};
use crate::engine::rules::RuleEngine;
use crate::models::{Board, DiskId, TeamSide, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolicyKind {
    Dummy,
    Fuzzy,
    #[default]
    Decourt,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PolicyKind::Dummy => "dummy",
            PolicyKind::Fuzzy => "fuzzy",
            PolicyKind::Decourt => "decourt",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dummy" => Ok(PolicyKind::Dummy),
            "fuzzy" => Ok(PolicyKind::Fuzzy),
            "decourt" => Ok(PolicyKind::Decourt),
            other => Err(format!("unknown policy '{}'", other)),
        }
    }
}

/// What a committed action does. Variant order is the ranking used when
/// several candidates compete: later variants win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    /// Degenerate board: zero-force touch
    None,
    GoToPosition,
    TurnAround,
    Pass,
    SideOpening,
    ShootToGoal,
    Advance,
    /// Flick the ball itself (own-area clearance)
    DirectBallTouch,
}

impl ActionKind {
    /// Kinds played by striking the ball with a disk.
    pub fn strikes_ball(&self) -> bool {
        matches!(
            self,
            ActionKind::Pass | ActionKind::SideOpening | ActionKind::ShootToGoal | ActionKind::Advance
        )
    }
}

/// Committed decision of a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    /// Disk to flick; `None` means the ball is flicked directly
    pub actor: Option<DiskId>,
    /// Where the moved piece (or the struck ball) should end up
    pub target: Vec2,
    /// Receiving teammate for passes
    pub target_disk: Option<DiskId>,
    /// Positions when the action was chosen, kept for replays
    pub actor_start: Vec2,
    pub target_start: Option<Vec2>,
    pub force: ForceVector,
}

impl Action {
    pub fn is_direct_ball(&self) -> bool {
        self.actor.is_none()
    }
}

/// Progress of `select_action`.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Pending,
    Done(Action),
}

impl Step {
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done(_))
    }

    pub fn into_action(self) -> Option<Action> {
        match self {
            Step::Done(action) => Some(action),
            Step::Pending => None,
        }
    }
}

/// Everything a policy may read while deciding.
pub struct AiContext<'a> {
    /// Team the policy plays for
    pub side: TeamSide,
    pub board: &'a Board,
    pub rules: &'a RuleEngine,
    pub forces: &'a ForceCalculator,
    pub paths: &'a dyn ClearPath,
    pub config: &'a EngineConfig,
}

impl<'a> AiContext<'a> {
    pub fn ball(&self) -> Vec2 {
        self.board.ball.position
    }

    pub fn position(&self, disk: DiskId) -> Option<Vec2> {
        self.board.position(disk)
    }

    /// Byline the team attacks (true = upper).
    pub fn attacks_upper(&self) -> bool {
        !self.rules.defends_upper(self.side)
    }
}

pub trait AiPolicy: Send {
    fn kind(&self) -> PolicyKind;

    fn has_action(&self) -> bool {
        self.selected_action().is_some()
    }

    /// Advance the decision. Returns the same `Done` action on every call once
    /// committed.
    fn select_action(&mut self, ctx: &AiContext) -> Step;

    fn selected_action(&self) -> Option<&Action>;

    fn selected_action_mut(&mut self) -> Option<&mut Action>;

    fn selected_player(&self) -> Option<DiskId> {
        self.selected_action().and_then(|a| a.actor)
    }

    fn will_goal_shoot(&self) -> bool {
        self.selected_action().map_or(false, |a| a.kind == ActionKind::ShootToGoal)
    }

    fn force(&self) -> Option<ForceVector> {
        self.selected_action().map(|a| a.force)
    }

    fn clear_selected_action(&mut self);

    /// Where the set-piece taker should stand before the restart.
    fn do_disk_position(&mut self, ctx: &AiContext, disk: DiskId) -> Option<Vec2> {
        helpers::set_piece_taker_spot(ctx, disk)
    }

    /// Where the keeper should stand to face the coming touch.
    fn do_goal_keeper_position(&mut self, ctx: &AiContext, keeper: DiskId) -> Option<Vec2> {
        helpers::keeper_spot(ctx, keeper)
    }

    /// Re-aim a committed shot once the opposing keeper is placed.
    fn calculate_goal_shoot(&mut self, ctx: &AiContext) {
        if let Some(action) = self.selected_action_mut() {
            if action.kind == ActionKind::ShootToGoal {
                helpers::reaim_shot(ctx, action);
            }
        }
    }
}

pub fn make_policy(kind: PolicyKind, config: &EngineConfig) -> Box<dyn AiPolicy> {
    match kind {
        PolicyKind::Dummy => Box::new(DummyPolicy::new()),
        PolicyKind::Fuzzy => Box::new(FuzzyPolicy::new(config.fuzzy.clone())),
        PolicyKind::Decourt => Box::new(DecourtPolicy::new(config.decourt.clone())),
    }
}
