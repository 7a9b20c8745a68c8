//! Phase-based policy
//!
//! One decision runs through five phases, one phase per `select_action` call:
//!
//! ```text
//! Initial -> CheckBallInOwnArea -> SelectCandidates -> EvaluateCandidates -> ChooseBest
//!                  |                                                             |
//!                  +---- ball in own area: direct clearance ----> Done <---------+
//! ```
//!
//! Each candidate disk is checked against the action kinds in a fixed order
//! and keeps the first one that applies:
//! TurnAround, Advance, ShootToGoal, SideOpening, Pass, GoToPosition.
//! The winner across candidates is the highest `ActionKind`; the earlier
//! candidate wins a tie, so the disk that acted last is preferred.

use super::helpers;
use super::path::PathCache;
use super::{Action, ActionKind, AiContext, AiPolicy, PolicyKind, Step};
use crate::engine::config::DecourtConfig;
use crate::engine::rules::RuleState;
use crate::models::geometry::{angle_between, distance};
use crate::models::DiskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Initial,
    CheckBallInOwnArea,
    SelectCandidates,
    EvaluateCandidates,
    ChooseBest,
}

#[derive(Debug)]
pub struct DecourtPolicy {
    config: DecourtConfig,
    phase: Phase,
    candidates: Vec<DiskId>,
    evaluated: Vec<Action>,
    selected: Option<Action>,
    cache: PathCache,
    /// Last action committed, to finish a dribble with a shot
    last_committed: Option<(DiskId, ActionKind)>,
}

impl DecourtPolicy {
    pub fn new(config: DecourtConfig) -> Self {
        Self {
            config,
            phase: Phase::Initial,
            candidates: Vec::new(),
            evaluated: Vec::new(),
            selected: None,
            cache: PathCache::new(),
            last_committed: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn candidates(&self) -> &[DiskId] {
        &self.candidates
    }

    pub fn evaluated(&self) -> &[Action] {
        &self.evaluated
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.cache
    }

    fn commit(&mut self, action: Action) -> Step {
        log::debug!(
            "decourt commits {:?} by {:?} (force {:.2})",
            action.kind,
            action.actor,
            action.force.magnitude()
        );
        self.last_committed = action.actor.map(|d| (d, action.kind));
        self.selected = Some(action.clone());
        self.phase = Phase::Initial;
        Step::Done(action)
    }

    /// Last-active disk first, then the nearest eligible disks.
    fn select_candidates(&mut self, ctx: &AiContext) {
        let last = ctx
            .board
            .team(ctx.side)
            .last_active_disk
            .filter(|d| ctx.rules.can_select(*d));

        self.candidates.clear();
        self.candidates.extend(last);
        for disk in helpers::eligible_by_distance(ctx) {
            if self.candidates.len() >= self.config.max_candidates {
                break;
            }
            if Some(disk) != last {
                self.candidates.push(disk);
            }
        }
    }

    fn evaluate_candidates(&mut self, ctx: &AiContext) {
        self.evaluated.clear();
        for &disk in &self.candidates {
            let continuing = self.last_committed == Some((disk, ActionKind::Advance))
                && ctx.rules.current_disk() == Some(disk);
            if let Some(action) = evaluate(&self.config, &mut self.cache, ctx, disk, continuing) {
                self.evaluated.push(action);
            }
        }
    }

    fn choose_best(&self) -> Option<Action> {
        let mut best: Option<&Action> = None;
        for action in &self.evaluated {
            match best {
                Some(b) if action.kind <= b.kind => {}
                _ => best = Some(action),
            }
        }
        best.cloned()
    }
}

/// First applicable action for `disk`, checked in priority order.
fn evaluate(
    cfg: &DecourtConfig,
    cache: &mut PathCache,
    ctx: &AiContext,
    disk: DiskId,
    continuing_advance: bool,
) -> Option<Action> {
    let pos = ctx.position(disk)?;
    let ball = ctx.ball();
    let fwd = helpers::forward(ctx);
    let goal = helpers::opponent_goal(ctx);
    let to_ball = ball - pos;
    let dist = to_ball.norm();
    let remaining = ctx.rules.remaining_touches_for(disk);
    let global = ctx.rules.remaining_global_touches();
    let penalty = ctx.rules.state() == RuleState::PenaltyKick;
    let id = Some(disk);

    // Ball sits behind the disk: go round it
    if !penalty
        && dist > 1e-3
        && dist <= cfg.turn_around_max_distance
        && angle_between(to_ball, -fwd) <= cfg.turn_around_max_angle_deg.to_radians()
    {
        let target = helpers::turn_around_target(ctx, pos, cfg.reposition_gap);
        return helpers::move_action(ctx, ActionKind::TurnAround, disk, target);
    }

    if !penalty
        && remaining >= 2
        && angle_between(to_ball, fwd) <= cfg.advance_max_angle_deg.to_radians()
        && distance(ball, goal) > cfg.advance_min_goal_distance
    {
        let target = helpers::advance_target(ctx, cfg.advance_step);
        if cache.query(ctx.paths, id, ball, target) {
            if let Some(action) = helpers::redirect_action(ctx, ActionKind::Advance, disk, target, None, true) {
                return Some(action);
            }
        }
    }

    let aim = helpers::shot_target(ctx);
    let good_position = helpers::goal_factor(&ctx.board.pitch, ball, ctx.attacks_upper())
        >= cfg.shoot_min_goal_factor
        && distance(ball, goal) <= cfg.shoot_max_distance;
    let finishing = continuing_advance && remaining == 1;
    if (good_position || finishing || penalty) && cache.query(ctx.paths, id, ball, aim) {
        if let Some(action) = helpers::redirect_action(ctx, ActionKind::ShootToGoal, disk, aim, None, false) {
            return Some(action);
        }
    }

    if !penalty && global >= 2 {
        for (receiver, at) in
            helpers::lateral_receivers(ctx, disk, cfg.side_opening_max_distance, cfg.side_opening_min_lateral)
        {
            let target = helpers::side_opening_target(ctx, at);
            if !cache.query(ctx.paths, id, ball, target) {
                continue;
            }
            if let Some(action) =
                helpers::redirect_action(ctx, ActionKind::SideOpening, disk, target, Some(receiver), true)
            {
                return Some(action);
            }
        }

        for (receiver, at) in helpers::forward_receivers(ctx, disk, cfg.pass_min_forward, cfg.pass_max_distance) {
            let target = helpers::pass_target(ctx, at);
            if ctx.forces.cut_angle(pos, ball, target) > cfg.pass_max_touch_angle_deg.to_radians() {
                continue;
            }
            if !cache.query(ctx.paths, id, ball, target) {
                continue;
            }
            if let Some(action) = helpers::redirect_action(ctx, ActionKind::Pass, disk, target, Some(receiver), true) {
                return Some(action);
            }
        }
    }

    let target = helpers::better_position_target(ctx, pos, cfg.reposition_gap, cfg.reposition_max_travel);
    helpers::move_action(ctx, ActionKind::GoToPosition, disk, target)
}

impl AiPolicy for DecourtPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Decourt
    }

    fn select_action(&mut self, ctx: &AiContext) -> Step {
        if let Some(action) = &self.selected {
            return Step::Done(action.clone());
        }

        match self.phase {
            Phase::Initial => {
                self.cache.clear();
                self.candidates.clear();
                self.evaluated.clear();
                self.phase = Phase::CheckBallInOwnArea;
                Step::Pending
            }
            Phase::CheckBallInOwnArea => {
                if helpers::ball_in_own_area(ctx) {
                    let target = helpers::clearance_target(ctx, self.config.clearance_distance);
                    return self.commit(helpers::direct_ball_action(ctx, target));
                }
                self.phase = Phase::SelectCandidates;
                Step::Pending
            }
            Phase::SelectCandidates => {
                self.select_candidates(ctx);
                self.phase = Phase::EvaluateCandidates;
                Step::Pending
            }
            Phase::EvaluateCandidates => {
                self.evaluate_candidates(ctx);
                self.phase = Phase::ChooseBest;
                Step::Pending
            }
            Phase::ChooseBest => match self.choose_best() {
                Some(action) => self.commit(action),
                None => {
                    let fallback = helpers::nearest_eligible(ctx);
                    log::warn!(
                        "decourt found no playable action for {}, falling back to a null touch",
                        ctx.side
                    );
                    self.commit(helpers::none_action(ctx, fallback))
                }
            },
        }
    }

    fn selected_action(&self) -> Option<&Action> {
        self.selected.as_ref()
    }

    fn selected_action_mut(&mut self) -> Option<&mut Action> {
        self.selected.as_mut()
    }

    fn clear_selected_action(&mut self) {
        self.selected = None;
        self.phase = Phase::Initial;
    }
}
