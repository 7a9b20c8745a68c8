//! Scoring policy
//!
//! Every eligible disk is scored for every action kind with weighted 0..1
//! factors; the global maximum is played. Disks are scanned in slot order
//! and a later entry only wins with a strictly higher score, so ties go to
//! the lower disk index.

use super::helpers;
use super::{Action, ActionKind, AiContext, AiPolicy, PolicyKind, Step};
use crate::engine::config::FuzzyWeights;
use crate::models::geometry::{angle_between, distance};
use crate::models::{DiskId, Vec2};

const DISK_KINDS: [ActionKind; 6] = [
    ActionKind::GoToPosition,
    ActionKind::TurnAround,
    ActionKind::Pass,
    ActionKind::SideOpening,
    ActionKind::ShootToGoal,
    ActionKind::Advance,
];

/// Receiver search radius shared by passes and lay-offs.
const RECEIVER_RANGE: f32 = 40.0;
const MIN_LATERAL: f32 = 4.0;
const MIN_FORWARD: f32 = 4.0;
const ADVANCE_STEP: f32 = 8.0;
const REPOSITION_GAP: f32 = 1.5;
const REPOSITION_TRAVEL: f32 = 20.0;
const CLEARANCE: f32 = 35.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAction {
    pub action: Action,
    pub score: f32,
}

#[derive(Debug)]
pub struct FuzzyPolicy {
    weights: FuzzyWeights,
    selected: Option<Action>,
    last_scores: Vec<ScoredAction>,
}

impl FuzzyPolicy {
    pub fn new(weights: FuzzyWeights) -> Self {
        Self { weights, selected: None, last_scores: Vec::new() }
    }

    /// Every option scored in the last decision, in scan order.
    pub fn last_scores(&self) -> &[ScoredAction] {
        &self.last_scores
    }

    fn score_all(&mut self, ctx: &AiContext) {
        self.last_scores.clear();
        let w = &self.weights;
        let pitch = &ctx.board.pitch;
        let ball = ctx.ball();
        let goal = helpers::opponent_goal(ctx);
        let goal_factor = helpers::goal_factor(pitch, ball, ctx.attacks_upper());
        let progress = 1.0 - (distance(ball, goal) / (2.0 * pitch.half_length)).clamp(0.0, 1.0);

        if helpers::ball_in_own_area(ctx) {
            let target = helpers::clearance_target(ctx, CLEARANCE);
            let blocked = !ctx.paths.has_clear_path(ball, target);
            let score = w.distance_to_ball + w.near_goal + w.angle - penalty(w, blocked);
            self.last_scores.push(ScoredAction { action: helpers::direct_ball_action(ctx, target), score });
        }

        for disk in helpers::eligible_disks(ctx) {
            let Some(pos) = ctx.position(disk) else { continue };
            let to_ball = ball - pos;
            let near = 1.0 - (to_ball.norm() / w.far_distance.max(1e-3)).clamp(0.0, 1.0);
            // 1.0 when disk, ball and goal line up
            let aligned = (angle_between(to_ball, goal - ball).cos() + 1.0) * 0.5;
            let remaining = ctx.rules.remaining_touches_for(disk);

            for kind in DISK_KINDS {
                let Some((action, from)) = build(ctx, kind, disk, remaining) else { continue };
                let blocked = !ctx.paths.has_clear_path(from, action.target);
                let raw = match kind {
                    ActionKind::GoToPosition => 0.1 + w.angle * (1.0 - aligned) * 0.5,
                    ActionKind::TurnAround => w.distance_to_ball * near * 0.5 + w.angle * (1.0 - aligned) * 0.5,
                    ActionKind::Pass => w.distance_to_ball * near + w.angle * aligned * 0.5 + w.near_goal * progress * 0.5,
                    ActionKind::SideOpening => {
                        w.distance_to_ball * near + w.angle * aligned * 0.3 + w.near_goal * progress * 0.3
                    }
                    ActionKind::ShootToGoal => w.distance_to_ball * near + w.angle * aligned + w.near_goal * goal_factor,
                    ActionKind::Advance => {
                        w.distance_to_ball * near + w.angle * aligned + w.near_goal * (1.0 - progress) * 0.8
                    }
                    _ => 0.0,
                };
                let score = raw.clamp(0.0, 1.0) - penalty(w, blocked);
                self.last_scores.push(ScoredAction { action, score });
            }
        }
    }

    fn best(&self) -> Option<&ScoredAction> {
        let mut best: Option<&ScoredAction> = None;
        for scored in &self.last_scores {
            match best {
                Some(b) if scored.score <= b.score + f32::EPSILON => {}
                _ => best = Some(scored),
            }
        }
        best
    }
}

fn penalty(w: &FuzzyWeights, blocked: bool) -> f32 {
    if blocked {
        w.blocked_penalty
    } else {
        0.0
    }
}

/// Action of `kind` for `disk` together with the start of the path it needs.
fn build(ctx: &AiContext, kind: ActionKind, disk: DiskId, remaining: u8) -> Option<(Action, Vec2)> {
    let pos = ctx.position(disk)?;
    let ball = ctx.ball();
    let fwd = helpers::forward(ctx);
    match kind {
        ActionKind::GoToPosition => {
            let target = helpers::better_position_target(ctx, pos, REPOSITION_GAP, REPOSITION_TRAVEL);
            helpers::move_action(ctx, kind, disk, target).map(|a| (a, pos))
        }
        ActionKind::TurnAround => {
            // Only meaningful when the ball is behind the disk
            if (ball - pos).dot(&fwd) >= 0.0 {
                return None;
            }
            let target = helpers::turn_around_target(ctx, pos, REPOSITION_GAP);
            helpers::move_action(ctx, kind, disk, target).map(|a| (a, pos))
        }
        ActionKind::Pass => {
            let (receiver, at) = helpers::forward_receivers(ctx, disk, MIN_FORWARD, RECEIVER_RANGE)
                .into_iter()
                .next()?;
            let target = helpers::pass_target(ctx, at);
            helpers::redirect_action(ctx, kind, disk, target, Some(receiver), true).map(|a| (a, ball))
        }
        ActionKind::SideOpening => {
            let (receiver, at) = helpers::lateral_receivers(ctx, disk, RECEIVER_RANGE * 0.5, MIN_LATERAL)
                .into_iter()
                .next()?;
            let target = helpers::side_opening_target(ctx, at);
            helpers::redirect_action(ctx, kind, disk, target, Some(receiver), true).map(|a| (a, ball))
        }
        ActionKind::ShootToGoal => {
            let target = helpers::shot_target(ctx);
            helpers::redirect_action(ctx, kind, disk, target, None, false).map(|a| (a, ball))
        }
        ActionKind::Advance => {
            if remaining < 2 {
                return None;
            }
            let target = helpers::advance_target(ctx, ADVANCE_STEP);
            helpers::redirect_action(ctx, kind, disk, target, None, true).map(|a| (a, ball))
        }
        _ => None,
    }
}

impl AiPolicy for FuzzyPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fuzzy
    }

    fn select_action(&mut self, ctx: &AiContext) -> Step {
        if let Some(action) = &self.selected {
            return Step::Done(action.clone());
        }
        self.score_all(ctx);
        let action = match self.best() {
            Some(best) => {
                log::debug!("fuzzy picks {:?} by {:?} (score {:.3})", best.action.kind, best.action.actor, best.score);
                best.action.clone()
            }
            None => {
                log::warn!("fuzzy found no playable action for {}, falling back to a null touch", ctx.side);
                helpers::none_action(ctx, helpers::nearest_eligible(ctx))
            }
        };
        self.selected = Some(action.clone());
        Step::Done(action)
    }

    fn selected_action(&self) -> Option<&Action> {
        self.selected.as_ref()
    }

    fn selected_action_mut(&mut self) -> Option<&mut Action> {
        self.selected.as_mut()
    }

    fn clear_selected_action(&mut self) {
        self.selected = None;
    }
}
