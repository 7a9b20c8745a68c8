//! Geometry shared by every policy: attack direction, goal factor, target
//! points and the builders turning a target into a committed `Action`.

use super::{Action, ActionKind, AiContext};
use crate::engine::force::ForceVector;
use crate::engine::rules::RuleState;
use crate::models::geometry::{angle_between, distance, normalize_or_zero};
use crate::models::{vec2, DiskId, PitchConfig, Vec2};

/// Space left between a receiving disk and the ball it is sent.
pub const RECEIVE_GAP: f32 = 0.5;

/// Unit vector of the team's attack along the pitch.
pub fn forward(ctx: &AiContext) -> Vec2 {
    vec2(0.0, ctx.board.pitch.inward(ctx.rules.defends_upper(ctx.side)))
}

pub fn opponent_goal(ctx: &AiContext) -> Vec2 {
    ctx.board.pitch.goal_center(ctx.attacks_upper())
}

/// Centre distance between a field disk and the ball at contact.
pub fn reach(pitch: &PitchConfig) -> f32 {
    pitch.disk_radius + pitch.ball_radius
}

/// How much of the goal mouth is visible from `ball`, 1.0 being the view
/// from the penalty spot or better.
pub fn goal_factor(pitch: &PitchConfig, ball: Vec2, upper: bool) -> f32 {
    let (left, right) = pitch.goal_posts(upper);
    let opening = angle_between(left - ball, right - ball);
    let reference = 2.0 * (pitch.goal_half_width / pitch.penalty_spot_distance).atan();
    if reference <= 0.0 {
        return 0.0;
    }
    (opening / reference).clamp(0.0, 1.0)
}

pub fn ball_in_own_area(ctx: &AiContext) -> bool {
    ctx.board
        .pitch
        .in_penalty_area(ctx.ball(), ctx.rules.defends_upper(ctx.side))
}

/// Field disks the rule engine would currently accept, in slot order.
pub fn eligible_disks(ctx: &AiContext) -> Vec<DiskId> {
    ctx.board
        .team(ctx.side)
        .field_disks()
        .map(|d| d.id)
        .filter(|id| ctx.rules.can_select(*id))
        .collect()
}

/// Eligible disks sorted by distance to the ball, lowest slot first on ties.
pub fn eligible_by_distance(ctx: &AiContext) -> Vec<DiskId> {
    let ball = ctx.ball();
    let mut disks: Vec<(DiskId, f32)> = eligible_disks(ctx)
        .into_iter()
        .filter_map(|id| ctx.position(id).map(|p| (id, distance(p, ball))))
        .collect();
    disks.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.slot.cmp(&b.0.slot)));
    disks.into_iter().map(|(id, _)| id).collect()
}

pub fn nearest_eligible(ctx: &AiContext) -> Option<DiskId> {
    eligible_by_distance(ctx).into_iter().next()
}

/// Teammates at least `min_forward` ahead of the ball and within
/// `max_distance` of it, most advanced first.
pub fn forward_receivers(
    ctx: &AiContext,
    actor: DiskId,
    min_forward: f32,
    max_distance: f32,
) -> Vec<(DiskId, Vec2)> {
    let ball = ctx.ball();
    let fwd = forward(ctx);
    let mut out: Vec<(DiskId, Vec2, f32)> = ctx
        .board
        .team(ctx.side)
        .field_disks()
        .filter(|d| d.id != actor)
        .filter_map(|d| {
            let ahead = (d.position - ball).dot(&fwd);
            (ahead >= min_forward && distance(d.position, ball) <= max_distance)
                .then_some((d.id, d.position, ahead))
        })
        .collect();
    out.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.slot.cmp(&b.0.slot)));
    out.into_iter().map(|(id, p, _)| (id, p)).collect()
}

/// Teammates beside the ball, nearest first.
pub fn lateral_receivers(
    ctx: &AiContext,
    actor: DiskId,
    max_distance: f32,
    min_lateral: f32,
) -> Vec<(DiskId, Vec2)> {
    let ball = ctx.ball();
    let mut out: Vec<(DiskId, Vec2, f32)> = ctx
        .board
        .team(ctx.side)
        .field_disks()
        .filter(|d| d.id != actor)
        .filter_map(|d| {
            let dist = distance(d.position, ball);
            (dist <= max_distance && (d.position.x - ball.x).abs() >= min_lateral)
                .then_some((d.id, d.position, dist))
        })
        .collect();
    out.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.slot.cmp(&b.0.slot)));
    out.into_iter().map(|(id, p, _)| (id, p)).collect()
}

// ============================================================================
// Target points
// ============================================================================

/// Aim point just over the goal line, into the larger gap beside the keeper.
pub fn shot_target(ctx: &AiContext) -> Vec2 {
    let pitch = &ctx.board.pitch;
    let upper = ctx.attacks_upper();
    let (left, right) = pitch.goal_posts(upper);
    let margin = pitch.ball_radius * 1.5;
    let beyond = -pitch.inward(upper) * pitch.ball_radius * 2.0;

    let keeper = ctx
        .board
        .team(ctx.side.opponent())
        .keeper()
        .map(|k| k.position)
        .filter(|k| pitch.in_penalty_area(*k, upper));

    let x = match keeper {
        Some(k) => {
            let kr = pitch.keeper_radius;
            let left_gap = (k.x - kr) - left.x;
            let right_gap = right.x - (k.x + kr);
            if left_gap >= right_gap {
                (left.x + margin + k.x - kr) * 0.5
            } else {
                (right.x - margin + k.x + kr) * 0.5
            }
        }
        None => 0.0,
    };
    let lo = left.x + margin;
    let hi = right.x - margin;
    vec2(if lo < hi { x.clamp(lo, hi) } else { 0.0 }, left.y + beyond)
}

pub fn advance_target(ctx: &AiContext, step: f32) -> Vec2 {
    let ball = ctx.ball();
    let mut dir = normalize_or_zero(opponent_goal(ctx) - ball);
    if dir == Vec2::zeros() {
        dir = forward(ctx);
    }
    clamp_inside(&ctx.board.pitch, ball + dir * step, ctx.board.pitch.ball_radius)
}

/// Spot diagonally behind the ball so the disk ends up able to play forward.
pub fn turn_around_target(ctx: &AiContext, actor: Vec2, gap: f32) -> Vec2 {
    let pitch = &ctx.board.pitch;
    let ball = ctx.ball();
    let offset = reach(pitch) + gap;
    let side = if actor.x >= ball.x { 1.0 } else { -1.0 };
    let target = ball - forward(ctx) * offset + vec2(side * offset, 0.0);
    clamp_inside(pitch, target, pitch.disk_radius)
}

/// Spot behind the ball on its line to goal, at most `max_travel` away.
pub fn better_position_target(ctx: &AiContext, actor: Vec2, gap: f32, max_travel: f32) -> Vec2 {
    let pitch = &ctx.board.pitch;
    let ball = ctx.ball();
    let mut line = normalize_or_zero(opponent_goal(ctx) - ball);
    if line == Vec2::zeros() {
        line = forward(ctx);
    }
    let mut target = ball - line * (reach(pitch) + gap);
    let travel = distance(actor, target);
    if travel > max_travel && travel > 0.0 {
        target = actor + (target - actor) * (max_travel / travel);
    }
    clamp_inside(pitch, target, pitch.disk_radius)
}

/// Where a pass should stop: in front of the receiver, on the ball side.
pub fn pass_target(ctx: &AiContext, receiver: Vec2) -> Vec2 {
    let ball = ctx.ball();
    receiver - normalize_or_zero(receiver - ball) * (reach(&ctx.board.pitch) + RECEIVE_GAP)
}

/// Lateral lay-off: the ball is left just ahead of the receiver.
pub fn side_opening_target(ctx: &AiContext, receiver: Vec2) -> Vec2 {
    receiver + forward(ctx) * (reach(&ctx.board.pitch) + RECEIVE_GAP)
}

/// Clearance out of the own area, angled towards the wing the ball is on.
pub fn clearance_target(ctx: &AiContext, length: f32) -> Vec2 {
    let pitch = &ctx.board.pitch;
    let ball = ctx.ball();
    let wing = if ball.x.abs() < 1e-3 { 0.0 } else { ball.x.signum() * 0.5 };
    let dir = normalize_or_zero(forward(ctx) + vec2(wing, 0.0));
    clamp_inside(pitch, ball + dir * length, pitch.ball_radius)
}

fn clamp_inside(pitch: &PitchConfig, p: Vec2, radius: f32) -> Vec2 {
    let hx = (pitch.half_width - radius).max(0.0);
    let hy = (pitch.half_length - radius).max(0.0);
    vec2(p.x.clamp(-hx, hx), p.y.clamp(-hy, hy))
}

// ============================================================================
// Action builders
// ============================================================================

/// Strike the ball with `disk` so it travels to `target`. `None` when the
/// cut is not playable.
pub fn redirect_action(
    ctx: &AiContext,
    kind: ActionKind,
    disk: DiskId,
    target: Vec2,
    target_disk: Option<DiskId>,
    must_stop: bool,
) -> Option<Action> {
    let actor = ctx.position(disk)?;
    let force = ctx.forces.ball_redirect(actor, ctx.ball(), target, must_stop)?;
    Some(Action {
        kind,
        actor: Some(disk),
        target,
        target_disk,
        actor_start: actor,
        target_start: target_disk.and_then(|d| ctx.position(d)),
        force: ForceVector::new(actor, force),
    })
}

/// Move `disk` so it comes to rest at `target`.
pub fn move_action(ctx: &AiContext, kind: ActionKind, disk: DiskId, target: Vec2) -> Option<Action> {
    let actor = ctx.position(disk)?;
    Some(Action {
        kind,
        actor: Some(disk),
        target,
        target_disk: None,
        actor_start: actor,
        target_start: None,
        force: ForceVector::new(actor, ctx.forces.target_follow(actor, target)),
    })
}

pub fn direct_ball_action(ctx: &AiContext, target: Vec2) -> Action {
    let ball = ctx.ball();
    Action {
        kind: ActionKind::DirectBallTouch,
        actor: None,
        target,
        target_disk: None,
        actor_start: ball,
        target_start: None,
        force: ForceVector::new(ball, ctx.forces.target_follow(ball, target)),
    }
}

/// Zero-force touch, used when nothing sensible can be played.
pub fn none_action(ctx: &AiContext, disk: Option<DiskId>) -> Action {
    let at = disk.and_then(|d| ctx.position(d)).unwrap_or_else(|| ctx.ball());
    Action {
        kind: ActionKind::None,
        actor: disk,
        target: at,
        target_disk: None,
        actor_start: at,
        target_start: None,
        force: ForceVector::zero(at),
    }
}

// ============================================================================
// Set-piece hooks
// ============================================================================

/// Spot behind the ball from which `disk` takes the restart.
pub fn set_piece_taker_spot(ctx: &AiContext, disk: DiskId) -> Option<Vec2> {
    ctx.position(disk)?;
    let pitch = &ctx.board.pitch;
    let ball = ctx.ball();
    let aim = if ctx.rules.state() == RuleState::PenaltyKick {
        shot_target(ctx)
    } else {
        opponent_goal(ctx)
    };
    let mut dir = normalize_or_zero(aim - ball);
    if dir == Vec2::zeros() {
        dir = forward(ctx);
    }
    let gap = ctx.config.decourt.reposition_gap;
    Some(clamp_inside(pitch, ball - dir * (reach(pitch) + gap), pitch.disk_radius))
}

/// Keeper spot: on the goal line, stepped out towards the ball and kept
/// between the posts.
pub fn keeper_spot(ctx: &AiContext, keeper: DiskId) -> Option<Vec2> {
    if !keeper.is_keeper() {
        return None;
    }
    let pitch = &ctx.board.pitch;
    let upper = ctx.rules.defends_upper(keeper.side);
    let goal = pitch.goal_center(upper);
    let inward = pitch.inward(upper);
    let dir = normalize_or_zero(ctx.ball() - goal);
    let step = ctx.config.decourt.keeper_step_out + pitch.keeper_radius;
    let spot = goal + dir * step;
    let x = spot.x.clamp(-pitch.goal_half_width, pitch.goal_half_width);
    let depth = ((spot.y - goal.y) * inward).max(pitch.keeper_radius);
    Some(vec2(x, goal.y + inward * depth))
}

/// Re-aim a committed shot at the current keeper placement. Keeps the old
/// aim when the new cut is not playable.
pub fn reaim_shot(ctx: &AiContext, action: &mut Action) -> bool {
    let Some(actor) = action.actor.and_then(|d| ctx.position(d)) else {
        return false;
    };
    let target = shot_target(ctx);
    match ctx.forces.ball_redirect(actor, ctx.ball(), target, false) {
        Some(force) => {
            log::debug!("shot re-aimed from {:?} to {:?}", action.target, target);
            action.target = target;
            action.force = ForceVector::new(actor, force);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ai::SegmentClearance;
    use crate::engine::config::EngineConfig;
    use crate::engine::force::ForceCalculator;
    use crate::engine::rules::RuleEngine;
    use crate::models::{Board, Controller, TeamSide};

    struct Fixture {
        board: Board,
        rules: RuleEngine,
        forces: ForceCalculator,
        config: EngineConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let config = EngineConfig::default();
            let board = Board::kickoff_layout(config.pitch, Controller::Human, Controller::Human);
            let mut rules = RuleEngine::new(config.rules.clone(), config.pitch);
            rules.start_half(true);
            Self { board, rules, forces: ForceCalculator::default(), config }
        }

        fn with<R>(&self, side: TeamSide, f: impl FnOnce(&AiContext) -> R) -> R {
            let paths = SegmentClearance::new(&self.board);
            let ctx = AiContext {
                side,
                board: &self.board,
                rules: &self.rules,
                forces: &self.forces,
                paths: &paths,
                config: &self.config,
            };
            f(&ctx)
        }
    }

    #[test]
    fn test_forward_follows_upper_team() {
        let fx = Fixture::new();
        // Home defends the upper byline in the first half
        assert_eq!(fx.with(TeamSide::Home, forward), vec2(0.0, -1.0));
        assert_eq!(fx.with(TeamSide::Away, forward), vec2(0.0, 1.0));
    }

    #[test]
    fn test_goal_factor_falls_with_distance() {
        let pitch = PitchConfig::default();
        let spot = pitch.penalty_spot(false);
        assert!((goal_factor(&pitch, spot, false) - 1.0).abs() < 1e-4);
        let far = goal_factor(&pitch, vec2(0.0, 0.0), false);
        let wide = goal_factor(&pitch, vec2(30.0, -50.0), false);
        assert!(far < 0.3);
        assert!(wide < goal_factor(&pitch, vec2(0.0, -40.0), false));
    }

    #[test]
    fn test_shot_target_avoids_keeper() {
        let mut fx = Fixture::new();
        // Away keeper defends the lower goal; push it to the right post
        let keeper = DiskId::keeper(TeamSide::Away);
        fx.board.set_position(keeper, vec2(2.5, -58.0)).unwrap();
        let aim = fx.with(TeamSide::Home, shot_target);
        assert!(aim.x < 0.0);
        assert!(aim.y < -60.0);
    }

    #[test]
    fn test_keeper_spot_stays_between_posts() {
        let mut fx = Fixture::new();
        fx.board.ball.position = vec2(35.0, -50.0);
        let spot = fx
            .with(TeamSide::Away, |ctx| keeper_spot(ctx, DiskId::keeper(TeamSide::Away)))
            .unwrap();
        let pitch = fx.board.pitch;
        assert!(spot.x.abs() <= pitch.goal_half_width + 1e-4);
        assert!(spot.y > -pitch.half_length);
        assert!(fx
            .with(TeamSide::Away, |ctx| keeper_spot(ctx, DiskId::new(TeamSide::Away, 2)))
            .is_none());
    }

    #[test]
    fn test_taker_spot_behind_ball() {
        let mut fx = Fixture::new();
        fx.board.ball.position = vec2(0.0, -10.0);
        let spot = fx
            .with(TeamSide::Home, |ctx| set_piece_taker_spot(ctx, DiskId::new(TeamSide::Home, 8)))
            .unwrap();
        // Home attacks towards negative y, so the taker stands above the ball
        assert!(spot.y > -10.0);
        assert!(spot.x.abs() < 1e-4);
    }

    #[test]
    fn test_none_action_has_zero_force() {
        let fx = Fixture::new();
        let action = fx.with(TeamSide::Home, |ctx| none_action(ctx, None));
        assert_eq!(action.kind, ActionKind::None);
        assert!(action.is_direct_ball());
        assert_eq!(action.force.magnitude(), 0.0);
    }

    #[test]
    fn test_eligible_excludes_keeper_and_other_team() {
        let fx = Fixture::new();
        let home = fx.with(TeamSide::Home, eligible_disks);
        assert_eq!(home.len(), 10);
        assert!(home.iter().all(|d| !d.is_keeper()));
        assert!(fx.with(TeamSide::Away, eligible_disks).is_empty());
    }
}
