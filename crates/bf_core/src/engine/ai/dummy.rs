//! Baseline policy: the disk nearest the ball shoots when the cut allows it,
//! otherwise it walks up behind the ball.

use super::helpers;
use super::{Action, ActionKind, AiContext, AiPolicy, PolicyKind, Step};

const REPOSITION_GAP: f32 = 1.5;
const REPOSITION_TRAVEL: f32 = 20.0;
const CLEARANCE: f32 = 35.0;

#[derive(Debug, Default)]
pub struct DummyPolicy {
    selected: Option<Action>,
}

impl DummyPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    fn decide(ctx: &AiContext) -> Action {
        if helpers::ball_in_own_area(ctx) {
            return helpers::direct_ball_action(ctx, helpers::clearance_target(ctx, CLEARANCE));
        }
        let Some(disk) = helpers::nearest_eligible(ctx) else {
            return helpers::none_action(ctx, None);
        };
        let aim = helpers::shot_target(ctx);
        helpers::redirect_action(ctx, ActionKind::ShootToGoal, disk, aim, None, false)
            .or_else(|| {
                let pos = ctx.position(disk)?;
                let target = helpers::better_position_target(ctx, pos, REPOSITION_GAP, REPOSITION_TRAVEL);
                helpers::move_action(ctx, ActionKind::GoToPosition, disk, target)
            })
            .unwrap_or_else(|| helpers::none_action(ctx, Some(disk)))
    }
}

impl AiPolicy for DummyPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Dummy
    }

    fn select_action(&mut self, ctx: &AiContext) -> Step {
        let action = self.selected.get_or_insert_with(|| Self::decide(ctx)).clone();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ai::SegmentClearance;
    use crate::engine::config::EngineConfig;
    use crate::engine::force::ForceCalculator;
    use crate::engine::rules::RuleEngine;
    use crate::models::{vec2, Board, Controller, DiskId, TeamSide};

    #[test]
    fn test_nearest_disk_shoots() {
        let config = EngineConfig::deterministic();
        let mut board = Board::kickoff_layout(config.pitch, Controller::Human, Controller::Human);
        let mut rules = RuleEngine::new(config.rules.clone(), config.pitch);
        rules.start_half(true);
        rules.new_turn();
        // Home attacks towards negative y; line a forward up behind the ball
        board.ball.position = vec2(0.0, -20.0);
        board.set_position(DiskId::new(TeamSide::Home, 9), vec2(0.0, -16.0)).unwrap();

        let forces = ForceCalculator::default();
        let paths = SegmentClearance::new(&board);
        let ctx = AiContext {
            side: TeamSide::Home,
            board: &board,
            rules: &rules,
            forces: &forces,
            paths: &paths,
            config: &config,
        };
        let mut policy = DummyPolicy::new();
        let action = policy.select_action(&ctx).into_action().unwrap();
        assert_eq!(action.kind, ActionKind::ShootToGoal);
        assert_eq!(policy.selected_player(), Some(DiskId::new(TeamSide::Home, 9)));
        assert!(policy.force().unwrap().force().y < 0.0);

        policy.clear_selected_action();
        assert!(!policy.has_action());
    }
}
