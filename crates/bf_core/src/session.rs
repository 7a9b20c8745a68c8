//! # Match session
//!
//! Glue between the host loop and the core: owns the board mirror, the rule
//! engine, the force calculator and the clock.
//!
//! ## Turn flow
//! ```text
//! begin_turn -> select_disk / touch_ball / apply_action
//!            -> report(PhysicsEvent)*            (while things move)
//!            -> resolve_turn(probe)              (once the world is stable)
//!            -> place_for_set_piece(...)         (dead ball only)
//! ```

use tracing::{debug, info, warn};

use crate::engine::ai::{helpers, Action, ActionKind, AiContext, AiPolicy, ClearPath, SegmentClearance, Step};
use crate::engine::config::EngineConfig;
use crate::engine::execution_noise::ExecutionNoise;
use crate::engine::force::{DistanceCalibrationTable, ForceCalculator, ForceVector};
use crate::engine::rules::{RuleEngine, RuleState, TurnOutcome};
use crate::error::{CoreError, Result};
use crate::models::{Board, Controller, DiskId, MatchClock, TeamSide, Vec2};
use crate::net::RuleResult;
use crate::save::{decompress_and_deserialize, serialize_and_compress, MatchSave, SaveError};

/// Upper bound on `select_action` calls for one decision.
const MAX_DECISION_STEPS: usize = 16;

/// What the physics layer can tell about the world.
pub trait WorldProbe {
    /// Nothing on the table is moving any more.
    fn is_stable(&self) -> bool;

    /// Whether the keeper of `side` is still standing.
    fn keeper_facing_up(&self, _side: TeamSide) -> bool {
        true
    }
}

/// Collision and boundary events reported while pieces move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    BallHitDisk { team: TeamSide },
    DiskHitDisk { a: TeamSide, b: TeamSide, at: Vec2 },
    BallOutSide { at: Vec2 },
    BallOutByline { upper: bool, lateral: f32 },
    BallInGoal { upper: bool },
}

pub struct MatchSession {
    config: EngineConfig,
    board: Board,
    rules: RuleEngine,
    forces: ForceCalculator,
    clock: MatchClock,
    noise: Option<ExecutionNoise>,
}

impl MatchSession {
    pub fn new(config: EngineConfig, home: Controller, away: Controller) -> Result<Self> {
        Self::with_calibration(config, DistanceCalibrationTable::default(), home, away)
    }

    pub fn with_calibration(
        config: EngineConfig,
        table: DistanceCalibrationTable,
        home: Controller,
        away: Controller,
    ) -> Result<Self> {
        config.validate()?;
        let board = Board::kickoff_layout(config.pitch, home, away);
        let rules = RuleEngine::new(config.rules.clone(), config.pitch);
        let forces = ForceCalculator::new(table, config.force.clone(), config.pitch);
        let noise = ExecutionNoise::from_config(&config.execution);
        Ok(Self { config, board, rules, forces, clock: MatchClock::default(), noise })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mirror of final positions; the host writes what physics settled on.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn forces(&self) -> &ForceCalculator {
        &self.forces
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn active_team(&self) -> TeamSide {
        self.rules.active_team()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn start_half(&mut self, first: bool) {
        self.rules.start_half(first);
        self.clock.start_half(first);
        self.board.reset_for_kickoff(self.rules.upper_team());
        for side in [TeamSide::Home, TeamSide::Away] {
            self.board.team_mut(side).last_active_disk = None;
        }
        info!(half = self.rules.half(), kickoff = %self.rules.active_team(), "half started");
    }

    pub fn begin_turn(&mut self) -> TeamSide {
        let side = self.rules.new_turn();
        debug!(team = %side, state = %self.rules.state(), "turn begins");
        side
    }

    /// Advance play time; true once the half is over.
    pub fn advance_clock(&mut self, dt_secs: f32) -> bool {
        let over = self.clock.advance(dt_secs);
        if over {
            info!(half = self.clock.half, "half time reached");
        }
        over
    }

    // ========================================================================
    // Touches
    // ========================================================================

    pub fn select_disk(&mut self, disk: DiskId) -> Result<()> {
        if !disk.is_valid() {
            return Err(CoreError::UnknownDisk(disk));
        }
        if disk.side != self.rules.active_team() || disk.is_keeper() {
            return Err(CoreError::NotYourTurn(disk));
        }
        if !self.rules.set_disk_act(disk) {
            return Err(if self.rules.remaining_global_touches() == 0 {
                CoreError::NoTouchesLeft
            } else {
                CoreError::NoMoreMoves(disk)
            });
        }
        self.board.team_mut(disk.side).last_active_disk = Some(disk);
        Ok(())
    }

    pub fn touch_ball(&mut self) -> Result<()> {
        if !self.rules.set_ball_act() {
            return Err(CoreError::NoTouchesLeft);
        }
        Ok(())
    }

    /// Charge the touch for `action` and return the force to apply. AI teams
    /// get execution error on top.
    pub fn apply_action(&mut self, action: &Action) -> Result<ForceVector> {
        match action.actor {
            Some(disk) => self.select_disk(disk)?,
            None => self.touch_ball()?,
        }
        if action.kind == ActionKind::ShootToGoal {
            self.rules.declare_shot();
        }

        let side = self.rules.active_team();
        let mut force = action.force;
        if self.board.team(side).is_ai() {
            if let Some(noise) = self.noise.as_mut() {
                force = noise.perturb(force);
            }
        }
        debug!(kind = ?action.kind, actor = ?action.actor, force = force.magnitude(), "action applied");
        Ok(force)
    }

    pub fn report(&mut self, event: PhysicsEvent) {
        match event {
            PhysicsEvent::BallHitDisk { team } => self.rules.ball_collide_disk(team),
            PhysicsEvent::DiskHitDisk { a, b, at } => self.rules.disk_collide_disk(a, b, at),
            PhysicsEvent::BallOutSide { at } => self.rules.ball_exit_at_side(at),
            PhysicsEvent::BallOutByline { upper, lateral } => self.rules.ball_exit_at_byline(upper, lateral),
            PhysicsEvent::BallInGoal { upper } => self.rules.ball_enter_goal(upper),
        }
    }

    pub fn resolve_turn(&mut self, probe: &dyn WorldProbe, online: bool) -> Result<TurnOutcome> {
        if !probe.is_stable() {
            return Err(CoreError::WorldNotStable);
        }
        for side in [TeamSide::Home, TeamSide::Away] {
            self.rules.keeper_posture(side, probe.keeper_facing_up(side));
        }
        let outcome = self.rules.ball_at_final_position(online);
        if let Some(scorer) = outcome.goal {
            info!(scorer = %scorer, home = self.rules.score().home, away = self.rules.score().away, "goal");
        } else if outcome.changed_ball_owner {
            info!(team = %outcome.active, state = %outcome.state, "possession changes");
        }
        Ok(outcome)
    }

    pub fn take_outgoing(&mut self) -> Vec<RuleResult> {
        self.rules.take_outgoing()
    }

    /// Apply the peer's authoritative resolution of the current turn.
    pub fn apply_remote(&mut self, result: &RuleResult) -> TurnOutcome {
        self.rules.apply_rule_result(result)
    }

    // ========================================================================
    // AI
    // ========================================================================

    fn context<'a>(&'a self, side: TeamSide, paths: &'a dyn ClearPath) -> AiContext<'a> {
        AiContext {
            side,
            board: &self.board,
            rules: &self.rules,
            forces: &self.forces,
            paths,
            config: &self.config,
        }
    }

    /// Run `policy` until it commits, for the active team.
    pub fn decide(&self, policy: &mut dyn AiPolicy) -> Action {
        let paths = SegmentClearance::new(&self.board);
        self.decide_with(policy, &paths)
    }

    pub fn decide_with(&self, policy: &mut dyn AiPolicy, paths: &dyn ClearPath) -> Action {
        let ctx = self.context(self.rules.active_team(), paths);
        for _ in 0..MAX_DECISION_STEPS {
            if let Step::Done(action) = policy.select_action(&ctx) {
                return action;
            }
        }
        warn!(policy = %policy.kind(), "policy did not commit, playing a null touch");
        helpers::none_action(&ctx, None)
    }

    /// Put the ball on the restart spot and let the policies place the taker
    /// and the defending keeper. Returns the taker, if one was placed.
    pub fn place_for_set_piece(
        &mut self,
        taker_policy: Option<&mut dyn AiPolicy>,
        keeper_policy: Option<&mut dyn AiPolicy>,
    ) -> Result<Option<DiskId>> {
        let state = self.rules.state();
        if !state.is_dead_ball() {
            return Ok(None);
        }
        if state == RuleState::Middle {
            self.board.reset_for_kickoff(self.rules.upper_team());
        } else if let Some(spot) = self.rules.set_piece_at() {
            self.board.ball.position = spot;
        }

        let attacker = self.rules.active_team();
        let mut taker = None;
        if let Some(policy) = taker_policy {
            if let Some(disk) = self.board.nearest_to_ball(attacker) {
                let spot = {
                    let paths = SegmentClearance::new(&self.board);
                    let ctx = self.context(attacker, &paths);
                    policy.do_disk_position(&ctx, disk)
                };
                if let Some(spot) = spot {
                    self.board.set_position(disk, spot)?;
                    taker = Some(disk);
                }
            }
        }

        if let Some(policy) = keeper_policy {
            let defender = attacker.opponent();
            let keeper = DiskId::keeper(defender);
            let spot = {
                let paths = SegmentClearance::new(&self.board);
                let ctx = self.context(defender, &paths);
                policy.do_goal_keeper_position(&ctx, keeper)
            };
            if let Some(spot) = spot {
                self.board.set_position(keeper, spot)?;
            }
        }

        debug!(state = %state, taker = ?taker, "set piece placed");
        Ok(taker)
    }

    /// Let a committed shot react to where the keeper now stands.
    pub fn refine_shot(&self, policy: &mut dyn AiPolicy) {
        let paths = SegmentClearance::new(&self.board);
        let ctx = self.context(self.rules.active_team(), &paths);
        policy.calculate_goal_shoot(&ctx);
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_save(&self) -> MatchSave {
        MatchSave::new(self.rules.snapshot(), self.clock, self.board.clone())
    }

    pub fn save(&self) -> std::result::Result<Vec<u8>, SaveError> {
        serialize_and_compress(&self.to_save())
    }

    /// Load a save. Nothing in the session changes unless the whole save is
    /// valid.
    pub fn load(&mut self, bytes: &[u8]) -> std::result::Result<(), SaveError> {
        let save = decompress_and_deserialize(bytes)?;
        self.apply_save(save)
    }

    pub fn apply_save(&mut self, save: MatchSave) -> std::result::Result<(), SaveError> {
        if save.board.pitch != self.config.pitch {
            warn!("save was made on a different pitch, refusing to load");
            return Err(SaveError::Corrupted("pitch does not match configuration".into()));
        }
        let mut rules = self.rules.clone();
        rules.restore(&save.rules).map_err(|e| {
            warn!(error = %e, "rule snapshot rejected");
            SaveError::Corrupted(e.to_string())
        })?;
        self.rules = rules;
        self.clock = save.clock;
        self.board = save.board;
        info!(half = self.clock.half, "match restored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ai::{make_policy, PolicyKind};
    use crate::models::vec2;

    struct Still;

    impl WorldProbe for Still {
        fn is_stable(&self) -> bool {
            true
        }
    }

    struct Rolling;

    impl WorldProbe for Rolling {
        fn is_stable(&self) -> bool {
            false
        }
    }

    struct KeeperDown(TeamSide);

    impl WorldProbe for KeeperDown {
        fn is_stable(&self) -> bool {
            true
        }

        fn keeper_facing_up(&self, side: TeamSide) -> bool {
            side != self.0
        }
    }

    fn session() -> MatchSession {
        let mut s = MatchSession::new(
            EngineConfig::deterministic(),
            Controller::Human,
            Controller::Ai(PolicyKind::Decourt),
        )
        .unwrap();
        s.start_half(true);
        s
    }

    fn home(slot: u8) -> DiskId {
        DiskId::new(TeamSide::Home, slot)
    }

    #[test]
    fn test_kickoff_turn() {
        let mut s = session();
        assert_eq!(s.begin_turn(), TeamSide::Home);
        s.select_disk(home(8)).unwrap();
        assert_eq!(s.board().team(TeamSide::Home).last_active_disk, Some(home(8)));
        s.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
        let outcome = s.resolve_turn(&Still, false).unwrap();
        assert_eq!(outcome.state, RuleState::Normal);
        assert_eq!(outcome.active, TeamSide::Home);
    }

    #[test]
    fn test_selection_errors() {
        let mut s = session();
        s.begin_turn();
        assert!(matches!(
            s.select_disk(DiskId::new(TeamSide::Away, 1)),
            Err(CoreError::NotYourTurn(_))
        ));
        assert!(matches!(s.select_disk(DiskId::new(TeamSide::Home, 11)), Err(CoreError::UnknownDisk(_))));
        s.select_disk(home(8)).unwrap();
        // Kickoff taker has a single touch
        let err = s.select_disk(home(8)).unwrap_err();
        assert!(matches!(err, CoreError::NoMoreMoves(_)));
        assert!(err.is_user_recoverable());
    }

    #[test]
    fn test_resolve_waits_for_stable_world() {
        let mut s = session();
        s.begin_turn();
        s.select_disk(home(8)).unwrap();
        assert!(matches!(s.resolve_turn(&Rolling, false), Err(CoreError::WorldNotStable)));
        // Nothing was consumed: resolving later still works
        s.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
        assert_eq!(s.resolve_turn(&Still, false).unwrap().state, RuleState::Normal);
    }

    #[test]
    fn test_goal_with_keeper_down_is_void() {
        let mut s = session();
        s.begin_turn();
        s.select_disk(home(8)).unwrap();
        s.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
        // Home attacks the lower goal in the first half
        s.report(PhysicsEvent::BallInGoal { upper: false });
        let outcome = s.resolve_turn(&KeeperDown(TeamSide::Away), false).unwrap();
        assert!(!outcome.is_goal());
        assert_eq!(outcome.state, RuleState::GoalKick);
        assert_eq!(s.rules().score().home, 0);
    }

    #[test]
    fn test_ai_turn_and_set_piece_placement() {
        let mut s = session();
        // Home kicks off, touches the ball out over the sideline
        s.begin_turn();
        s.select_disk(home(8)).unwrap();
        s.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
        s.report(PhysicsEvent::BallOutSide { at: vec2(40.5, -10.0) });
        let outcome = s.resolve_turn(&Still, false).unwrap();
        assert_eq!(outcome.state, RuleState::ThrowIn);
        assert_eq!(outcome.active, TeamSide::Away);

        let mut away_ai = make_policy(PolicyKind::Decourt, s.config());
        let mut home_ai = make_policy(PolicyKind::Decourt, s.config());
        let taker = s
            .place_for_set_piece(Some(away_ai.as_mut()), Some(home_ai.as_mut()))
            .unwrap()
            .unwrap();
        assert_eq!(taker.side, TeamSide::Away);
        let spot = s.rules().set_piece_at().unwrap();
        assert_eq!(s.board().ball.position, spot);

        s.begin_turn();
        let action = s.decide(away_ai.as_mut());
        assert_ne!(action.kind, ActionKind::None);
        let force = s.apply_action(&action).unwrap();
        assert!(force.magnitude() >= 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let mut s = session();
        s.begin_turn();
        s.select_disk(home(8)).unwrap();
        s.report(PhysicsEvent::BallHitDisk { team: TeamSide::Home });
        s.resolve_turn(&Still, false).unwrap();
        s.advance_clock(120.0);
        let bytes = s.save().unwrap();

        let mut other = session();
        other.load(&bytes).unwrap();
        assert_eq!(other.rules().snapshot(), s.rules().snapshot());
        assert_eq!(other.clock(), s.clock());

        let before = other.rules().snapshot();
        assert!(other.load(&bytes[..bytes.len() - 1]).is_err());
        assert_eq!(other.rules().snapshot(), before);
    }

    #[test]
    fn test_clock() {
        let mut s = session();
        assert!(!s.advance_clock(600.0));
        assert!(s.advance_clock(300.0));
        assert!(!s.clock().is_full_time());
        s.start_half(false);
        assert_eq!(s.active_team(), TeamSide::Away);
    }
}
