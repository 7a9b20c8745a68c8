//! Rule Engine - turn and possession state machine
//!
//! ## Turn lifecycle
//! 1. `new_turn()` clears the per-turn latches
//! 2. `set_disk_act()` / `set_ball_act()` charge the touch
//! 3. Collision reporters latch what happened while things move
//! 4. `ball_at_final_position()` runs once the world is stable and decides
//!    the next state and who plays next
//!
//! ## Resolution order (fixed, do not change)
//! 1. Acting disk hit an enemy disk first (foul)
//! 2. Acting disk never reached the ball first
//! 3. Ball left over a sideline
//! 4. Ball left over a byline / entered a goal
//! 5. Team ran out of touches
//! 6. Plain contact, ball still in play

use std::collections::VecDeque;

use super::snapshot::RuleSnapshot;
use super::touch_budget::TouchBudget;
use super::types::{BallAction, BallEvent, FirstContact, RuleState, TurnFlags, TurnOutcome};
use crate::engine::config::RulesConfig;
use crate::error::{CoreError, Result};
use crate::models::{DiskId, PitchConfig, Score, TeamSide, Vec2};
use crate::net::RuleResult;

/// Explicit rule engine instance, owned by the match session.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    pitch: PitchConfig,
    state: RuleState,
    active: TeamSide,
    /// Team defending the upper (+y) byline
    upper: TeamSide,
    half: u8,
    touches: TouchBudget,
    flags: TurnFlags,
    last_ball_toucher: Option<TeamSide>,
    set_piece_at: Option<Vec2>,
    will_shoot: bool,
    /// Shot announced before the turn it applies to
    pending_shot: bool,
    keeper_down: [bool; 2],
    score: Score,
    /// Outcome of the current turn once resolved; cleared by `new_turn`
    resolved: Option<TurnOutcome>,
    turns_played: u32,
    outbox: VecDeque<RuleResult>,
}

impl RuleEngine {
    pub fn new(rules: RulesConfig, pitch: PitchConfig) -> Self {
        Self {
            pitch,
            state: RuleState::Middle,
            active: TeamSide::Home,
            upper: TeamSide::Home,
            half: 0,
            touches: TouchBudget::new(rules),
            flags: TurnFlags::default(),
            last_ball_toucher: None,
            set_piece_at: Some(pitch.center()),
            will_shoot: false,
            pending_shot: false,
            keeper_down: [false; 2],
            score: Score::default(),
            resolved: None,
            turns_played: 0,
            outbox: VecDeque::new(),
        }
    }

    // ========================================================================
    // Read-only state
    // ========================================================================

    pub fn state(&self) -> RuleState {
        self.state
    }

    pub fn active_team(&self) -> TeamSide {
        self.active
    }

    pub fn upper_team(&self) -> TeamSide {
        self.upper
    }

    /// Whether `side` defends the upper byline.
    pub fn defends_upper(&self, side: TeamSide) -> bool {
        side == self.upper
    }

    pub fn half(&self) -> u8 {
        self.half
    }

    pub fn touches(&self) -> &TouchBudget {
        &self.touches
    }

    pub fn remaining_global_touches(&self) -> u8 {
        self.touches.remaining_global()
    }

    pub fn remaining_disk_touches(&self) -> u8 {
        self.touches.remaining_disk()
    }

    pub fn current_disk(&self) -> Option<DiskId> {
        self.touches.current_disk()
    }

    /// Touches `disk` could play if selected now (0 for the other team).
    pub fn remaining_touches_for(&self, disk: DiskId) -> u8 {
        if disk.side != self.active || disk.is_keeper() {
            return 0;
        }
        self.touches.remaining_for(disk, self.state)
    }

    pub fn can_select(&self, disk: DiskId) -> bool {
        disk.side == self.active && !disk.is_keeper() && disk.is_valid() && self.touches.can_act(disk)
    }

    pub fn flags(&self) -> &TurnFlags {
        &self.flags
    }

    pub fn last_ball_toucher(&self) -> Option<TeamSide> {
        self.last_ball_toucher
    }

    pub fn set_piece_at(&self) -> Option<Vec2> {
        self.set_piece_at
    }

    pub fn will_shoot(&self) -> bool {
        self.will_shoot
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn last_outcome(&self) -> Option<TurnOutcome> {
        self.resolved
    }

    // ========================================================================
    // Half / turn lifecycle
    // ========================================================================

    /// Kickoff of a half. Home defends the upper byline and kicks off in the
    /// first half; both swap for the second. Repositioning the pieces is the
    /// caller's job.
    pub fn start_half(&mut self, first: bool) {
        self.half = if first { 1 } else { 2 };
        self.upper = if first { TeamSide::Home } else { TeamSide::Away };
        self.active = self.upper;
        self.state = RuleState::Middle;
        self.set_piece_at = Some(self.pitch.center());
        self.last_ball_toucher = None;
        self.touches.reset(RuleState::Middle);
        self.clear_turn();
        self.will_shoot = false;
        self.pending_shot = false;
        log::info!("Half {} kicks off, {} to play", self.half, self.active);
    }

    /// Start a new turn. Returns the team that may act.
    pub fn new_turn(&mut self) -> TeamSide {
        self.clear_turn();
        // A penalty is always a declared shot
        self.will_shoot = std::mem::take(&mut self.pending_shot) || self.state == RuleState::PenaltyKick;
        self.active
    }

    fn clear_turn(&mut self) {
        self.flags = TurnFlags::default();
        self.keeper_down = [false; 2];
        self.resolved = None;
    }

    /// Announce a shot on goal for the coming touch so the defender can set
    /// the keeper. Made between turns, it carries into the next `new_turn`.
    pub fn declare_shot(&mut self) {
        self.will_shoot = true;
        self.pending_shot = true;
    }

    /// Charge a touch to `disk`. Fails without mutating anything when the disk
    /// is the current disk with no touches left, is not on the active team,
    /// is a keeper, or the team has no touches left.
    pub fn set_disk_act(&mut self, disk: DiskId) -> bool {
        if disk.side != self.active || disk.is_keeper() || !disk.is_valid() {
            log::debug!("set_disk_act rejected: {} cannot act for {}", disk, self.active);
            return false;
        }
        let ok = self.touches.use_disk(disk, self.state);
        if ok {
            log::debug!(
                "{} acts ({} disk / {} global touches left)",
                disk,
                self.touches.remaining_disk(),
                self.touches.remaining_global()
            );
        }
        ok
    }

    /// Touch played directly on the ball, without a disk.
    pub fn set_ball_act(&mut self) -> bool {
        if !self.touches.use_ball() {
            return false;
        }
        self.flags.latch_contact(FirstContact::Ball);
        if self.flags.ball_event.is_none() {
            self.last_ball_toucher = Some(self.active);
        }
        true
    }

    // ========================================================================
    // Event reporters (called by the physics layer while things move)
    // ========================================================================

    /// A disk of `team` touched the ball.
    pub fn ball_collide_disk(&mut self, team: TeamSide) {
        if self.flags.ball_event.is_some() {
            // Ball already dead, later touches do not count
            return;
        }
        self.last_ball_toucher = Some(team);
        if team == self.active {
            self.flags.latch_contact(FirstContact::Ball);
        }
    }

    /// Two disks collided at `pos`.
    pub fn disk_collide_disk(&mut self, team_x: TeamSide, team_y: TeamSide, pos: Vec2) {
        if team_x != self.active && team_y != self.active {
            return;
        }
        let contact = if team_x == team_y {
            FirstContact::OwnDisk
        } else {
            FirstContact::EnemyDisk { at: pos }
        };
        self.flags.latch_contact(contact);
    }

    pub fn ball_exit_at_side(&mut self, pos: Vec2) {
        self.flags.latch_ball_event(BallEvent {
            action: BallAction::ExitedSide,
            at: pos,
            upper: pos.y > 0.0,
            last_toucher: self.last_ball_toucher,
        });
    }

    /// Ball crossed a byline outside the goal; `lateral` is the crossing x.
    pub fn ball_exit_at_byline(&mut self, upper_side: bool, lateral: f32) {
        let y = self.pitch.goal_center(upper_side).y;
        self.flags.latch_ball_event(BallEvent {
            action: BallAction::ExitedByline,
            at: Vec2::new(lateral, y),
            upper: upper_side,
            last_toucher: self.last_ball_toucher,
        });
    }

    pub fn ball_enter_goal(&mut self, upper_side: bool) {
        self.flags.latch_ball_event(BallEvent {
            action: BallAction::EnteredGoal,
            at: self.pitch.goal_center(upper_side),
            upper: upper_side,
            last_toucher: self.last_ball_toucher,
        });
    }

    /// Keeper posture as reported by physics; a toppled keeper voids goals.
    pub fn keeper_posture(&mut self, side: TeamSide, facing_up: bool) {
        self.keeper_down[side.index()] = !facing_up;
    }

    // ========================================================================
    // Turn resolution
    // ========================================================================

    /// Resolve the turn once the world is stable. Consumes the latches; a
    /// second call in the same turn returns the first outcome unchanged.
    /// When `online`, the result is queued for the peer.
    pub fn ball_at_final_position(&mut self, online: bool) -> TurnOutcome {
        if let Some(outcome) = self.resolved {
            return outcome;
        }

        let flags = std::mem::take(&mut self.flags);
        let outcome = self.classify(&flags);

        if let Some(scorer) = outcome.goal {
            self.score.add_goal(scorer);
            log::info!("Goal for {} ({}-{})", scorer, self.score.home, self.score.away);
        }
        if outcome.changed_ball_owner {
            log::info!("{} for {}, possession changes", outcome.state, outcome.active);
        } else {
            log::debug!("{} for {}", outcome.state, outcome.active);
        }

        self.state = outcome.state;
        self.active = outcome.active;
        self.set_piece_at = outcome.set_piece_at;
        if outcome.changed_ball_owner || outcome.state.is_dead_ball() {
            self.last_ball_toucher = None;
        }
        self.set_remaining_touches(&outcome);
        self.pending_shot = false;
        self.turns_played += 1;
        self.resolved = Some(outcome);

        if online {
            self.outbox.push_back(RuleResult::from_outcome(&outcome, self.turns_played));
        }
        outcome
    }

    fn set_remaining_touches(&mut self, outcome: &TurnOutcome) {
        if outcome.goal.is_some() {
            // Kickoff after a goal gets a fresh budget, even after an own goal
            self.touches.reset(RuleState::Middle);
        } else {
            self.touches.after_turn(self.state, outcome.changed_ball_owner);
        }
    }

    fn classify(&self, flags: &TurnFlags) -> TurnOutcome {
        let acting = self.active;

        // 1. Foul: acting disk reached an enemy disk first
        if let Some(FirstContact::EnemyDisk { at }) = flags.first_contact {
            let fouled = acting.opponent();
            let fouled_upper = self.defends_upper(fouled);
            // Kicked from the spot in front of the goal the fouled team attacks
            let (state, spot) = if self.pitch.in_penalty_area(at, fouled_upper) {
                (RuleState::PenaltyKick, self.pitch.penalty_spot(!fouled_upper))
            } else {
                (RuleState::FreeKick, at)
            };
            return self.outcome(state, fouled, Some(spot), None);
        }

        // 2. No legitimate ball contact
        if !flags.ball_first() {
            let awarded = acting.opponent();
            return match flags.ball_event {
                None => self.outcome(RuleState::Normal, awarded, None, None),
                Some(event) => self.restart_for(awarded, &event),
            };
        }

        match flags.ball_event {
            // 3. Sideline
            Some(event) if event.action == BallAction::ExitedSide => {
                let exited_by = event.last_toucher.unwrap_or(acting);
                let awarded = exited_by.opponent();
                let spot = self.pitch.throw_in_spot(event.at);
                self.outcome(RuleState::ThrowIn, awarded, Some(spot), None)
            }
            // 4. Byline or goal
            Some(event) if event.action == BallAction::EnteredGoal => {
                let defender = self.defender_of(event.upper);
                if self.verify_goal_valid(event.upper) {
                    let scorer = defender.opponent();
                    self.outcome(RuleState::Middle, defender, Some(self.pitch.center()), Some(scorer))
                } else {
                    log::debug!("Goal not valid, {} keeper was down", defender);
                    let spot = self.pitch.goal_kick_spot(event.upper, 0.0);
                    self.outcome(RuleState::GoalKick, defender, Some(spot), None)
                }
            }
            Some(event) => self.byline_restart(&event),
            // 5. Out of touches
            None if self.touches.remaining_global() == 0 => {
                self.outcome(RuleState::Normal, acting.opponent(), None, None)
            }
            // 6. Play on
            None => self.outcome(RuleState::Normal, acting, None, None),
        }
    }

    /// A goal stands only if the defending keeper is still facing up.
    pub fn verify_goal_valid(&self, upper_side: bool) -> bool {
        let defender = self.defender_of(upper_side);
        !self.keeper_down[defender.index()]
    }

    fn defender_of(&self, upper_side: bool) -> TeamSide {
        if upper_side {
            self.upper
        } else {
            self.upper.opponent()
        }
    }

    /// Corner or goal kick by byline ownership and last touch.
    fn byline_restart(&self, event: &BallEvent) -> TurnOutcome {
        let defender = self.defender_of(event.upper);
        if event.last_toucher == Some(defender) {
            let spot = self.pitch.corner_flag(event.upper, event.at.x);
            self.outcome(RuleState::CornerKick, defender.opponent(), Some(spot), None)
        } else {
            let spot = self.pitch.goal_kick_spot(event.upper, event.at.x);
            self.outcome(RuleState::GoalKick, defender, Some(spot), None)
        }
    }

    /// Restart for `awarded` when the acting team never played the ball.
    fn restart_for(&self, awarded: TeamSide, event: &BallEvent) -> TurnOutcome {
        match event.action {
            BallAction::ExitedSide => {
                let spot = self.pitch.throw_in_spot(event.at);
                self.outcome(RuleState::ThrowIn, awarded, Some(spot), None)
            }
            BallAction::ExitedByline | BallAction::EnteredGoal => {
                if self.defender_of(event.upper) == awarded {
                    let spot = self.pitch.goal_kick_spot(event.upper, event.at.x);
                    self.outcome(RuleState::GoalKick, awarded, Some(spot), None)
                } else {
                    let spot = self.pitch.corner_flag(event.upper, event.at.x);
                    self.outcome(RuleState::CornerKick, awarded, Some(spot), None)
                }
            }
            BallAction::None => self.outcome(RuleState::Normal, awarded, None, None),
        }
    }

    fn outcome(
        &self,
        state: RuleState,
        active: TeamSide,
        set_piece_at: Option<Vec2>,
        goal: Option<TeamSide>,
    ) -> TurnOutcome {
        TurnOutcome {
            state,
            active,
            changed_ball_owner: active != self.active,
            set_piece_at,
            goal,
        }
    }

    // ========================================================================
    // Networking
    // ========================================================================

    /// Results waiting to be sent to the peer, oldest first.
    pub fn take_outgoing(&mut self) -> Vec<RuleResult> {
        self.outbox.drain(..).collect()
    }

    /// Apply a result computed by the peer that owns this turn. Local latches
    /// are discarded, not reconciled.
    pub fn apply_rule_result(&mut self, result: &RuleResult) -> TurnOutcome {
        let outcome = result.to_outcome();
        self.flags = TurnFlags::default();
        if let Some(scorer) = outcome.goal {
            self.score.add_goal(scorer);
        }
        self.state = outcome.state;
        self.active = outcome.active;
        self.set_piece_at = outcome.set_piece_at;
        if outcome.changed_ball_owner || outcome.state.is_dead_ball() {
            self.last_ball_toucher = None;
        }
        self.set_remaining_touches(&outcome);
        self.pending_shot = false;
        self.turns_played = result.turn;
        self.resolved = Some(outcome);
        outcome
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn snapshot(&self) -> RuleSnapshot {
        RuleSnapshot {
            state: self.state,
            active: self.active,
            upper: self.upper,
            half: self.half,
            remaining_global_touches: self.touches.remaining_global(),
            remaining_disk_touches: self.touches.remaining_disk(),
            current_disk: self.touches.current_disk(),
            will_shoot: self.will_shoot,
            last_ball_toucher: self.last_ball_toucher,
            set_piece_at: self.set_piece_at,
            score: self.score,
            turns_played: self.turns_played,
        }
    }

    /// Restore persisted state. Everything is validated before anything is
    /// written, so a failed restore leaves the engine untouched.
    pub fn restore(&mut self, snapshot: &RuleSnapshot) -> Result<()> {
        snapshot.validate().map_err(CoreError::InvalidSnapshot)?;
        let mut touches = self.touches.clone();
        touches
            .restore(
                snapshot.remaining_global_touches,
                snapshot.remaining_disk_touches,
                snapshot.current_disk,
            )
            .map_err(CoreError::InvalidSnapshot)?;
        if let Some(disk) = snapshot.current_disk {
            if disk.side != snapshot.active {
                return Err(CoreError::InvalidSnapshot(format!(
                    "current disk {} is not on the active team {}",
                    disk, snapshot.active
                )));
            }
        }

        self.touches = touches;
        self.state = snapshot.state;
        self.active = snapshot.active;
        self.upper = snapshot.upper;
        self.half = snapshot.half;
        self.will_shoot = snapshot.will_shoot;
        self.pending_shot = false;
        self.last_ball_toucher = snapshot.last_ball_toucher;
        self.set_piece_at = snapshot.set_piece_at;
        self.score = snapshot.score;
        self.turns_played = snapshot.turns_played;
        self.clear_turn();
        Ok(())
    }
}
