//! Turn resolution scenarios and properties against the public rule API

use bf_core::engine::config::RulesConfig;
use bf_core::engine::rules::{RuleEngine, RuleState, TurnOutcome};
use bf_core::models::{vec2, DiskId, PitchConfig, TeamSide, Vec2};
use insta::assert_json_snapshot;
use proptest::prelude::*;

fn kickoff() -> RuleEngine {
    let mut engine = RuleEngine::new(RulesConfig::default(), PitchConfig::default());
    engine.start_half(true);
    engine.new_turn();
    engine
}

/// Home in open play after a clean kickoff touch.
fn open_play() -> RuleEngine {
    let mut engine = kickoff();
    assert!(engine.set_disk_act(DiskId::new(TeamSide::Home, 9)));
    engine.ball_collide_disk(TeamSide::Home);
    let outcome = engine.ball_at_final_position(false);
    assert_eq!(outcome.state, RuleState::Normal);
    engine.new_turn();
    engine
}

fn home(slot: u8) -> DiskId {
    DiskId::new(TeamSide::Home, slot)
}

#[test]
fn test_ball_only_contact_keeps_play_going() {
    let mut engine = open_play();
    assert!(engine.set_disk_act(home(4)));
    engine.ball_collide_disk(TeamSide::Home);
    let outcome = engine.ball_at_final_position(false);
    assert_eq!(outcome.state, RuleState::Normal);
    assert_eq!(outcome.active, TeamSide::Home);
    assert!(!outcome.changed_ball_owner);
    assert_eq!(engine.current_disk(), Some(home(4)));
}

#[test]
fn test_foul_in_fouled_area_gives_penalty() {
    let mut engine = open_play();
    assert!(engine.set_disk_act(home(2)));
    // Away defends the lower byline in the first half
    let at = vec2(-4.0, -50.0);
    assert!(PitchConfig::default().in_penalty_area(at, false));
    engine.disk_collide_disk(TeamSide::Home, TeamSide::Away, at);
    engine.ball_collide_disk(TeamSide::Home);
    let outcome = engine.ball_at_final_position(false);
    assert_eq!(outcome.state, RuleState::PenaltyKick);
    assert!(outcome.changed_ball_owner);
    assert_eq!(outcome.active, TeamSide::Away);
}

#[test]
fn test_sideline_exit_by_acting_team_is_throw_in() {
    let mut engine = open_play();
    assert!(engine.set_disk_act(home(1)));
    engine.ball_collide_disk(TeamSide::Home);
    let exit = vec2(-41.0, 12.0);
    engine.ball_exit_at_side(exit);
    let outcome = engine.ball_at_final_position(false);
    assert_eq!(outcome.state, RuleState::ThrowIn);
    assert!(outcome.changed_ball_owner);
    assert_eq!(outcome.active, TeamSide::Away);
    assert_eq!(outcome.set_piece_at, Some(PitchConfig::default().throw_in_spot(exit)));
}

#[test]
fn test_last_touch_of_possession_hands_over() {
    let mut engine = open_play();
    // Kickoff used one of the twelve touches
    for i in 0..11u8 {
        assert!(engine.set_disk_act(home(i % 9)));
        engine.ball_collide_disk(TeamSide::Home);
        let outcome = engine.ball_at_final_position(false);
        if i < 10 {
            assert_eq!(outcome.active, TeamSide::Home, "turn {}", i);
        } else {
            assert_eq!(engine.remaining_global_touches(), engine.touches().max_global_touches());
            assert_eq!(outcome.state, RuleState::Normal);
            assert_eq!(outcome.active, TeamSide::Away);
            assert!(outcome.changed_ball_owner);
        }
        engine.new_turn();
    }
}

#[test]
fn test_exhausted_disk_cannot_act() {
    let mut engine = open_play();
    for _ in 0..3 {
        assert!(engine.set_disk_act(home(3)));
    }
    let global = engine.remaining_global_touches();
    assert!(!engine.set_disk_act(home(3)));
    assert_eq!(engine.remaining_disk_touches(), 0);
    assert_eq!(engine.remaining_global_touches(), global);
    // A different disk may still go
    assert!(engine.set_disk_act(home(4)));
}

#[test]
fn test_kickoff_rule_state() {
    let engine = kickoff();
    let snapshot = engine.snapshot();
    let summary = serde_json::json!({
        "state": snapshot.state,
        "active": snapshot.active,
        "upper": snapshot.upper,
        "half": snapshot.half,
        "remaining_global_touches": snapshot.remaining_global_touches,
        "remaining_disk_touches": snapshot.remaining_disk_touches,
        "current_disk": snapshot.current_disk,
        "will_shoot": snapshot.will_shoot,
    });
    assert_json_snapshot!("kickoff_rules", summary);
}

// ========== Properties ==========

#[derive(Debug, Clone)]
enum Event {
    BallHit(TeamSide),
    DiskHit(TeamSide, TeamSide, Vec2),
    Side(Vec2),
    Byline(bool, f32),
    Goal(bool),
}

fn side_strategy() -> impl Strategy<Value = TeamSide> {
    prop_oneof![Just(TeamSide::Home), Just(TeamSide::Away)]
}

fn point_strategy() -> impl Strategy<Value = Vec2> {
    (-40.0f32..=40.0, -60.0f32..=60.0).prop_map(|(x, y)| vec2(x, y))
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        side_strategy().prop_map(Event::BallHit),
        (side_strategy(), side_strategy(), point_strategy()).prop_map(|(a, b, at)| Event::DiskHit(a, b, at)),
        point_strategy().prop_map(Event::Side),
        (any::<bool>(), -40.0f32..=40.0).prop_map(|(upper, x)| Event::Byline(upper, x)),
        any::<bool>().prop_map(Event::Goal),
    ]
}

fn apply(engine: &mut RuleEngine, event: &Event) {
    match *event {
        Event::BallHit(team) => engine.ball_collide_disk(team),
        Event::DiskHit(a, b, at) => engine.disk_collide_disk(a, b, at),
        Event::Side(at) => engine.ball_exit_at_side(at),
        Event::Byline(upper, lateral) => engine.ball_exit_at_byline(upper, lateral),
        Event::Goal(upper) => engine.ball_enter_goal(upper),
    }
}

#[derive(Debug, Clone)]
enum Touch {
    Disk(TeamSide, u8),
    Ball,
    Resolve,
}

fn touch_strategy() -> impl Strategy<Value = Touch> {
    prop_oneof![
        4 => (side_strategy(), 0u8..=11).prop_map(|(side, slot)| Touch::Disk(side, slot)),
        1 => Just(Touch::Ball),
        1 => Just(Touch::Resolve),
    ]
}

proptest! {
    /// Once both latches are set, nothing reported later changes the outcome.
    #[test]
    fn prop_later_events_never_change_outcome(
        prefix in prop::collection::vec(event_strategy(), 0..8),
        lateral in -30.0f32..30.0,
        upper in any::<bool>(),
        tail in prop::collection::vec(event_strategy(), 1..8),
    ) {
        let mut engine = open_play();
        prop_assert!(engine.set_disk_act(home(0)));
        for event in &prefix {
            apply(&mut engine, event);
        }
        engine.disk_collide_disk(TeamSide::Home, TeamSide::Home, vec2(lateral, 0.0));
        engine.ball_enter_goal(upper);
        prop_assert!(engine.flags().first_contact.is_some());
        prop_assert!(engine.flags().ball_event.is_some());

        let mut settled = engine.clone();
        for event in &tail {
            apply(&mut engine, event);
        }
        let with_tail: TurnOutcome = engine.ball_at_final_position(false);
        let without_tail: TurnOutcome = settled.ball_at_final_position(false);
        prop_assert_eq!(with_tail, without_tail);
    }

    /// Counters stay ordered and rejected touches change nothing.
    #[test]
    fn prop_touch_budget_stays_consistent(touches in prop::collection::vec(touch_strategy(), 1..60)) {
        let mut engine = kickoff();
        let max = engine.touches().max_global_touches();
        for touch in &touches {
            let before = (engine.remaining_global_touches(), engine.remaining_disk_touches(), engine.current_disk());
            match *touch {
                Touch::Disk(side, slot) => {
                    let disk = DiskId::new(side, slot);
                    let exhausted = engine.current_disk() == Some(disk) && engine.remaining_disk_touches() == 0;
                    let accepted = engine.set_disk_act(disk);
                    if exhausted {
                        prop_assert!(!accepted);
                    }
                    if !accepted {
                        let after = (engine.remaining_global_touches(), engine.remaining_disk_touches(), engine.current_disk());
                        prop_assert_eq!(before, after);
                    }
                }
                Touch::Ball => {
                    let accepted = engine.set_ball_act();
                    prop_assert_eq!(accepted, before.0 > 0);
                }
                Touch::Resolve => {
                    engine.ball_at_final_position(false);
                    engine.new_turn();
                }
            }
            prop_assert!(engine.remaining_disk_touches() <= engine.remaining_global_touches());
            prop_assert!(engine.remaining_global_touches() <= max);
        }
    }
}
