//! Scenario files for driving the core from the command line
//!
//! A scenario pins a board (ball + any disks that differ from the kickoff
//! layout) and optionally a rule state. Turn scripts replay the physics
//! events of one flick against it.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use bf_core::engine::force::{CalibrationPoint, DistanceCalibrationTable};
use bf_core::models::{Controller, DiskId, TeamSide, Vec2};
use bf_core::save::{save_to_path, MatchSave};
use bf_core::{make_policy, Action, EngineConfig, MatchSession, PhysicsEvent, PolicyKind, RuleSnapshot, TurnOutcome, WorldProbe};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskPlacement {
    pub disk: DiskId,
    pub position: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Config preset name (standard, casual, deterministic)
    #[serde(default)]
    pub profile: Option<String>,
    /// Rule state to start from; kickoff of the first half when absent
    #[serde(default)]
    pub rules: Option<RuleSnapshot>,
    pub ball: Vec2,
    #[serde(default)]
    pub disks: Vec<DiskPlacement>,
    #[serde(default)]
    pub last_active: Option<DiskId>,
}

/// One physics event as written in a turn script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    BallHitDisk { team: TeamSide },
    DiskHitDisk { a: TeamSide, b: TeamSide, at: Vec2 },
    BallOutSide { at: Vec2 },
    BallOutByline { upper: bool, lateral: f32 },
    BallInGoal { upper: bool },
}

impl From<&ScriptEvent> for PhysicsEvent {
    fn from(event: &ScriptEvent) -> Self {
        match *event {
            ScriptEvent::BallHitDisk { team } => PhysicsEvent::BallHitDisk { team },
            ScriptEvent::DiskHitDisk { a, b, at } => PhysicsEvent::DiskHitDisk { a, b, at },
            ScriptEvent::BallOutSide { at } => PhysicsEvent::BallOutSide { at },
            ScriptEvent::BallOutByline { upper, lateral } => PhysicsEvent::BallOutByline { upper, lateral },
            ScriptEvent::BallInGoal { upper } => PhysicsEvent::BallInGoal { upper },
        }
    }
}

/// What happened during one flick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnScript {
    /// Flicked disk; a direct ball touch when absent
    #[serde(default)]
    pub actor: Option<DiskId>,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
    /// Keepers that ended the turn toppled
    #[serde(default)]
    pub keepers_down: Vec<TeamSide>,
}

struct ScriptedWorld<'a> {
    keepers_down: &'a [TeamSide],
}

impl WorldProbe for ScriptedWorld<'_> {
    fn is_stable(&self) -> bool {
        true
    }

    fn keeper_facing_up(&self, side: TeamSide) -> bool {
        !self.keepers_down.contains(&side)
    }
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Config from a YAML/JSON file, else the scenario preset, else the
/// `BF_CONFIG_PROFILE` environment preset.
pub fn load_config(path: Option<&Path>, profile: Option<&str>) -> Result<EngineConfig> {
    if let Some(path) = path {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        let config = if is_yaml {
            EngineConfig::from_yaml_str(&text)?
        } else {
            EngineConfig::from_json_str(&text)?
        };
        return Ok(config);
    }
    match profile {
        Some(name) => match EngineConfig::from_profile(name) {
            Some(config) => Ok(config),
            None => bail!("Unknown config profile '{}'", name),
        },
        None => Ok(EngineConfig::from_env_or_default()),
    }
}

/// Session with both teams under `policy`, set up as the scenario describes.
pub fn build_session(scenario: &Scenario, config: EngineConfig, policy: PolicyKind) -> Result<MatchSession> {
    let controller = Controller::Ai(policy);
    let mut session = MatchSession::new(config, controller, controller)?;
    session.start_half(true);

    let mut board = session.board().clone();
    board.ball.position = scenario.ball;
    for placement in &scenario.disks {
        board.set_position(placement.disk, placement.position)?;
    }
    if let Some(disk) = scenario.last_active {
        board.team_mut(disk.side).last_active_disk = Some(disk);
    }

    let rules = scenario.rules.clone().unwrap_or_else(|| session.rules().snapshot());
    let mut clock = *session.clock();
    clock.half = rules.half;
    session
        .apply_save(MatchSave::new(rules, clock, board))
        .context("Scenario rule state is not consistent")?;
    session.begin_turn();
    Ok(session)
}

/// Run `policy` for the team to move and return its committed action.
pub fn decide(session: &MatchSession, policy: PolicyKind) -> Action {
    let mut policy = make_policy(policy, session.config());
    session.decide(policy.as_mut())
}

/// Play the script's touch, feed its events and resolve the turn.
pub fn resolve(session: &mut MatchSession, script: &TurnScript) -> Result<TurnOutcome> {
    match script.actor {
        Some(disk) => session.select_disk(disk)?,
        None => session.touch_ball()?,
    }
    for event in &script.events {
        session.report(event.into());
    }
    let world = ScriptedWorld { keepers_down: &script.keepers_down };
    Ok(session.resolve_turn(&world, false)?)
}

/// Forces for each distance from the given or built-in table.
pub fn calibration(table: Option<&Path>, distances: &[f32]) -> Result<Vec<CalibrationPoint>> {
    let table = match table {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            DistanceCalibrationTable::from_json_str(&text)?
        }
        None => DistanceCalibrationTable::default(),
    };
    if distances.is_empty() {
        return Ok(table.points().to_vec());
    }
    Ok(distances
        .iter()
        .map(|&distance| CalibrationPoint { distance, force: table.force_for(distance) })
        .collect())
}

/// Write the session to a save file and return what was written.
pub fn snapshot(session: &MatchSession, out: &Path) -> Result<MatchSave> {
    let save = session.to_save();
    save_to_path(out, &save).with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(save)
}
