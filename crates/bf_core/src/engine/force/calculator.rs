use serde::{Deserialize, Serialize};

use super::calibration::DistanceCalibrationTable;
use super::MIN_TRANSFER;
use crate::engine::config::ForceConfig;
use crate::models::geometry::{angle_between, distance, normalize_or_zero};
use crate::models::{PitchConfig, Vec2};

/// Flick to apply: the piece at `from` is pushed towards `to`; the length of
/// `to - from` is the force.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceVector {
    pub from: Vec2,
    pub to: Vec2,
}

impl ForceVector {
    pub fn new(from: Vec2, force: Vec2) -> Self {
        Self { from, to: from + force }
    }

    pub fn zero(at: Vec2) -> Self {
        Self { from: at, to: at }
    }

    pub fn force(&self) -> Vec2 {
        self.to - self.from
    }

    pub fn magnitude(&self) -> f32 {
        self.force().norm()
    }
}

/// Converts positional intents into force vectors.
#[derive(Debug, Clone)]
pub struct ForceCalculator {
    table: DistanceCalibrationTable,
    config: ForceConfig,
    pitch: PitchConfig,
}

impl ForceCalculator {
    pub fn new(table: DistanceCalibrationTable, config: ForceConfig, pitch: PitchConfig) -> Self {
        Self { table, config, pitch }
    }

    pub fn table(&self) -> &DistanceCalibrationTable {
        &self.table
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// Force moving a piece from `from` so that it comes to rest at `to`.
    pub fn target_follow(&self, from: Vec2, to: Vec2) -> Vec2 {
        let dir = normalize_or_zero(to - from);
        dir * self.table.force_for(distance(from, to))
    }

    /// Where the disk centre must be when it meets the ball to send the ball
    /// straight at `target`.
    pub fn contact_point(&self, ball: Vec2, target: Vec2) -> Vec2 {
        let out = normalize_or_zero(target - ball);
        ball - out * (self.pitch.disk_radius + self.pitch.ball_radius)
    }

    /// Cut angle (radians) between the disk's run-up and the ball's exit line.
    pub fn cut_angle(&self, actor: Vec2, ball: Vec2, target: Vec2) -> f32 {
        let out = target - ball;
        let approach = self.contact_point(ball, target) - actor;
        if approach.norm() < 1e-3 {
            return 0.0;
        }
        angle_between(approach, out)
    }

    /// Force on the disk at `actor` so the ball at `ball` travels to `target`.
    /// With `must_stop` the ball should come to rest there; otherwise it is
    /// played through with extra pace. `None` when the cut is too wide to
    /// play.
    pub fn ball_redirect(&self, actor: Vec2, ball: Vec2, target: Vec2, must_stop: bool) -> Option<Vec2> {
        let out = normalize_or_zero(target - ball);
        if out == Vec2::zeros() {
            return None;
        }
        let contact = self.contact_point(ball, target);
        let mut approach = contact - actor;
        if approach.norm() < 1e-3 {
            approach = out;
        }

        let cut = angle_between(approach, out);
        if cut > self.config.max_cut_angle_deg.to_radians() {
            return None;
        }

        let run_up = (contact - actor).norm();
        let ball_travel = distance(ball, target);
        let transfer = cut.cos().max(MIN_TRANSFER);
        let mut length = self.table.force_for(run_up + ball_travel / transfer);

        if !must_stop {
            length *= self.config.free_roll_factor;
        }
        let gap = distance(actor, ball) - self.pitch.disk_radius - self.pitch.ball_radius;
        if gap < self.config.close_contact_gap {
            length *= self.config.close_contact_factor;
        }
        length *= self.config.redirect_scale;

        Some(normalize_or_zero(approach) * length)
    }
}

impl Default for ForceCalculator {
    fn default() -> Self {
        Self::new(DistanceCalibrationTable::default(), ForceConfig::default(), PitchConfig::default())
    }
}
