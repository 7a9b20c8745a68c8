//! Pitch dimensions and the landmarks rules refer to
//!
//! "Upper" always means the byline at `+half_length`.

use serde::{Deserialize, Serialize};

use super::geometry::{vec2, Vec2};

/// Table dimensions in scene units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchConfig {
    /// Half the distance between the sidelines
    pub half_width: f32,
    /// Half the distance between the bylines
    pub half_length: f32,
    /// Half width of the penalty area
    pub penalty_area_half_width: f32,
    /// Depth of the penalty area measured from the byline
    pub penalty_area_depth: f32,
    /// Half width of the goal area
    pub goal_area_half_width: f32,
    /// Depth of the goal area measured from the byline
    pub goal_area_depth: f32,
    /// Half the distance between the posts
    pub goal_half_width: f32,
    /// Distance of the penalty spot from the byline
    pub penalty_spot_distance: f32,
    pub disk_radius: f32,
    pub keeper_radius: f32,
    pub ball_radius: f32,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            half_width: 40.0,
            half_length: 60.0,
            penalty_area_half_width: 20.0,
            penalty_area_depth: 16.0,
            goal_area_half_width: 9.0,
            goal_area_depth: 5.5,
            goal_half_width: 4.0,
            penalty_spot_distance: 11.0,
            disk_radius: 1.3,
            keeper_radius: 1.6,
            ball_radius: 1.1,
        }
    }
}

impl PitchConfig {
    #[inline]
    fn byline_y(&self, upper: bool) -> f32 {
        if upper {
            self.half_length
        } else {
            -self.half_length
        }
    }

    /// Unit y direction pointing from the given byline into the pitch.
    #[inline]
    pub fn inward(&self, upper: bool) -> f32 {
        if upper {
            -1.0
        } else {
            1.0
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::zeros()
    }

    pub fn goal_center(&self, upper: bool) -> Vec2 {
        vec2(0.0, self.byline_y(upper))
    }

    /// Both posts of a goal, left (negative x) first.
    pub fn goal_posts(&self, upper: bool) -> (Vec2, Vec2) {
        let y = self.byline_y(upper);
        (vec2(-self.goal_half_width, y), vec2(self.goal_half_width, y))
    }

    pub fn penalty_spot(&self, upper: bool) -> Vec2 {
        vec2(0.0, self.byline_y(upper) + self.inward(upper) * self.penalty_spot_distance)
    }

    /// Goal kicks are taken from the edge of the goal area, on the side the
    /// ball left the pitch.
    pub fn goal_kick_spot(&self, upper: bool, lateral: f32) -> Vec2 {
        let x = self.goal_area_half_width * 0.5 * lateral.signum();
        vec2(x, self.byline_y(upper) + self.inward(upper) * self.goal_area_depth)
    }

    /// Corner flag on the side of `lateral`, nudged inside the pitch so the
    /// ball rests in play.
    pub fn corner_flag(&self, upper: bool, lateral: f32) -> Vec2 {
        let x = (self.half_width - self.ball_radius) * if lateral < 0.0 { -1.0 } else { 1.0 };
        vec2(x, self.byline_y(upper) + self.inward(upper) * self.ball_radius)
    }

    /// Throw-in spot: the exit point pulled back onto the sideline.
    pub fn throw_in_spot(&self, exit: Vec2) -> Vec2 {
        let x = (self.half_width - self.ball_radius) * if exit.x < 0.0 { -1.0 } else { 1.0 };
        let y = exit
            .y
            .clamp(-self.half_length + self.ball_radius, self.half_length - self.ball_radius);
        vec2(x, y)
    }

    pub fn in_penalty_area(&self, pos: Vec2, upper: bool) -> bool {
        if pos.x.abs() > self.penalty_area_half_width {
            return false;
        }
        let depth = (self.byline_y(upper) - pos.y).abs();
        depth <= self.penalty_area_depth && pos.y.abs() <= self.half_length
    }

    pub fn in_goal_area(&self, pos: Vec2, upper: bool) -> bool {
        if pos.x.abs() > self.goal_area_half_width {
            return false;
        }
        let depth = (self.byline_y(upper) - pos.y).abs();
        depth <= self.goal_area_depth && pos.y.abs() <= self.half_length
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x.abs() <= self.half_width && pos.y.abs() <= self.half_length
    }

    /// Diagonal length, used to normalise distances into 0..1.
    pub fn diagonal(&self) -> f32 {
        2.0 * (self.half_width * self.half_width + self.half_length * self.half_length).sqrt()
    }

    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("half_width", self.half_width),
            ("half_length", self.half_length),
            ("penalty_area_half_width", self.penalty_area_half_width),
            ("penalty_area_depth", self.penalty_area_depth),
            ("goal_half_width", self.goal_half_width),
            ("disk_radius", self.disk_radius),
            ("keeper_radius", self.keeper_radius),
            ("ball_radius", self.ball_radius),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }
        if self.penalty_area_half_width > self.half_width
            || self.penalty_area_depth > self.half_length
        {
            return Err("penalty area larger than the half pitch".to_string());
        }
        if self.goal_half_width > self.penalty_area_half_width {
            return Err("goal wider than the penalty area".to_string());
        }
        Ok(())
    }
}
