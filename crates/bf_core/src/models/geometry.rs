//! Planar geometry helpers
//!
//! The table is modelled on a 2D plane: `x` runs across the pitch (sidelines
//! at `±half_width`) and `y` runs along it (bylines at `±half_length`).
//! Height is ignored by rules and AI alike.

use nalgebra::Vector2;

/// 2D position / direction on the pitch plane.
pub type Vec2 = Vector2<f32>;

const EPS: f32 = 1e-4;

#[inline]
pub fn vec2(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

/// Unit vector, or zero for degenerate input.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len = v.norm();
    if len < EPS {
        Vec2::zeros()
    } else {
        v / len
    }
}

#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).norm()
}

/// Unsigned angle between two directions in radians (0 for degenerate input).
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let la = a.norm();
    let lb = b.norm();
    if la < EPS || lb < EPS {
        return 0.0;
    }
    (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0).acos()
}

/// Left-hand perpendicular (rotates +90°).
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    vec2(-v.y, v.x)
}

/// Shortest distance from `point` to the segment `start..end`.
pub fn point_to_segment_distance(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let seg = end - start;
    let len_sq = seg.norm_squared();
    if len_sq < EPS {
        return distance(point, start);
    }
    let t = ((point - start).dot(&seg) / len_sq).clamp(0.0, 1.0);
    distance(point, start + seg * t)
}

/// Segment parameter `t` (0..1) of the closest point to `point`.
pub fn segment_param(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let seg = end - start;
    let len_sq = seg.norm_squared();
    if len_sq < EPS {
        return 0.0;
    }
    ((point - start).dot(&seg) / len_sq).clamp(0.0, 1.0)
}

/// Snap a point onto an integer grid so it can key a cache.
pub fn quantize(p: Vec2, step: f32) -> (i32, i32) {
    ((p.x / step).round() as i32, (p.y / step).round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize_or_zero(Vec2::zeros()), Vec2::zeros());
        let n = normalize_or_zero(vec2(3.0, 4.0));
        assert!((n.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_angle_between() {
        let a = angle_between(vec2(1.0, 0.0), vec2(0.0, 1.0));
        assert!((a - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert_eq!(angle_between(Vec2::zeros(), vec2(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_point_to_segment_distance() {
        let d = point_to_segment_distance(vec2(0.0, 1.0), vec2(-1.0, 0.0), vec2(1.0, 0.0));
        assert!((d - 1.0).abs() < 1e-5);

        // Beyond the end clamps to the endpoint
        let d = point_to_segment_distance(vec2(3.0, 0.0), vec2(-1.0, 0.0), vec2(1.0, 0.0));
        assert!((d - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(vec2(1.26, -0.74), 0.5), (3, -1));
    }
}
