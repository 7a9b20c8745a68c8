//! Distance → force-length lookup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub distance: f32,
    pub force: f32,
}

/// Monotonic table mapping travel distance to the force length that produces
/// it. Built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceCalibrationTable {
    points: Vec<CalibrationPoint>,
}

#[derive(Deserialize)]
struct RawTable {
    points: Vec<CalibrationPoint>,
}

/// Fitted against the reference physics setup.
const DEFAULT_POINTS: [(f32, f32); 10] = [
    (0.0, 0.0),
    (2.0, 6.5),
    (5.0, 11.8),
    (10.0, 17.9),
    (20.0, 26.4),
    (30.0, 33.0),
    (45.0, 41.2),
    (60.0, 48.3),
    (90.0, 60.1),
    (120.0, 70.4),
];

static DEFAULT_TABLE: Lazy<DistanceCalibrationTable> = Lazy::new(|| DistanceCalibrationTable {
    points: DEFAULT_POINTS
        .iter()
        .map(|&(distance, force)| CalibrationPoint { distance, force })
        .collect(),
});

impl Default for DistanceCalibrationTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl DistanceCalibrationTable {
    /// Distances must be strictly increasing and forces non-decreasing.
    pub fn new(points: Vec<CalibrationPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(CoreError::InvalidCalibration("table is empty".into()));
        }
        for p in &points {
            if !(p.distance.is_finite() && p.force.is_finite()) || p.distance < 0.0 || p.force < 0.0 {
                return Err(CoreError::InvalidCalibration(format!(
                    "bad point ({}, {})",
                    p.distance, p.force
                )));
            }
        }
        for pair in points.windows(2) {
            if pair[1].distance <= pair[0].distance {
                return Err(CoreError::InvalidCalibration(format!(
                    "distances not increasing at {}",
                    pair[1].distance
                )));
            }
            if pair[1].force < pair[0].force {
                return Err(CoreError::InvalidCalibration(format!(
                    "force decreases at distance {}",
                    pair[1].distance
                )));
            }
        }
        Ok(Self { points })
    }

    /// Load a fitted table: `{"points": [{"distance": .., "force": ..}, ..]}`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawTable = serde_json::from_str(text)?;
        Self::new(raw.points)
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Force length for `distance`: linear between points, clamped below the
    /// first (and for non-finite input), extended along the last segment beyond the end.
    pub fn force_for(&self, distance: f32) -> f32 {
        let first = self.points[0];
        if !distance.is_finite() || distance <= first.distance || self.points.len() == 1 {
            return first.force;
        }
        let idx = self.points.partition_point(|p| p.distance < distance);
        let (a, b) = if idx >= self.points.len() {
            let n = self.points.len();
            (self.points[n - 2], self.points[n - 1])
        } else {
            (self.points[idx - 1], self.points[idx])
        };
        let t = (distance - a.distance) / (b.distance - a.distance);
        (a.force + t * (b.force - a.force)).max(0.0)
    }
}
