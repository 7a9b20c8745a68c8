//! # Execution error for computer-controlled flicks
//!
//! **Intent + error = played force**
//!
//! Policies stay deterministic; the session perturbs the force they hand
//! over. Direction error is normal in degrees, length error is a normal
//! relative factor. The RNG is seeded so a replayed match plays out the same.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::engine::config::ExecutionConfig;
use crate::engine::force::ForceVector;
use crate::models::Vec2;

/// Length factors are kept inside this band.
const MIN_POWER: f32 = 0.5;
const MAX_POWER: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionError {
    /// Positive = counter-clockwise
    pub angle_deg: f32,
    /// 1.0 = exact
    pub power_factor: f32,
}

impl ExecutionError {
    pub fn zero() -> Self {
        Self { angle_deg: 0.0, power_factor: 1.0 }
    }

    pub fn apply(&self, force: ForceVector) -> ForceVector {
        let f = force.force();
        let (sin, cos) = self.angle_deg.to_radians().sin_cos();
        let rotated = Vec2::new(f.x * cos - f.y * sin, f.x * sin + f.y * cos);
        ForceVector::new(force.from, rotated * self.power_factor)
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionNoise {
    rng: ChaCha8Rng,
    angle_sigma_deg: f32,
    power_sigma: f32,
}

impl ExecutionNoise {
    pub fn new(seed: u64, angle_sigma_deg: f32, power_sigma: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            angle_sigma_deg: angle_sigma_deg.max(0.0),
            power_sigma: power_sigma.max(0.0),
        }
    }

    /// `None` when execution error is switched off.
    pub fn from_config(config: &ExecutionConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.seed, config.angle_sigma_deg, config.power_sigma))
    }

    pub fn sample(&mut self) -> ExecutionError {
        let a: f32 = StandardNormal.sample(&mut self.rng);
        let p: f32 = StandardNormal.sample(&mut self.rng);
        ExecutionError {
            angle_deg: a * self.angle_sigma_deg,
            power_factor: (1.0 + p * self.power_sigma).clamp(MIN_POWER, MAX_POWER),
        }
    }

    pub fn perturb(&mut self, force: ForceVector) -> ForceVector {
        let error = self.sample();
        log::trace!("execution error {:.2} deg x{:.3}", error.angle_deg, error.power_factor);
        error.apply(force)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vec2;

    #[test]
    fn test_disabled_config_gives_no_noise() {
        assert!(ExecutionNoise::from_config(&ExecutionConfig::off()).is_none());
        assert!(ExecutionNoise::from_config(&ExecutionConfig::default()).is_some());
    }

    #[test]
    fn test_same_seed_same_errors() {
        let mut a = ExecutionNoise::new(7, 2.0, 0.05);
        let mut b = ExecutionNoise::new(7, 2.0, 0.05);
        for _ in 0..20 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_zero_sigma_is_exact() {
        let mut noise = ExecutionNoise::new(1, 0.0, 0.0);
        let force = ForceVector::new(vec2(1.0, 2.0), vec2(0.0, 10.0));
        let played = noise.perturb(force);
        assert!((played.force() - force.force()).norm() < 1e-5);
    }

    #[test]
    fn test_rotation() {
        let error = ExecutionError { angle_deg: 90.0, power_factor: 2.0 };
        let played = error.apply(ForceVector::new(Vec2::zeros(), vec2(1.0, 0.0)));
        assert!((played.force() - vec2(0.0, 2.0)).norm() < 1e-5);
    }
}
