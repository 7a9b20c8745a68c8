//! Execution error for AI-controlled flicks

use serde::{Deserialize, Serialize};

/// Noise applied to the force an AI team actually plays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Master switch
    pub enabled: bool,
    /// Direction error sigma in degrees (default: 2.0)
    pub angle_sigma_deg: f32,
    /// Relative force-length error sigma (default: 0.05)
    pub power_sigma: f32,
    /// Seed for the execution RNG
    pub seed: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { enabled: true, angle_sigma_deg: 2.0, power_sigma: 0.05, seed: 0x5EED }
    }
}

impl ExecutionConfig {
    pub fn off() -> Self {
        Self { enabled: false, angle_sigma_deg: 0.0, power_sigma: 0.0, ..Self::default() }
    }
}
