//! # Engine Configuration
//!
//! Every tuning value of the rule/AI core in one serialisable tree.
//!
//! ## Usage
//! ```rust
//! use bf_core::engine::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let casual = EngineConfig::casual();
//! assert!(casual.rules.max_global_touches > config.rules.max_global_touches);
//! ```
//!
//! ## Environment Variables
//!
//! - `BF_CONFIG_PROFILE`: Select preset (standard, casual, deterministic)

mod ai_config;
mod execution_config;
mod force_config;
mod rules_config;

pub use ai_config::{DecourtConfig, FuzzyWeights};
pub use execution_config::ExecutionConfig;
pub use force_config::ForceConfig;
pub use rules_config::RulesConfig;

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{CoreError, Result};
use crate::models::PitchConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub pitch: PitchConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub force: ForceConfig,
    #[serde(default)]
    pub decourt: DecourtConfig,
    #[serde(default)]
    pub fuzzy: FuzzyWeights,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl EngineConfig {
    /// Reference ruleset (same as default)
    pub fn standard() -> Self {
        Self::default()
    }

    /// Longer possessions, looser AI execution
    pub fn casual() -> Self {
        let mut cfg = Self::default();
        cfg.rules.max_global_touches = 16;
        cfg.execution.angle_sigma_deg = 5.0;
        cfg.execution.power_sigma = 0.12;
        cfg.decourt.shoot_min_goal_factor = 0.25;
        cfg
    }

    /// No execution noise (tests, replays)
    pub fn deterministic() -> Self {
        let mut cfg = Self::default();
        cfg.execution = ExecutionConfig::off();
        cfg
    }

    pub fn from_profile(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::standard()),
            "casual" => Some(Self::casual()),
            "deterministic" | "test" => Some(Self::deterministic()),
            _ => None,
        }
    }

    /// Preset named by `BF_CONFIG_PROFILE`, or the standard ruleset.
    pub fn from_env_or_default() -> Self {
        env::var("BF_CONFIG_PROFILE")
            .ok()
            .and_then(|name| Self::from_profile(&name))
            .unwrap_or_default()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.pitch.validate().map_err(CoreError::InvalidConfig)?;
        self.rules.validate().map_err(CoreError::InvalidConfig)?;
        if self.decourt.max_candidates == 0 {
            return Err(CoreError::InvalidConfig("max_candidates must be at least 1".into()));
        }
        if !(self.force.max_cut_angle_deg > 0.0 && self.force.max_cut_angle_deg < 90.0) {
            return Err(CoreError::InvalidConfig(format!(
                "max_cut_angle_deg out of range: {}",
                self.force.max_cut_angle_deg
            )));
        }
        if self.execution.angle_sigma_deg < 0.0 || self.execution.power_sigma < 0.0 {
            return Err(CoreError::InvalidConfig("negative execution sigma".into()));
        }
        Ok(())
    }
}

// ========== Tests ==========
