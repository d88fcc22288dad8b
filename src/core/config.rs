//! Game rules that govern action admission and parameter validation
//!
//! Values mirror the `game` constants handed to every player at the start
//! of a match. They are loaded once from TOML and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating rules
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Values parsed but violate a rule constraint
    #[error("Invalid rules: {0}")]
    Invalid(String),
}

/// Rules for the action-admission core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Actions a player may take inside one detection window with no
    /// control centers held
    pub base_action_count: u32,

    /// Detection interval; the admission window spans the last
    /// `action_detection_interval - 1` ticks including the current one
    pub action_detection_interval: u64,

    /// Ceiling increment granted per controlled control center
    pub actions_per_control_center: u32,

    /// Highest valid group id; valid ids are `1..=max_unit_group`
    pub max_unit_group: u32,

    /// Smallest factor accepted by SCALE
    pub min_scale_factor: f64,

    /// Largest factor accepted by SCALE
    pub max_scale_factor: f64,

    /// World extent along x
    pub world_width: f64,

    /// World extent along y
    pub world_height: f64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            base_action_count: 12,
            action_detection_interval: 60,
            actions_per_control_center: 1,
            max_unit_group: 100,
            min_scale_factor: 0.1,
            max_scale_factor: 10.0,
            world_width: 1024.0,
            world_height: 1024.0,
        }
    }
}

impl GameRules {
    /// Parse and validate rules from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let rules: GameRules = toml::from_str(content)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Load rules from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Number of ticks in the trailing admission window
    pub fn window_len(&self) -> u64 {
        self.action_detection_interval.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.action_detection_interval < 2 {
            return Err(ConfigError::Invalid(format!(
                "action_detection_interval must be at least 2, got {}",
                self.action_detection_interval
            )));
        }
        if self.max_unit_group == 0 {
            return Err(ConfigError::Invalid("max_unit_group must be positive".into()));
        }
        if !(self.min_scale_factor.is_finite()
            && self.max_scale_factor.is_finite()
            && self.min_scale_factor > 0.0
            && self.min_scale_factor <= self.max_scale_factor)
        {
            return Err(ConfigError::Invalid(format!(
                "scale factor bounds [{}, {}] are not a valid range",
                self.min_scale_factor, self.max_scale_factor
            )));
        }
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::Invalid("world dimensions must be positive".into()));
        }
        Ok(())
    }
}
