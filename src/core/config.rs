/// Engine configuration — scheduling constants, loadable from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("max_active_arcs must be at least 1")]
    ZeroCapacity,
}

/// Scheduling constants for the arc manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many arcs may be active at once.
    pub max_active_arcs: usize,
    /// Years an arc id waits after completing before it may start again.
    pub cooldown_years: u32,
    /// Chance per year that one eligible arc starts.
    pub start_probability: f64,
    /// Chance that a social encounter starts an NPC-bound arc.
    pub encounter_probability: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_active_arcs: 2,
            cooldown_years: 10,
            start_probability: 0.3,
            encounter_probability: 0.2,
        }
    }
}

impl EngineConfig {
    pub fn load_from_ron(path: &Path) -> Result<EngineConfig, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_active_arcs == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        for (name, value) in [
            ("start_probability", self.start_probability),
            ("encounter_probability", self.encounter_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        Ok(())
    }
}
