//! Engine configuration: default variant settings, tie-break overrides and
//! host limits. Loaded from TOML at startup by the host and the simulator.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::error::DartsError;
use crate::games::clock::types::ClockConfig;
use crate::games::shanghai::types::ShanghaiConfig;

pub const CONFIG_FILE_NAME: &str = "darts_engine.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Pending commands buffered before submitters wait.
    pub channel_capacity: usize,
    /// Live matches held at once, finished ones included until dropped.
    pub max_matches: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
            max_matches: 1024,
        }
    }
}

/// Top-level TOML file structure.
///
/// ```toml
/// [host]
/// channel_capacity = 64
/// max_matches = 1024
///
/// [shanghai]
/// start_number = 1
/// round_count = 7
/// tie_break = "roster_order"   # or "shared_victory"
///
/// [clock]
/// include_bull = true
/// include_doubles = false
/// include_triples = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub host: HostConfig,
    pub shanghai: ShanghaiConfig,
    pub clock: ClockConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), DartsError> {
        if self.host.channel_capacity == 0 {
            return Err(DartsError::Config("host.channel_capacity must be at least 1".into()));
        }
        if self.host.max_matches == 0 {
            return Err(DartsError::Config("host.max_matches must be at least 1".into()));
        }
        self.shanghai
            .validate()
            .map_err(|e| DartsError::Config(format!("[shanghai] {e}")))
    }
}

pub fn parse_config(content: &str) -> Result<EngineConfig, DartsError> {
    let config: EngineConfig =
        toml::from_str(content).map_err(|e| DartsError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<EngineConfig, DartsError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| DartsError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    parse_config(&content)
        .map_err(|e| DartsError::Config(format!("failed to parse {}: {}", path.display(), e)))
}

/// Try well-known paths, returning defaults if none is found or loadable.
pub fn load_default_config() -> EngineConfig {
    let candidates = [
        CONFIG_FILE_NAME.to_string(),
        format!("../{CONFIG_FILE_NAME}"),
        format!("/etc/darts/{CONFIG_FILE_NAME}"),
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded engine config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load engine config");
                }
            }
        }
    }
    tracing::info!("no {} found, using built-in defaults", CONFIG_FILE_NAME);
    EngineConfig::default()
}
