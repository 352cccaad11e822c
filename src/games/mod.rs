pub mod clock;
pub mod cricket;
pub mod shanghai;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::engine::config::EngineConfig;
use crate::engine::error::DartsError;
use crate::engine::models::MatchPlayer;
use crate::engine::orchestrator::{DynMatch, TurnOrchestrator};
use crate::engine::plugin::VariantEngine;
use clock::plugin::ClockEngine;
use clock::types::ClockConfig;
use cricket::plugin::CricketEngine;
use shanghai::plugin::ShanghaiEngine;
use shanghai::types::ShanghaiConfig;

/// Public description of a registered variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    pub variant_id: String,
    pub display_name: String,
    pub description: String,
    pub min_players: usize,
    pub max_players: usize,
}

impl VariantInfo {
    fn of<V: VariantEngine>(engine: &V) -> Self {
        Self {
            variant_id: engine.variant_id().to_string(),
            display_name: engine.display_name().to_string(),
            description: engine.description().to_string(),
            min_players: engine.min_players(),
            max_players: engine.max_players(),
        }
    }
}

/// Builds matches of one variant from JSON options layered over defaults.
pub trait VariantFactory: Send + Sync {
    fn info(&self) -> VariantInfo;
    fn create_match(
        &self,
        roster: Vec<MatchPlayer>,
        options: &serde_json::Value,
    ) -> Result<Box<dyn DynMatch>, DartsError>;
}

/// Overlay the keys of a JSON object onto `defaults`. `null` or `{}` keep the
/// defaults. Unknown keys are ignored.
pub fn merge_options<T>(defaults: &T, options: &serde_json::Value) -> Result<T, DartsError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = serde_json::to_value(defaults)?;
    match (options, merged.as_object_mut()) {
        (serde_json::Value::Null, _) => {}
        (serde_json::Value::Object(overrides), Some(base)) => {
            for (key, value) in overrides {
                base.insert(key.clone(), value.clone());
            }
        }
        _ => {
            return Err(DartsError::InvalidSetup(format!(
                "match options must be a JSON object, got {options}"
            )))
        }
    }
    serde_json::from_value(merged)
        .map_err(|e| DartsError::InvalidSetup(format!("invalid match options: {e}")))
}

pub struct CricketFactory;

impl VariantFactory for CricketFactory {
    fn info(&self) -> VariantInfo {
        VariantInfo::of(&CricketEngine)
    }

    fn create_match(
        &self,
        roster: Vec<MatchPlayer>,
        _options: &serde_json::Value,
    ) -> Result<Box<dyn DynMatch>, DartsError> {
        Ok(Box::new(TurnOrchestrator::new(CricketEngine::new(), roster)?))
    }
}

pub struct ShanghaiFactory {
    pub defaults: ShanghaiConfig,
}

impl VariantFactory for ShanghaiFactory {
    fn info(&self) -> VariantInfo {
        VariantInfo::of(&ShanghaiEngine::default())
    }

    fn create_match(
        &self,
        roster: Vec<MatchPlayer>,
        options: &serde_json::Value,
    ) -> Result<Box<dyn DynMatch>, DartsError> {
        let config: ShanghaiConfig = merge_options(&self.defaults, options)?;
        let engine = ShanghaiEngine::new(config)?;
        Ok(Box::new(TurnOrchestrator::new(engine, roster)?))
    }
}

pub struct ClockFactory {
    pub defaults: ClockConfig,
}

impl VariantFactory for ClockFactory {
    fn info(&self) -> VariantInfo {
        VariantInfo::of(&ClockEngine::new(self.defaults))
    }

    fn create_match(
        &self,
        roster: Vec<MatchPlayer>,
        options: &serde_json::Value,
    ) -> Result<Box<dyn DynMatch>, DartsError> {
        let config: ClockConfig = merge_options(&self.defaults, options)?;
        Ok(Box::new(TurnOrchestrator::new(ClockEngine::new(config), roster)?))
    }
}

/// Registry of available variants, keyed by variant id.
pub struct VariantRegistry {
    factories: HashMap<String, Box<dyn VariantFactory>>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Cricket, Shanghai and Around-the-Clock with defaults from `config`.
    pub fn with_defaults(config: &EngineConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(CricketFactory));
        registry.register(Box::new(ShanghaiFactory { defaults: config.shanghai }));
        registry.register(Box::new(ClockFactory { defaults: config.clock }));
        registry
    }

    pub fn register(&mut self, factory: Box<dyn VariantFactory>) {
        let id = factory.info().variant_id;
        self.factories.insert(id, factory);
    }

    pub fn get(&self, variant_id: &str) -> Option<&dyn VariantFactory> {
        self.factories.get(variant_id).map(|f| f.as_ref())
    }

    pub fn list_variant_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn list_variants(&self) -> Vec<VariantInfo> {
        self.list_variant_ids()
            .iter()
            .filter_map(|id| self.get(id).map(|f| f.info()))
            .collect()
    }

    pub fn create_match(
        &self,
        variant_id: &str,
        roster: Vec<MatchPlayer>,
        options: &serde_json::Value,
    ) -> Result<Box<dyn DynMatch>, DartsError> {
        let factory = self
            .get(variant_id)
            .ok_or_else(|| DartsError::UnknownVariant(variant_id.to_string()))?;
        factory.create_match(roster, options)
    }
}

impl Default for VariantRegistry {
    fn default() -> Self {
        Self::with_defaults(&EngineConfig::default())
    }
}
