use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::{log, log_warn};
use super::{
    ConfigContentProvider, ConfigSerializer, FileContentConfigProvider, Validate,
    YamlConfigSerializer,
};

pub struct ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer = YamlConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    config_serializer: TConfigSerializer,
    config_content_provider: TConfigContentProvider,
    config: Arc<Mutex<Option<TConfig>>>,
}

impl<TConfig> ConfigManager<FileContentConfigProvider, TConfig, YamlConfigSerializer>
where
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
{
    pub fn from_yaml_file(file_path: &str) -> Self {
        Self::new(
            FileContentConfigProvider::new(file_path.to_string()),
            YamlConfigSerializer::new(),
        )
    }
}

impl<TConfigContentProvider, TConfig, TConfigSerializer>
    ConfigManager<TConfigContentProvider, TConfig, TConfigSerializer>
where
    TConfigContentProvider: ConfigContentProvider,
    TConfig: Clone + for<'de> Deserialize<'de> + Serialize + Validate + Default,
    TConfigSerializer: ConfigSerializer<TConfig>,
{
    pub fn new(
        config_content_provider: TConfigContentProvider,
        config_serializer: TConfigSerializer,
    ) -> Self {
        Self {
            config: Arc::new(Mutex::new(None)),
            config_content_provider,
            config_serializer,
        }
    }

    /// Strict read: missing content yields the default, unreadable or invalid content is an error.
    pub fn get_config(&self) -> Result<TConfig, String> {
        let mut current = self
            .config
            .lock()
            .map_err(|_| "Config cache lock poisoned".to_string())?;

        if let Some(config) = current.as_ref() {
            return Ok(config.clone());
        }

        let config_data_result = self.config_content_provider.get_config_content()?;
        if let Some(config_data) = config_data_result {
            let config = self.config_serializer.deserialize(&config_data)?;

            config
                .validate()
                .map_err(|e| format!("Config validation error: {}", e))?;

            *current = Some(config.clone());
            return Ok(config);
        }

        Ok(TConfig::default())
    }

    /// Lenient read used at session start. Content that cannot be parsed is discarded from the
    /// store and replaced by defaults; content that parses but fails validation is repaired
    /// through [`Validate::sanitized`].
    pub fn get_config_or_default(&self) -> TConfig {
        match self.get_config() {
            Ok(config) => config,
            Err(err) => {
                log_warn!("Discarding persisted config: {}", err);
                let repaired = self.repair_stored_config();
                if let Ok(mut current) = self.config.lock() {
                    *current = Some(repaired.clone());
                }
                repaired
            }
        }
    }

    fn repair_stored_config(&self) -> TConfig {
        let parsed = self
            .config_content_provider
            .get_config_content()
            .ok()
            .flatten()
            .and_then(|content| self.config_serializer.deserialize(&content).ok());

        match parsed {
            Some(config) => {
                let repaired = config.sanitized();
                log!("Persisted config repaired with per-field defaults");
                repaired
            }
            None => {
                if let Err(e) = self.config_content_provider.clear_config_content() {
                    log_warn!("Failed to clear persisted config: {}", e);
                }
                TConfig::default()
            }
        }
    }

    pub fn set_config(&self, config: &TConfig) -> Result<(), String> {
        config
            .validate()
            .map_err(|e| format!("Config validation error: {}", e))?;

        let serialized_config = self.config_serializer.serialize(config)?;

        self.config_content_provider
            .set_config_content(&serialized_config)?;

        let mut current = self
            .config
            .lock()
            .map_err(|_| "Config cache lock poisoned".to_string())?;
        *current = Some(config.clone());
        Ok(())
    }
}
