use serde::{Deserialize, Serialize};

/// Text encoding of a persisted record. Errors are plain messages naming the record.
pub trait ConfigSerializer<TConfig> {
    fn serialize(&self, config: &TConfig) -> Result<String, String>;
    fn deserialize(&self, content: &str) -> Result<TConfig, String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct YamlConfigSerializer;

impl YamlConfigSerializer {
    pub const fn new() -> Self {
        YamlConfigSerializer
    }
}

/// `snake_engine::game::settings::GameSettings` becomes `GameSettings`.
fn record_name<TConfig>() -> &'static str {
    let full = std::any::type_name::<TConfig>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl<TConfig> ConfigSerializer<TConfig> for YamlConfigSerializer
where
    TConfig: for<'de> Deserialize<'de> + Serialize,
{
    fn serialize(&self, config: &TConfig) -> Result<String, String> {
        serde_yaml_ng::to_string(config)
            .map_err(|e| format!("Could not write {} as YAML: {}", record_name::<TConfig>(), e))
    }

    fn deserialize(&self, content: &str) -> Result<TConfig, String> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| format!("Could not read {} from YAML: {}", record_name::<TConfig>(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameSettings, HighScoreRecord};

    #[test]
    fn test_record_name_strips_module_path() {
        assert_eq!(record_name::<GameSettings>(), "GameSettings");
        assert_eq!(record_name::<HighScoreRecord>(), "HighScoreRecord");
        assert_eq!(record_name::<Vec<u32>>(), "Vec");
    }

    #[test]
    fn test_deserialize_error_names_record() {
        let serializer = YamlConfigSerializer::new();
        let result: Result<HighScoreRecord, String> =
            serializer.deserialize("high_score: [not, a, number]");
        let message = result.unwrap_err();
        assert!(message.starts_with("Could not read HighScoreRecord from YAML"), "{message}");
    }

    #[test]
    fn test_high_score_record_written_as_yaml() {
        let serializer = YamlConfigSerializer::new();
        let yaml = serializer
            .serialize(&HighScoreRecord { high_score: 120 })
            .unwrap();
        assert_eq!(yaml.trim(), "high_score: 120");

        let back: HighScoreRecord = serializer.deserialize(&yaml).unwrap();
        assert_eq!(back.high_score, 120);
    }
}
