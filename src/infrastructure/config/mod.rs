//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::application::services::FailurePolicy;
use crate::infrastructure::plugins::UnitDescriptor;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub general: GeneralConfig,
    pub bot: BotConfig,
    #[serde(default)]
    pub modules: Vec<UnitDescriptor>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GeneralConfig {
    #[serde(default = "default_true")]
    pub verbose: bool,
    #[serde(default)]
    pub on_callback_failure: FailurePolicy,
    pub persistence: Option<UnitDescriptor>,
}

/// Connection credentials and presence, consumed by the protocol adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub master: String,
    #[serde(default = "default_presence")]
    pub presence: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_resource")]
    pub resource: String,
    /// When false only the master may talk to the bot
    #[serde(default)]
    pub is_public: bool,
}

fn default_true() -> bool {
    true
}

fn default_presence() -> String {
    "chat".to_string()
}

fn default_resource() -> String {
    "Bot".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                verbose: true,
                on_callback_failure: FailurePolicy::Abort,
                persistence: Some(UnitDescriptor::new("persistence/json", "JsonStore").with_config({
                    let mut store = serde_yaml::Mapping::new();
                    store.insert("path".into(), "data/computer-bot.json".into());
                    serde_yaml::Value::Mapping(store)
                })),
            },
            bot: BotConfig {
                username: "bot@example.org".to_string(),
                password: String::new(),
                master: "me@example.org".to_string(),
                presence: default_presence(),
                status: Some("At your service".to_string()),
                resource: default_resource(),
                is_public: false,
            },
            modules: vec![
                UnitDescriptor::new("modules/notes", "Notes").named("notes"),
                UnitDescriptor::new("modules/heartbeat", "Heartbeat").named("heartbeat"),
            ],
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse and validate a YAML document
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let persistence = self
            .general
            .persistence
            .as_ref()
            .ok_or_else(|| ConfigError::MissingField("general.persistence".to_string()))?;
        persistence.validate("general.persistence")?;

        if self.bot.master.trim().is_empty() {
            return Err(ConfigError::MissingField("bot.master".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for (i, module) in self.modules.iter().enumerate() {
            let field = format!("modules[{}]", i);
            module.validate(&field)?;
            let name = module.module_name();
            if !seen.insert(name.clone()) {
                return Err(ConfigError::InvalidValue(format!(
                    "{}.name: module '{}' is configured twice",
                    field, name
                )));
            }
        }
        Ok(())
    }

    /// Check if an identity is the configured master
    pub fn is_master(&self, id: &str) -> bool {
        self.bot.master == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
general:
  verbose: false
  on-callback-failure: log
  persistence:
    source: persistence/sqlite
    type: SqliteStore
    config:
      path: ":memory:"
bot:
  username: bot@example.org
  password: hunter2
  master: me@example.org
  is-public: true
modules:
  - name: notes
    source: modules/notes
    type: Notes
    config:
      public: true
  - name: heartbeat
    source: modules/heartbeat
    type: Heartbeat
"#;

    #[test]
    fn parses_full_document() {
        let config = Config::parse(SAMPLE).unwrap();
        assert!(!config.general.verbose);
        assert_eq!(config.general.on_callback_failure, FailurePolicy::Log);

        let persistence = config.general.persistence.as_ref().unwrap();
        assert_eq!(persistence.source, "persistence/sqlite");
        assert_eq!(persistence.type_name, "SqliteStore");

        assert_eq!(config.bot.presence, "chat");
        assert_eq!(config.bot.resource, "Bot");
        assert!(config.bot.is_public);
        assert!(config.is_master("me@example.org"));
        assert!(!config.is_master("someone@example.org"));

        let names: Vec<_> = config.modules.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["notes", "heartbeat"]);
        assert!(config.modules[1].config.is_null());
    }

    #[test]
    fn missing_persistence_is_rejected() {
        let doc = "general: {}\nbot: { username: b, master: m }\n";
        assert!(matches!(Config::parse(doc), Err(ConfigError::MissingField(f)) if f == "general.persistence"));
    }

    #[test]
    fn missing_persistence_type_is_rejected() {
        let doc = r#"
general:
  persistence: { source: persistence/memory }
bot: { username: b, master: m }
"#;
        assert!(matches!(
            Config::parse(doc),
            Err(ConfigError::MissingField(f)) if f == "general.persistence.type"
        ));
    }

    #[test]
    fn duplicate_module_names_are_rejected() {
        let doc = r#"
general:
  persistence: { source: persistence/memory, type: MemoryStore }
bot: { username: b, master: m }
modules:
  - { name: notes, source: modules/notes, type: Notes }
  - { name: notes, source: modules/notes, type: Notes }
"#;
        assert!(matches!(Config::parse(doc), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn unnamed_module_clashes_with_its_type_name() {
        let doc = r#"
general:
  persistence: { source: persistence/memory, type: MemoryStore }
bot: { username: b, master: m }
modules:
  - { source: modules/notes, type: Notes }
"#;
        assert!(Config::parse(doc).is_ok());

        let clash = format!("{}  - {{ name: notes, source: modules/notes, type: Notes }}\n", doc);
        assert!(matches!(Config::parse(&clash), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn default_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed = Config::parse(&yaml).unwrap();
        assert_eq!(parsed.modules.len(), 2);
        assert_eq!(parsed.general.on_callback_failure, FailurePolicy::Abort);
    }
}
