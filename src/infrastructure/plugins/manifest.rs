//! Descriptor for a configurable unit (persistence backend or bot module)

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;

/// Where to find a unit and how to configure it.
///
/// `source` names a group of units in the catalog, `type` the concrete unit
/// inside it. `config` is handed to the unit untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct UnitDescriptor {
    /// Namespace for modules; unused for the persistence backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub source: String,

    #[serde(rename = "type", default)]
    pub type_name: String,

    #[serde(default, skip_serializing_if = "serde_yaml::Value::is_null")]
    pub config: serde_yaml::Value,
}

impl UnitDescriptor {
    pub fn new(source: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            source: source.into(),
            type_name: type_name.into(),
            config: serde_yaml::Value::Null,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: serde_yaml::Value) -> Self {
        self.config = config;
        self
    }

    /// Namespace a module is loaded under: its `name`, or the lowercased type
    pub fn module_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.type_name.to_lowercase())
    }

    /// `field` is the config path used in error messages
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.source", field)));
        }
        if self.type_name.trim().is_empty() {
            return Err(ConfigError::MissingField(format!("{}.type", field)));
        }
        Ok(())
    }
}
