//! JSON file-based storage implementation

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::traits::{Logger, Persistence};

type Namespaces = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct JsonStoreConfig {
    path: PathBuf,
}

/// JSON file-based store.
///
/// The whole map is kept in memory and the file is rewritten after every
/// write, through a temporary file so a crash never leaves it half written.
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<Namespaces>,
    logger: Logger,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>, logger: Logger) -> Result<Self, StorageError> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Namespaces::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Namespaces::new()
        };

        logger.in_scope(|| {
            tracing::info!("JSON store at {} ({} namespaces)", path.display(), data.len())
        });

        Ok(Self {
            path,
            data: Mutex::new(data),
            logger,
        })
    }

    fn flush(&self, data: &Namespaces) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(data)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Persistence for JsonStore {
    fn open(config: &serde_yaml::Value, logger: Logger) -> Result<Self, StorageError> {
        let config: JsonStoreConfig = serde_yaml::from_value(config.clone())
            .map_err(|e| StorageError::InvalidConfig(format!("json store: {}", e)))?;
        Self::new(config.path, logger)
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        let previous = data
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        if let Err(e) = self.flush(&data) {
            self.logger.in_scope(|| tracing::error!("Failed to save {}: {}", self.path.display(), e));
            // Unsaved writes must not be readable
            match previous {
                Some(old) => {
                    data.entry(namespace.to_string())
                        .or_default()
                        .insert(key.to_string(), old);
                }
                None => {
                    if let Some(keys) = data.get_mut(namespace) {
                        keys.remove(key);
                        if keys.is_empty() {
                            data.remove(namespace);
                        }
                    }
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }
}
