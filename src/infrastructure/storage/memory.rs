//! In-process storage, lost on exit

use std::collections::HashMap;
use std::sync::RwLock;

use crate::application::errors::StorageError;
use crate::domain::traits::{Logger, Persistence};

/// Nested map: namespace -> key -> value
pub struct MemoryStore {
    data: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for MemoryStore {
    fn open(_config: &serde_yaml::Value, logger: Logger) -> Result<Self, StorageError> {
        logger.in_scope(|| tracing::info!("Using in-memory persistence, nothing survives a restart"));
        Ok(Self::new())
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().map_err(|_| StorageError::Poisoned)?;
        data.entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.read().map_err(|_| StorageError::Poisoned)?;
        Ok(data.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }
}
