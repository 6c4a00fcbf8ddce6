//! SQLite-backed storage

use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::traits::{Logger, Persistence};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SqliteStoreConfig {
    path: PathBuf,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(path: impl Into<PathBuf>, logger: Logger) -> Result<Self, StorageError> {
        let path = path.into();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(&path)?
        };
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        logger.in_scope(|| tracing::info!("SQLite store at {}", path.display()));
        Ok(store)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (namespace, key)
            )",
            [],
        )?;
        Ok(())
    }
}

impl Persistence for SqliteStore {
    fn open(config: &serde_yaml::Value, logger: Logger) -> Result<Self, StorageError> {
        let config: SqliteStoreConfig = serde_yaml::from_value(config.clone())
            .map_err(|e| StorageError::InvalidConfig(format!("sqlite store: {}", e)))?;
        Self::new(config.path, logger)
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv (namespace, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(namespace, key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            rusqlite::params![namespace, key, value],
        )?;
        Ok(())
    }

    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE namespace = ?1 AND key = ?2",
                rusqlite::params![namespace, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
