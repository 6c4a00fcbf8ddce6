use crate::application::errors::StorageError;

/// Logging sink handed to backends and modules: a span carrying the unit's name
pub type Logger = tracing::Span;

/// Namespaced key/value storage shared by every module.
///
/// Each module uses its own name as namespace, so the same key written by
/// two modules never collides. Implementations are called from worker
/// threads concurrently and must do their own locking.
pub trait Persistence: Send + Sync {
    /// Build the backend from its config block
    fn open(config: &serde_yaml::Value, logger: Logger) -> Result<Self, StorageError>
    where
        Self: Sized;

    /// Store `value` under (`namespace`, `key`), replacing any previous value
    fn write(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value under (`namespace`, `key`). A key never written is `Ok(None)`.
    fn read(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError>;
}
