//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Module error: {0}")]
    Module(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command registration and execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command spec: {0}")]
    InvalidSpec(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Commands can only be registered during startup")]
    RegistrationClosed,

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid backend config: {0}")]
    InvalidConfig(String),

    #[error("Lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Failures while resolving a configured unit (persistence backend or module)
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Couldn't find {path} for {unit}")]
    SourceNotFound { unit: &'static str, path: String },

    #[error("Couldn't instantiate {type_name}. Maybe it's not defined in {path}")]
    TypeNotResolvable {
        unit: &'static str,
        path: String,
        type_name: String,
    },

    #[error("{type_name} from {path} failed to start: {reason}")]
    InstantiationFailed {
        unit: &'static str,
        path: String,
        type_name: String,
        reason: String,
    },
}

impl LoadError {
    /// Which kind of unit was being loaded ("persistence" or "module")
    pub fn unit(&self) -> &'static str {
        match self {
            LoadError::SourceNotFound { unit, .. }
            | LoadError::TypeNotResolvable { unit, .. }
            | LoadError::InstantiationFailed { unit, .. } => unit,
        }
    }
}
