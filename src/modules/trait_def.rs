//! Module trait definitions

use serde::de::DeserializeOwned;

use crate::application::errors::BotError;
use crate::application::services::Bot;
use crate::domain::traits::Logger;

/// What every module receives when it is constructed
pub struct ModuleContext {
    /// Namespace for the module's commands and persisted keys
    pub name: String,
    pub bot: Bot,
    /// The module's `config` block, `Null` when absent
    pub config: serde_yaml::Value,
    pub logger: Logger,
}

impl ModuleContext {
    /// Deserialize the config block, falling back to defaults when it is absent
    pub fn settings<T: DeserializeOwned + Default>(&self) -> Result<T, BotError> {
        if self.config.is_null() {
            return Ok(T::default());
        }
        serde_yaml::from_value(self.config.clone())
            .map_err(|e| BotError::Module(format!("{}: invalid config: {}", self.name, e)))
    }
}

/// Core module trait that all bot modules must implement.
///
/// A module wires itself up inside `new`: it registers commands and periodic
/// events through `ctx.bot` and keeps whatever it needs from the context.
/// Commands can only be registered while the bot is starting.
pub trait Module: Send + Sync {
    fn new(ctx: ModuleContext) -> Result<Self, BotError>
    where
        Self: Sized;

    /// Namespace the module was loaded under
    fn name(&self) -> &str;
}
