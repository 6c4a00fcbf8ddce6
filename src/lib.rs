//! computer-bot: a chat-bot host with pluggable modules and persistence

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod modules;

pub use application::errors::BotError;
pub use application::services::{Bot, FailurePolicy, PeriodicEvent};
pub use infrastructure::config::Config;
pub use infrastructure::plugins::Catalog;
