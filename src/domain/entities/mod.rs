//! Domain entities - Core bot objects

pub mod identity;
pub mod message;
pub mod command;

pub use identity::Identity;
pub use message::{IncomingMessage, Reply};
pub use command::{Command, CommandCallback, CommandRegistry, CommandResult, CommandSpec};
