//! Bot modules
//! 
//! A module is loaded from configuration, gets a namespace, the bot handle,
//! its config block and a logger, and registers commands and periodic events.

pub mod heartbeat;
pub mod notes;
pub mod trait_def;

pub use heartbeat::Heartbeat;
pub use notes::Notes;
pub use trait_def::{Module, ModuleContext};
