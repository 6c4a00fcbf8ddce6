//! Application services - the bot host and its runtime pieces

pub mod bot;
pub mod builtins;
pub mod scheduler;
pub mod workers;

pub use bot::{Bot, WeakBot};
pub use scheduler::{EventState, PeriodicCallback, PeriodicEvent, Scheduler};
pub use workers::{FailurePolicy, Workers};
