//! Application layer - the bot host
//! 
//! This layer contains:
//! - Services: the Bot orchestrator, built-in commands, scheduler and worker pool
//! - Messaging: matching and dispatching incoming messages
//! - Errors: error types shared by every layer

pub mod errors;
pub mod services;
pub mod messaging;
