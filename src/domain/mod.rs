//! Domain layer - Core bot concepts with no runtime dependencies
//! 
//! This layer contains:
//! - Entities: Identities, incoming messages, replies and commands
//! - Traits: Abstractions the host is wired against (ChatProtocol, Persistence, Outbox)

pub mod entities;
pub mod traits;
