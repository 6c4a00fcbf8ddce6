//! Domain traits - Abstractions for infrastructure implementations

pub mod protocol;
pub mod persistence;

pub use protocol::{ChatProtocol, Inbox, Outbox};
pub use persistence::{Logger, Persistence};
