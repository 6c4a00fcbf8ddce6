use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::BotError;
use crate::domain::entities::{IncomingMessage, Reply};
use crate::domain::entities::Identity;

/// Channel the protocol pushes received messages into
pub type Inbox = mpsc::Sender<IncomingMessage>;

/// Chat protocol client - abstraction for messaging platform adapters
///
/// The host only needs to connect, disconnect and deliver text. Received
/// messages are pushed into the `Inbox` handed over on `connect`, already
/// tagged with whether the sender is the configured master.
#[async_trait]
pub trait ChatProtocol: Send + Sync {
    /// Open the connection and start forwarding received messages
    async fn connect(&self, inbox: Inbox) -> Result<(), BotError>;

    /// Close the connection. Safe to call more than once.
    fn disconnect(&self);

    /// Send one text message to a recipient
    fn deliver(&self, recipient: &Identity, text: &str) -> Result<(), BotError>;
}

/// Anything that can send a reply back to a recipient
pub trait Outbox: Send + Sync {
    fn deliver(&self, recipient: &Identity, reply: Reply) -> Result<(), BotError>;
}
