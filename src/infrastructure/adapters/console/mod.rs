//! Console adapter for development/testing
//!
//! Every stdin line is a message from the master. A line written as
//! `@someone text` is sent as `someone` instead, to try out public commands.

use async_trait::async_trait;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::{Identity, IncomingMessage};
use crate::domain::traits::{ChatProtocol, Inbox};
use crate::infrastructure::config::BotConfig;

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    master: Identity,
    presence: String,
    status: Option<String>,
    connected: Arc<AtomicBool>,
}

impl ConsoleAdapter {
    pub fn new(credentials: &BotConfig) -> Self {
        Self {
            master: Identity::new(credentials.master.clone()),
            presence: credentials.presence.clone(),
            status: credentials.status.clone(),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Turn one input line into a message, `None` for blank lines
    pub fn parse_line(&self, line: &str) -> Option<IncomingMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(rest) = line.strip_prefix('@') {
            let (who, text) = rest.split_once(char::is_whitespace)?;
            let text = text.trim();
            if who.is_empty() || text.is_empty() {
                return None;
            }
            let from_master = who == self.master.id;
            return Some(IncomingMessage::new(who, text).with_master(from_master));
        }

        Some(IncomingMessage::new(self.master.clone(), line).with_master(true))
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProtocol for ConsoleAdapter {
    async fn connect(&self, inbox: Inbox) -> Result<(), BotError> {
        if self.connected.swap(true, Ordering::SeqCst) {
            return Err(BotError::Protocol("console already connected".to_string()));
        }
        tracing::info!(
            "Starting console bot (dev mode), presence: {}, status: {}",
            self.presence,
            self.status.as_deref().unwrap_or("-")
        );

        let connected = self.connected.clone();
        let parser = ConsoleAdapter {
            master: self.master.clone(),
            presence: self.presence.clone(),
            status: self.status.clone(),
            connected: self.connected.clone(),
        };
        std::thread::Builder::new()
            .name("console-stdin".to_string())
            .spawn(move || {
                let stdin = std::io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    if !connected.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Some(message) = parser.parse_line(&line) {
                        if inbox.blocking_send(message).is_err() {
                            break;
                        }
                    }
                }
                tracing::info!("Console input closed");
            })
            .map_err(|e| BotError::Protocol(format!("failed to start console reader: {}", e)))?;

        Ok(())
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            tracing::info!("Console disconnected");
        }
    }

    fn deliver(&self, recipient: &Identity, text: &str) -> Result<(), BotError> {
        if !self.is_connected() {
            return Err(BotError::Protocol("console is not connected".to_string()));
        }
        println!("[bot -> {}] {}", recipient, text);
        Ok(())
    }
}
