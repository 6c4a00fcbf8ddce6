//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use computer_bot::domain::entities::Identity;
use computer_bot::domain::traits::{ChatProtocol, Inbox};
use computer_bot::{Bot, BotError, Catalog, Config};

pub const MASTER: &str = "me@example.org";
pub const GUEST: &str = "guest@example.org";

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolEvent {
    Connect,
    Deliver { to: String, text: String },
    Disconnect,
}

/// Protocol double that records every call
#[derive(Default)]
pub struct RecordingProtocol {
    events: Mutex<Vec<ProtocolEvent>>,
    inbox: Mutex<Option<Inbox>>,
    connected: AtomicBool,
    refuse_connect: bool,
}

impl RecordingProtocol {
    pub fn refusing() -> Self {
        Self {
            refuse_connect: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<ProtocolEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn delivered(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProtocolEvent::Deliver { to, text } => Some((to, text)),
                _ => None,
            })
            .collect()
    }

    /// Wait until `run` has connected and handed over its inbox
    pub async fn inbox(&self) -> Inbox {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(inbox) = self.inbox.lock().unwrap().clone() {
                return inbox;
            }
            assert!(Instant::now() < deadline, "bot never connected");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Drop the inbox so `run` sees the protocol go away
    pub fn hang_up(&self) {
        self.inbox.lock().unwrap().take();
    }
}

#[async_trait]
impl ChatProtocol for RecordingProtocol {
    async fn connect(&self, inbox: Inbox) -> Result<(), BotError> {
        if self.refuse_connect {
            return Err(BotError::Protocol("connection refused".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        self.events.lock().unwrap().push(ProtocolEvent::Connect);
        *self.inbox.lock().unwrap() = Some(inbox);
        Ok(())
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.events.lock().unwrap().push(ProtocolEvent::Disconnect);
        }
    }

    fn deliver(&self, recipient: &Identity, text: &str) -> Result<(), BotError> {
        self.events.lock().unwrap().push(ProtocolEvent::Deliver {
            to: recipient.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// A config with in-memory persistence, logging policy and `modules` appended verbatim
pub fn config_with(modules: &str, public: bool) -> Config {
    let yaml = format!(
        r#"
general:
  verbose: false
  on-callback-failure: log
  persistence:
    source: persistence/memory
    type: MemoryStore
bot:
  username: bot@example.org
  master: {master}
  is-public: {public}
modules:
{modules}
"#,
        master = MASTER,
        public = public,
        modules = if modules.trim().is_empty() { "  []" } else { modules },
    );
    Config::parse(&yaml).expect("test config parses")
}

pub fn start(config: &Config, catalog: &Catalog, protocol: &Arc<RecordingProtocol>) -> Result<Bot, BotError> {
    let protocol = protocol.clone();
    Bot::start(config, catalog, move |_| Ok(protocol as Arc<dyn ChatProtocol>))
}

pub async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
