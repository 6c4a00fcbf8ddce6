use super::Identity;
use chrono::{DateTime, Utc};

/// A text message received by the protocol adapter
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: String,
    pub sender: Identity,
    pub text: String,
    /// Set by the protocol when the sender is the configured master
    pub from_master: bool,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(sender: impl Into<Identity>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            text: text.into(),
            from_master: false,
            received_at: Utc::now(),
        }
    }

    pub fn with_master(mut self, from_master: bool) -> Self {
        self.from_master = from_master;
        self
    }
}

/// What a command callback hands back to its sender.
///
/// `Many` is delivered one message per element, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Many(Vec<String>),
}

impl Reply {
    pub fn messages(&self) -> &[String] {
        match self {
            Reply::Text(text) => std::slice::from_ref(text),
            Reply::Many(texts) => texts,
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        match self {
            Reply::Text(text) => vec![text],
            Reply::Many(texts) => texts,
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Vec<String>> for Reply {
    fn from(texts: Vec<String>) -> Self {
        Reply::Many(texts)
    }
}

impl From<Vec<&str>> for Reply {
    fn from(texts: Vec<&str>) -> Self {
        Reply::Many(texts.into_iter().map(str::to_string).collect())
    }
}
