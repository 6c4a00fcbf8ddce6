//! Message dispatcher - Routes messages to commands

use std::sync::Arc;

use crate::application::errors::BotError;
use crate::domain::entities::{CommandRegistry, IncomingMessage};
use crate::domain::traits::Outbox;

/// Outcome of dispatching one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No command accepted the text; nothing was done
    Unmatched,
    /// `syntax` ran; `delivered` counts the reply messages sent back
    Handled { syntax: String, delivered: usize },
}

/// Matches, invokes and replies, all on the calling thread
#[derive(Clone)]
pub struct MessageDispatcher {
    registry: Arc<CommandRegistry>,
}

impl MessageDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Run the first command accepting `message` and deliver its reply.
    ///
    /// A callback error is returned to the caller. A failed delivery is only
    /// logged: the command did run.
    pub fn dispatch(&self, message: &IncomingMessage, outbox: &dyn Outbox) -> Result<Dispatch, BotError> {
        let Some(command) = self.registry.find(&message.text, message.from_master) else {
            tracing::debug!("No command for {:?} from {}", message.text, message.sender);
            return Ok(Dispatch::Unmatched);
        };

        tracing::debug!("'{}' triggered by {}", command.syntax, message.sender);
        let reply = command.invoke(&message.sender, &message.text)?;

        let delivered = match reply {
            Some(reply) => {
                let count = reply.messages().len();
                match outbox.deliver(&message.sender, reply) {
                    Ok(()) => count,
                    Err(e) => {
                        tracing::warn!("Failed to reply to {}: {}", message.sender, e);
                        0
                    }
                }
            }
            None => 0,
        };

        Ok(Dispatch::Handled {
            syntax: command.syntax.clone(),
            delivered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::CommandError;
    use crate::domain::entities::{Command, CommandSpec, Identity, Reply};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl Outbox for Recorder {
        fn deliver(&self, recipient: &Identity, reply: Reply) -> Result<(), BotError> {
            let mut sent = self.sent.lock().unwrap();
            for text in reply.into_messages() {
                sent.push((recipient.id.clone(), text));
            }
            Ok(())
        }
    }

    fn spec(syntax: &str, pattern: &str, public: bool) -> CommandSpec {
        CommandSpec::new(syntax)
            .with_description("test")
            .with_pattern(pattern)
            .public(public)
    }

    #[test]
    fn only_matching_command_runs_once() {
        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));
        let (a, b) = (hits_a.clone(), hits_b.clone());

        let mut registry = CommandRegistry::new();
        registry.register(
            Command::compile(
                spec("a", "^a$", true),
                Box::new(move |_, _| {
                    a.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }),
            )
            .unwrap(),
        );
        registry.register(
            Command::compile(
                spec("b", "^b$", true),
                Box::new(move |_, _| {
                    b.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                }),
            )
            .unwrap(),
        );

        let dispatcher = MessageDispatcher::new(Arc::new(registry));
        let outbox = Recorder::default();
        let result = dispatcher.dispatch(&IncomingMessage::new("u", "b"), &outbox).unwrap();

        assert_eq!(result, Dispatch::Handled { syntax: "b".to_string(), delivered: 0 });
        assert_eq!(hits_a.load(Ordering::SeqCst), 0);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn sequence_reply_is_delivered_in_order() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::compile(
                spec("list", "^list$", true),
                Box::new(|_, _| Ok(Some(Reply::from(vec!["1", "2", "3"])))),
            )
            .unwrap(),
        );

        let dispatcher = MessageDispatcher::new(Arc::new(registry));
        let outbox = Recorder::default();
        let result = dispatcher.dispatch(&IncomingMessage::new("u", "list"), &outbox).unwrap();

        assert_eq!(result, Dispatch::Handled { syntax: "list".to_string(), delivered: 3 });
        let sent = outbox.sent.lock().unwrap();
        let texts: Vec<_> = sent.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
        assert!(sent.iter().all(|(to, _)| to == "u"));
    }

    #[test]
    fn unmatched_and_unauthorized_do_nothing() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::compile(spec("secret", "^secret$", false), Box::new(|_, _| Ok(Some("x".into())))).unwrap(),
        );

        let dispatcher = MessageDispatcher::new(Arc::new(registry));
        let outbox = Recorder::default();

        let miss = dispatcher.dispatch(&IncomingMessage::new("u", "nothing"), &outbox).unwrap();
        let guest = dispatcher.dispatch(&IncomingMessage::new("u", "secret"), &outbox).unwrap();
        assert_eq!(miss, Dispatch::Unmatched);
        assert_eq!(guest, Dispatch::Unmatched);
        assert!(outbox.sent.lock().unwrap().is_empty());

        let master = dispatcher
            .dispatch(&IncomingMessage::new("me", "secret").with_master(true), &outbox)
            .unwrap();
        assert_eq!(master, Dispatch::Handled { syntax: "secret".to_string(), delivered: 1 });
    }

    #[test]
    fn callback_error_is_returned() {
        let mut registry = CommandRegistry::new();
        registry.register(
            Command::compile(
                spec("boom", "^boom$", true),
                Box::new(|_, _| Err(CommandError::ExecutionFailed("boom".to_string()))),
            )
            .unwrap(),
        );

        let dispatcher = MessageDispatcher::new(Arc::new(registry));
        let result = dispatcher.dispatch(&IncomingMessage::new("u", "boom"), &Recorder::default());
        assert!(matches!(result, Err(BotError::Command(CommandError::ExecutionFailed(_)))));
    }
}
