//! The bot host: owns persistence, commands, scheduler and the protocol

use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use super::builtins;
use super::scheduler::{PeriodicEvent, Scheduler};
use super::workers::Workers;
use crate::application::errors::{BotError, CommandError, ConfigError};
use crate::application::messaging::{Dispatch, MessageDispatcher};
use crate::domain::entities::{Command, CommandRegistry, CommandResult, CommandSpec, Identity, IncomingMessage, Reply};
use crate::domain::traits::{ChatProtocol, Outbox, Persistence};
use crate::infrastructure::config::{BotConfig, Config};
use crate::infrastructure::plugins::{self, Catalog};
use crate::modules::Module;

/// Capacity of the channel between the protocol and the dispatch loop
const INBOX_CAPACITY: usize = 64;

/// Commands are collected while starting, then frozen for lock-free dispatch
struct CommandTable {
    staging: Mutex<Option<CommandRegistry>>,
    frozen: OnceLock<Arc<CommandRegistry>>,
}

impl CommandTable {
    fn new() -> Self {
        Self {
            staging: Mutex::new(Some(CommandRegistry::new())),
            frozen: OnceLock::new(),
        }
    }

    fn register(&self, command: Command) -> Result<(), CommandError> {
        let mut staging = self.staging.lock().map_err(|_| CommandError::RegistrationClosed)?;
        let registry = staging.as_mut().ok_or(CommandError::RegistrationClosed)?;
        registry.register(command);
        Ok(())
    }

    fn freeze(&self) -> Arc<CommandRegistry> {
        let staged = self.staging.lock().ok().and_then(|mut s| s.take());
        self.frozen
            .get_or_init(|| Arc::new(staged.unwrap_or_default()))
            .clone()
    }
}

struct BotInner {
    persistence: Arc<dyn Persistence>,
    protocol: Arc<dyn ChatProtocol>,
    credentials: BotConfig,
    commands: CommandTable,
    scheduler: Scheduler,
    workers: Workers,
    module_names: Mutex<Vec<String>>,
    shutdown: watch::Sender<bool>,
}

/// Handle to the bot, cheap to clone and handed to every module.
#[derive(Clone)]
pub struct Bot {
    inner: Arc<BotInner>,
}

/// Non-owning handle, used by commands that call back into the bot
#[derive(Clone)]
pub struct WeakBot {
    inner: Weak<BotInner>,
}

impl WeakBot {
    pub fn upgrade(&self) -> Option<Bot> {
        self.inner.upgrade().map(|inner| Bot { inner })
    }
}

impl Bot {
    /// Build the bot in startup order: persistence, protocol client,
    /// built-in commands, configured modules. Must run inside a tokio runtime.
    ///
    /// Any failure aborts startup. The protocol is not connected yet; call
    /// `run` for that.
    pub fn start<P>(config: &Config, catalog: &Catalog, protocol: P) -> Result<Self, BotError>
    where
        P: FnOnce(&BotConfig) -> Result<Arc<dyn ChatProtocol>, BotError>,
    {
        config.validate().inspect_err(|e| tracing::error!("Invalid configuration: {}", e))?;
        let persistence_descriptor = config.general.persistence.as_ref().ok_or_else(|| {
            tracing::error!("You need to specify a persistence backend in your config");
            ConfigError::MissingField("general.persistence".to_string())
        })?;

        let persistence = plugins::load_persistence(catalog, persistence_descriptor)?;
        let protocol = protocol(&config.bot).inspect_err(|e| tracing::error!("Protocol setup failed: {}", e))?;
        let bot = Self::assemble(persistence, protocol, config.bot.clone(), Workers::new(config.general.on_callback_failure));

        builtins::register(&bot)?;

        for descriptor in &config.modules {
            let module = plugins::load_module(catalog, descriptor, &bot)?;
            bot.record_module(module.as_ref());
        }

        let commands = bot.freeze_commands();
        tracing::info!("Bot ready: {} commands, {} modules", commands.len(), bot.module_names().len());
        Ok(bot)
    }

    /// Wire a bot from already-built parts. No commands are registered.
    pub fn assemble(
        persistence: Arc<dyn Persistence>,
        protocol: Arc<dyn ChatProtocol>,
        credentials: BotConfig,
        workers: Workers,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(BotInner {
                persistence,
                protocol,
                credentials,
                commands: CommandTable::new(),
                scheduler: Scheduler::start(workers.clone()),
                workers,
                module_names: Mutex::new(Vec::new()),
                shutdown,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakBot {
        WeakBot {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register a command. Only possible until startup completes.
    pub fn register_command<F>(&self, spec: CommandSpec, callback: F) -> Result<(), BotError>
    where
        F: Fn(&Identity, &str) -> CommandResult + Send + Sync + 'static,
    {
        let command = Command::compile(spec, Box::new(callback))?;
        tracing::debug!("Registering command '{}'", command.syntax);
        self.inner.commands.register(command)?;
        Ok(())
    }

    /// Send a reply; a sequence goes out one message per element, in order
    pub fn deliver(&self, recipient: &Identity, reply: impl Into<Reply>) -> Result<(), BotError> {
        let reply: Reply = reply.into();
        for text in reply.messages() {
            self.inner.protocol.deliver(recipient, text)?;
        }
        Ok(())
    }

    /// Run `callback` every `interval` on the worker pool, never overlapping itself
    pub fn register_periodic_event<F>(&self, interval: Duration, callback: F) -> Result<PeriodicEvent, BotError>
    where
        F: Fn() -> Result<(), BotError> + Send + Sync + 'static,
    {
        self.inner.scheduler.schedule(interval, callback)
    }

    pub fn persistence(&self) -> &Arc<dyn Persistence> {
        &self.inner.persistence
    }

    pub fn is_master(&self, identity: &Identity) -> bool {
        self.inner.credentials.master == identity.id
    }

    /// Frozen command table; `None` while the bot is still starting
    pub fn commands(&self) -> Option<Arc<CommandRegistry>> {
        self.inner.commands.frozen.get().cloned()
    }

    /// Close registration and publish the command table
    pub fn freeze_commands(&self) -> Arc<CommandRegistry> {
        self.inner.commands.freeze()
    }

    /// Names of the modules loaded at startup, in load order
    pub fn module_names(&self) -> Vec<String> {
        self.inner.module_names.lock().map(|names| names.clone()).unwrap_or_default()
    }

    /// Modules live on through the commands and events they registered;
    /// only the name is kept.
    fn record_module(&self, module: &dyn Module) {
        if let Ok(mut names) = self.inner.module_names.lock() {
            names.push(module.name().to_string());
        }
    }

    pub fn disconnect(&self) {
        self.inner.protocol.disconnect();
    }

    /// Ask `run` to return
    pub fn shutdown(&self) {
        tracing::info!("Shutdown requested");
        self.inner.shutdown.send_replace(true);
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Dispatch one incoming message on the worker pool.
    ///
    /// `None` means the command callback failed (and was logged).
    pub async fn handle(&self, message: IncomingMessage) -> Option<Dispatch> {
        if !self.inner.credentials.is_public && !message.from_master {
            tracing::debug!("Ignoring {} (bot is not public)", message.sender);
            return Some(Dispatch::Unmatched);
        }

        let Some(registry) = self.commands() else {
            tracing::warn!("Message from {} arrived before startup finished", message.sender);
            return None;
        };

        let dispatcher = MessageDispatcher::new(registry);
        let bot = self.clone();
        let label = format!("Command for {:?} from {}", message.text, message.sender);
        self.inner
            .workers
            .run(&label, move || dispatcher.dispatch(&message, &bot))
            .await
    }

    /// Connect and serve messages until shutdown, ctrl-c, or the protocol
    /// closing its side of the inbox.
    ///
    /// Messages are dispatched in arrival order; the next one is not taken
    /// until the previous command has replied.
    pub async fn run(&self) -> Result<(), BotError> {
        self.freeze_commands();
        let (inbox, mut messages) = mpsc::channel(INBOX_CAPACITY);
        let mut shutdown = self.inner.shutdown.subscribe();

        if let Err(e) = self.inner.protocol.connect(inbox).await {
            tracing::error!("Failed to connect as {}: {}", self.inner.credentials.username, e);
            return Err(e);
        }
        tracing::info!("Connected as {}", self.inner.credentials.username);

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            tokio::select! {
                _ = shutdown.changed() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received ctrl-c");
                    self.shutdown();
                }
                received = messages.recv() => match received {
                    // Sequential: the next message waits for this one's reply
                    Some(message) => {
                        self.handle(message).await;
                    }
                    None => {
                        tracing::info!("Protocol closed the inbox");
                        break;
                    }
                },
            }
        }

        self.disconnect();
        tracing::info!("The end :-)");
        Ok(())
    }
}

impl Outbox for Bot {
    fn deliver(&self, recipient: &Identity, reply: Reply) -> Result<(), BotError> {
        Bot::deliver(self, recipient, reply)
    }
}
