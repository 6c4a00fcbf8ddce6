use regex_lite::Regex;

use super::{Identity, Reply};
use crate::application::errors::CommandError;

/// What a command callback returns: `Ok(None)` means "nothing to send back"
pub type CommandResult = Result<Option<Reply>, CommandError>;

/// Command callback, invoked with the sender and the raw message text
pub type CommandCallback = Box<dyn Fn(&Identity, &str) -> CommandResult + Send + Sync>;

/// Registration request for a command.
///
/// Syntax, description and pattern are all required; `register` rejects
/// a spec that is missing any of them.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    pub syntax: String,
    pub description: Option<String>,
    pub pattern: Option<String>,
    pub is_public: bool,
}

impl CommandSpec {
    pub fn new(syntax: impl Into<String>) -> Self {
        Self {
            syntax: syntax.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// A registered bot command
pub struct Command {
    pub syntax: String,
    pub description: String,
    pub matcher: Regex,
    pub is_public: bool,
    callback: CommandCallback,
}

impl Command {
    /// Validates the spec and compiles its pattern
    pub fn compile(spec: CommandSpec, callback: CommandCallback) -> Result<Self, CommandError> {
        if spec.syntax.trim().is_empty() {
            return Err(CommandError::InvalidSpec("missing syntax".to_string()));
        }
        let description = spec
            .description
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| CommandError::InvalidSpec(format!("'{}' has no description", spec.syntax)))?;
        let pattern = spec
            .pattern
            .ok_or_else(|| CommandError::InvalidSpec(format!("'{}' has no pattern", spec.syntax)))?;
        let matcher = Regex::new(&pattern).map_err(|e| CommandError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            syntax: spec.syntax,
            description,
            matcher,
            is_public: spec.is_public,
            callback,
        })
    }

    /// True when `text` matches and the sender is allowed to run this command
    pub fn accepts(&self, text: &str, from_master: bool) -> bool {
        (self.is_public || from_master) && self.matcher.is_match(text)
    }

    pub fn invoke(&self, sender: &Identity, text: &str) -> CommandResult {
        (self.callback)(sender, text)
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("syntax", &self.syntax)
            .field("pattern", &self.matcher.as_str())
            .field("is_public", &self.is_public)
            .finish()
    }
}

/// Ordered command table. First registered match wins.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        if self.commands.iter().any(|c| c.syntax == command.syntax) {
            tracing::debug!("Command '{}' registered again, the earlier one shadows it", command.syntax);
        }
        self.commands.push(command);
    }

    /// First command accepting `text` for this sender
    pub fn find(&self, text: &str, from_master: bool) -> Option<&Command> {
        self.commands.iter().find(|c| c.accepts(text, from_master))
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Commands a sender may run, in registration order
    pub fn visible_to(&self, from_master: bool) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(move |c| c.is_public || from_master)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
