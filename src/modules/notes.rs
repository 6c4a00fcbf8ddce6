//! Notes module - remembers short key/value notes for its users

use regex_lite::Regex;
use serde::Deserialize;

use super::trait_def::{Module, ModuleContext};
use crate::application::errors::BotError;
use crate::domain::entities::{CommandSpec, Reply};

const REMEMBER: &str = r"^remember (\S+) (.+)$";
const RECALL: &str = r"^recall (\S+)$";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct NotesSettings {
    /// Let anyone use the commands, not just the master
    #[serde(default)]
    public: bool,
}

pub struct Notes {
    name: String,
}

impl Module for Notes {
    fn new(ctx: ModuleContext) -> Result<Self, BotError> {
        let settings: NotesSettings = ctx.settings()?;
        let remember = Regex::new(REMEMBER).map_err(|e| BotError::Module(e.to_string()))?;
        let recall = Regex::new(RECALL).map_err(|e| BotError::Module(e.to_string()))?;

        let store = ctx.bot.persistence().clone();
        let namespace = ctx.name.clone();
        ctx.bot.register_command(
            CommandSpec::new("remember <key> <value>")
                .with_description("Stores a note under a key")
                .with_pattern(REMEMBER)
                .public(settings.public),
            move |_, text| {
                let Some(caps) = remember.captures(text) else {
                    return Ok(None);
                };
                store.write(&namespace, &caps[1], &caps[2])?;
                Ok(Some(Reply::Text(format!("Got it, {} is {}", &caps[1], &caps[2]))))
            },
        )?;

        let store = ctx.bot.persistence().clone();
        let namespace = ctx.name.clone();
        ctx.bot.register_command(
            CommandSpec::new("recall <key>")
                .with_description("Reads back a stored note")
                .with_pattern(RECALL)
                .public(settings.public),
            move |_, text| {
                let Some(caps) = recall.captures(text) else {
                    return Ok(None);
                };
                let key = &caps[1];
                let reply = match store.read(&namespace, key)? {
                    Some(value) => format!("{} is {}", key, value),
                    None => format!("I don't know {}", key),
                };
                Ok(Some(Reply::Text(reply)))
            },
        )?;

        ctx.logger.in_scope(|| tracing::info!("Notes ready (public: {})", settings.public));
        Ok(Self { name: ctx.name })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
