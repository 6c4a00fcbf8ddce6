//! Commands every bot has, registered before any module

use super::bot::Bot;
use crate::application::errors::BotError;
use crate::domain::entities::{CommandSpec, Reply};

pub const PONG: &str = "Pong!";
pub const FAREWELL: &str = "Bye bye.";

pub fn register(bot: &Bot) -> Result<(), BotError> {
    bot.register_command(
        CommandSpec::new("ping")
            .with_description("Returns a pong and a timestamp")
            .with_pattern(r"^ping$"),
        |_, _| Ok(Some(Reply::Text(format!("{} ({})", PONG, chrono::Local::now().format("%Y-%m-%d %H:%M:%S %z"))))),
    )?;

    let handle = bot.downgrade();
    bot.register_command(
        CommandSpec::new("bye")
            .with_description("Swiftly disconnects the bot")
            .with_pattern(r"^bye$"),
        move |sender, _| {
            let Some(bot) = handle.upgrade() else {
                return Ok(None);
            };
            // Reply first, then drop the connection, then stop the process
            if let Err(e) = bot.deliver(sender, FAREWELL) {
                tracing::warn!("Could not say goodbye to {}: {}", sender, e);
            }
            bot.disconnect();
            bot.shutdown();
            Ok(None)
        },
    )?;

    let handle = bot.downgrade();
    bot.register_command(
        CommandSpec::new("help")
            .with_description("Lists the commands you can use")
            .with_pattern(r"^help$")
            .public(true),
        move |sender, _| {
            let Some(bot) = handle.upgrade() else {
                return Ok(None);
            };
            let Some(commands) = bot.commands() else {
                return Ok(None);
            };
            let lines: Vec<String> = commands
                .visible_to(bot.is_master(sender))
                .map(|c| format!("{} - {}", c.syntax, c.description))
                .collect();
            Ok(Some(Reply::Text(format!("Available commands:\n{}", lines.join("\n")))))
        },
    )?;

    Ok(())
}
