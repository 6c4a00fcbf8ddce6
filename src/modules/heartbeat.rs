//! Heartbeat module - a periodic event that counts its own beats

use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use super::trait_def::{Module, ModuleContext};
use crate::application::errors::BotError;
use crate::application::services::PeriodicEvent;
use crate::domain::entities::{CommandSpec, Reply};

pub const BEATS_KEY: &str = "beats";
pub const LAST_BEAT_KEY: &str = "last-beat";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct HeartbeatSettings {
    interval_ms: u64,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self { interval_ms: 60_000 }
    }
}

pub struct Heartbeat {
    name: String,
    event: PeriodicEvent,
}

impl Heartbeat {
    pub fn event(&self) -> &PeriodicEvent {
        &self.event
    }
}

impl Module for Heartbeat {
    fn new(ctx: ModuleContext) -> Result<Self, BotError> {
        let settings: HeartbeatSettings = ctx.settings()?;

        let store = ctx.bot.persistence().clone();
        let namespace = ctx.name.clone();
        let logger = ctx.logger.clone();
        let event = ctx.bot.register_periodic_event(Duration::from_millis(settings.interval_ms), move || {
            let _span = logger.enter();
            let beats = store
                .read(&namespace, BEATS_KEY)?
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(0)
                + 1;
            store.write(&namespace, BEATS_KEY, &beats.to_string())?;
            store.write(&namespace, LAST_BEAT_KEY, &Utc::now().to_rfc3339())?;
            tracing::debug!("Beat #{}", beats);
            Ok(())
        })?;

        let handle = event.clone();
        ctx.bot.register_command(
            CommandSpec::new("heartbeat stop")
                .with_description("Stops the heartbeat")
                .with_pattern(r"^heartbeat stop$"),
            move |_, _| {
                handle.cancel();
                Ok(Some(Reply::from("Heartbeat stopped")))
            },
        )?;

        let handle = event.clone();
        let store = ctx.bot.persistence().clone();
        let namespace = ctx.name.clone();
        ctx.bot.register_command(
            CommandSpec::new("heartbeat")
                .with_description("Shows how many beats so far")
                .with_pattern(r"^heartbeat$"),
            move |_, _| {
                let beats = store.read(&namespace, BEATS_KEY)?.unwrap_or_else(|| "0".to_string());
                let last = store.read(&namespace, LAST_BEAT_KEY)?.unwrap_or_else(|| "never".to_string());
                let status = if handle.is_cancelled() { "stopped" } else { "running" };
                Ok(Some(Reply::Many(vec![
                    format!("Beats: {}", beats),
                    format!("Last beat: {}", last),
                    format!("Status: {}", status),
                ])))
            },
        )?;

        ctx.logger.in_scope(|| tracing::info!("Beating every {}ms", settings.interval_ms));
        Ok(Self { name: ctx.name, event })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
