//! Worker pool for module callbacks
//!
//! Command and periodic callbacks are synchronous module code. They run on
//! tokio's blocking pool so a slow callback never stalls the event loop.

use serde::{Deserialize, Serialize};
use std::any::Any;

use crate::application::errors::BotError;

/// What happens when a module callback panics or returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log and exit the process
    #[default]
    Abort,
    /// Log and carry on
    Log,
}

/// Exit code used when a callback failure takes the process down
pub const CALLBACK_FAILURE_EXIT_CODE: i32 = 70;

#[derive(Debug, Clone)]
pub struct Workers {
    policy: FailurePolicy,
}

impl Workers {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    /// Run `job` off the event loop and wait for it.
    ///
    /// Returns `None` when the job failed; by then the failure has been
    /// logged and, under `FailurePolicy::Abort`, the process is exiting.
    pub async fn run<T, F>(&self, label: &str, job: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, BotError> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::task::spawn_blocking(job).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.fail(label, &e.to_string());
                None
            }
            Err(e) if e.is_panic() => {
                self.fail(label, &panic_message(e.into_panic()));
                None
            }
            Err(e) => {
                tracing::warn!("{} was cancelled: {}", label, e);
                None
            }
        }
    }

    fn fail(&self, label: &str, reason: &str) {
        tracing::error!("{} failed: {}", label, reason);
        if self.policy == FailurePolicy::Abort {
            tracing::error!("Unhandled callback failure, shutting down");
            std::process::exit(CALLBACK_FAILURE_EXIT_CODE);
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
