//! Periodic events
//!
//! A single actor task owns every event's timer. When a timer fires the
//! actor hands the callback to the worker pool; the worker reports back with
//! `Completed` and only then is the next timer armed. Two runs of the same
//! event can therefore never overlap.
//!
//! The actor only holds a weak sender to itself: once every `Scheduler`
//! handle is dropped it stops, and pending timers are discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::workers::Workers;
use crate::application::errors::BotError;

/// Body of a periodic event
pub type PeriodicCallback = Box<dyn Fn() -> Result<(), BotError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    /// Waiting for the timer
    Scheduled,
    /// Callback in flight on a worker
    Running,
    /// Cancelled and dropped by the scheduler
    Terminated,
}

impl EventState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => EventState::Scheduled,
            1 => EventState::Running,
            _ => EventState::Terminated,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            EventState::Scheduled => 0,
            EventState::Running => 1,
            EventState::Terminated => 2,
        }
    }
}

struct EventShared {
    id: Uuid,
    interval: Duration,
    cancelled: AtomicBool,
    state: AtomicU8,
    runs: AtomicU64,
    callback: PeriodicCallback,
}

impl EventShared {
    fn set_state(&self, state: EventState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }
}

/// Handle to a registered periodic event. Keep it to cancel the event later.
#[derive(Clone)]
pub struct PeriodicEvent {
    shared: Arc<EventShared>,
}

impl PeriodicEvent {
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    /// Stop rescheduling. A run already in flight still completes.
    pub fn cancel(&self) {
        if !self.shared.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("Periodic event {} cancelled", self.shared.id);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> EventState {
        EventState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }

    /// Number of runs that have finished
    pub fn runs(&self) -> u64 {
        self.shared.runs.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for PeriodicEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicEvent")
            .field("id", &self.id())
            .field("interval", &self.interval())
            .field("state", &self.state())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

enum SchedulerMsg {
    Register(Arc<EventShared>),
    Fire(Uuid),
    Completed(Uuid),
}

/// Handle to the scheduler actor
#[derive(Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<SchedulerMsg>,
}

impl Scheduler {
    /// Spawn the actor on the current tokio runtime
    pub fn start(workers: Workers) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = SchedulerActor {
            events: HashMap::new(),
            tx: tx.downgrade(),
            workers,
        };
        tokio::spawn(actor.run(rx));
        Self { tx }
    }

    /// Register `callback` to run every `interval`, first run one interval from now
    pub fn schedule<F>(&self, interval: Duration, callback: F) -> Result<PeriodicEvent, BotError>
    where
        F: Fn() -> Result<(), BotError> + Send + Sync + 'static,
    {
        if interval.is_zero() {
            return Err(BotError::Scheduler("interval must be greater than zero".to_string()));
        }

        let shared = Arc::new(EventShared {
            id: Uuid::new_v4(),
            interval,
            cancelled: AtomicBool::new(false),
            state: AtomicU8::new(EventState::Scheduled.as_u8()),
            runs: AtomicU64::new(0),
            callback: Box::new(callback),
        });

        self.tx
            .send(SchedulerMsg::Register(shared.clone()))
            .map_err(|_| BotError::Scheduler("scheduler is not running".to_string()))?;

        tracing::debug!("Periodic event {} every {:?}", shared.id, interval);
        Ok(PeriodicEvent { shared })
    }
}

struct SchedulerActor {
    events: HashMap<Uuid, Arc<EventShared>>,
    tx: mpsc::WeakUnboundedSender<SchedulerMsg>,
    workers: Workers,
}

impl SchedulerActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SchedulerMsg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                SchedulerMsg::Register(event) => {
                    self.arm(&event);
                    self.events.insert(event.id, event);
                }
                SchedulerMsg::Fire(id) => self.fire(id),
                SchedulerMsg::Completed(id) => self.completed(id),
            }
        }
        tracing::debug!("Scheduler stopped with {} events pending", self.events.len());
    }

    fn arm(&self, event: &EventShared) {
        let tx = self.tx.clone();
        let id = event.id;
        let interval = event.interval;
        tokio::spawn(async move {
            tokio::time::sleep(interval).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(SchedulerMsg::Fire(id));
            }
        });
    }

    fn fire(&mut self, id: Uuid) {
        let Some(event) = self.events.get(&id).cloned() else {
            return;
        };
        if event.cancelled.load(Ordering::SeqCst) {
            self.terminate(id);
            return;
        }

        event.set_state(EventState::Running);
        let tx = self.tx.clone();
        let workers = self.workers.clone();
        tokio::spawn(async move {
            let label = format!("Periodic event {}", id);
            let job = event.clone();
            workers.run(&label, move || (job.callback)()).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(SchedulerMsg::Completed(id));
            }
        });
    }

    fn completed(&mut self, id: Uuid) {
        let Some(event) = self.events.get(&id).cloned() else {
            return;
        };
        event.runs.fetch_add(1, Ordering::SeqCst);
        if event.cancelled.load(Ordering::SeqCst) {
            self.terminate(id);
            return;
        }
        event.set_state(EventState::Scheduled);
        self.arm(&event);
    }

    fn terminate(&mut self, id: Uuid) {
        if let Some(event) = self.events.remove(&id) {
            event.set_state(EventState::Terminated);
            tracing::debug!("Periodic event {} terminated after {} runs", id, event.runs.load(Ordering::SeqCst));
        }
    }
}
