//! Periodic poll and sweep timers.
//!
//! Two independent tokio tasks drive the dashboard: the poll loop fetches a
//! batch on every tick and applies it, the sweep loop expires warnings on
//! its own cadence. Wall-clock instants come from a [`Clock`] so tests can
//! pin them, while tick timing follows tokio's (pausable) clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::dashboard::DashboardState;
use crate::poller::Fetcher;

// ---

/// Dashboard state shared between the timers and the HTTP read side.
pub type SharedState = Arc<RwLock<DashboardState>>;

/// Source of "now" for warning timestamps and retention.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Timer cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub poll_every: Duration,
    pub sweep_every: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            poll_every: Duration::from_secs(5),
            sweep_every: Duration::from_secs(60),
        }
    }
}

/// Owns the running timers. Dropping it aborts both tasks; a poll request
/// still in flight is dropped at its await point and never reaches the state.
pub struct DashboardHandle {
    state: SharedState,
    poll_task: JoinHandle<()>,
    sweep_task: JoinHandle<()>,
}

impl DashboardHandle {
    /// Start polling immediately and sweeping after the first sweep period.
    pub fn start(
        state: SharedState,
        fetcher: Arc<dyn Fetcher>,
        clock: Arc<dyn Clock>,
        schedule: Schedule,
    ) -> Self {
        // ---
        let poll_task = spawn_poll_loop(
            state.clone(),
            fetcher,
            clock.clone(),
            schedule.poll_every,
        );
        let sweep_task = spawn_sweep_loop(state.clone(), clock, schedule.sweep_every);

        Self {
            state,
            poll_task,
            sweep_task,
        }
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        self.poll_task.abort();
        self.sweep_task.abort();
    }
}

/// Run one poll cycle: fetch outside the lock, then apply.
pub async fn poll_once(state: &SharedState, fetcher: &dyn Fetcher, clock: &dyn Clock) {
    // ---
    let outcome = fetcher.fetch().await;
    let now = clock.now();

    let mut guard = state.write().await;
    match guard.on_poll(outcome, now) {
        Ok(summary) => {
            debug!(
                "Poll applied: received={} stored={}",
                summary.received, summary.stored
            );
            if summary.new_warnings > 0 {
                info!("{} new threshold warnings", summary.new_warnings);
            }
        }
        Err(e) => warn!("Poll failed: {}", e),
    }
}

pub fn spawn_poll_loop(
    state: SharedState,
    fetcher: Arc<dyn Fetcher>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            poll_once(&state, fetcher.as_ref(), clock.as_ref()).await;
        }
    })
}

pub fn spawn_sweep_loop(
    state: SharedState,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> JoinHandle<()> {
    // ---
    tokio::spawn(async move {
        let Some(start) = Instant::now().checked_add(period) else {
            error!("Sweep period {:?} is out of range, warning sweep disabled", period);
            return;
        };
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let evicted = state.write().await.on_sweep(clock.now());
            if evicted > 0 {
                debug!("Sweep evicted {} warnings", evicted);
            }
        }
    })
}
