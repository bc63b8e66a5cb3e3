//! Observation loop and session handle.
//!
//! An [`ObservationLoop`] owns a single repeating timer that re-runs the
//! traversal over the current root document. An [`Observation`] packages a
//! fresh inventory with its loop, so independent sessions can run against
//! different pages at the same time.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ExtractionConfig;
use crate::driver::RootSource;
use crate::error::ScoutError;
use crate::inventory::{ElementDescriptor, Inventory};
use crate::traversal::{PassReport, Traversal};

/// Lifecycle of an observation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Created, no timer installed.
    Idle,
    /// A timer is installed and pulses are firing.
    Running,
    /// Terminal. No further passes start.
    Stopped,
}

struct TimerSlot {
    token: CancellationToken,
    task: JoinHandle<()>,
}

struct LoopInner {
    traversal: Traversal,
    source: Arc<dyn RootSource>,
    interval: Duration,
    state: Mutex<LoopState>,
    timer: Mutex<Option<TimerSlot>>,
    in_flight: AtomicBool,
    passes: AtomicU64,
}

/// Resets the in-flight flag when a pass ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoopInner {
    /// Run one pass unless another is still in flight (`Ok(None)`).
    async fn run_guarded(&self) -> Result<Option<PassReport>, ScoutError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }
        let _guard = InFlight(&self.in_flight);

        let root = self.source.root().await?;
        let report = self.traversal.run_pass(root).await?;
        self.passes.fetch_add(1, Ordering::Relaxed);
        Ok(Some(report))
    }

    async fn pulse_loop(self: Arc<Self>, token: CancellationToken) {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if token.is_cancelled() {
                break;
            }

            match self.run_guarded().await {
                Ok(Some(_)) => {}
                Ok(None) => debug!("Previous pass still running, skipping pulse"),
                // The root is usually recreated after navigation; keep pulsing.
                Err(e) => warn!("Observation pass failed: {}", e),
            }
        }

        debug!("Observation timer exited");
    }
}

/// Periodically re-runs a [`Traversal`] until stopped.
pub struct ObservationLoop {
    inner: Arc<LoopInner>,
}

impl ObservationLoop {
    pub fn new(traversal: Traversal, source: Arc<dyn RootSource>) -> Self {
        let interval = traversal.config().observation_interval;
        Self {
            inner: Arc::new(LoopInner {
                traversal,
                source,
                interval,
                state: Mutex::new(LoopState::Idle),
                timer: Mutex::new(None),
                in_flight: AtomicBool::new(false),
                passes: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> LoopState {
        *self.inner.state.lock()
    }

    /// Completed passes, whether pulsed or requested.
    pub fn passes(&self) -> u64 {
        self.inner.passes.load(Ordering::Relaxed)
    }

    /// Install the repeating timer. Starting again while running replaces the
    /// previous timer; starting after [`stop`](Self::stop) is rejected.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<(), ScoutError> {
        let mut state = self.inner.state.lock();
        if *state == LoopState::Stopped {
            return Err(ScoutError::LoopStopped);
        }

        let mut timer = self.inner.timer.lock();
        if let Some(previous) = timer.take() {
            debug!("Replacing running observation timer");
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        let task = tokio::spawn(self.inner.clone().pulse_loop(token.clone()));
        *timer = Some(TimerSlot { token, task });
        *state = LoopState::Running;
        Ok(())
    }

    /// Stop pulsing. Idempotent. A pass already in flight runs to completion.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        if *state != LoopState::Stopped {
            debug!("Stopping observation loop after {} pass(es)", self.passes());
        }
        *state = LoopState::Stopped;
        if let Some(slot) = self.inner.timer.lock().as_ref() {
            slot.token.cancel();
        }
    }

    /// Stop and wait for the timer task, including any in-flight pass.
    pub async fn stop_and_wait(&self) {
        self.stop();
        let slot = self.inner.timer.lock().take();
        if let Some(slot) = slot {
            if let Err(e) = slot.task.await {
                warn!("Observation timer task ended abnormally: {}", e);
            }
        }
    }

    /// Run a pass right now, outside the timer. `Ok(None)` when a pass is
    /// already in flight or the loop is stopped.
    pub async fn run_once(&self) -> Result<Option<PassReport>, ScoutError> {
        if self.state() == LoopState::Stopped {
            return Ok(None);
        }
        self.inner.run_guarded().await
    }
}

impl Drop for ObservationLoop {
    fn drop(&mut self) {
        if let Some(slot) = self.inner.timer.lock().as_ref() {
            slot.token.cancel();
        }
    }
}

/// A running extraction session: a fresh inventory plus its loop.
pub struct Observation {
    id: Uuid,
    inventory: Inventory,
    control: ObservationLoop,
}

impl Observation {
    /// Start a session: run the first pass, then install the timer.
    ///
    /// Returns once the first pass completes. A failure of that pass is
    /// returned and no timer is installed.
    pub async fn start(
        source: Arc<dyn RootSource>,
        config: ExtractionConfig,
    ) -> Result<Self, ScoutError> {
        config.validate()?;

        let id = Uuid::new_v4();
        let inventory = Inventory::new();
        let control = ObservationLoop::new(Traversal::new(config, inventory.clone()), source);

        if let Some(report) = control.run_once().await? {
            info!(
                "Observation {} started: {} element(s) after first pass ({} candidate(s))",
                id,
                inventory.len(),
                report.candidates
            );
        }
        control.start()?;

        Ok(Self {
            id,
            inventory,
            control,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Snapshot of every discovered element.
    pub fn elements(&self) -> Vec<ElementDescriptor> {
        self.inventory.snapshot()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn len(&self) -> usize {
        self.inventory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    pub fn state(&self) -> LoopState {
        self.control.state()
    }

    pub fn passes(&self) -> u64 {
        self.control.passes()
    }

    /// Run an extra pass now; `Ok(None)` if one is already running.
    pub async fn refresh(&self) -> Result<Option<PassReport>, ScoutError> {
        self.control.run_once().await
    }

    /// Halt future passes. Idempotent.
    pub fn stop(&self) {
        if self.control.state() != LoopState::Stopped {
            info!("Observation {} stopping with {} element(s)", self.id, self.len());
        }
        self.control.stop();
    }

    /// Halt future passes and wait for an in-flight pass to finish, so that
    /// [`elements`](Self::elements) is a consistent snapshot afterwards.
    pub async fn stop_and_wait(&self) {
        self.stop();
        self.control.stop_and_wait().await;
    }
}
