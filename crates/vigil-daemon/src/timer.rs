//! The Pomodoro timer service.
//!
//! Wraps [`CycleState`] in a mutex shared between the command path and a
//! background tick task. Notices are queued and the snapshot published while
//! the lock is held, so both follow the order in which state changed.
//! Queueing never waits on delivery.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use vigil_notify::NoticeSender;
use vigil_types::Notice;

use crate::cycle::{
    CycleDurations, CycleError, CycleSnapshot, CycleState, Messages, Status, Toggled, Tones,
    Transition,
};

struct Shared {
    state: Mutex<CycleState>,
    messages: Messages,
    notices: NoticeSender,
    snapshots: watch::Sender<CycleSnapshot>,
}

impl Shared {
    fn new(durations: CycleDurations, tones: Tones, notices: NoticeSender) -> Self {
        let state = CycleState::new(durations);
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            state: Mutex::new(state),
            messages: Messages::new(durations, tones),
            notices,
            snapshots,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue notices and publish `state`. Call with the lock held.
    fn publish(&self, notices: Vec<Notice>, state: &CycleState) {
        self.notices.send_all(notices);
        self.snapshots.send_replace(state.snapshot());
    }

    fn tick(&self, now: Instant) -> Option<Transition> {
        let mut state = self.lock();
        let transition = state.tick(now)?;
        info!(phase = %state.phase(), cycles = state.cycles_completed(), "phase transition");
        self.publish(self.messages.transition(transition), &state);
        Some(transition)
    }

    fn toggle(&self, now: Instant) -> Toggled {
        let mut state = self.lock();
        let toggled = state.toggle(now);
        info!(?toggled, phase = %state.phase(), "pomodoro toggled");
        self.publish(self.messages.toggled(toggled), &state);
        toggled
    }

    fn status(&self, now: Instant) -> Result<Status, CycleError> {
        let state = self.lock();
        let status = state.status(now);
        if let Err(e) = &status {
            debug!(error = %e, "status requested while idle");
        }
        self.notices.send(self.messages.status(status));
        status
    }

    fn stop(&self) -> Result<(), CycleError> {
        let mut state = self.lock();
        let result = state.stop();
        match &result {
            Ok(()) => info!("pomodoro stopped"),
            Err(e) => debug!(error = %e, "stop requested while idle"),
        }
        self.publish(vec![self.messages.stopped(result)], &state);
        result
    }
}

/// Handle to a running Pomodoro timer.
///
/// Dropping the handle stops the tick task at its next wake-up; call
/// [`shutdown`](Self::shutdown) to wait for it.
pub struct CycleTimer {
    shared: Arc<Shared>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl CycleTimer {
    /// Create an idle timer and spawn its tick task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        durations: CycleDurations,
        tones: Tones,
        tick: Duration,
        notices: NoticeSender,
    ) -> Self {
        let shared = Arc::new(Shared::new(durations, tones, notices));
        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(tick_loop(Arc::clone(&shared), tick, stop_rx));
        debug!(?tick, "cycle timer started");

        Self {
            shared,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Start, pause or resume the cycle.
    pub fn toggle(&self) -> Toggled {
        self.shared.toggle(Instant::now())
    }

    /// Announce the current phase and remaining time.
    pub fn status(&self) -> Result<Status, CycleError> {
        self.shared.status(Instant::now())
    }

    /// Reset to idle, announcing whether there was anything to stop.
    pub fn stop(&self) -> Result<(), CycleError> {
        self.shared.stop()
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        self.shared.lock().snapshot()
    }

    /// Receiver notified on every command and phase transition.
    pub fn subscribe(&self) -> watch::Receiver<CycleSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Stop the tick task and wait for it to exit. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "cycle tick task failed");
            }
            debug!("cycle timer stopped");
        }
    }
}

async fn tick_loop(shared: Arc<Shared>, period: Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                shared.tick(Instant::now());
            }
        }
    }
}
