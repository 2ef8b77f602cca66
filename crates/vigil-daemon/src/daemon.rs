//! Add-on host orchestration.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vigil_input::InputEmulation;
use vigil_notify::{spawn_dispatcher, NoticeSender, Notifier};
use vigil_types::Phase;

use crate::config::Config;
use crate::error::DaemonError;
use crate::keep_awake::{KeepAwake, SharedEmulation};
use crate::timer::CycleTimer;

/// Commands processed by the daemon's main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonEvent {
    /// Start, pause or resume the Pomodoro cycle.
    ToggleCycle,
    /// Announce the current phase and remaining time.
    ReportStatus,
    /// Return the Pomodoro cycle to idle.
    StopCycle,
    /// Switch the keep-awake add-on on or off.
    ToggleKeepAwake,
    /// Shutdown signal.
    Shutdown,
}

/// Snapshot of the add-ons' state, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaemonStatus {
    pub phase: Phase,
    pub running: bool,
    pub cycles_completed: u32,
    pub keep_awake: bool,
}

/// Everything the daemon shuts down in order.
struct Components {
    timer: CycleTimer,
    keep_awake: KeepAwake,
    emulation: SharedEmulation,
    notices: NoticeSender,
    dispatcher: JoinHandle<()>,
    status_tx: watch::Sender<DaemonStatus>,
}

impl Components {
    fn status(&self) -> DaemonStatus {
        let cycle = self.timer.snapshot();
        DaemonStatus {
            phase: cycle.phase,
            running: cycle.running,
            cycles_completed: cycle.cycles_completed,
            keep_awake: self.keep_awake.is_active(),
        }
    }

    fn publish_status(&self) {
        let status = self.status();
        self.status_tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    async fn handle(&mut self, event: DaemonEvent) {
        debug!(?event, "handling command");
        match event {
            DaemonEvent::ToggleCycle => {
                self.timer.toggle();
            }
            DaemonEvent::ReportStatus => {
                let _ = self.timer.status();
            }
            DaemonEvent::StopCycle => {
                let _ = self.timer.stop();
            }
            DaemonEvent::ToggleKeepAwake => {
                if let Err(e) = self.keep_awake.toggle().await {
                    warn!(error = %e, "keep awake could not start");
                }
            }
            DaemonEvent::Shutdown => {}
        }
        self.publish_status();
    }

    async fn shutdown(self) -> Result<(), DaemonError> {
        info!("daemon shutting down");
        let Self {
            mut timer,
            mut keep_awake,
            emulation,
            notices,
            dispatcher,
            status_tx,
        } = self;

        let keep_awake_result = keep_awake.shutdown().await;
        timer.shutdown().await;
        let emulation_result = emulation.lock().await.shutdown().await;

        // The dispatcher finishes once every sender is gone.
        drop(keep_awake);
        drop(timer);
        drop(notices);
        if let Err(e) = dispatcher.await {
            warn!(error = %e, "notice dispatcher failed");
        }
        drop(status_tx);

        keep_awake_result?;
        emulation_result?;
        info!("daemon shut down complete");
        Ok(())
    }
}

/// The running add-ons: Pomodoro timer plus keep-awake.
pub struct Daemon {
    event_tx: mpsc::Sender<DaemonEvent>,
    event_rx: mpsc::Receiver<DaemonEvent>,
    components: Components,
}

impl Daemon {
    /// Validate `config`, start the notice dispatcher and the cycle timer.
    ///
    /// Must be called from within a tokio runtime. The keep-awake add-on
    /// starts inactive.
    pub fn new<N: Notifier>(
        config: &Config,
        emulation: Box<dyn InputEmulation>,
        notifier: N,
    ) -> Result<Self, DaemonError> {
        config.validate()?;

        let (notices, dispatcher) = spawn_dispatcher(notifier);
        let emulation: SharedEmulation = Arc::new(Mutex::new(emulation));
        let timer = CycleTimer::start(
            config.pomodoro.durations(),
            config.tones.tones(),
            config.pomodoro.tick(),
            notices.clone(),
        );
        let keep_awake = KeepAwake::new(
            config.keep_awake.clone(),
            Arc::clone(&emulation),
            notices.clone(),
        );
        let (status_tx, _) = watch::channel(DaemonStatus::default());
        let (event_tx, event_rx) = mpsc::channel(64);

        Ok(Self {
            event_tx,
            event_rx,
            components: Components {
                timer,
                keep_awake,
                emulation,
                notices,
                dispatcher,
                status_tx,
            },
        })
    }

    /// Get a clone of the event sender for feeding commands into the daemon.
    pub fn event_sender(&self) -> mpsc::Sender<DaemonEvent> {
        self.event_tx.clone()
    }

    pub fn status_receiver(&self) -> watch::Receiver<DaemonStatus> {
        self.components.status_tx.subscribe()
    }

    /// Run the daemon event loop until [`DaemonEvent::Shutdown`] arrives or
    /// every event sender is dropped, then shut everything down.
    pub async fn run(self) -> Result<(), DaemonError> {
        let Self {
            event_tx,
            mut event_rx,
            mut components,
        } = self;
        drop(event_tx);

        let mut cycle_rx = components.timer.subscribe();
        info!("daemon running");

        loop {
            tokio::select! {
                event = event_rx.recv() => match event {
                    Some(DaemonEvent::Shutdown) | None => {
                        info!("shutting down");
                        break;
                    }
                    Some(event) => components.handle(event).await,
                },
                Ok(()) = cycle_rx.changed() => components.publish_status(),
            }
        }

        components.shutdown().await
    }
}

/// The add-ons as the host sees them: running, or switched off by secure mode.
pub enum Addon {
    Enabled(Daemon),
    Disabled,
}

impl Addon {
    /// Decide once at startup whether the add-ons may run.
    ///
    /// Secure mode comes from the host (`secure`) or from
    /// `daemon.secure` in the config. A disabled add-on spawns no tasks and
    /// never touches the emulation backend or notifier.
    pub fn build<N: Notifier>(
        config: &Config,
        secure: bool,
        emulation: Box<dyn InputEmulation>,
        notifier: N,
    ) -> Result<Self, DaemonError> {
        if secure || config.daemon.secure {
            info!("secure mode, add-ons disabled");
            return Ok(Self::Disabled);
        }
        Daemon::new(config, emulation, notifier).map(Self::Enabled)
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }

    pub fn into_daemon(self) -> Result<Daemon, DaemonError> {
        match self {
            Self::Enabled(daemon) => Ok(daemon),
            Self::Disabled => Err(DaemonError::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use vigil_input::mock::MockEmulation;
    use vigil_notify::mock::MockNotifier;

    use super::*;

    #[tokio::test]
    async fn secure_mode_disables() {
        let config = Config::default();
        let addon = Addon::build(
            &config,
            true,
            Box::new(MockEmulation::new()),
            MockNotifier::new(),
        )
        .unwrap();
        assert!(!addon.is_enabled());
        assert!(matches!(addon.into_daemon(), Err(DaemonError::Disabled)));
    }

    #[tokio::test]
    async fn secure_mode_from_config() {
        let mut config = Config::default();
        config.daemon.secure = true;
        let addon = Addon::build(
            &config,
            false,
            Box::new(MockEmulation::new()),
            MockNotifier::new(),
        )
        .unwrap();
        assert!(!addon.is_enabled());
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = Config::default();
        config.pomodoro.work_minutes = 0;
        let result = Daemon::new(&config, Box::new(MockEmulation::new()), MockNotifier::new());
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }

    #[tokio::test]
    async fn dropping_senders_shuts_down() {
        let emulation = MockEmulation::new();
        let handle = emulation.handle();
        let daemon = Daemon::new(&Config::default(), Box::new(emulation), MockNotifier::new())
            .unwrap();
        let tx = daemon.event_sender();
        let task = tokio::spawn(daemon.run());
        drop(tx);
        task.await.unwrap().unwrap();
        assert!(handle.is_shutdown());
    }
}
