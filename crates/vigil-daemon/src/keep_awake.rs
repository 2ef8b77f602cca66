//! Keep-awake add-on: periodic synthetic input so the host never idles out.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use vigil_input::{press_chord, InputEmulation, InputError};
use vigil_notify::NoticeSender;
use vigil_types::{DeviceInfo, InputEvent, Notice, VirtualDeviceId};

use crate::config::{KeepAwakeAction, KeepAwakeConfig};

/// Emulation backend shared between the daemon and the keep-awake task.
pub type SharedEmulation = Arc<Mutex<Box<dyn InputEmulation>>>;

pub const ACTIVATED: &str = "Keep awake activated.";
pub const DEACTIVATED: &str = "Keep awake deactivated.";

struct Active {
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct KeepAwake {
    config: KeepAwakeConfig,
    emulation: SharedEmulation,
    device: Option<VirtualDeviceId>,
    notices: NoticeSender,
    active: Option<Active>,
}

impl KeepAwake {
    pub fn new(config: KeepAwakeConfig, emulation: SharedEmulation, notices: NoticeSender) -> Self {
        Self {
            config,
            emulation,
            device: None,
            notices,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Activate or deactivate, returning whether the add-on is now active.
    ///
    /// When the virtual device cannot be created the user is told why and the
    /// add-on stays inactive.
    pub async fn toggle(&mut self) -> Result<bool, InputError> {
        if let Some(active) = self.active.take() {
            stop(active).await;
            info!("keep awake deactivated");
            self.notices.send(Notice::announce(DEACTIVATED));
            return Ok(false);
        }

        let device = match self.ensure_device().await {
            Ok(device) => device,
            Err(e) => {
                self.notices
                    .send(Notice::announce(format!("Keep awake unavailable: {e}.")));
                return Err(e);
            }
        };

        info!(
            interval_secs = self.config.interval_secs,
            action = ?self.config.action,
            "keep awake activated"
        );
        self.notices.send(Notice::announce(ACTIVATED));

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run(
            Arc::clone(&self.emulation),
            device,
            self.config.clone(),
            self.notices.clone(),
            stop_rx,
        ));
        self.active = Some(Active { stop_tx, task });
        Ok(true)
    }

    /// Stop the task if running and destroy the virtual device. Idempotent.
    pub async fn shutdown(&mut self) -> Result<(), InputError> {
        if let Some(active) = self.active.take() {
            stop(active).await;
        }
        if let Some(device) = self.device.take() {
            self.emulation.lock().await.destroy_device(device).await?;
            debug!(?device, "keep-awake device destroyed");
        }
        Ok(())
    }

    async fn ensure_device(&mut self) -> Result<VirtualDeviceId, InputError> {
        if let Some(device) = self.device {
            return Ok(device);
        }
        let device = self
            .emulation
            .lock()
            .await
            .create_device(&DeviceInfo::keep_awake())
            .await?;
        debug!(?device, "keep-awake device created");
        self.device = Some(device);
        Ok(device)
    }
}

async fn stop(active: Active) {
    let _ = active.stop_tx.send(());
    if let Err(e) = active.task.await {
        warn!(error = %e, "keep-awake task failed");
    }
}

async fn run(
    emulation: SharedEmulation,
    device: VirtualDeviceId,
    config: KeepAwakeConfig,
    notices: NoticeSender,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut interval = tokio::time::interval(config.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = interval.tick() => {
                if let Err(e) = fire(&emulation, device, &config, &notices).await {
                    warn!(error = %e, "keep-awake input failed");
                }
            }
        }
    }
}

async fn fire(
    emulation: &SharedEmulation,
    device: VirtualDeviceId,
    config: &KeepAwakeConfig,
    notices: &NoticeSender,
) -> Result<(), InputError> {
    let mut emulation = emulation.lock().await;
    match config.action {
        KeepAwakeAction::ShowDesktop => {
            press_chord(&mut **emulation, device, &config.chord, config.hold()).await?;
            debug!(chord = %config.chord.label(), "chord sent");
            if config.announce {
                notices.send(Notice::announce(format!(
                    "{} keys sent.",
                    config.chord.label()
                )));
            }
        }
        KeepAwakeAction::MouseNudge => {
            emulation
                .inject(device, InputEvent::MouseMove { dx: 1, dy: 0 })
                .await?;
            emulation
                .inject(device, InputEvent::MouseMove { dx: -1, dy: 0 })
                .await?;
            debug!("pointer nudged");
        }
    }
    Ok(())
}
