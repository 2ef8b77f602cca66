//! Mock input backend for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;
use vigil_types::{DeviceInfo, InputEvent, VirtualDeviceId};

use crate::error::InputError;
use crate::InputEmulation;

/// Recorded injection event for test observation.
#[derive(Debug, Clone)]
pub struct InjectedEvent {
    pub device: VirtualDeviceId,
    pub event: InputEvent,
    /// When the event was injected (tokio clock, so paused-time tests can
    /// check spacing).
    pub at: Instant,
}

/// Shared state for observing what `MockEmulation` did.
#[derive(Debug, Default)]
struct MockEmulationState {
    devices: HashMap<VirtualDeviceId, DeviceInfo>,
    injected: Vec<InjectedEvent>,
    next_id: u32,
    failing: bool,
    shutdown: bool,
}

/// Mock input emulation backend for testing.
pub struct MockEmulation {
    state: Arc<Mutex<MockEmulationState>>,
}

impl Default for MockEmulation {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmulation {
    /// Create a new mock emulation backend.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockEmulationState::default())),
        }
    }

    /// Get a clonable handle for observing the emulation state from tests.
    pub fn handle(&self) -> MockEmulationHandle {
        MockEmulationHandle {
            state: Arc::clone(&self.state),
        }
    }
}

/// Clonable observer handle for `MockEmulation`.
///
/// Tests use this to inspect created devices and injected events.
#[derive(Clone)]
pub struct MockEmulationHandle {
    state: Arc<Mutex<MockEmulationState>>,
}

impl MockEmulationHandle {
    /// Get a snapshot of all created virtual devices.
    pub fn devices(&self) -> HashMap<VirtualDeviceId, DeviceInfo> {
        self.state.lock().unwrap().devices.clone()
    }

    /// Get a snapshot of all injected events.
    pub fn injected_events(&self) -> Vec<InjectedEvent> {
        self.state.lock().unwrap().injected.clone()
    }

    /// Make every subsequent injection fail with [`InputError::Inject`].
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// Check if shutdown was called.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().unwrap().shutdown
    }
}

#[async_trait]
impl InputEmulation for MockEmulation {
    async fn create_device(&mut self, info: &DeviceInfo) -> Result<VirtualDeviceId, InputError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = VirtualDeviceId(state.next_id);
        state.devices.insert(id, info.clone());
        Ok(id)
    }

    async fn inject(
        &mut self,
        device: VirtualDeviceId,
        event: InputEvent,
    ) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        if state.failing {
            return Err(InputError::Inject("mock failure".to_string()));
        }
        if !state.devices.contains_key(&device) {
            return Err(InputError::UnknownDevice(device));
        }
        state.injected.push(InjectedEvent {
            device,
            event,
            at: Instant::now(),
        });
        Ok(())
    }

    async fn destroy_device(&mut self, device: VirtualDeviceId) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        state
            .devices
            .remove(&device)
            .map(|_| ())
            .ok_or(InputError::UnknownDevice(device))
    }

    async fn shutdown(&mut self) -> Result<(), InputError> {
        let mut state = self.state.lock().unwrap();
        state.devices.clear();
        state.shutdown = true;
        Ok(())
    }
}
