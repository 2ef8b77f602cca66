//! Platform-abstracted synthetic input for vigil.
//!
//! This crate defines the [`InputEmulation`] trait that platform backends
//! implement, and [`press_chord`] which the keep-awake add-on uses to tap a
//! key combination. The uinput backend lives behind the `linux` feature, a
//! recording backend for tests behind `mock`.

use std::time::Duration;

use async_trait::async_trait;
use vigil_types::{DeviceInfo, InputEvent, KeyChord, VirtualDeviceId};

pub mod error;
#[cfg(feature = "linux")]
pub mod linux;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod unavailable;

pub use error::InputError;
pub use unavailable::UnavailableEmulation;

/// Creates virtual input devices and injects events into them.
#[async_trait]
pub trait InputEmulation: Send + 'static {
    /// Create a virtual device with the given capabilities.
    async fn create_device(&mut self, info: &DeviceInfo) -> Result<VirtualDeviceId, InputError>;

    /// Inject an input event into a virtual device.
    async fn inject(
        &mut self,
        device: VirtualDeviceId,
        event: InputEvent,
    ) -> Result<(), InputError>;

    /// Destroy a virtual device.
    async fn destroy_device(&mut self, device: VirtualDeviceId) -> Result<(), InputError>;

    /// Shut down the emulation backend and destroy all virtual devices.
    async fn shutdown(&mut self) -> Result<(), InputError>;
}

/// Press every key of `chord`, hold for `hold`, then release in reverse order.
///
/// Releases are attempted even when a press failed, so no key is left stuck
/// down. The first error encountered is returned.
pub async fn press_chord(
    emulation: &mut dyn InputEmulation,
    device: VirtualDeviceId,
    chord: &KeyChord,
    hold: Duration,
) -> Result<(), InputError> {
    let mut first_error = None;

    for event in chord.press_events() {
        if let Err(e) = emulation.inject(device, event).await {
            first_error.get_or_insert(e);
        }
    }

    tokio::time::sleep(hold).await;

    for event in chord.release_events() {
        if let Err(e) = emulation.inject(device, event).await {
            first_error.get_or_insert(e);
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
