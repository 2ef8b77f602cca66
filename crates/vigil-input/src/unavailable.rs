//! Backend used when no platform emulation is compiled in.

use async_trait::async_trait;
use vigil_types::{DeviceInfo, InputEvent, VirtualDeviceId};

use crate::error::InputError;
use crate::InputEmulation;

/// Emulation backend that refuses every request with
/// [`InputError::Unavailable`].
#[derive(Debug, Default)]
pub struct UnavailableEmulation;

#[async_trait]
impl InputEmulation for UnavailableEmulation {
    async fn create_device(&mut self, _info: &DeviceInfo) -> Result<VirtualDeviceId, InputError> {
        Err(InputError::Unavailable)
    }

    async fn inject(
        &mut self,
        _device: VirtualDeviceId,
        _event: InputEvent,
    ) -> Result<(), InputError> {
        Err(InputError::Unavailable)
    }

    async fn destroy_device(&mut self, _device: VirtualDeviceId) -> Result<(), InputError> {
        Err(InputError::Unavailable)
    }

    async fn shutdown(&mut self) -> Result<(), InputError> {
        Ok(())
    }
}
