//! Device descriptor types.

/// Opaque ID for a device description handed to an emulation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// Opaque ID for a virtual input device created by an emulation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VirtualDeviceId(pub u32);

/// Describes a virtual input device to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Requested device ID.
    pub id: DeviceId,
    /// Human-readable name (e.g. "vigil keep-awake keyboard").
    pub name: String,
    /// What this device can do.
    pub capabilities: Vec<DeviceCapability>,
}

impl DeviceInfo {
    /// The device the keep-awake add-on injects through: a keyboard that can
    /// also nudge the pointer.
    #[must_use]
    pub fn keep_awake() -> Self {
        Self {
            id: DeviceId(1),
            name: "vigil keep-awake".to_string(),
            capabilities: vec![DeviceCapability::Keyboard, DeviceCapability::RelativeMouse],
        }
    }
}

/// What kind of input a device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCapability {
    Keyboard,
    RelativeMouse,
}
