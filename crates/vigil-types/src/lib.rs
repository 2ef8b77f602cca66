//! Shared types for vigil.
//!
//! This crate contains all types shared across the vigil workspace:
//! Pomodoro phases, user-facing notices, synthetic input events, key chords
//! and virtual device descriptors.

pub mod device;
pub mod event;
pub mod notice;
pub mod phase;

pub use device::{DeviceCapability, DeviceId, DeviceInfo, VirtualDeviceId};
pub use event::{ButtonState, InputEvent, KeyChord, KeyCode};
pub use notice::{Notice, Priority};
pub use phase::Phase;
