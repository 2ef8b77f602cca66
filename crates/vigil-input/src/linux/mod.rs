//! Linux backend: uinput virtual devices via evdev.

mod emulation;
mod keymap;

pub use emulation::UinputEmulation;
