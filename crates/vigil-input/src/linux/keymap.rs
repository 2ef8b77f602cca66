//! Mapping from vigil key codes to evdev keys.

use evdev::KeyCode as EvdevKey;
use vigil_types::{ButtonState, KeyCode};

/// Generates the registered key list and the translation from one table.
/// The match is exhaustive, so every `KeyCode` variant must be listed.
macro_rules! keymap {
    ($($code:ident => $evdev:ident,)*) => {
        const ALL_KEYCODES: &[KeyCode] = &[$(KeyCode::$code,)*];

        /// Convert our `KeyCode` to an evdev `KeyCode`.
        pub fn keycode_to_evdev_key(code: KeyCode) -> EvdevKey {
            match code {
                $(KeyCode::$code => EvdevKey::$evdev,)*
            }
        }
    };
}

keymap! {
    // Letters
    KeyA => KEY_A,
    KeyB => KEY_B,
    KeyC => KEY_C,
    KeyD => KEY_D,
    KeyE => KEY_E,
    KeyF => KEY_F,
    KeyG => KEY_G,
    KeyH => KEY_H,
    KeyI => KEY_I,
    KeyJ => KEY_J,
    KeyK => KEY_K,
    KeyL => KEY_L,
    KeyM => KEY_M,
    KeyN => KEY_N,
    KeyO => KEY_O,
    KeyP => KEY_P,
    KeyQ => KEY_Q,
    KeyR => KEY_R,
    KeyS => KEY_S,
    KeyT => KEY_T,
    KeyU => KEY_U,
    KeyV => KEY_V,
    KeyW => KEY_W,
    KeyX => KEY_X,
    KeyY => KEY_Y,
    KeyZ => KEY_Z,

    // Numbers
    Digit0 => KEY_0,
    Digit1 => KEY_1,
    Digit2 => KEY_2,
    Digit3 => KEY_3,
    Digit4 => KEY_4,
    Digit5 => KEY_5,
    Digit6 => KEY_6,
    Digit7 => KEY_7,
    Digit8 => KEY_8,
    Digit9 => KEY_9,

    // Function keys
    F1 => KEY_F1,
    F2 => KEY_F2,
    F3 => KEY_F3,
    F4 => KEY_F4,
    F5 => KEY_F5,
    F6 => KEY_F6,
    F7 => KEY_F7,
    F8 => KEY_F8,
    F9 => KEY_F9,
    F10 => KEY_F10,
    F11 => KEY_F11,
    F12 => KEY_F12,

    // Modifiers
    LeftShift => KEY_LEFTSHIFT,
    RightShift => KEY_RIGHTSHIFT,
    LeftCtrl => KEY_LEFTCTRL,
    RightCtrl => KEY_RIGHTCTRL,
    LeftAlt => KEY_LEFTALT,
    RightAlt => KEY_RIGHTALT,
    LeftMeta => KEY_LEFTMETA,
    RightMeta => KEY_RIGHTMETA,

    // Navigation
    Enter => KEY_ENTER,
    Escape => KEY_ESC,
    Backspace => KEY_BACKSPACE,
    Tab => KEY_TAB,
    Space => KEY_SPACE,
    Insert => KEY_INSERT,
    Delete => KEY_DELETE,
    Home => KEY_HOME,
    End => KEY_END,
    PageUp => KEY_PAGEUP,
    PageDown => KEY_PAGEDOWN,
    ArrowUp => KEY_UP,
    ArrowDown => KEY_DOWN,
    ArrowLeft => KEY_LEFT,
    ArrowRight => KEY_RIGHT,
}

/// Every key `keycode_to_evdev_key` can produce, for registering on a
/// virtual keyboard.
pub fn all_mapped_keys() -> impl Iterator<Item = EvdevKey> {
    ALL_KEYCODES.iter().map(|&code| keycode_to_evdev_key(code))
}

/// Convert a `ButtonState` to an evdev event value.
pub fn button_state_to_evdev_value(state: ButtonState) -> i32 {
    match state {
        ButtonState::Pressed => 1,
        ButtonState::Released => 0,
    }
}
