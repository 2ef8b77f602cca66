//! Synthetic input event types.
//!
//! Platform-agnostic representations of the keyboard and mouse events the
//! keep-awake add-on injects, plus the [`KeyChord`] it presses.

use serde::{Deserialize, Serialize};

/// A platform-agnostic input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Key press or release.
    Key { code: KeyCode, state: ButtonState },

    /// Relative mouse motion.
    MouseMove { dx: i32, dy: i32 },
}

/// Button/key state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Keyboard key code.
///
/// Uses a subset of USB HID usage names for cross-platform compatibility.
/// Platform backends translate these codes to native scancodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    // Numbers
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifiers
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,

    // Navigation
    Enter,
    Escape,
    Backspace,
    Tab,
    Space,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl KeyCode {
    /// Spoken name of the key, as a screen reader user would say it.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::LeftMeta | Self::RightMeta => "Windows".to_string(),
            Self::LeftCtrl | Self::RightCtrl => "Control".to_string(),
            Self::LeftShift | Self::RightShift => "Shift".to_string(),
            Self::LeftAlt | Self::RightAlt => "Alt".to_string(),
            other => {
                let name = format!("{other:?}");
                name.strip_prefix("Key")
                    .or_else(|| name.strip_prefix("Digit"))
                    .map_or_else(|| name.clone(), str::to_string)
            }
        }
    }
}

/// Keys held down together.
///
/// Pressing emits key-down events in order; releasing emits key-up events in
/// reverse order so modifiers wrap the final key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyChord(Vec<KeyCode>);

impl KeyChord {
    #[must_use]
    pub fn new(keys: Vec<KeyCode>) -> Self {
        Self(keys)
    }

    /// Windows + D: minimises every window and counts as user activity.
    #[must_use]
    pub fn show_desktop() -> Self {
        Self(vec![KeyCode::LeftMeta, KeyCode::KeyD])
    }

    #[must_use]
    pub fn keys(&self) -> &[KeyCode] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Key-down events, first key first.
    #[must_use]
    pub fn press_events(&self) -> Vec<InputEvent> {
        self.0
            .iter()
            .map(|&code| InputEvent::Key {
                code,
                state: ButtonState::Pressed,
            })
            .collect()
    }

    /// Key-up events, last key first.
    #[must_use]
    pub fn release_events(&self) -> Vec<InputEvent> {
        self.0
            .iter()
            .rev()
            .map(|&code| InputEvent::Key {
                code,
                state: ButtonState::Released,
            })
            .collect()
    }

    /// Human-readable chord, e.g. "Windows + D".
    #[must_use]
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|code| code.label())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

impl Default for KeyChord {
    fn default() -> Self {
        Self::show_desktop()
    }
}
