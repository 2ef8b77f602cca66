//! User-facing output requests.
//!
//! A [`Notice`] is what the add-ons hand to the speech/tone service. Notices
//! are plain data so they can be built while holding a lock and delivered
//! afterwards.

/// How urgently an announcement should be spoken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Queued after whatever is currently being spoken.
    #[default]
    Normal,
    /// Interrupts current speech.
    Immediate,
}

/// One speech or tone request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Announce { text: String, priority: Priority },
    Tone { frequency_hz: u32, duration_ms: u32 },
}

impl Notice {
    /// Announcement at normal priority.
    pub fn announce(text: impl Into<String>) -> Self {
        Self::Announce {
            text: text.into(),
            priority: Priority::Normal,
        }
    }

    /// Announcement that interrupts current speech.
    pub fn immediate(text: impl Into<String>) -> Self {
        Self::Announce {
            text: text.into(),
            priority: Priority::Immediate,
        }
    }

    pub fn tone(frequency_hz: u32, duration_ms: u32) -> Self {
        Self::Tone {
            frequency_hz,
            duration_ms,
        }
    }

    /// The spoken text, if this is an announcement.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Announce { text, .. } => Some(text),
            Self::Tone { .. } => None,
        }
    }
}
