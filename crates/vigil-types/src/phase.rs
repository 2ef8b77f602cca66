//! Pomodoro cycle phases.

/// Segment of the work/break cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No cycle running. Initial and terminal.
    #[default]
    Idle,
    /// Focused work period.
    Working,
    /// Break after an ordinary work period.
    ShortBreak,
    /// Break after every n-th work period.
    LongBreak,
}

impl Phase {
    /// Whether a cycle is in progress (running or paused).
    pub fn is_active(self) -> bool {
        self != Self::Idle
    }

    /// Whether this is either kind of break.
    pub fn is_break(self) -> bool {
        matches!(self, Self::ShortBreak | Self::LongBreak)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Working => write!(f, "Working"),
            Self::ShortBreak => write!(f, "ShortBreak"),
            Self::LongBreak => write!(f, "LongBreak"),
        }
    }
}
