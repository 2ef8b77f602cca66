//! Pomodoro state machine.
//!
//! [`CycleState`] is pure: every operation takes the current instant and
//! returns what happened, never touching a clock or a notifier. The
//! [`CycleTimer`](crate::timer::CycleTimer) service wraps it in a mutex,
//! drives [`CycleState::tick`] from a background task and turns outcomes
//! into notices with [`Messages`].
//!
//! Phase ends are detected by comparing `now - phase_start` against the time
//! left in the phase, so irregular tick spacing cannot cause drift. A tick
//! fires at most one transition: if the host was suspended across several
//! phase boundaries, only one transition is announced and the new phase is
//! timed from the tick that noticed it.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;
use vigil_types::{Notice, Phase};

/// Phase lengths and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDurations {
    pub work: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
    /// Every n-th completed work period is followed by a long break.
    pub cycles_before_long_break: u32,
}

impl Default for CycleDurations {
    fn default() -> Self {
        Self {
            work: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            long_break: Duration::from_secs(15 * 60),
            cycles_before_long_break: 4,
        }
    }
}

/// Tone frequencies played on transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tones {
    pub start_hz: u32,
    pub break_hz: u32,
    pub long_break_hz: u32,
    pub duration_ms: u32,
}

impl Default for Tones {
    fn default() -> Self {
        Self {
            start_hz: 880,
            break_hz: 660,
            long_break_hz: 440,
            duration_ms: 300,
        }
    }
}

/// An operation that makes no sense in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error("no pomodoro cycle active")]
    NotActive,
}

/// Result of [`CycleState::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Started,
    Paused,
    Resumed,
}

/// Result of a successful [`CycleState::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Paused,
    Running { phase: Phase, remaining: Duration },
}

/// A phase boundary crossed by [`CycleState::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ShortBreak { cycles_completed: u32 },
    LongBreak { cycles_completed: u32 },
    BreakFinished { was_long: bool },
}

/// Point-in-time copy of the state, for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub cycles_completed: u32,
    /// Time left in the phase as of the last start, pause or transition.
    pub remaining_in_phase: Duration,
}

/// The work/break cycle.
#[derive(Debug, Clone)]
pub struct CycleState {
    durations: CycleDurations,
    phase: Phase,
    running: bool,
    phase_start: Instant,
    remaining_in_phase: Duration,
    cycles_completed: u32,
}

impl CycleState {
    pub fn new(durations: CycleDurations) -> Self {
        Self {
            phase: Phase::Idle,
            running: false,
            phase_start: Instant::now(),
            remaining_in_phase: durations.work,
            cycles_completed: 0,
            durations,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_in_phase(&self) -> Duration {
        self.remaining_in_phase
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            phase: self.phase,
            running: self.running,
            cycles_completed: self.cycles_completed,
            remaining_in_phase: self.remaining_in_phase,
        }
    }

    /// Start a cycle when idle, otherwise pause or resume it.
    pub fn toggle(&mut self, now: Instant) -> Toggled {
        if self.phase == Phase::Idle {
            self.phase = Phase::Working;
            self.running = true;
            self.phase_start = now;
            self.remaining_in_phase = self.durations.work;
            Toggled::Started
        } else if self.running {
            let elapsed = now.saturating_duration_since(self.phase_start);
            self.remaining_in_phase = self.remaining_in_phase.saturating_sub(elapsed);
            self.running = false;
            Toggled::Paused
        } else {
            self.phase_start = now;
            self.running = true;
            Toggled::Resumed
        }
    }

    /// Report the current phase and time left in it.
    ///
    /// Idle and paused states are answered without looking at the clock.
    pub fn status(&self, now: Instant) -> Result<Status, CycleError> {
        if self.phase == Phase::Idle {
            return Err(CycleError::NotActive);
        }
        if !self.running {
            return Ok(Status::Paused);
        }
        let elapsed = now.saturating_duration_since(self.phase_start);
        Ok(Status::Running {
            phase: self.phase,
            remaining: self.remaining_in_phase.saturating_sub(elapsed),
        })
    }

    /// Return to idle from any phase.
    ///
    /// The reset happens even when no cycle was active; the error only tells
    /// the caller there was nothing to stop.
    pub fn stop(&mut self) -> Result<(), CycleError> {
        let was_active = self.phase.is_active();
        self.phase = Phase::Idle;
        self.running = false;
        self.remaining_in_phase = self.durations.work;
        self.cycles_completed = 0;
        if was_active {
            Ok(())
        } else {
            Err(CycleError::NotActive)
        }
    }

    /// Fire at most one phase transition if the current phase has run out.
    pub fn tick(&mut self, now: Instant) -> Option<Transition> {
        if self.phase == Phase::Idle || !self.running {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.phase_start);
        if elapsed < self.remaining_in_phase {
            return None;
        }

        self.phase_start = now;
        let transition = match self.phase {
            Phase::Working => {
                self.cycles_completed += 1;
                if self.cycles_completed % self.durations.cycles_before_long_break == 0 {
                    self.phase = Phase::LongBreak;
                    self.remaining_in_phase = self.durations.long_break;
                    Transition::LongBreak {
                        cycles_completed: self.cycles_completed,
                    }
                } else {
                    self.phase = Phase::ShortBreak;
                    self.remaining_in_phase = self.durations.short_break;
                    Transition::ShortBreak {
                        cycles_completed: self.cycles_completed,
                    }
                }
            }
            Phase::ShortBreak | Phase::LongBreak => {
                let was_long = self.phase == Phase::LongBreak;
                self.phase = Phase::Working;
                self.remaining_in_phase = self.durations.work;
                Transition::BreakFinished { was_long }
            }
            Phase::Idle => return None,
        };
        Some(transition)
    }
}

/// Wording and tones for every cycle outcome.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    durations: CycleDurations,
    tones: Tones,
}

pub const PAUSED: &str = "Pomodoro paused.";
pub const RESUMED: &str = "Pomodoro resumed.";
pub const NOT_ACTIVE: &str = "No Pomodoro cycle active.";
pub const STOPPED: &str = "Pomodoro stopped.";
pub const NOTHING_TO_STOP: &str = "No Pomodoro cycle to stop.";
pub const BREAK_FINISHED: &str = "Break finished. Back to work.";
pub const LONG_BREAK_FINISHED: &str = "Long break finished. Back to work.";

impl Messages {
    pub fn new(durations: CycleDurations, tones: Tones) -> Self {
        Self { durations, tones }
    }

    pub fn toggled(&self, toggled: Toggled) -> Vec<Notice> {
        match toggled {
            Toggled::Started => vec![
                Notice::announce(format!(
                    "Pomodoro started. Work for {}.",
                    spoken_span(self.durations.work)
                )),
                Notice::tone(self.tones.start_hz, self.tones.duration_ms),
            ],
            Toggled::Paused => vec![Notice::announce(PAUSED)],
            Toggled::Resumed => vec![Notice::announce(RESUMED)],
        }
    }

    pub fn status(&self, status: Result<Status, CycleError>) -> Notice {
        match status {
            Err(CycleError::NotActive) => Notice::announce(NOT_ACTIVE),
            Ok(Status::Paused) => Notice::announce(PAUSED),
            Ok(Status::Running { phase, remaining }) => {
                let what = if phase.is_break() {
                    "Break in progress"
                } else {
                    "Pomodoro cycle in progress"
                };
                Notice::announce(format!("{what}. {} remaining.", minutes_seconds(remaining)))
            }
        }
    }

    pub fn stopped(&self, result: Result<(), CycleError>) -> Notice {
        match result {
            Ok(()) => Notice::announce(STOPPED),
            Err(CycleError::NotActive) => Notice::announce(NOTHING_TO_STOP),
        }
    }

    pub fn transition(&self, transition: Transition) -> Vec<Notice> {
        let tone = |hz| Notice::tone(hz, self.tones.duration_ms);
        match transition {
            Transition::ShortBreak { .. } => vec![
                Notice::immediate(format!(
                    "Work period finished. Take a {} break.",
                    adjective_span(self.durations.short_break)
                )),
                tone(self.tones.break_hz),
            ],
            Transition::LongBreak { cycles_completed } => vec![
                Notice::immediate(format!(
                    "{cycles_completed} cycles completed. Take a {} long break.",
                    adjective_span(self.durations.long_break)
                )),
                tone(self.tones.long_break_hz),
            ],
            Transition::BreakFinished { was_long } => vec![
                Notice::immediate(if was_long {
                    LONG_BREAK_FINISHED
                } else {
                    BREAK_FINISHED
                }),
                tone(self.tones.start_hz),
            ],
        }
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// "12 minutes 5 seconds", floor division.
pub fn minutes_seconds(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{} {}", plural(secs / 60, "minute"), plural(secs % 60, "second"))
}

/// "25 minutes", falling back to seconds for sub-minute lengths.
fn spoken_span(d: Duration) -> String {
    let secs = d.as_secs();
    if secs % 60 == 0 {
        plural(secs / 60, "minute")
    } else {
        plural(secs, "second")
    }
}

/// "5 minute", as in "a 5 minute break".
fn adjective_span(d: Duration) -> String {
    let secs = d.as_secs();
    if secs % 60 == 0 {
        format!("{} minute", secs / 60)
    } else {
        format!("{secs} second")
    }
}
