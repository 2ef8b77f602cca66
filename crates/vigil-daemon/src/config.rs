//! Add-on configuration loaded from TOML.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vigil_types::KeyChord;

use crate::cycle::{CycleDurations, Tones};
use crate::error::DaemonError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub tones: ToneConfig,
    #[serde(default)]
    pub keep_awake: KeepAwakeConfig,
}

impl Config {
    /// Reject values that would make a timer spin or never fire.
    pub fn validate(&self) -> Result<(), DaemonError> {
        let p = &self.pomodoro;
        if p.work_minutes == 0 || p.short_break_minutes == 0 || p.long_break_minutes == 0 {
            return Err(DaemonError::Config(
                "pomodoro durations must be at least one minute".to_string(),
            ));
        }
        for (field, minutes) in [
            ("work_minutes", p.work_minutes),
            ("short_break_minutes", p.short_break_minutes),
            ("long_break_minutes", p.long_break_minutes),
        ] {
            if minutes.checked_mul(60).is_none() {
                return Err(DaemonError::Config(format!("pomodoro.{field} is too large")));
            }
        }
        if p.cycles_before_long_break == 0 {
            return Err(DaemonError::Config(
                "pomodoro.cycles_before_long_break must be at least 1".to_string(),
            ));
        }
        if p.tick_ms == 0 {
            return Err(DaemonError::Config(
                "pomodoro.tick_ms must be positive".to_string(),
            ));
        }
        if self.keep_awake.interval_secs == 0 {
            return Err(DaemonError::Config(
                "keep_awake.interval_secs must be positive".to_string(),
            ));
        }
        if self.keep_awake.action == KeepAwakeAction::ShowDesktop && self.keep_awake.chord.is_empty()
        {
            return Err(DaemonError::Config(
                "keep_awake.chord must name at least one key".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Host secure mode: when set, no add-on starts.
    #[serde(default)]
    pub secure: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            secure: false,
        }
    }
}

/// Pomodoro cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u64,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl PomodoroConfig {
    pub fn durations(&self) -> CycleDurations {
        CycleDurations {
            work: minutes(self.work_minutes),
            short_break: minutes(self.short_break_minutes),
            long_break: minutes(self.long_break_minutes),
            cycles_before_long_break: self.cycles_before_long_break,
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Saturates; [`Config::validate`] rejects values that would.
fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles_before_long_break: default_cycles_before_long_break(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// Tone frequencies for phase transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    #[serde(default = "default_start_hz")]
    pub start_hz: u32,
    #[serde(default = "default_break_hz")]
    pub break_hz: u32,
    #[serde(default = "default_long_break_hz")]
    pub long_break_hz: u32,
    #[serde(default = "default_tone_ms")]
    pub duration_ms: u32,
}

impl ToneConfig {
    pub fn tones(&self) -> Tones {
        Tones {
            start_hz: self.start_hz,
            break_hz: self.break_hz,
            long_break_hz: self.long_break_hz,
            duration_ms: self.duration_ms,
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self {
            start_hz: default_start_hz(),
            break_hz: default_break_hz(),
            long_break_hz: default_long_break_hz(),
            duration_ms: default_tone_ms(),
        }
    }
}

/// What the keep-awake add-on does on each interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeepAwakeAction {
    /// Tap the configured chord (Windows + D by default).
    #[default]
    ShowDesktop,
    /// Move the pointer one pixel right and back.
    MouseNudge,
}

/// Keep-awake add-on settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAwakeConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub action: KeepAwakeAction,
    #[serde(default)]
    pub chord: KeyChord,
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    #[serde(default = "default_true")]
    pub announce: bool,
}

impl KeepAwakeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

impl Default for KeepAwakeConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            action: KeepAwakeAction::default(),
            chord: KeyChord::default(),
            hold_ms: default_hold_ms(),
            announce: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_work_minutes() -> u64 {
    25
}

fn default_short_break_minutes() -> u64 {
    5
}

fn default_long_break_minutes() -> u64 {
    15
}

fn default_cycles_before_long_break() -> u32 {
    4
}

fn default_tick_ms() -> u64 {
    500
}

fn default_start_hz() -> u32 {
    880
}

fn default_break_hz() -> u32 {
    660
}

fn default_long_break_hz() -> u32 {
    440
}

fn default_tone_ms() -> u32 {
    300
}

fn default_interval_secs() -> u64 {
    60
}

fn default_hold_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_types::KeyCode;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("work_minutes = 25"));
        assert!(toml_str.contains("interval_secs = 60"));
        assert!(toml_str.contains("\"LeftMeta\""));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn default_durations() {
        let durations = PomodoroConfig::default().durations();
        assert_eq!(durations.work, Duration::from_secs(1500));
        assert_eq!(durations.short_break, Duration::from_secs(300));
        assert_eq!(durations.long_break, Duration::from_secs(900));
        assert_eq!(durations.cycles_before_long_break, 4);
        assert_eq!(PomodoroConfig::default().tick(), Duration::from_millis(500));
    }

    #[test]
    fn parse_example_config() {
        let toml_str = r#"
[daemon]
log_level = "debug"

[pomodoro]
work_minutes = 50
short_break_minutes = 10
cycles_before_long_break = 3

[tones]
start_hz = 1000

[keep_awake]
interval_secs = 120
action = "MouseNudge"
chord = ["LeftCtrl", "F5"]
announce = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.daemon.log_level, "debug");
        assert!(!config.daemon.secure);
        assert_eq!(config.pomodoro.work_minutes, 50);
        assert_eq!(config.pomodoro.long_break_minutes, 15);
        assert_eq!(config.pomodoro.cycles_before_long_break, 3);
        assert_eq!(config.tones.start_hz, 1000);
        assert_eq!(config.tones.break_hz, 660);
        assert_eq!(config.keep_awake.action, KeepAwakeAction::MouseNudge);
        assert_eq!(
            config.keep_awake.chord,
            KeyChord::new(vec![KeyCode::LeftCtrl, KeyCode::F5])
        );
        assert_eq!(config.keep_awake.hold_ms, 100);
        assert!(!config.keep_awake.announce);
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.pomodoro.work_minutes, 25);
        assert_eq!(config.keep_awake.chord, KeyChord::show_desktop());
    }

    #[test]
    fn rejects_zero_durations() {
        let mut config = Config::default();
        config.pomodoro.short_break_minutes = 0;
        assert!(matches!(config.validate(), Err(DaemonError::Config(_))));

        let mut config = Config::default();
        config.pomodoro.cycles_before_long_break = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pomodoro.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.keep_awake.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_minutes_that_overflow_seconds() {
        let config: Config = toml::from_str(
            r#"
[pomodoro]
work_minutes = 400000000000000000
"#,
        )
        .unwrap();
        match config.validate() {
            Err(DaemonError::Config(msg)) => assert!(msg.contains("work_minutes")),
            other => panic!("expected config error, got {other:?}"),
        }
        assert_eq!(config.pomodoro.durations().work, Duration::from_secs(u64::MAX));

        let mut config = Config::default();
        config.pomodoro.long_break_minutes = u64::MAX / 60;
        assert!(config.validate().is_ok());
        config.pomodoro.long_break_minutes += 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_chord_only_for_show_desktop() {
        let mut config = Config::default();
        config.keep_awake.chord = KeyChord::new(Vec::new());
        assert!(config.validate().is_err());

        config.keep_awake.action = KeepAwakeAction::MouseNudge;
        assert!(config.validate().is_ok());
    }
}
