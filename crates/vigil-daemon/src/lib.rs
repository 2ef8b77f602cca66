//! Core of the vigil add-ons.
//!
//! Holds the Pomodoro state machine and timer service, the keep-awake
//! add-on, configuration loading and the daemon loop that routes host
//! commands to them.

pub mod config;
pub mod cycle;
pub mod daemon;
pub mod error;
pub mod keep_awake;
pub mod setup;
pub mod timer;

pub use config::Config;
pub use cycle::{CycleError, CycleSnapshot, CycleState};
pub use daemon::{Addon, Daemon, DaemonEvent, DaemonStatus};
pub use error::DaemonError;
pub use keep_awake::KeepAwake;
pub use timer::CycleTimer;
