//! Daemon errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("add-ons disabled in secure mode")]
    Disabled,

    #[error("input error: {0}")]
    Input(#[from] vigil_input::InputError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
