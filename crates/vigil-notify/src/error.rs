//! Notification subsystem errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("speech service unavailable")]
    Unavailable,

    #[error("failed to write notification: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
