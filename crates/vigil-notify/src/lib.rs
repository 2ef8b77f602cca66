//! Speech and tone notifications for vigil.
//!
//! Defines the [`Notifier`] trait for the host's speech/tone service, a
//! console backend, and the dispatcher task that decouples notice producers
//! from delivery. Producers hold a [`NoticeSender`]; only the dispatcher task
//! ever touches the notifier.

use async_trait::async_trait;
use vigil_types::{Notice, Priority};

pub mod console;
pub mod dispatch;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use console::ConsoleNotifier;
pub use dispatch::{spawn_dispatcher, NoticeSender};
pub use error::NotifyError;

/// The speech/tone output service.
#[async_trait]
pub trait Notifier: Send + 'static {
    /// Speak `text`.
    async fn announce(&mut self, text: &str, priority: Priority) -> Result<(), NotifyError>;

    /// Play a tone.
    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), NotifyError>;
}

/// Deliver one notice through `notifier`.
pub async fn deliver(notifier: &mut dyn Notifier, notice: &Notice) -> Result<(), NotifyError> {
    match notice {
        Notice::Announce { text, priority } => notifier.announce(text, *priority).await,
        Notice::Tone {
            frequency_hz,
            duration_ms,
        } => notifier.tone(*frequency_hz, *duration_ms).await,
    }
}
