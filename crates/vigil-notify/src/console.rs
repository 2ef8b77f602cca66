//! Console backend: announcements as lines on a writer.
//!
//! Useful when the host's speech synthesiser reads the terminal, and for
//! running the add-ons headless.

use async_trait::async_trait;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};
use tracing::debug;
use vigil_types::Priority;

use crate::error::NotifyError;
use crate::Notifier;

const BEL: &str = "\x07";

/// Writes announcements and tones to `W`, one per line.
///
/// Immediate announcements are prefixed with `!`. Tones write the terminal
/// bell followed by a description. A stalled writer suspends only the
/// dispatcher task.
pub struct ConsoleNotifier<W> {
    out: W,
}

impl ConsoleNotifier<io::Stdout> {
    /// Notifier writing to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send + 'static> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer, e.g. to inspect a `Vec<u8>` in tests.
    pub fn into_inner(self) -> W {
        self.out
    }

    async fn write_line(&mut self, line: String) -> Result<(), NotifyError> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> Notifier for ConsoleNotifier<W> {
    async fn announce(&mut self, text: &str, priority: Priority) -> Result<(), NotifyError> {
        let line = match priority {
            Priority::Normal => format!("{text}\n"),
            Priority::Immediate => format!("! {text}\n"),
        };
        self.write_line(line).await
    }

    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), NotifyError> {
        debug!(frequency_hz, duration_ms, "tone");
        self.write_line(format!("{BEL}[tone {frequency_hz} Hz, {duration_ms} ms]\n"))
            .await
    }
}
