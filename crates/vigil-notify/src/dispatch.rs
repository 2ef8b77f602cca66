//! Notice dispatcher task.
//!
//! Notices are produced inside lock-holding critical sections and must never
//! wait on delivery. [`NoticeSender::send`] only enqueues; the task spawned by
//! [`spawn_dispatcher`] owns the notifier and delivers in order.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use vigil_types::Notice;

use crate::{deliver, Notifier};

/// Cloneable, non-blocking handle for queueing notices.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    /// A sender and the raw receiving end, for callers that want to drain
    /// notices themselves.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a notice. Dropped silently once the dispatcher has gone.
    pub fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            debug!("notice dispatcher gone, dropping notice");
        }
    }

    /// Queue several notices, preserving order.
    pub fn send_all(&self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.send(notice);
        }
    }
}

/// Spawn a task that owns `notifier` and delivers every queued notice.
///
/// Delivery failures are logged and swallowed. The task finishes once every
/// [`NoticeSender`] clone is dropped and the queue is drained.
pub fn spawn_dispatcher<N: Notifier>(notifier: N) -> (NoticeSender, JoinHandle<()>) {
    let (sender, rx) = NoticeSender::channel();
    let handle = tokio::spawn(run(notifier, rx));
    (sender, handle)
}

async fn run<N: Notifier>(mut notifier: N, mut rx: mpsc::UnboundedReceiver<Notice>) {
    let mut delivered = 0u64;
    let mut failed = 0u64;
    while let Some(notice) = rx.recv().await {
        match deliver(&mut notifier, &notice).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                failed += 1;
                warn!(error = %e, ?notice, "notice not delivered");
            }
        }
    }
    debug!(delivered, failed, "notice dispatcher finished");
}
