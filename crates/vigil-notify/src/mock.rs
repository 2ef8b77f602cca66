//! Mock notifier for testing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vigil_types::{Notice, Priority};

use crate::error::NotifyError;
use crate::Notifier;

#[derive(Debug)]
struct MockNotifierState {
    notices: Vec<Notice>,
    available: bool,
    failures: usize,
}

/// Records every delivered notice.
pub struct MockNotifier {
    state: Arc<Mutex<MockNotifierState>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockNotifierState {
                notices: Vec::new(),
                available: true,
                failures: 0,
            })),
        }
    }

    /// Get a clonable handle for observing delivered notices from tests.
    pub fn handle(&self) -> MockNotifierHandle {
        MockNotifierHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn record(&self, notice: Notice) -> Result<(), NotifyError> {
        let mut state = self.state.lock().unwrap();
        if !state.available {
            state.failures += 1;
            return Err(NotifyError::Unavailable);
        }
        state.notices.push(notice);
        Ok(())
    }
}

/// Clonable observer handle for `MockNotifier`.
#[derive(Clone)]
pub struct MockNotifierHandle {
    state: Arc<Mutex<MockNotifierState>>,
}

impl MockNotifierHandle {
    /// Snapshot of every delivered notice.
    pub fn notices(&self) -> Vec<Notice> {
        self.state.lock().unwrap().notices.clone()
    }

    /// Snapshot of delivered announcement texts only.
    pub fn texts(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .notices
            .iter()
            .filter_map(|n| n.text().map(str::to_string))
            .collect()
    }

    /// Frequencies of delivered tones, in order.
    pub fn tones(&self) -> Vec<u32> {
        self.state
            .lock()
            .unwrap()
            .notices
            .iter()
            .filter_map(|n| match n {
                Notice::Tone { frequency_hz, .. } => Some(*frequency_hz),
                Notice::Announce { .. } => None,
            })
            .collect()
    }

    /// Simulate the speech service going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.state.lock().unwrap().available = available;
    }

    /// Number of delivery attempts refused while unavailable.
    pub fn failures(&self) -> usize {
        self.state.lock().unwrap().failures
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn announce(&mut self, text: &str, priority: Priority) -> Result<(), NotifyError> {
        self.record(Notice::Announce {
            text: text.to_string(),
            priority,
        })
    }

    async fn tone(&mut self, frequency_hz: u32, duration_ms: u32) -> Result<(), NotifyError> {
        self.record(Notice::tone(frequency_hz, duration_ms))
    }
}
