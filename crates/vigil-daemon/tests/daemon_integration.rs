//! Integration tests driving the full daemon loop with mock backends.
//!
//! Every test runs on a paused tokio clock, so phase lengths of many minutes
//! elapse instantly and deterministically.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;
use vigil_daemon::config::Config;
use vigil_daemon::{Addon, Daemon, DaemonError, DaemonEvent, DaemonStatus};
use vigil_input::mock::{MockEmulation, MockEmulationHandle};
use vigil_input::UnavailableEmulation;
use vigil_notify::mock::{MockNotifier, MockNotifierHandle};
use vigil_types::{ButtonState, InputEvent, KeyCode, Phase};

const WORK: Duration = Duration::from_secs(25 * 60);
const SHORT_BREAK: Duration = Duration::from_secs(5 * 60);
const LONG_BREAK: Duration = Duration::from_secs(15 * 60);

/// A running daemon and the observer handles of its mock backends.
#[allow(dead_code)]
struct TestDaemon {
    events: mpsc::Sender<DaemonEvent>,
    status: watch::Receiver<DaemonStatus>,
    emulation: MockEmulationHandle,
    notifier: MockNotifierHandle,
    handle: JoinHandle<Result<(), DaemonError>>,
}

impl TestDaemon {
    async fn send(&self, event: DaemonEvent) {
        self.events.send(event).await.expect("daemon should be running");
    }

    async fn wait_for(&mut self, pred: impl Fn(&DaemonStatus) -> bool) -> DaemonStatus {
        wait_for_status(&mut self.status, Duration::from_secs(5), pred)
            .await
            .expect("status should match")
    }

    async fn shutdown(self) -> Result<(), DaemonError> {
        let _ = self.events.send(DaemonEvent::Shutdown).await;
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("daemon should stop in time")
            .expect("daemon task should not panic")
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn setup_with(config: &Config, emulation: MockEmulation) -> TestDaemon {
    init_tracing();
    let emulation_handle = emulation.handle();
    let notifier = MockNotifier::new();
    let notifier_handle = notifier.handle();

    let daemon = Daemon::new(config, Box::new(emulation), notifier).unwrap();
    let status = daemon.status_receiver();
    let events = daemon.event_sender();
    let handle = tokio::spawn(daemon.run());

    TestDaemon {
        events,
        status,
        emulation: emulation_handle,
        notifier: notifier_handle,
        handle,
    }
}

fn setup() -> TestDaemon {
    setup_with(&Config::default(), MockEmulation::new())
}

/// Wait for a condition on a status receiver with timeout.
async fn wait_for_status(
    rx: &mut watch::Receiver<DaemonStatus>,
    timeout: Duration,
    pred: impl Fn(&DaemonStatus) -> bool,
) -> Result<DaemonStatus, &'static str> {
    tokio::time::timeout(timeout, async {
        loop {
            {
                let status = rx.borrow_and_update().clone();
                if pred(&status) {
                    return Ok(status);
                }
            }
            if rx.changed().await.is_err() {
                return Err("watch closed");
            }
        }
    })
    .await
    .map_err(|_| "timeout")?
}

/// Yield until at least `count` announcements were delivered.
///
/// Yielding instead of sleeping keeps the paused clock where it is.
async fn wait_for_texts(notifier: &MockNotifierHandle, count: usize) -> Vec<String> {
    for _ in 0..1000 {
        let texts = notifier.texts();
        if texts.len() >= count {
            return texts;
        }
        tokio::task::yield_now().await;
    }
    panic!(
        "expected {count} announcements, got {:?}",
        notifier.texts()
    );
}

#[tokio::test(start_paused = true)]
async fn test_work_break_and_paused_break() {
    let mut daemon = setup();

    daemon.send(DaemonEvent::ToggleCycle).await;
    let status = daemon.wait_for(|s| s.running).await;
    assert_eq!(status.phase, Phase::Working);

    tokio::time::sleep(WORK + Duration::from_secs(1)).await;
    let status = daemon.wait_for(|s| s.phase == Phase::ShortBreak).await;
    assert_eq!(status.cycles_completed, 1);

    // One second into the break: pause, wait 500 s, resume.
    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| !s.running).await;
    tokio::time::sleep(Duration::from_secs(500)).await;
    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;

    // 1 s before the pause plus 298 s after: still on break.
    tokio::time::sleep(Duration::from_secs(298)).await;
    assert_eq!(daemon.status.borrow().phase, Phase::ShortBreak);

    tokio::time::sleep(Duration::from_secs(2)).await;
    daemon.wait_for(|s| s.phase == Phase::Working).await;

    let texts = wait_for_texts(&daemon.notifier, 5).await;
    assert_eq!(
        texts,
        vec![
            "Pomodoro started. Work for 25 minutes.",
            "Work period finished. Take a 5 minute break.",
            "Pomodoro paused.",
            "Pomodoro resumed.",
            "Break finished. Back to work.",
        ]
    );
    assert_eq!(daemon.notifier.tones(), vec![880, 660, 880]);

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_fourth_break_is_long() {
    let mut daemon = setup();
    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;

    for cycle in 1..=4 {
        tokio::time::sleep(WORK).await;
        let status = daemon.wait_for(|s| s.phase.is_break()).await;
        assert_eq!(status.cycles_completed, cycle);
        if cycle < 4 {
            assert_eq!(status.phase, Phase::ShortBreak);
            tokio::time::sleep(SHORT_BREAK).await;
            daemon.wait_for(|s| s.phase == Phase::Working).await;
        } else {
            assert_eq!(status.phase, Phase::LongBreak);
        }
    }

    tokio::time::sleep(LONG_BREAK).await;
    daemon.wait_for(|s| s.phase == Phase::Working).await;

    let texts = wait_for_texts(&daemon.notifier, 9).await;
    assert!(texts.contains(&"4 cycles completed. Take a 15 minute long break.".to_string()));
    assert_eq!(texts.last().unwrap(), "Long break finished. Back to work.");
    assert_eq!(
        daemon.notifier.tones(),
        vec![880, 660, 880, 660, 880, 660, 880, 440, 880]
    );

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_status_and_stop() {
    let mut daemon = setup();

    daemon.send(DaemonEvent::ReportStatus).await;
    daemon.send(DaemonEvent::StopCycle).await;
    let texts = wait_for_texts(&daemon.notifier, 2).await;
    assert_eq!(
        texts,
        vec!["No Pomodoro cycle active.", "No Pomodoro cycle to stop."]
    );

    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;
    tokio::time::sleep(Duration::from_secs(775)).await;
    daemon.send(DaemonEvent::ReportStatus).await;
    let texts = wait_for_texts(&daemon.notifier, 4).await;
    assert_eq!(
        texts[3],
        "Pomodoro cycle in progress. 12 minutes 5 seconds remaining."
    );

    daemon.send(DaemonEvent::StopCycle).await;
    let status = daemon.wait_for(|s| s.phase == Phase::Idle).await;
    assert!(!status.running);
    assert_eq!(status.cycles_completed, 0);
    let texts = wait_for_texts(&daemon.notifier, 5).await;
    assert_eq!(texts[4], "Pomodoro stopped.");

    daemon.send(DaemonEvent::ReportStatus).await;
    let texts = wait_for_texts(&daemon.notifier, 6).await;
    assert_eq!(texts[5], "No Pomodoro cycle active.");

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_status_during_paused_break() {
    let mut daemon = setup();
    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;
    tokio::time::sleep(WORK).await;
    daemon.wait_for(|s| s.phase == Phase::ShortBreak).await;

    tokio::time::sleep(Duration::from_secs(120)).await;
    daemon.send(DaemonEvent::ReportStatus).await;
    let texts = wait_for_texts(&daemon.notifier, 3).await;
    assert_eq!(texts[2], "Break in progress. 3 minutes 0 seconds remaining.");

    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| !s.running).await;
    daemon.send(DaemonEvent::ReportStatus).await;
    let texts = wait_for_texts(&daemon.notifier, 5).await;
    assert_eq!(texts[3], "Pomodoro paused.");
    assert_eq!(texts[4], "Pomodoro paused.");

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_keep_awake_sends_show_desktop() {
    let mut daemon = setup();

    daemon.send(DaemonEvent::ToggleKeepAwake).await;
    daemon.wait_for(|s| s.keep_awake).await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    let events = daemon.emulation.injected_events();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0].event,
        InputEvent::Key {
            code: KeyCode::LeftMeta,
            state: ButtonState::Pressed
        }
    );
    assert_eq!(
        events[3].event,
        InputEvent::Key {
            code: KeyCode::LeftMeta,
            state: ButtonState::Released
        }
    );
    assert_eq!(events[2].at - events[1].at, Duration::from_millis(100));

    let texts = wait_for_texts(&daemon.notifier, 2).await;
    assert_eq!(texts, vec!["Keep awake activated.", "Windows + D keys sent."]);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(daemon.emulation.injected_events().len(), 8);

    daemon.send(DaemonEvent::ToggleKeepAwake).await;
    daemon.wait_for(|s| !s.keep_awake).await;
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(daemon.emulation.injected_events().len(), 8);
    let texts = wait_for_texts(&daemon.notifier, 4).await;
    assert_eq!(texts.last().unwrap(), "Keep awake deactivated.");

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_keep_awake_runs_alongside_pomodoro() {
    let mut daemon = setup();
    daemon.send(DaemonEvent::ToggleKeepAwake).await;
    daemon.send(DaemonEvent::ToggleCycle).await;
    let status = daemon.wait_for(|s| s.keep_awake && s.running).await;
    assert_eq!(status.phase, Phase::Working);

    tokio::time::sleep(WORK + Duration::from_millis(200)).await;
    let status = daemon.wait_for(|s| s.phase == Phase::ShortBreak).await;
    assert!(status.keep_awake);
    // Fired at 0 s and then every minute up to and including 25 min.
    assert_eq!(daemon.emulation.injected_events().len(), 26 * 4);

    let emulation = daemon.emulation.clone();
    daemon.shutdown().await.unwrap();
    assert!(emulation.devices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_keep_awake_unavailable_backend() {
    init_tracing();
    let notifier = MockNotifier::new();
    let notifier_handle = notifier.handle();
    let daemon = Daemon::new(
        &Config::default(),
        Box::new(UnavailableEmulation),
        notifier,
    )
    .unwrap();
    let status = daemon.status_receiver();
    let events = daemon.event_sender();
    let handle = tokio::spawn(daemon.run());

    events.send(DaemonEvent::ToggleKeepAwake).await.unwrap();
    let texts = wait_for_texts(&notifier_handle, 1).await;
    assert_eq!(
        texts,
        vec!["Keep awake unavailable: input emulation not available on this platform."]
    );
    assert!(!status.borrow().keep_awake);

    // The Pomodoro timer still works.
    events.send(DaemonEvent::ToggleCycle).await.unwrap();
    let texts = wait_for_texts(&notifier_handle, 2).await;
    assert_eq!(texts[1], "Pomodoro started. Work for 25 minutes.");

    events.send(DaemonEvent::Shutdown).await.unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_notifier_failure_does_not_affect_state() {
    let mut daemon = setup();
    daemon.notifier.set_available(false);

    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;
    tokio::time::sleep(WORK + Duration::from_secs(1)).await;
    let status = daemon.wait_for(|s| s.phase == Phase::ShortBreak).await;
    assert_eq!(status.cycles_completed, 1);

    // Started + tone, break + tone: all refused, none recorded.
    for _ in 0..100 {
        if daemon.notifier.failures() >= 4 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(daemon.notifier.failures(), 4);
    assert!(daemon.notifier.notices().is_empty());

    daemon.notifier.set_available(true);
    daemon.send(DaemonEvent::ReportStatus).await;
    let texts = wait_for_texts(&daemon.notifier, 1).await;
    assert_eq!(texts, vec!["Break in progress. 4 minutes 59 seconds remaining."]);

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_no_notices_after_shutdown() {
    let mut daemon = setup();
    daemon.send(DaemonEvent::ToggleKeepAwake).await;
    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.keep_awake && s.running).await;

    let notifier = daemon.notifier.clone();
    let emulation = daemon.emulation.clone();
    daemon.shutdown().await.unwrap();

    assert!(emulation.is_shutdown());
    assert!(emulation.devices().is_empty());
    let notices = notifier.notices().len();
    let injected = emulation.injected_events().len();

    tokio::time::sleep(Duration::from_secs(3 * 3600)).await;
    assert_eq!(notifier.notices().len(), notices);
    assert_eq!(emulation.injected_events().len(), injected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_while_idle() {
    let daemon = setup();
    let emulation = daemon.emulation.clone();
    let notifier = daemon.notifier.clone();
    daemon.shutdown().await.unwrap();
    assert!(emulation.is_shutdown());
    assert!(notifier.notices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_custom_durations() {
    let mut config = Config::default();
    config.pomodoro.work_minutes = 1;
    config.pomodoro.short_break_minutes = 1;
    config.pomodoro.cycles_before_long_break = 2;
    config.pomodoro.long_break_minutes = 2;
    let mut daemon = setup_with(&config, MockEmulation::new());

    daemon.send(DaemonEvent::ToggleCycle).await;
    daemon.wait_for(|s| s.running).await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    daemon.wait_for(|s| s.phase == Phase::ShortBreak).await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    daemon.wait_for(|s| s.phase == Phase::Working).await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    let status = daemon.wait_for(|s| s.phase == Phase::LongBreak).await;
    assert_eq!(status.cycles_completed, 2);

    let texts = wait_for_texts(&daemon.notifier, 4).await;
    assert_eq!(texts[0], "Pomodoro started. Work for 1 minute.");
    assert_eq!(texts[1], "Work period finished. Take a 1 minute break.");
    assert_eq!(texts[3], "2 cycles completed. Take a 2 minute long break.");

    daemon.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_secure_mode_disables_addons() {
    init_tracing();
    let emulation = MockEmulation::new();
    let emulation_handle = emulation.handle();
    let notifier = MockNotifier::new();
    let notifier_handle = notifier.handle();

    let addon = Addon::build(&Config::default(), true, Box::new(emulation), notifier).unwrap();
    assert!(!addon.is_enabled());
    assert!(matches!(addon.into_daemon(), Err(DaemonError::Disabled)));

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(notifier_handle.notices().is_empty());
    assert!(emulation_handle.devices().is_empty());
    assert!(emulation_handle.injected_events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_enabled_addon_runs_daemon() {
    init_tracing();
    let notifier = MockNotifier::new();
    let notifier_handle = notifier.handle();
    let addon = Addon::build(
        &Config::default(),
        false,
        Box::new(MockEmulation::new()),
        notifier,
    )
    .unwrap();
    assert!(addon.is_enabled());

    let daemon = addon.into_daemon().unwrap();
    let events = daemon.event_sender();
    let handle = tokio::spawn(daemon.run());
    events.send(DaemonEvent::ToggleCycle).await.unwrap();
    wait_for_texts(&notifier_handle, 1).await;
    drop(events);
    handle.await.unwrap().unwrap();
}
