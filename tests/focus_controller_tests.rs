// Integration tests for the focus timer controller
//
// These tests run on tokio's paused clock, so sleeping advances time
// deterministically and every tick of the controller's ticker is observable.

use anyhow::{bail, Result};
use smartstudy::focus::{
    FocusTimerConfig, FocusTimerController, Notifier, Permission, Phase, PhaseCompletion,
    TimerEvent,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;

/// Notifier double recording every call
struct RecordingNotifier {
    answer: Option<Permission>,
    requests: AtomicUsize,
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn granting() -> Arc<Self> {
        Self::with_answer(Some(Permission::Granted))
    }

    /// `None` makes the permission request itself fail
    fn with_answer(answer: Option<Permission>) -> Arc<Self> {
        Arc::new(Self {
            answer,
            requests: AtomicUsize::new(0),
            shown: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn request_permission(&self) -> Result<Permission> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.answer {
            Some(permission) => Ok(permission),
            None => bail!("notifications not supported"),
        }
    }

    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn cycle(focus_secs: u64, break_secs: u64) -> FocusTimerConfig {
    FocusTimerConfig {
        focus_duration: Duration::from_secs(focus_secs),
        break_duration: Duration::from_secs(break_secs),
        notifications: true,
    }
}

fn drain(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_ticks_once_per_second() {
    let controller = FocusTimerController::new(cycle(10, 5), RecordingNotifier::granting());

    controller.start().await;
    sleep(Duration::from_millis(3500)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.remaining_secs, 7);
    assert!(snapshot.is_running);
    assert!((controller.progress_fraction().await - 0.3).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_focus_completion_switches_to_break_and_notifies() {
    let notifier = RecordingNotifier::granting();
    let controller = FocusTimerController::new(cycle(3, 2), notifier.clone());
    let mut rx = controller.subscribe();

    controller.start().await;
    sleep(Duration::from_millis(3500)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Break);
    assert_eq!(snapshot.remaining_secs, 2);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.completed_sessions, 1);

    // The break does not start on its own
    sleep(Duration::from_secs(10)).await;
    assert_eq!(controller.snapshot().await.remaining_secs, 2);

    let events = drain(&mut rx);
    let completions: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            TimerEvent::PhaseCompleted { completion, .. } => Some(*completion),
            _ => None,
        })
        .collect();
    assert_eq!(completions, vec![PhaseCompletion::FocusComplete]);

    let ticks: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            TimerEvent::Tick { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, vec![2, 1], "no tick is published at zero");

    let shown = notifier.shown();
    assert_eq!(shown.len(), 1);
    assert!(shown[0].0.starts_with("Work session complete!"));
    assert_eq!(shown[0].1, "Time for a 0-minute break!");
}

#[tokio::test(start_paused = true)]
async fn test_break_completion_notifies_and_returns_to_focus() {
    let notifier = RecordingNotifier::granting();
    let controller = FocusTimerController::new(cycle(60, 60), notifier.clone());

    controller.start().await;
    sleep(Duration::from_millis(60_500)).await;
    controller.start().await;
    sleep(Duration::from_millis(60_500)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Focus);
    assert_eq!(snapshot.remaining_secs, 60);
    assert_eq!(snapshot.completed_sessions, 1);

    let shown = notifier.shown();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].1, "Time for a 1-minute break!");
    assert!(shown[1].0.starts_with("Break complete!"));
}

#[tokio::test(start_paused = true)]
async fn test_pause_cancels_pending_ticks() {
    let controller = FocusTimerController::new(cycle(10, 5), RecordingNotifier::granting());

    controller.start().await;
    sleep(Duration::from_millis(2500)).await;
    controller.pause().await;
    controller.pause().await;

    sleep(Duration::from_secs(30)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.remaining_secs, 8);
    assert!(!snapshot.is_running);
}

#[tokio::test(start_paused = true)]
async fn test_restart_runs_a_single_ticker() {
    let controller = FocusTimerController::new(cycle(10, 5), RecordingNotifier::granting());

    controller.start().await;
    controller.pause().await;
    controller.start().await;
    controller.start().await;

    sleep(Duration::from_millis(1500)).await;

    assert_eq!(controller.snapshot().await.remaining_secs, 9);
}

#[tokio::test(start_paused = true)]
async fn test_reset_stops_and_keeps_sessions() {
    let controller = FocusTimerController::new(cycle(2, 5), RecordingNotifier::granting());

    controller.start().await;
    sleep(Duration::from_millis(2500)).await;
    controller.start().await;
    sleep(Duration::from_millis(1500)).await;

    controller.reset().await;
    sleep(Duration::from_secs(5)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Focus);
    assert_eq!(snapshot.remaining_secs, 2);
    assert!(!snapshot.is_running);
    assert_eq!(snapshot.completed_sessions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_permission_requested_once() {
    let notifier = RecordingNotifier::granting();
    let controller = FocusTimerController::new(cycle(10, 5), notifier.clone());

    controller.start().await;
    controller.pause().await;
    controller.start().await;
    controller.reset().await;
    controller.start().await;

    assert_eq!(notifier.requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_denied_permission_suppresses_notifications() {
    let notifier = RecordingNotifier::with_answer(Some(Permission::Denied));
    let controller = FocusTimerController::new(cycle(2, 2), notifier.clone());

    controller.start().await;
    sleep(Duration::from_millis(2500)).await;

    assert_eq!(controller.snapshot().await.phase, Phase::Break);
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_permission_request_is_ignored() {
    let notifier = RecordingNotifier::with_answer(None);
    let controller = FocusTimerController::new(cycle(2, 2), notifier.clone());

    controller.start().await;
    sleep(Duration::from_millis(2500)).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Break);
    assert_eq!(snapshot.completed_sessions, 1);
    assert_eq!(notifier.requests(), 1);
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_notifications_disabled_skips_permission() {
    let notifier = RecordingNotifier::granting();
    let config = FocusTimerConfig {
        notifications: false,
        ..cycle(2, 2)
    };
    let controller = FocusTimerController::new(config, notifier.clone());

    controller.start().await;
    sleep(Duration::from_millis(2500)).await;

    assert_eq!(notifier.requests(), 0);
    assert!(notifier.shown().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_no_tick_after_shutdown() {
    let controller = FocusTimerController::new(cycle(10, 5), RecordingNotifier::granting());
    let mut rx = controller.subscribe();

    controller.start().await;
    sleep(Duration::from_millis(1500)).await;
    controller.shutdown().await;
    drain(&mut rx);

    sleep(Duration::from_secs(20)).await;

    assert!(drain(&mut rx).is_empty());
    assert_eq!(controller.snapshot().await.remaining_secs, 9);

    // Starting again is ignored
    controller.start().await;
    sleep(Duration::from_secs(5)).await;
    assert!(!controller.snapshot().await.is_running);
    assert_eq!(controller.snapshot().await.remaining_secs, 9);
}

#[tokio::test(start_paused = true)]
async fn test_no_tick_after_drop() {
    let controller = FocusTimerController::new(cycle(10, 5), RecordingNotifier::granting());
    let mut rx = controller.subscribe();

    controller.start().await;
    drop(controller);

    sleep(Duration::from_secs(20)).await;

    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .all(|event| !matches!(event, TimerEvent::Tick { .. })),
        "ticker fired after the controller was dropped"
    );
    assert!(matches!(
        rx.try_recv(),
        Err(broadcast::error::TryRecvError::Closed)
    ));
}
