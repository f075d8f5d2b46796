use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use super::config::FocusTimerConfig;
use super::notify::{completion_message, Notifier, Permission};
use super::timer::{FocusTimer, Phase, PhaseCompletion, TimerSnapshot};

/// Real-time interval between countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// State changes published to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Started(TimerSnapshot),
    Tick { phase: Phase, remaining_secs: u64 },
    PhaseCompleted {
        completion: PhaseCompletion,
        snapshot: TimerSnapshot,
    },
    Paused(TimerSnapshot),
    Reset(TimerSnapshot),
}

struct TimerCell {
    timer: FocusTimer,
    /// Bumped on every start/pause/reset; a ticker only mutates the timer
    /// while its captured epoch is current
    epoch: u64,
    permission_requested: bool,
    permission: Option<Permission>,
}

/// Drives a [`FocusTimer`] from a cancellable one-second ticker
///
/// The ticker is a tokio task that is aborted on pause, reset, shutdown and
/// drop. Observers receive [`TimerEvent`]s through [`subscribe`](Self::subscribe).
pub struct FocusTimerController {
    cell: Arc<Mutex<TimerCell>>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<TimerEvent>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    torn_down: Arc<AtomicBool>,
}

impl FocusTimerController {
    pub fn new(config: FocusTimerConfig, notifier: Arc<dyn Notifier>) -> Self {
        info!(
            "Creating focus timer (focus={}s, break={}s, notifier={})",
            config.focus_secs(),
            config.break_secs(),
            notifier.name()
        );

        let (events, _) = broadcast::channel(64);

        Self {
            cell: Arc::new(Mutex::new(TimerCell {
                timer: FocusTimer::new(config),
                epoch: 0,
                permission_requested: false,
                permission: None,
            })),
            notifier,
            events,
            ticker: Mutex::new(None),
            torn_down: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to timer events
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    /// Start the countdown; no-op if already running
    ///
    /// The first call asks the notifier for permission. A failed request is
    /// treated as denied.
    pub async fn start(&self) {
        if self.torn_down.load(Ordering::SeqCst) {
            debug!("Focus timer torn down, ignoring start");
            return;
        }

        let request_permission = {
            let mut cell = self.cell.lock().await;
            if cell.timer.is_running() {
                debug!("Focus timer already running");
                return;
            }
            let first = !cell.permission_requested && cell.timer.config().notifications;
            cell.permission_requested = true;
            first
        };

        if request_permission {
            let permission = match self.notifier.request_permission().await {
                Ok(permission) => permission,
                Err(e) => {
                    debug!("Notification permission request failed: {}", e);
                    Permission::Denied
                }
            };
            info!("Notification permission: {:?}", permission);
            self.cell.lock().await.permission = Some(permission);
        }

        let (epoch, snapshot) = {
            let mut cell = self.cell.lock().await;
            if !cell.timer.start() {
                return;
            }
            cell.epoch += 1;
            (cell.epoch, cell.timer.snapshot())
        };

        info!(
            "Focus timer started: {:?} with {} remaining",
            snapshot.phase, snapshot.display
        );

        let handle = self.spawn_ticker(epoch);
        if let Some(previous) = self.ticker.lock().await.replace(handle) {
            previous.abort();
        }

        let _ = self.events.send(TimerEvent::Started(snapshot));
    }

    /// Stop the countdown and cancel the pending tick; idempotent
    pub async fn pause(&self) {
        let (was_running, snapshot) = {
            let mut cell = self.cell.lock().await;
            let was_running = cell.timer.pause();
            cell.epoch += 1;
            (was_running, cell.timer.snapshot())
        };

        self.cancel_ticker().await;

        if was_running {
            info!("Focus timer paused at {}", snapshot.display);
            let _ = self.events.send(TimerEvent::Paused(snapshot));
        }
    }

    /// Return to a stopped focus phase, keeping completed session counts
    pub async fn reset(&self) {
        let snapshot = {
            let mut cell = self.cell.lock().await;
            cell.timer.reset();
            cell.epoch += 1;
            cell.timer.snapshot()
        };

        self.cancel_ticker().await;

        info!("Focus timer reset");
        let _ = self.events.send(TimerEvent::Reset(snapshot));
    }

    /// Fraction of the current phase already elapsed (0.0 - 1.0)
    pub async fn progress_fraction(&self) -> f64 {
        self.cell.lock().await.timer.progress_fraction()
    }

    /// Current timer state
    pub async fn snapshot(&self) -> TimerSnapshot {
        self.cell.lock().await.timer.snapshot()
    }

    /// Cancel the ticker for good; later calls to [`start`](Self::start) are ignored
    pub async fn shutdown(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
        {
            let mut cell = self.cell.lock().await;
            cell.timer.pause();
            cell.epoch += 1;
        }
        self.cancel_ticker().await;
        info!("Focus timer shut down");
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn spawn_ticker(&self, epoch: u64) -> JoinHandle<()> {
        let cell = Arc::clone(&self.cell);
        let notifier = Arc::clone(&self.notifier);
        let events = self.events.clone();
        let torn_down = Arc::clone(&self.torn_down);

        tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

            loop {
                interval.tick().await;

                if torn_down.load(Ordering::SeqCst) {
                    break;
                }

                let (completion, snapshot, permission, config) = {
                    let mut cell = cell.lock().await;
                    if cell.epoch != epoch || !cell.timer.is_running() {
                        break;
                    }
                    let completion = cell.timer.tick();
                    (
                        completion,
                        cell.timer.snapshot(),
                        cell.permission,
                        cell.timer.config().clone(),
                    )
                };

                let Some(completion) = completion else {
                    let _ = events.send(TimerEvent::Tick {
                        phase: snapshot.phase,
                        remaining_secs: snapshot.remaining_secs,
                    });
                    continue;
                };

                info!(
                    "Phase complete: {:?} (sessions={}, next={:?})",
                    completion, snapshot.completed_sessions, snapshot.phase
                );
                let _ = events.send(TimerEvent::PhaseCompleted {
                    completion,
                    snapshot,
                });

                if config.notifications && permission == Some(Permission::Granted) {
                    let (title, body) = completion_message(completion, &config);
                    if let Err(e) = notifier.notify(&title, &body).await {
                        debug!("Notification failed: {}", e);
                    }
                }

                break;
            }
        })
    }
}

impl Drop for FocusTimerController {
    fn drop(&mut self) {
        self.torn_down.store(true, Ordering::SeqCst);
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}
