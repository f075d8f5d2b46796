use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::state::{
    format_clock, CaptureError, CaptureEvent, CaptureSnapshot, CaptureState, FinishedRecording,
};
use crate::audio::{Artifact, AudioInput, DeviceEvent};
use crate::voice::TranscriptionUploader;

/// Interval of the elapsed-time counter
pub const ELAPSED_INTERVAL: Duration = Duration::from_secs(1);

/// How long `stop` waits for chunks still queued by the input
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct CaptureInner {
    state: CaptureState,
    /// Bumped whenever a recording session ends; callbacks carrying an older
    /// epoch are ignored
    epoch: u64,
    session_id: Option<Uuid>,
    elapsed_secs: u64,
    chunks: Vec<Vec<u8>>,
    last_error: Option<CaptureError>,
}

impl CaptureInner {
    fn fail(&mut self, error: CaptureError) {
        self.state = CaptureState::Error;
        self.epoch += 1;
        self.chunks.clear();
        self.last_error = Some(error);
    }

    fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            state: self.state,
            session_id: self.session_id,
            elapsed_secs: self.elapsed_secs,
            elapsed_display: format_clock(self.elapsed_secs),
            chunk_count: self.chunks.len(),
            buffered_bytes: self.chunks.iter().map(Vec::len).sum(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Recording state machine around a single [`AudioInput`]
///
/// ```text
/// Idle --request_start--> Recording --pause--> Paused --resume--> Recording
/// Recording|Paused --stop--> Finalizing --> Idle
/// Idle --request_start(fail)--> Error --acknowledge--> Idle
/// Recording|Paused --device lost--> Error --acknowledge--> Idle
/// ```
///
/// Lock order is device before state; the state lock is never held across an
/// await on the device. Start, pause, resume and the first half of stop hold
/// the device lock for the whole transition.
pub struct AudioCaptureController {
    inner: Arc<Mutex<CaptureInner>>,
    device: Arc<Mutex<Box<dyn AudioInput>>>,
    uploader: Arc<dyn TranscriptionUploader>,
    events: broadcast::Sender<CaptureEvent>,
    pump: Mutex<Option<JoinHandle<()>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl AudioCaptureController {
    pub fn new(device: Box<dyn AudioInput>, uploader: Arc<dyn TranscriptionUploader>) -> Self {
        info!("Creating audio capture controller (input={})", device.name());

        let (events, _) = broadcast::channel(256);

        Self {
            inner: Arc::new(Mutex::new(CaptureInner {
                state: CaptureState::Idle,
                epoch: 0,
                session_id: None,
                elapsed_secs: 0,
                chunks: Vec::new(),
                last_error: None,
            })),
            device: Arc::new(Mutex::new(device)),
            uploader,
            events,
            pump: Mutex::new(None),
            ticker: Mutex::new(None),
        }
    }

    /// Subscribe to capture events
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> CaptureState {
        self.inner.lock().await.state
    }

    pub async fn snapshot(&self) -> CaptureSnapshot {
        self.inner.lock().await.snapshot()
    }

    /// Acquire the input and start recording
    ///
    /// A no-op while a recording is in progress. Starting from `Error`
    /// acknowledges the previous failure first.
    pub async fn request_start(&self) -> Result<(), CaptureError> {
        let mut device = self.device.lock().await;

        {
            let mut inner = self.inner.lock().await;
            match inner.state {
                CaptureState::Recording | CaptureState::Paused | CaptureState::Finalizing => {
                    debug!("Recording already in progress ({:?})", inner.state);
                    return Ok(());
                }
                CaptureState::Error => {
                    debug!("Clearing previous capture error before restart");
                    inner.state = CaptureState::Idle;
                    inner.last_error = None;
                }
                CaptureState::Idle => {}
            }
        }

        info!("Acquiring audio input: {}", device.name());

        let rx = match device.open().await {
            Ok(rx) => rx,
            Err(e) => {
                if let Err(close_err) = device.close().await {
                    warn!("Failed to release audio input after open error: {}", close_err);
                }

                let error = CaptureError::DeviceUnavailable(format!("{:#}", e));
                error!("Failed to start recording: {}", error);

                let session_id = {
                    let mut inner = self.inner.lock().await;
                    inner.fail(error.clone());
                    inner.session_id
                };
                self.emit(CaptureEvent::StateChanged {
                    state: CaptureState::Error,
                    session_id,
                });
                self.emit(CaptureEvent::Failed {
                    error: error.clone(),
                });

                return Err(error);
            }
        };

        let (epoch, session_id) = {
            let mut inner = self.inner.lock().await;
            inner.state = CaptureState::Recording;
            inner.epoch += 1;
            inner.session_id = Some(Uuid::new_v4());
            inner.elapsed_secs = 0;
            inner.chunks.clear();
            inner.last_error = None;
            (inner.epoch, inner.session_id)
        };
        drop(device);

        let pump = self.spawn_pump(rx, epoch);
        if let Some(previous) = self.pump.lock().await.replace(pump) {
            previous.abort();
        }
        let ticker = self.spawn_ticker(epoch);
        if let Some(previous) = self.ticker.lock().await.replace(ticker) {
            previous.abort();
        }

        if let Some(id) = session_id {
            info!("Recording started: {}", id);
        }
        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Recording,
            session_id,
        });

        Ok(())
    }

    /// Suspend recording; only valid while `Recording`
    ///
    /// Returns false when the call did not change state.
    pub async fn pause(&self) -> bool {
        // Held until the ticker and the input agree with the new state
        let mut device = self.device.lock().await;

        let session_id = {
            let mut inner = self.inner.lock().await;
            if inner.state != CaptureState::Recording {
                debug!("Pause ignored in {:?}", inner.state);
                return false;
            }
            inner.state = CaptureState::Paused;
            inner.session_id
        };

        self.cancel_ticker().await;

        if let Err(e) = device.set_active(false).await {
            warn!("Failed to suspend audio input: {}", e);
        }
        drop(device);

        info!("Recording paused");
        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Paused,
            session_id,
        });
        true
    }

    /// Continue a paused recording; only valid while `Paused`
    pub async fn resume(&self) -> bool {
        let mut device = self.device.lock().await;

        let (epoch, session_id) = {
            let mut inner = self.inner.lock().await;
            if inner.state != CaptureState::Paused {
                debug!("Resume ignored in {:?}", inner.state);
                return false;
            }
            inner.state = CaptureState::Recording;
            (inner.epoch, inner.session_id)
        };

        if let Err(e) = device.set_active(true).await {
            warn!("Failed to resume audio input: {}", e);
        }

        let ticker = self.spawn_ticker(epoch);
        if let Some(previous) = self.ticker.lock().await.replace(ticker) {
            previous.abort();
        }
        drop(device);

        info!("Recording resumed");
        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Recording,
            session_id,
        });
        true
    }

    /// Release the input, assemble the artifact and hand it to the uploader
    ///
    /// Returns `Ok(None)` when nothing was recording. A zero-byte artifact is
    /// reported as [`CaptureError::EmptyRecording`] and never uploaded.
    pub async fn stop(&self) -> Result<Option<FinishedRecording>, CaptureError> {
        let mut device = self.device.lock().await;

        let session_id = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                CaptureState::Recording | CaptureState::Paused => {}
                other => {
                    debug!("Stop ignored in {:?}", other);
                    return Ok(None);
                }
            }
            inner.state = CaptureState::Finalizing;
            inner.session_id
        };

        info!("Stopping recording");
        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Finalizing,
            session_id,
        });

        self.cancel_ticker().await;

        if let Err(e) = device.close().await {
            warn!("Failed to release audio input: {}", e);
        }
        let format = device.format();
        // The pump takes the device lock when its stream ends
        drop(device);

        // Chunks delivered before the input was released are still queued
        let pump = self.pump.lock().await.take();
        if let Some(mut pump) = pump {
            if time::timeout(DRAIN_TIMEOUT, &mut pump).await.is_err() {
                warn!("Audio input did not drain within {:?}", DRAIN_TIMEOUT);
                pump.abort();
            }
        }

        let artifact = {
            let mut inner = self.inner.lock().await;
            let chunks = std::mem::take(&mut inner.chunks);
            inner.epoch += 1;
            inner.state = CaptureState::Idle;
            let artifact = Artifact::assemble(chunks, inner.elapsed_secs, format, Utc::now());
            if artifact.is_empty() {
                inner.last_error = Some(CaptureError::EmptyRecording);
            }
            artifact
        };

        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Idle,
            session_id,
        });

        if artifact.is_empty() {
            warn!(
                "Recording is empty ({} chunks, {}s), skipping upload",
                artifact.chunk_count, artifact.elapsed_secs
            );
            self.emit(CaptureEvent::Failed {
                error: CaptureError::EmptyRecording,
            });
            return Err(CaptureError::EmptyRecording);
        }

        info!(
            "Recording finalized: {} ({} bytes from {} chunks, {})",
            artifact.suggested_name,
            artifact.len(),
            artifact.chunk_count,
            format_clock(artifact.elapsed_secs)
        );
        self.emit(CaptureEvent::Finalized {
            bytes: artifact.len(),
            elapsed_secs: artifact.elapsed_secs,
            suggested_name: artifact.suggested_name.clone(),
        });

        let upload = self
            .uploader
            .upload_artifact(&artifact.bytes, &artifact.suggested_name)
            .await;

        match &upload {
            Ok(note) => info!("Recording uploaded as voice note {}", note.id),
            Err(e) => error!("Recording upload failed: {}", e),
        }

        Ok(Some(FinishedRecording { artifact, upload }))
    }

    /// Clear an error; only valid in `Error`
    pub async fn acknowledge(&self) -> bool {
        let session_id = {
            let mut inner = self.inner.lock().await;
            if inner.state != CaptureState::Error {
                return false;
            }
            inner.state = CaptureState::Idle;
            inner.last_error = None;
            inner.session_id
        };

        debug!("Capture error acknowledged");
        self.emit(CaptureEvent::StateChanged {
            state: CaptureState::Idle,
            session_id,
        });
        true
    }

    /// Discard any recording in progress and release the input
    pub async fn shutdown(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.epoch += 1;
            inner.chunks.clear();
            inner.state = CaptureState::Idle;
        }

        self.cancel_ticker().await;
        if let Some(pump) = self.pump.lock().await.take() {
            pump.abort();
        }

        if let Err(e) = self.device.lock().await.close().await {
            warn!("Failed to release audio input on shutdown: {}", e);
        }

        info!("Audio capture shut down");
    }

    fn emit(&self, event: CaptureEvent) {
        let _ = self.events.send(event);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    fn spawn_ticker(&self, epoch: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut interval =
                time::interval_at(Instant::now() + ELAPSED_INTERVAL, ELAPSED_INTERVAL);

            loop {
                interval.tick().await;

                let secs = {
                    let mut inner = inner.lock().await;
                    if inner.epoch != epoch || inner.state != CaptureState::Recording {
                        break;
                    }
                    inner.elapsed_secs += 1;
                    inner.elapsed_secs
                };

                let _ = events.send(CaptureEvent::Elapsed { secs });
            }
        })
    }

    fn spawn_pump(&self, mut rx: mpsc::Receiver<DeviceEvent>, epoch: u64) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let device = Arc::clone(&self.device);
        let events = self.events.clone();

        tokio::spawn(async move {
            let reason = loop {
                match rx.recv().await {
                    Some(DeviceEvent::Data(bytes)) => {
                        let (index, len) = {
                            let mut inner = inner.lock().await;
                            if inner.epoch != epoch {
                                debug!("Dropping chunk from a finished recording");
                                return;
                            }
                            let len = bytes.len();
                            inner.chunks.push(bytes);
                            (inner.chunks.len() - 1, len)
                        };
                        let _ = events.send(CaptureEvent::ChunkReceived { index, bytes: len });
                    }
                    Some(DeviceEvent::Disconnected(reason)) => break reason,
                    None => break "audio stream ended".to_string(),
                }
            };

            let mut device = device.lock().await;

            let (error, session_id) = {
                let mut inner = inner.lock().await;
                // A stop in progress closes the stream on purpose
                if inner.epoch != epoch
                    || !matches!(inner.state, CaptureState::Recording | CaptureState::Paused)
                {
                    return;
                }
                let error = CaptureError::DeviceDisconnected(reason);
                inner.fail(error.clone());
                (error, inner.session_id)
            };

            error!("Recording aborted: {}", error);
            let _ = events.send(CaptureEvent::StateChanged {
                state: CaptureState::Error,
                session_id,
            });
            let _ = events.send(CaptureEvent::Failed { error });

            if let Err(e) = device.close().await {
                warn!("Failed to release disconnected audio input: {}", e);
            }
        })
    }
}

impl Drop for AudioCaptureController {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
        if let Some(handle) = self.pump.get_mut().take() {
            handle.abort();
        }
    }
}
