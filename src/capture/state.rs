use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::audio::Artifact;
use crate::voice::{TranscriptionResult, UploadError};

/// Recording lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    Idle,
    Recording,
    Paused,
    /// Device released, artifact being assembled
    Finalizing,
    /// Last attempt failed; `acknowledge` returns to `Idle`
    Error,
}

/// Terminal failures of a recording attempt
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum CaptureError {
    #[error("audio input unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("recording is empty")]
    EmptyRecording,

    #[error("audio input disconnected: {0}")]
    DeviceDisconnected(String),
}

/// State changes published to observers
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    StateChanged {
        state: CaptureState,
        session_id: Option<Uuid>,
    },
    Elapsed {
        secs: u64,
    },
    ChunkReceived {
        index: usize,
        bytes: usize,
    },
    Finalized {
        bytes: usize,
        elapsed_secs: u64,
        suggested_name: String,
    },
    Failed {
        error: CaptureError,
    },
}

/// Point-in-time view of the recorder
#[derive(Debug, Clone, Serialize)]
pub struct CaptureSnapshot {
    pub state: CaptureState,
    pub session_id: Option<Uuid>,
    pub elapsed_secs: u64,
    /// Elapsed time as `M:SS`
    pub elapsed_display: String,
    pub chunk_count: usize,
    pub buffered_bytes: usize,
    pub last_error: Option<CaptureError>,
}

/// Outcome of a successful `stop`
///
/// The artifact is kept even when the upload fails so the caller can retry.
#[derive(Debug)]
pub struct FinishedRecording {
    pub artifact: Artifact,
    pub upload: Result<TranscriptionResult, UploadError>,
}

/// Format seconds as `M:SS`
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
