use super::state::AppState;
use crate::ambient::{AmbientPlayer, AmbientSound};
use crate::capture::{CaptureError, CaptureSnapshot};
use crate::focus::TimerSnapshot;
use crate::voice::{filter_notes, UploadError, VoiceNote};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub status: String,
    pub message: String,
    /// Absent when nothing was recording
    pub suggested_name: Option<String>,
    pub bytes: usize,
    pub elapsed_secs: u64,
    pub note: Option<VoiceNote>,
    pub upload_error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryQuery {
    pub query: Option<String>,
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectSoundRequest {
    pub sound: String,
}

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: u8,
}

#[derive(Debug, Serialize)]
pub struct SoundInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub stream_id: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AmbientResponse {
    pub player: AmbientPlayer,
    pub sounds: Vec<SoundInfo>,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn capture_error_response(error: CaptureError) -> Response {
    let status = match error {
        CaptureError::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        CaptureError::EmptyRecording => StatusCode::UNPROCESSABLE_ENTITY,
        CaptureError::DeviceDisconnected(_) => StatusCode::CONFLICT,
    };
    error_response(status, error)
}

/// SSE stream of every event sent on `rx` after subscription
fn event_stream<T>(
    rx: broadcast::Receiver<T>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    T: Serialize + Clone + Send + 'static,
{
    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let event = Event::default()
                        .json_data(&event)
                        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
                    return Some((Ok(event), rx));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

// ============================================================================
// Focus timer
// ============================================================================

/// POST /focus/start
pub async fn focus_start(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.focus.start().await;
    Json(state.focus.snapshot().await)
}

/// POST /focus/pause
pub async fn focus_pause(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.focus.pause().await;
    Json(state.focus.snapshot().await)
}

/// POST /focus/reset
pub async fn focus_reset(State(state): State<AppState>) -> Json<TimerSnapshot> {
    state.focus.reset().await;
    Json(state.focus.snapshot().await)
}

/// GET /focus/status
pub async fn focus_status(State(state): State<AppState>) -> Json<TimerSnapshot> {
    Json(state.focus.snapshot().await)
}

/// GET /focus/events
pub async fn focus_events(State(state): State<AppState>) -> impl IntoResponse {
    event_stream(state.focus.subscribe())
}

// ============================================================================
// Voice recorder
// ============================================================================

/// POST /voice/record/start
pub async fn record_start(State(state): State<AppState>) -> Response {
    match state.capture.request_start().await {
        Ok(()) => (StatusCode::OK, Json(state.capture.snapshot().await)).into_response(),
        Err(e) => {
            error!("Failed to start recording: {}", e);
            capture_error_response(e)
        }
    }
}

/// POST /voice/record/pause
pub async fn record_pause(State(state): State<AppState>) -> Response {
    if state.capture.pause().await {
        return (StatusCode::OK, Json(state.capture.snapshot().await)).into_response();
    }
    let current = state.capture.state().await;
    error_response(
        StatusCode::CONFLICT,
        format!("Cannot pause while {:?}", current),
    )
}

/// POST /voice/record/resume
pub async fn record_resume(State(state): State<AppState>) -> Response {
    if state.capture.resume().await {
        return (StatusCode::OK, Json(state.capture.snapshot().await)).into_response();
    }
    let current = state.capture.state().await;
    error_response(
        StatusCode::CONFLICT,
        format!("Cannot resume while {:?}", current),
    )
}

/// POST /voice/record/stop
/// Stop recording and upload the result for transcription
pub async fn record_stop(State(state): State<AppState>) -> Response {
    match state.capture.stop().await {
        Ok(None) => (
            StatusCode::OK,
            Json(StopRecordingResponse {
                status: "idle".to_string(),
                message: "Not recording".to_string(),
                suggested_name: None,
                bytes: 0,
                elapsed_secs: 0,
                note: None,
                upload_error: None,
            }),
        )
            .into_response(),
        Ok(Some(finished)) => {
            let artifact = finished.artifact;
            let (status, message, note, upload_error) = match finished.upload {
                Ok(note) => {
                    info!("Recording transcribed: {}", artifact.suggested_name);
                    (
                        StatusCode::OK,
                        "Recording uploaded and transcribed".to_string(),
                        Some(note),
                        None,
                    )
                }
                Err(e) => (
                    StatusCode::BAD_GATEWAY,
                    format!("Upload failed: {}", e),
                    None,
                    Some(e),
                ),
            };

            (
                status,
                Json(StopRecordingResponse {
                    status: "stopped".to_string(),
                    message,
                    suggested_name: Some(artifact.suggested_name.clone()),
                    bytes: artifact.len(),
                    elapsed_secs: artifact.elapsed_secs,
                    note,
                    upload_error,
                }),
            )
                .into_response()
        }
        Err(e) => capture_error_response(e),
    }
}

/// POST /voice/record/acknowledge
pub async fn record_acknowledge(State(state): State<AppState>) -> Json<CaptureSnapshot> {
    state.capture.acknowledge().await;
    Json(state.capture.snapshot().await)
}

/// GET /voice/status
pub async fn voice_status(State(state): State<AppState>) -> Json<CaptureSnapshot> {
    Json(state.capture.snapshot().await)
}

/// GET /voice/events
pub async fn voice_events(State(state): State<AppState>) -> impl IntoResponse {
    event_stream(state.capture.subscribe())
}

/// GET /voice/library?query=&subject=
pub async fn voice_library(
    State(state): State<AppState>,
    Query(params): Query<LibraryQuery>,
) -> Response {
    match state.voice.library(None, params.subject.as_deref()).await {
        Ok(notes) => {
            let query = params.query.unwrap_or_default();
            (StatusCode::OK, Json(filter_notes(&notes, &query))).into_response()
        }
        Err(e) => {
            error!("Failed to fetch voice-note library: {}", e);
            error_response(StatusCode::BAD_GATEWAY, e)
        }
    }
}

// ============================================================================
// Ambient soundscape
// ============================================================================

async fn ambient_response(state: &AppState) -> Json<AmbientResponse> {
    let player = *state.ambient.read().await;
    Json(AmbientResponse {
        player,
        sounds: AmbientSound::ALL
            .iter()
            .map(|sound| SoundInfo {
                id: sound.id(),
                name: sound.name(),
                description: sound.description(),
                stream_id: sound.stream_id(),
            })
            .collect(),
    })
}

/// GET /ambient
pub async fn ambient_status(State(state): State<AppState>) -> Json<AmbientResponse> {
    ambient_response(&state).await
}

/// POST /ambient/sound
pub async fn ambient_select(
    State(state): State<AppState>,
    Json(req): Json<SelectSoundRequest>,
) -> Response {
    let sound: AmbientSound = match req.sound.parse() {
        Ok(sound) => sound,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    state.ambient.write().await.select(sound);
    info!("Ambient sound: {}", sound.name());

    ambient_response(&state).await.into_response()
}

/// POST /ambient/volume
pub async fn ambient_volume(
    State(state): State<AppState>,
    Json(req): Json<VolumeRequest>,
) -> Json<AmbientResponse> {
    state.ambient.write().await.set_volume(req.volume);
    ambient_response(&state).await
}

/// POST /ambient/toggle
pub async fn ambient_toggle(State(state): State<AppState>) -> Json<AmbientResponse> {
    let playing = state.ambient.write().await.toggle();
    info!("Ambient playback: {}", if playing { "on" } else { "off" });
    ambient_response(&state).await
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
