//! HTTP API for the study page and voice-note recorder
//!
//! This module exposes both controllers to a presentation layer:
//! - POST /focus/start, /focus/pause, /focus/reset - Drive the focus timer
//! - GET /focus/status, /focus/events - Timer snapshot and SSE event stream
//! - POST /voice/record/{start,pause,resume,stop,acknowledge} - Drive the recorder
//! - GET /voice/status, /voice/events - Recorder snapshot and SSE event stream
//! - GET /voice/library - Voice notes from the backend, filtered by `query`
//! - GET /ambient, POST /ambient/{sound,volume,toggle} - Soundscape state
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
