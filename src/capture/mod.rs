//! Voice-note recording
//!
//! `AudioCaptureController` owns one audio input at a time, accumulates the
//! chunks it delivers, tracks elapsed recording time and hands the finished
//! artifact to a `TranscriptionUploader`.

mod controller;
mod state;

pub use controller::{AudioCaptureController, ELAPSED_INTERVAL};
pub use state::{
    format_clock, CaptureError, CaptureEvent, CaptureSnapshot, CaptureState, FinishedRecording,
};
