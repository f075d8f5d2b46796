//! Client for the voice-note backend (upload, transcription, library)

pub mod client;
pub mod messages;

pub use client::{filter_notes, TranscriptionUploader, UploadError, VoiceApiClient, ALLOWED_EXTENSIONS};
pub use messages::{TranscriptionResult, VoiceNote};
