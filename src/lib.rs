pub mod ambient;
pub mod audio;
pub mod capture;
pub mod config;
pub mod focus;
pub mod http;
pub mod voice;

pub use ambient::{AmbientPlayer, AmbientSound};
pub use audio::{
    Artifact, ArtifactFormat, AudioInput, AudioInputConfig, AudioInputFactory, AudioSource,
    DeviceEvent, WavFileInput,
};
pub use capture::{
    AudioCaptureController, CaptureError, CaptureEvent, CaptureSnapshot, CaptureState,
    FinishedRecording,
};
pub use config::Config;
pub use focus::{
    FocusTimer, FocusTimerConfig, FocusTimerController, LogNotifier, Notifier, Permission, Phase,
    PhaseCompletion, StudyStats, TimerEvent, TimerSnapshot,
};
pub use http::{create_router, AppState};
pub use voice::{TranscriptionResult, TranscriptionUploader, UploadError, VoiceApiClient, VoiceNote};
