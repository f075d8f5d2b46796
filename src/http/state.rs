use crate::ambient::AmbientPlayer;
use crate::capture::AudioCaptureController;
use crate::focus::FocusTimerController;
use crate::voice::VoiceApiClient;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub focus: Arc<FocusTimerController>,
    pub capture: Arc<AudioCaptureController>,
    pub ambient: Arc<RwLock<AmbientPlayer>>,
    /// Voice-note backend (library queries)
    pub voice: Arc<VoiceApiClient>,
}

impl AppState {
    pub fn new(
        focus: FocusTimerController,
        capture: AudioCaptureController,
        ambient: AmbientPlayer,
        voice: VoiceApiClient,
    ) -> Self {
        Self {
            focus: Arc::new(focus),
            capture: Arc::new(capture),
            ambient: Arc::new(RwLock::new(ambient)),
            voice: Arc::new(voice),
        }
    }
}
