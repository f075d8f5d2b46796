use anyhow::{bail, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

use super::file::WavFileInput;

/// Delivered by an open input, in capture order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Encoded audio bytes
    Data(Vec<u8>),
    /// The device went away mid-capture
    Disconnected(String),
}

/// Container format of the bytes an input produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactFormat {
    /// File extension without the dot
    pub extension: &'static str,
    pub mime: &'static str,
}

impl ArtifactFormat {
    pub const WAV: ArtifactFormat = ArtifactFormat {
        extension: "wav",
        mime: "audio/wav",
    };

    pub const WEBM: ArtifactFormat = ArtifactFormat {
        extension: "webm",
        mime: "audio/webm",
    };
}

/// Configuration for audio inputs
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Amount of audio per delivered chunk in milliseconds
    pub chunk_interval_ms: u64,
    /// Deliver chunks at real-time pace rather than as fast as possible
    pub realtime: bool,
}

impl Default for AudioInputConfig {
    fn default() -> Self {
        Self {
            chunk_interval_ms: 1000, // 1s chunks
            realtime: true,
        }
    }
}

/// Audio input device
///
/// `open` acquires the device and `close` releases it; a controller holds at
/// most one open session per input.
#[async_trait::async_trait]
pub trait AudioInput: Send + Sync {
    /// Acquire the device and start delivering events
    async fn open(&mut self) -> Result<mpsc::Receiver<DeviceEvent>>;

    /// Suspend or resume delivery while keeping the device held
    async fn set_active(&mut self, active: bool) -> Result<()>;

    /// Release the device; no-op if not open
    async fn close(&mut self) -> Result<()>;

    /// Check if the device is currently held
    fn is_open(&self) -> bool;

    /// Get input name for logging
    fn name(&self) -> &str;

    /// Format of the delivered bytes
    fn format(&self) -> ArtifactFormat;
}

/// Audio source type
#[derive(Debug, Clone)]
pub enum AudioSource {
    /// Microphone input
    Microphone,
    /// WAV file replayed as if it were captured live
    File(PathBuf),
}

/// Audio input factory
pub struct AudioInputFactory;

impl AudioInputFactory {
    pub fn create(source: AudioSource, config: AudioInputConfig) -> Box<dyn AudioInput> {
        match source {
            AudioSource::Microphone => Box::new(UnsupportedInput),
            AudioSource::File(path) => Box::new(WavFileInput::new(path, config)),
        }
    }
}

/// Stand-in for platforms without a microphone backend; every `open` fails
#[derive(Debug, Default)]
pub struct UnsupportedInput;

#[async_trait::async_trait]
impl AudioInput for UnsupportedInput {
    async fn open(&mut self) -> Result<mpsc::Receiver<DeviceEvent>> {
        bail!("No microphone backend is available on this platform")
    }

    async fn set_active(&mut self, _active: bool) -> Result<()> {
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_open(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unsupported"
    }

    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::WEBM
    }
}
