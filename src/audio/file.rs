use anyhow::{bail, Context, Result};
use hound::WavReader;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::backend::{ArtifactFormat, AudioInput, AudioInputConfig, DeviceEvent};

/// Replays a WAV file as a live capture
///
/// The file's raw bytes (header included) are delivered in blocks holding
/// `chunk_interval_ms` of audio, so concatenating every delivered chunk
/// reproduces the file exactly.
pub struct WavFileInput {
    path: PathBuf,
    config: AudioInputConfig,
    active: Option<watch::Sender<bool>>,
    producer: Option<JoinHandle<()>>,
}

impl WavFileInput {
    pub fn new(path: impl Into<PathBuf>, config: AudioInputConfig) -> Self {
        Self {
            path: path.into(),
            config,
            active: None,
            producer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes per delivered block for a WAV with the given layout
    pub fn block_size(spec: hound::WavSpec, chunk_interval_ms: u64) -> usize {
        let byte_rate = spec.sample_rate as u64
            * spec.channels as u64
            * (spec.bits_per_sample as u64).div_ceil(8);
        (byte_rate * chunk_interval_ms / 1000).max(1) as usize
    }
}

#[async_trait::async_trait]
impl AudioInput for WavFileInput {
    async fn open(&mut self) -> Result<mpsc::Receiver<DeviceEvent>> {
        if self.producer.is_some() {
            bail!("{} is already open", self.path.display());
        }

        info!("Opening audio file input: {}", self.path.display());

        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read WAV file: {}", self.path.display()))?;

        let spec = WavReader::new(Cursor::new(bytes.as_slice()))
            .with_context(|| format!("Invalid WAV file: {}", self.path.display()))?
            .spec();

        let block_size = Self::block_size(spec, self.config.chunk_interval_ms);
        let pace = self
            .config
            .realtime
            .then(|| Duration::from_millis(self.config.chunk_interval_ms.max(1)));

        info!(
            "Audio file input ready: {}Hz, {} channels, {} bytes in {}-byte blocks",
            spec.sample_rate,
            spec.channels,
            bytes.len(),
            block_size
        );

        let (tx, rx) = mpsc::channel(64);
        let (active_tx, mut active_rx) = watch::channel(true);

        let producer = tokio::spawn(async move {
            let mut interval = pace.map(tokio::time::interval);

            for block in bytes.chunks(block_size) {
                if active_rx.wait_for(|active| *active).await.is_err() {
                    return;
                }
                if let Some(interval) = interval.as_mut() {
                    interval.tick().await;
                }
                if tx.send(DeviceEvent::Data(block.to_vec())).await.is_err() {
                    return;
                }
            }

            debug!("Audio file input exhausted, holding stream open");
            tx.closed().await;
        });

        self.active = Some(active_tx);
        self.producer = Some(producer);

        Ok(rx)
    }

    async fn set_active(&mut self, active: bool) -> Result<()> {
        match &self.active {
            Some(sender) => {
                sender.send_replace(active);
                Ok(())
            }
            None => bail!("{} is not open", self.path.display()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.active = None;
        if let Some(producer) = self.producer.take() {
            producer.abort();
            info!("Closed audio file input: {}", self.path.display());
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.producer.is_some()
    }

    fn name(&self) -> &str {
        "wav-file"
    }

    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::WAV
    }
}

impl Drop for WavFileInput {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            warn!("Audio file input dropped while open: {}", self.path.display());
            producer.abort();
        }
    }
}
