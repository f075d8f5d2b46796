use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info};

use super::messages::{ErrorBody, TranscriptionResult, VoiceNote};

/// File extensions the voice-note service accepts
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["mp3", "wav", "m4a", "ogg", "webm"];

#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum UploadError {
    #[error("cannot reach the voice-note service: {0}")]
    Network(String),

    #[error("voice-note service returned {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("unsupported audio format '{0}' (allowed: .mp3, .wav, .m4a, .ogg, .webm)")]
    UnsupportedFormat(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Upload collaborator for finished recordings
#[async_trait::async_trait]
pub trait TranscriptionUploader: Send + Sync {
    /// Upload a recording and wait for its transcription
    async fn upload_artifact(
        &self,
        bytes: &[u8],
        suggested_name: &str,
    ) -> Result<TranscriptionResult, UploadError>;
}

/// REST client for the voice-note backend
#[derive(Clone)]
pub struct VoiceApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl VoiceApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("Voice-note service at {}", base_url);

        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload an audio file from disk
    pub async fn upload_file(&self, path: &Path) -> Result<TranscriptionResult, UploadError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadError::UnsupportedFormat(format!(".{}", extension)));
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| UploadError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("recording")
            .to_string();

        self.upload_artifact(&bytes, &name).await
    }

    /// Fetch the caller's voice-note library
    pub async fn library(
        &self,
        query: Option<&str>,
        subject: Option<&str>,
    ) -> Result<Vec<VoiceNote>, UploadError> {
        let mut params = Vec::new();
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            params.push(("query", query));
        }
        if let Some(subject) = subject.filter(|s| !s.is_empty()) {
            params.push(("subject", subject));
        }

        let mut request = self
            .client
            .get(format!("{}/api/voice/library", self.base_url))
            .query(&params);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, UploadError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = server_detail(status, &body);
            error!("Voice-note service error {}: {}", status, detail);
            return Err(UploadError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<T>().await.map_err(|e| UploadError::Server {
            status: status.as_u16(),
            detail: format!("invalid response body: {}", e),
        })
    }
}

#[async_trait::async_trait]
impl TranscriptionUploader for VoiceApiClient {
    async fn upload_artifact(
        &self,
        bytes: &[u8],
        suggested_name: &str,
    ) -> Result<TranscriptionResult, UploadError> {
        info!(
            "Uploading recording {} ({} bytes)",
            suggested_name,
            bytes.len()
        );

        let form = Form::new().part("file", file_part(bytes, suggested_name)?);

        let mut request = self
            .client
            .post(format!("{}/api/voice/upload", self.base_url))
            .multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let note: VoiceNote = Self::parse(response).await?;

        info!("Upload transcribed as voice note {}", note.id);
        debug!("Transcription: {:?}", note.transcription);

        Ok(note)
    }
}

/// Keep notes whose transcription or summary contains `query`, ignoring case
pub fn filter_notes(notes: &[VoiceNote], query: &str) -> Vec<VoiceNote> {
    if query.trim().is_empty() {
        return notes.to_vec();
    }

    let needle = query.to_lowercase();
    let matches = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(&needle))
    };

    notes
        .iter()
        .filter(|note| matches(&note.transcription) || matches(&note.summary))
        .cloned()
        .collect()
}

/// Multipart `file` field carrying the recording under its suggested name
fn file_part(bytes: &[u8], name: &str) -> Result<Part, UploadError> {
    let mime = mime_for(name);
    Part::bytes(bytes.to_vec())
        .file_name(name.to_string())
        .mime_str(mime)
        .map_err(|_| UploadError::UnsupportedFormat(mime.to_string()))
}

fn mime_for(name: &str) -> &'static str {
    match name.rsplit('.').next().map(str::to_lowercase).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("ogg") => "audio/ogg",
        Some("webm") => "audio/webm",
        _ => "application/octet-stream",
    }
}

fn server_detail(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.to_string()
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_part_builds_for_every_extension() {
        for ext in ALLOWED_EXTENSIONS.iter().chain(["bin"].iter()) {
            let name = format!("recording.{}", ext);
            assert!(file_part(b"audio", &name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_mime_for_ignores_case() {
        assert_eq!(mime_for("Lecture.WAV"), "audio/wav");
        assert_eq!(mime_for("memo.M4A"), "audio/mp4");
        assert_eq!(mime_for("no_extension"), "application/octet-stream");
    }
}
