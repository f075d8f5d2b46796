use serde::{Deserialize, Serialize};

/// Voice note as stored and transcribed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceNote {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub filename: String,
    /// Recording length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub transcription: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// ISO-8601 timestamp as sent by the backend; the offset may be absent
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
}

/// Result of uploading a recording: the transcribed note
pub type TranscriptionResult = VoiceNote;

/// Error body returned by the backend (`{"detail": ...}`)
///
/// `detail` is a string for handled errors and a list of objects for
/// validation failures.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
