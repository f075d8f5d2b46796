use chrono::{DateTime, Utc};
use serde::Serialize;

use super::backend::ArtifactFormat;

/// A finished recording ready for upload
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    /// Captured chunks concatenated in arrival order
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Seconds spent recording, pauses excluded
    pub elapsed_secs: u64,
    /// Number of chunks the artifact was assembled from
    pub chunk_count: usize,
    /// File name offered to the upload service
    pub suggested_name: String,
    pub mime: &'static str,
    pub finished_at: DateTime<Utc>,
}

impl Artifact {
    /// Concatenate chunks in the order given
    pub fn assemble(
        chunks: Vec<Vec<u8>>,
        elapsed_secs: u64,
        format: ArtifactFormat,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let chunk_count = chunks.len();
        let total: usize = chunks.iter().map(Vec::len).sum();

        let mut bytes = Vec::with_capacity(total);
        for chunk in chunks {
            bytes.extend_from_slice(&chunk);
        }

        Self {
            bytes,
            elapsed_secs,
            chunk_count,
            suggested_name: suggested_name(format, finished_at),
            mime: format.mime,
            finished_at,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// `recording_{unix_millis}.{ext}`
pub fn suggested_name(format: ArtifactFormat, at: DateTime<Utc>) -> String {
    format!("recording_{}.{}", at.timestamp_millis(), format.extension)
}
