//! Types for the production pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collaborators::CollaboratorError;
use crate::video::{StoreError, VideoLength, VideoStatus};

/// Errors returned by pipeline actions.
///
/// Failures after a record is registered are absorbed into its status and
/// never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Script generation failed; no record was created.
    #[error("script generation failed: {0}")]
    ScriptGeneration(CollaboratorError),

    /// Metadata optimization failed; no record was created.
    #[error("metadata optimization failed: {0}")]
    Optimization(CollaboratorError),

    /// Series strategy lookup failed; nothing was produced.
    #[error("series strategy failed: {0}")]
    SeriesStrategy(CollaboratorError),

    /// Upload failed; the status is unchanged.
    #[error("upload failed: {0}")]
    Upload(CollaboratorError),

    /// Thumbnail generation failed.
    #[error("thumbnail generation failed: {0}")]
    Thumbnail(CollaboratorError),

    /// No uploader credentials configured.
    #[error("upload credentials not configured")]
    UploadNotConfigured,

    /// Video not found.
    #[error("video not found: {0}")]
    NotFound(String),

    /// Operation not allowed in the current status.
    #[error("cannot {operation} video {key}: current status is {status}")]
    InvalidState {
        key: String,
        status: VideoStatus,
        operation: &'static str,
    },

    /// The stored record has no script to regenerate from.
    #[error("video {0} has no stored script")]
    MissingScript(String),

    /// Another publish of the same video is uploading.
    #[error("video {0} is already being published")]
    PublishInProgress(String),

    /// The video has no generated artifact to upload.
    #[error("video {0} has no generated artifact")]
    MissingArtifact(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Parameters of one production run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProduceRequest {
    pub length: VideoLength,
    #[serde(default)]
    pub playlist: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub inspiration_url: Option<String>,
    /// Use this script verbatim instead of generating one.
    #[serde(default)]
    pub script: Option<String>,
}

impl ProduceRequest {
    pub fn new(length: VideoLength) -> Self {
        Self {
            length,
            playlist: None,
            topic: None,
            title: None,
            inspiration_url: None,
            script: None,
        }
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_inspiration(mut self, url: impl Into<String>) -> Self {
        self.inspiration_url = Some(url.into());
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::InvalidState {
            key: "My Video".to_string(),
            status: VideoStatus::Generated,
            operation: "retry",
        };
        assert_eq!(
            err.to_string(),
            "cannot retry video My Video: current status is generated"
        );
    }

    #[test]
    fn test_produce_request_deserialize_minimal() {
        let request: ProduceRequest = serde_json::from_str(r#"{"length":"long"}"#).unwrap();
        assert_eq!(request, ProduceRequest::new(VideoLength::Long));
    }
}
