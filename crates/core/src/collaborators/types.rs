//! Request and response types exchanged with external collaborators.

use serde::{Deserialize, Serialize};

use crate::video::VideoLength;

/// Input for script generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptRequest {
    /// Topic hint; the generator picks a trending one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub length: VideoLength,
    /// Title to use verbatim, if the caller already has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Reference video whose tone and structure should inspire the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspiration_url: Option<String>,
}

/// A generated script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedScript {
    pub script: String,
    pub title: String,
    /// The concrete topic chosen (resolves generic prompts).
    pub topic: String,
}

/// Input for metadata optimization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub script: String,
}

/// Optimized upload metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizedMetadata {
    pub optimized_title: String,
    pub optimized_description: String,
    #[serde(default)]
    pub optimized_tags: Vec<String>,
    pub optimized_category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_upload_time: Option<String>,
}

/// Input for starting a visual generation job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KickoffRequest {
    pub script: String,
    /// Record key the job belongs to.
    pub title: String,
    /// Short prompt derived from the script.
    pub prompt: String,
    pub duration_secs: u32,
    pub aspect_ratio: String,
}

/// Status of an external generation job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OperationStatus {
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Produced visual, when the job finished successfully.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

impl OperationStatus {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn completed(media_url: impl Into<String>) -> Self {
        Self {
            done: true,
            error: None,
            media_url: Some(media_url.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            done: true,
            error: Some(error.into()),
            media_url: None,
        }
    }
}

/// Input for thumbnail generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThumbnailRequest {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Title, used to tell parts of a series apart.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// What series to produce next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesSuggestion {
    pub topic: String,
    pub playlist: String,
    pub is_new_series: bool,
}

/// Credentials for the upload target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadCredentials {
    pub api_key: String,
    pub channel_id: String,
}

/// Everything the uploader needs for one video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadRequest {
    pub credentials: UploadCredentials,
    pub video_url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
}
