//! Core video record data types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Length class
// ============================================================================

/// Length class of a produced video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VideoLength {
    /// Roughly one minute, produced daily.
    Short,
    /// Five to ten minutes, produced weekly as part of a series.
    Long,
}

impl VideoLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoLength::Short => "short",
            VideoLength::Long => "long",
        }
    }
}

impl fmt::Display for VideoLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoLength {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "short" => Ok(VideoLength::Short),
            "long" => Ok(VideoLength::Long),
            other => Err(format!("unknown video length: {}", other)),
        }
    }
}

// ============================================================================
// Video record
// ============================================================================

/// Production metadata for one video.
///
/// Keyed by `optimized_title`: the record is registered under the title
/// returned by the metadata optimizer and that title is the sole identity
/// across records, statuses, operation handles and artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    /// Original, un-optimized title.
    pub title: String,
    /// Full narration script.
    pub script: String,
    /// Length class.
    pub length: VideoLength,
    /// Series playlist this video belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<String>,
    /// Calendar day (UTC) the video is scheduled for.
    pub scheduled_date: NaiveDate,
    /// User-facing title; the record key.
    pub optimized_title: String,
    pub optimized_description: String,
    /// Ordered tag sequence.
    #[serde(default)]
    pub optimized_tags: Vec<String>,
    pub optimized_category: String,
    /// Free-form upload slot suggestion (e.g. "Saturday at 2:00 PM EST").
    /// Its presence makes a completed video `Scheduled` instead of `Generated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_upload_time: Option<String>,
    /// Reference to the generated thumbnail image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl VideoRecord {
    /// The key this record is stored under.
    pub fn key(&self) -> &str {
        &self.optimized_title
    }
}

/// Partial update merged shallowly into an existing record.
///
/// `None` fields are left untouched. The key (`optimized_title`) and the
/// length class cannot be changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub script: Option<String>,
    pub playlist: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub optimized_description: Option<String>,
    pub optimized_tags: Option<Vec<String>>,
    pub optimized_category: Option<String>,
    pub suggested_upload_time: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl VideoUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }

    pub fn with_scheduled_date(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    pub fn with_suggested_upload_time(mut self, slot: impl Into<String>) -> Self {
        self.suggested_upload_time = Some(slot.into());
        self
    }

    /// Merge the set fields into `record`.
    pub fn apply(&self, record: &mut VideoRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(script) = &self.script {
            record.script = script.clone();
        }
        if let Some(playlist) = &self.playlist {
            record.playlist = Some(playlist.clone());
        }
        if let Some(date) = self.scheduled_date {
            record.scheduled_date = date;
        }
        if let Some(description) = &self.optimized_description {
            record.optimized_description = description.clone();
        }
        if let Some(tags) = &self.optimized_tags {
            record.optimized_tags = tags.clone();
        }
        if let Some(category) = &self.optimized_category {
            record.optimized_category = category.clone();
        }
        if let Some(slot) = &self.suggested_upload_time {
            record.suggested_upload_time = Some(slot.clone());
        }
        if let Some(url) = &self.thumbnail_url {
            record.thumbnail_url = Some(url.clone());
        }
    }
}

// ============================================================================
// Status
// ============================================================================

/// Lifecycle status of a video, stored separately from the record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    /// Registered but generation not started.
    Draft,
    /// External generation job in flight.
    Processing,
    /// Visual and narration ready; no upload slot suggested.
    Generated,
    /// Visual and narration ready; waiting for its suggested upload slot.
    Scheduled,
    /// Kickoff, generation or synthesis failed.
    Failed,
    /// Poll attempts exhausted while the job was still running.
    TimedOut,
    /// Operation handle expired while still processing.
    Lost,
    /// Uploaded.
    Published,
}

impl VideoStatus {
    pub const ALL: [VideoStatus; 8] = [
        VideoStatus::Draft,
        VideoStatus::Processing,
        VideoStatus::Generated,
        VideoStatus::Scheduled,
        VideoStatus::Failed,
        VideoStatus::TimedOut,
        VideoStatus::Lost,
        VideoStatus::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Draft => "draft",
            VideoStatus::Processing => "processing",
            VideoStatus::Generated => "generated",
            VideoStatus::Scheduled => "scheduled",
            VideoStatus::Failed => "failed",
            VideoStatus::TimedOut => "timed_out",
            VideoStatus::Lost => "lost",
            VideoStatus::Published => "published",
        }
    }

    /// Terminal failure states that the user can retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VideoStatus::Failed | VideoStatus::TimedOut | VideoStatus::Lost
        )
    }

    /// States from which the video can be uploaded.
    pub fn is_publishable(&self) -> bool {
        matches!(self, VideoStatus::Generated | VideoStatus::Scheduled)
    }

    /// Whether the state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: VideoStatus) -> bool {
        use VideoStatus::*;
        match (self, next) {
            (Draft, Processing) => true,
            (Processing, Generated | Scheduled | Failed | TimedOut | Lost) => true,
            (Failed | TimedOut | Lost, Processing) => true,
            (Generated | Scheduled, Published) => true,
            _ => false,
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Generated artifact
// ============================================================================

/// Output of a successful generation: the visual and its narration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub video_url: String,
    pub audio_url: String,
}
