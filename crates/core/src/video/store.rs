//! Video storage trait and types.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::{GeneratedArtifact, VideoLength, VideoRecord, VideoStatus, VideoUpdate};

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record under this key.
    #[error("video not found: {0}")]
    NotFound(String),

    /// The state machine does not allow this status change.
    #[error("cannot move video {key} from {from} to {to}")]
    InvalidTransition {
        key: String,
        from: VideoStatus,
        to: VideoStatus,
    },

    /// Backend failure (I/O, poisoned lock, ...).
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Filter for scanning records.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    /// Only records of this length class.
    pub length: Option<VideoLength>,
    /// Only records in this playlist.
    pub playlist: Option<String>,
    /// Only records scheduled on or after this date.
    pub scheduled_from: Option<NaiveDate>,
    /// Only records scheduled on or before this date.
    pub scheduled_to: Option<NaiveDate>,
}

impl VideoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, length: VideoLength) -> Self {
        self.length = Some(length);
        self
    }

    pub fn with_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.playlist = Some(playlist.into());
        self
    }

    /// Restrict to a single scheduled day.
    pub fn on(self, date: NaiveDate) -> Self {
        self.between(date, date)
    }

    /// Restrict to an inclusive scheduled date range.
    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.scheduled_from = Some(from);
        self.scheduled_to = Some(to);
        self
    }

    pub fn matches(&self, record: &VideoRecord) -> bool {
        if let Some(length) = self.length {
            if record.length != length {
                return false;
            }
        }
        if let Some(playlist) = &self.playlist {
            if record.playlist.as_deref() != Some(playlist.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.scheduled_from {
            if record.scheduled_date < from {
                return false;
            }
        }
        if let Some(to) = self.scheduled_to {
            if record.scheduled_date > to {
                return false;
            }
        }
        true
    }
}

/// Keyed storage for video records, their statuses and generated artifacts.
///
/// All maps share the record key (`optimized_title`). Status and artifact
/// writes are no-ops for keys that have no record.
pub trait VideoStore: Send + Sync {
    /// Register a record. Returns `false` (and changes nothing) if the key
    /// already exists.
    fn create(&self, record: VideoRecord) -> Result<bool, StoreError>;

    /// Shallow-merge `update` into an existing record. Returns `false` if the
    /// key is absent.
    fn update(&self, key: &str, update: &VideoUpdate) -> Result<bool, StoreError>;

    /// Get a record by key.
    fn get(&self, key: &str) -> Result<Option<VideoRecord>, StoreError>;

    /// All keys in registration order.
    fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Records matching the filter, in registration order.
    fn scan(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>, StoreError>;

    /// Overwrite the status of an existing record. Returns `false` if the key
    /// has no record.
    fn set_status(&self, key: &str, status: VideoStatus) -> Result<bool, StoreError>;

    /// Stored status, `None` if never set.
    fn status(&self, key: &str) -> Result<Option<VideoStatus>, StoreError>;

    /// Keys whose current status equals `status`.
    fn keys_with_status(&self, status: VideoStatus) -> Result<Vec<String>, StoreError>;

    /// Store the generated artifact for an existing record.
    fn put_artifact(&self, key: &str, artifact: GeneratedArtifact) -> Result<bool, StoreError>;

    /// Drop the generated artifact. Returns `false` if there was none.
    fn remove_artifact(&self, key: &str) -> Result<bool, StoreError>;

    /// Generated artifact, if the video completed.
    fn artifact(&self, key: &str) -> Result<Option<GeneratedArtifact>, StoreError>;

    /// Checked status change. Returns the previous status.
    ///
    /// A record without a stored status counts as `Draft`.
    fn transition(&self, key: &str, next: VideoStatus) -> Result<VideoStatus, StoreError> {
        if self.get(key)?.is_none() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let current = self.status(key)?.unwrap_or(VideoStatus::Draft);
        if !current.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                key: key.to_string(),
                from: current,
                to: next,
            });
        }
        self.set_status(key, next)?;
        Ok(current)
    }

    /// Records scheduled on `date`.
    fn videos_on(&self, date: NaiveDate) -> Result<Vec<VideoRecord>, StoreError> {
        self.scan(&VideoFilter::new().on(date))
    }

    /// Records belonging to `playlist`.
    fn videos_in_playlist(&self, playlist: &str) -> Result<Vec<VideoRecord>, StoreError> {
        self.scan(&VideoFilter::new().with_playlist(playlist))
    }

    /// Number of records in `playlist`.
    fn count_in_playlist(&self, playlist: &str) -> Result<usize, StoreError> {
        Ok(self.videos_in_playlist(playlist)?.len())
    }

    /// Distinct playlist names, sorted.
    fn playlists(&self) -> Result<Vec<String>, StoreError> {
        let names: BTreeSet<String> = self
            .scan(&VideoFilter::new())?
            .into_iter()
            .filter_map(|r| r.playlist)
            .collect();
        Ok(names.into_iter().collect())
    }
}
