//! Testing utilities and mock implementations.
//!
//! Provides a controllable implementation of every collaborator contract and
//! a manually driven clock, so the pipeline, poller and autopilot can be
//! exercised end to end without external services or real time.
//!
//! # Example
//!
//! ```rust,ignore
//! use reelpilot_core::testing::{fixtures, ManualClock, MockCollaborators, MockCall};
//!
//! let mock = MockCollaborators::new();
//! let clock = ManualClock::new(fixtures::friday_noon());
//!
//! mock.set_default_status(OperationStatus::completed("https://media.test/v.mp4")).await;
//! mock.fail(MockCall::Speech, "tts offline").await;
//!
//! let pipeline = VideoPipeline::new(config, videos, operations, mock.collaborators(), clock);
//! ```

mod clock;
mod mock_collaborators;

pub use clock::ManualClock;
pub use mock_collaborators::{MockCall, MockCollaborators};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use crate::video::{VideoLength, VideoRecord};

    /// Friday 2026-10-16 12:00 UTC. The week it falls in started on
    /// Sunday 2026-10-11.
    pub fn friday_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    /// Create a test record whose key is `title`.
    pub fn video_record(title: &str, length: VideoLength, scheduled_date: NaiveDate) -> VideoRecord {
        VideoRecord {
            title: title.to_string(),
            script: format!("{} explained. Short and sweet.", title),
            length,
            playlist: None,
            scheduled_date,
            optimized_title: title.to_string(),
            optimized_description: format!("Everything about {}", title),
            optimized_tags: vec!["test".to_string()],
            optimized_category: "28".to_string(),
            suggested_upload_time: None,
            thumbnail_url: None,
        }
    }

    /// Create a test record belonging to a playlist.
    pub fn series_record(
        title: &str,
        playlist: &str,
        length: VideoLength,
        scheduled_date: NaiveDate,
    ) -> VideoRecord {
        VideoRecord {
            playlist: Some(playlist.to_string()),
            ..video_record(title, length, scheduled_date)
        }
    }
}
