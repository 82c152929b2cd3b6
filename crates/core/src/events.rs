//! Pipeline events.
//!
//! Components report lifecycle changes and background task outcomes through
//! an [`EventHandle`]. Any number of observers can subscribe; emitting never
//! blocks and never fails the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

use crate::video::{VideoLength, VideoStatus};

/// Something observable that happened in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// A record was registered by a production run.
    VideoRegistered { key: String, length: VideoLength },
    /// A record changed status.
    StatusChanged {
        key: String,
        from: VideoStatus,
        to: VideoStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Background thumbnail generation finished.
    ThumbnailReady { key: String, url: String },
    /// Background thumbnail generation failed; the record status is unchanged.
    ThumbnailFailed { key: String, error: String },
    /// An autopilot run finished.
    AutopilotRun {
        length: VideoLength,
        deficit: usize,
        produced: Vec<String>,
    },
}

/// Event with its emission time.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineEventEnvelope {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: PipelineEvent,
}

/// Handle for emitting pipeline events.
///
/// Cheaply cloneable; all clones feed the same channel.
#[derive(Clone)]
pub struct EventHandle {
    tx: broadcast::Sender<PipelineEventEnvelope>,
}

impl EventHandle {
    /// Create a channel retaining up to `capacity` undelivered events per
    /// subscriber. Slow subscribers lose the oldest events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEventEnvelope> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PipelineEvent) {
        let envelope = PipelineEventEnvelope {
            timestamp: Utc::now(),
            event,
        };
        // No subscribers is fine.
        if self.tx.send(envelope).is_err() {
            trace!("Pipeline event dropped, no subscribers");
        }
    }
}

impl Default for EventHandle {
    fn default() -> Self {
        Self::new(256)
    }
}
