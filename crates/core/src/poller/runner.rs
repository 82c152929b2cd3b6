//! Status poller implementation.
//!
//! Each tick looks at every `Processing` video that is due, asks the
//! generation backend how its job is doing and moves the video on:
//! - job still running, handle not stored yet, or check failed: backoff
//! - job failed or finished without media: `Failed`
//! - handle expired: `Lost`
//! - job finished: narration, artifact, then `Generated` or `Scheduled`

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::collaborators::{Collaborators, OperationStatus, ThumbnailGenerator};
use crate::events::{EventHandle, PipelineEvent};
use crate::metrics::{POLL_OUTCOMES, THUMBNAILS};
use crate::operation::{OperationLookup, OperationTracker};
use crate::pipeline::{apply_transition, thumbnail_request};
use crate::video::{
    GeneratedArtifact, StoreError, VideoRecord, VideoStatus, VideoStore, VideoUpdate,
};

use super::backoff::{backoff_delay, PollSchedule};
use super::config::PollerConfig;

/// What happened to one video during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollOutcome {
    /// Job still running.
    Pending,
    /// Handle not stored yet.
    Missing,
    /// Status check failed; retried later.
    CheckFailed,
    Generated,
    Scheduled,
    Failed,
    Lost,
    TimedOut,
    /// The video changed underneath the poll; nothing applied.
    Skipped,
}

impl PollOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollOutcome::Pending => "pending",
            PollOutcome::Missing => "missing",
            PollOutcome::CheckFailed => "check_failed",
            PollOutcome::Generated => "generated",
            PollOutcome::Scheduled => "scheduled",
            PollOutcome::Failed => "failed",
            PollOutcome::Lost => "lost",
            PollOutcome::TimedOut => "timed_out",
            PollOutcome::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickSummary {
    /// `Processing` videos seen, due or not.
    pub processing: usize,
    /// Outcome per polled video.
    pub outcomes: Vec<(String, PollOutcome)>,
}

impl TickSummary {
    pub fn polled(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcome(&self, key: &str) -> Option<PollOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, outcome)| *outcome)
    }

    pub fn count(&self, outcome: PollOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Advances `Processing` videos by polling their generation jobs.
#[derive(Clone)]
pub struct StatusPoller {
    config: PollerConfig,
    videos: Arc<dyn VideoStore>,
    operations: Arc<dyn OperationTracker>,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    events: Option<EventHandle>,

    // Runtime state
    schedules: Arc<Mutex<HashMap<String, PollSchedule>>>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl StatusPoller {
    pub fn new(
        config: PollerConfig,
        videos: Arc<dyn VideoStore>,
        operations: Arc<dyn OperationTracker>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            videos,
            operations,
            collaborators,
            clock,
            events: None,
            schedules: Arc::new(Mutex::new(HashMap::new())),
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Current poll schedule of a video, if it has been polled unfinished.
    pub async fn schedule(&self, key: &str) -> Option<PollSchedule> {
        self.schedules.lock().await.get(key).cloned()
    }

    /// Start the background poll loop.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Status poller already running");
            return;
        }

        info!(
            interval_ms = self.config.tick_interval_ms,
            "Starting status poller"
        );

        let poller = self.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let interval = Duration::from_millis(self.config.tick_interval_ms);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Status poller received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !poller.running.load(Ordering::Relaxed) {
                            break;
                        }
                        match poller.tick().await {
                            Ok(summary) if summary.polled() > 0 => {
                                debug!(
                                    processing = summary.processing,
                                    polled = summary.polled(),
                                    "Poll tick finished"
                                );
                            }
                            Ok(_) => {}
                            Err(e) => error!("Poll tick failed: {}", e),
                        }
                    }
                }
            }
        });
    }

    /// Stop the background poll loop.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Status poller not running");
            return;
        }

        info!("Stopping status poller");
        let _ = self.shutdown_tx.send(());
    }

    /// Poll every due `Processing` video once.
    pub async fn tick(&self) -> Result<TickSummary, StoreError> {
        let processing = self.videos.keys_with_status(VideoStatus::Processing)?;
        let now = self.clock.now();

        let due: Vec<String> = {
            let mut schedules = self.schedules.lock().await;
            schedules.retain(|key, _| processing.contains(key));
            processing
                .iter()
                .filter(|key| schedules.get(*key).map_or(true, |s| s.is_due(now)))
                .cloned()
                .collect()
        };

        let outcomes: Vec<(String, PollOutcome)> = stream::iter(due)
            .map(|key| async move {
                let outcome = match self.poll_one(&key).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(key = %key, error = %e, "Poll skipped");
                        PollOutcome::Skipped
                    }
                };
                POLL_OUTCOMES.with_label_values(&[outcome.as_str()]).inc();
                (key, outcome)
            })
            .buffer_unordered(self.config.max_concurrent_polls.max(1))
            .collect()
            .await;

        Ok(TickSummary {
            processing: processing.len(),
            outcomes,
        })
    }

    async fn poll_one(&self, key: &str) -> Result<PollOutcome, StoreError> {
        let handle = match self.operations.lookup(key)? {
            OperationLookup::Active(handle) => handle,
            OperationLookup::Expired(handle) => {
                warn!(key = %key, since = %handle.created_at, "Operation handle expired");
                return self
                    .finish(key, VideoStatus::Lost, "operation handle expired".to_string())
                    .await;
            }
            OperationLookup::Missing => {
                debug!(key = %key, "No operation handle yet");
                return self.record_attempt(key, PollOutcome::Missing).await;
            }
        };

        let status = match self
            .collaborators
            .status_check
            .check(&handle.reference)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                warn!(key = %key, error = %e, "Operation status check failed");
                return self.record_attempt(key, PollOutcome::CheckFailed).await;
            }
        };

        match status {
            OperationStatus { done: false, .. } => {
                debug!(key = %key, "Generation still running");
                self.record_attempt(key, PollOutcome::Pending).await
            }
            OperationStatus {
                error: Some(error), ..
            } => {
                self.finish(key, VideoStatus::Failed, format!("generation failed: {}", error))
                    .await
            }
            OperationStatus { media_url, .. } => match media_url.filter(|u| !u.trim().is_empty()) {
                Some(video_url) => self.complete(key, video_url).await,
                None => {
                    self.finish(
                        key,
                        VideoStatus::Failed,
                        "generation finished without a media reference".to_string(),
                    )
                    .await
                }
            },
        }
    }

    /// Narrate, store the artifact and move the video out of `Processing`.
    async fn complete(&self, key: &str, video_url: String) -> Result<PollOutcome, StoreError> {
        let Some(record) = self.videos.get(key)? else {
            return Ok(PollOutcome::Skipped);
        };

        let audio_url = match self.collaborators.speech.synthesize(&record.script).await {
            Ok(url) => url,
            Err(e) => {
                return self
                    .finish(key, VideoStatus::Failed, format!("narration failed: {}", e))
                    .await;
            }
        };

        self.videos.put_artifact(
            key,
            GeneratedArtifact {
                video_url,
                audio_url,
            },
        )?;

        let next = if record.suggested_upload_time.is_some() {
            VideoStatus::Scheduled
        } else {
            VideoStatus::Generated
        };
        let outcome = match self
            .finish(key, next, "generation finished".to_string())
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                let _ = self.videos.remove_artifact(key);
                return Err(e);
            }
        };

        // An artifact only exists for a completed video.
        if outcome == PollOutcome::Skipped {
            self.videos.remove_artifact(key)?;
            return Ok(outcome);
        }

        if outcome == PollOutcome::Scheduled {
            self.spawn_thumbnail(key.to_string(), record);
        }
        Ok(outcome)
    }

    /// Count an unfinished poll; times the video out once attempts run out.
    async fn record_attempt(
        &self,
        key: &str,
        outcome: PollOutcome,
    ) -> Result<PollOutcome, StoreError> {
        let attempts = {
            let mut schedules = self.schedules.lock().await;
            let now = self.clock.now();
            let schedule = schedules.entry(key.to_string()).or_insert(PollSchedule {
                attempts: 0,
                next_poll_at: now,
            });
            schedule.attempts += 1;
            schedule.next_poll_at = now + backoff_delay(&self.config, schedule.attempts);
            schedule.attempts
        };

        if attempts >= self.config.max_attempts {
            return self
                .finish(
                    key,
                    VideoStatus::TimedOut,
                    format!("no result after {} polls", attempts),
                )
                .await;
        }
        Ok(outcome)
    }

    /// Apply a terminal transition and drop everything tracked for the video.
    async fn finish(
        &self,
        key: &str,
        next: VideoStatus,
        reason: String,
    ) -> Result<PollOutcome, StoreError> {
        self.operations.remove(key)?;
        self.schedules.lock().await.remove(key);

        match apply_transition(
            self.videos.as_ref(),
            self.events.as_ref(),
            key,
            next,
            Some(reason),
        ) {
            Ok(_) => Ok(match next {
                VideoStatus::Generated => PollOutcome::Generated,
                VideoStatus::Scheduled => PollOutcome::Scheduled,
                VideoStatus::Failed => PollOutcome::Failed,
                VideoStatus::Lost => PollOutcome::Lost,
                VideoStatus::TimedOut => PollOutcome::TimedOut,
                _ => PollOutcome::Skipped,
            }),
            Err(StoreError::InvalidTransition { from, .. }) => {
                warn!(key = %key, from = %from, to = %next, "Video left processing during poll");
                Ok(PollOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    /// Generate a thumbnail without holding up the transition.
    fn spawn_thumbnail(&self, key: String, record: VideoRecord) {
        let thumbnails: Arc<dyn ThumbnailGenerator> = Arc::clone(&self.collaborators.thumbnails);
        let videos = Arc::clone(&self.videos);
        let events = self.events.clone();

        tokio::spawn(async move {
            match thumbnails.generate_thumbnail(&thumbnail_request(&record)).await {
                Ok(url) => {
                    THUMBNAILS.with_label_values(&["success"]).inc();
                    if let Err(e) = videos.update(&key, &VideoUpdate::new().with_thumbnail(url.clone())) {
                        warn!(key = %key, error = %e, "Failed to store thumbnail");
                    }
                    info!(key = %key, "Thumbnail ready");
                    if let Some(events) = events {
                        events.emit(PipelineEvent::ThumbnailReady { key, url });
                    }
                }
                Err(e) => {
                    THUMBNAILS.with_label_values(&["failure"]).inc();
                    warn!(key = %key, error = %e, "Thumbnail generation failed");
                    if let Some(events) = events {
                        events.emit(PipelineEvent::ThumbnailFailed {
                            key,
                            error: e.to_string(),
                        });
                    }
                }
            }
        });
    }
}
