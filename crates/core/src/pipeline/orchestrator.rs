//! Production run orchestration.
//!
//! A run goes script → metadata optimization → registration → kickoff,
//! strictly in that order. Nothing is registered until the optimized title
//! (the record key) is known, so two concurrent runs cannot race on a key
//! neither has registered yet.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::collaborators::{
    Collaborators, GeneratedScript, KickoffRequest, OptimizationRequest, ScriptRequest,
    UploadCredentials, UploadRequest,
};
use crate::events::{EventHandle, PipelineEvent};
use crate::metrics::{PRODUCTION_DURATION, PRODUCTION_RUNS, RETRIES, UPLOADS};
use crate::operation::OperationTracker;
use crate::video::{StoreError, VideoRecord, VideoStatus, VideoStore, VideoUpdate};

use super::config::PipelineConfig;
use super::prompt::{first_sentence, thumbnail_request};
use super::types::{PipelineError, ProduceRequest};

const UNTITLED: &str = "Untitled";
const CUSTOM_SCRIPT_TOPIC: &str = "Custom Script";
const NO_DESCRIPTION: &str = "No description available.";

/// Apply a checked status change and report it.
pub(crate) fn apply_transition(
    videos: &dyn VideoStore,
    events: Option<&EventHandle>,
    key: &str,
    next: VideoStatus,
    reason: Option<String>,
) -> Result<VideoStatus, StoreError> {
    let from = videos.transition(key, next)?;
    crate::metrics::STATUS_TRANSITIONS
        .with_label_values(&[next.as_str()])
        .inc();
    info!(key = %key, from = %from, to = %next, "Video status changed");
    if let Some(events) = events {
        events.emit(PipelineEvent::StatusChanged {
            key: key.to_string(),
            from,
            to: next,
            reason,
        });
    }
    Ok(from)
}

/// Drives production runs and the user-triggered actions on a video.
pub struct VideoPipeline {
    config: PipelineConfig,
    videos: Arc<dyn VideoStore>,
    operations: Arc<dyn OperationTracker>,
    collaborators: Collaborators,
    clock: Arc<dyn Clock>,
    events: Option<EventHandle>,
    upload_credentials: Option<UploadCredentials>,
    /// Keys with an upload in flight.
    publishing: Mutex<HashSet<String>>,
}

/// Exclusive right to publish one video, released on drop.
struct PublishClaim<'a> {
    publishing: &'a Mutex<HashSet<String>>,
    key: String,
}

impl Drop for PublishClaim<'_> {
    fn drop(&mut self) {
        if let Ok(mut publishing) = self.publishing.lock() {
            publishing.remove(&self.key);
        }
    }
}

impl VideoPipeline {
    pub fn new(
        config: PipelineConfig,
        videos: Arc<dyn VideoStore>,
        operations: Arc<dyn OperationTracker>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            videos,
            operations,
            collaborators,
            clock,
            events: None,
            upload_credentials: None,
            publishing: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_events(mut self, events: EventHandle) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_upload_credentials(mut self, credentials: UploadCredentials) -> Self {
        self.upload_credentials = Some(credentials);
        self
    }

    pub fn videos(&self) -> &Arc<dyn VideoStore> {
        &self.videos
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Run one production and return the key of the registered video.
    ///
    /// Errors before registration leave no record behind. Once registered,
    /// a failed kickoff only marks the video `Failed`.
    pub async fn produce(&self, request: ProduceRequest) -> Result<String, PipelineError> {
        let length = request.length;
        let start = Instant::now();

        let result = self.run_production(request).await;

        PRODUCTION_DURATION
            .with_label_values(&[length.as_str()])
            .observe(start.elapsed().as_secs_f64());
        let label = match &result {
            Ok((_, VideoStatus::Failed)) => "kickoff_failed",
            Ok(_) => "registered",
            Err(_) => "error",
        };
        PRODUCTION_RUNS
            .with_label_values(&[length.as_str(), label])
            .inc();

        result.map(|(key, _)| key)
    }

    async fn run_production(
        &self,
        request: ProduceRequest,
    ) -> Result<(String, VideoStatus), PipelineError> {
        // Step 1: script
        let script = match &request.script {
            Some(script) => GeneratedScript {
                script: script.clone(),
                title: request.title.clone().unwrap_or_else(|| UNTITLED.to_string()),
                topic: request
                    .topic
                    .clone()
                    .unwrap_or_else(|| CUSTOM_SCRIPT_TOPIC.to_string()),
            },
            None => {
                let script_request = ScriptRequest {
                    topic: request.topic.clone(),
                    length: request.length,
                    title: request.title.clone(),
                    inspiration_url: request.inspiration_url.clone(),
                };
                let mut generated = self
                    .collaborators
                    .scripts
                    .generate_script(&script_request)
                    .await
                    .map_err(PipelineError::ScriptGeneration)?;
                if let Some(title) = &request.title {
                    generated.title = title.clone();
                }
                generated
            }
        };

        // Step 2: metadata
        let optimization = OptimizationRequest {
            title: script.title.clone(),
            description: " ".to_string(),
            tags: Vec::new(),
            category: self.config.default_category.clone(),
            script: script.script.clone(),
        };
        let metadata = self
            .collaborators
            .optimizer
            .optimize(&optimization)
            .await
            .map_err(PipelineError::Optimization)?;

        let key = metadata.optimized_title.trim().to_string();
        if key.is_empty() {
            return Err(PipelineError::Optimization(
                crate::collaborators::CollaboratorError::InvalidResponse(
                    "empty optimized title".to_string(),
                ),
            ));
        }

        // Step 3: registration
        let record = VideoRecord {
            title: script.title,
            script: script.script,
            length: request.length,
            playlist: request.playlist,
            scheduled_date: self.clock.now().date_naive(),
            optimized_title: key.clone(),
            optimized_description: metadata.optimized_description,
            optimized_tags: metadata.optimized_tags,
            optimized_category: metadata.optimized_category,
            suggested_upload_time: metadata.suggested_upload_time,
            thumbnail_url: None,
        };

        let script_for_kickoff = if self.videos.create(record.clone())? {
            info!(key = %key, length = %request.length, topic = %script.topic, "Registered new video");
            if let Some(events) = &self.events {
                events.emit(PipelineEvent::VideoRegistered {
                    key: key.clone(),
                    length: request.length,
                });
            }
            record.script
        } else {
            // Title collision: the existing record wins and is regenerated
            // from its own script.
            warn!(key = %key, "Video already registered under this title, reusing existing record");
            self.videos
                .get(&key)?
                .map(|existing| existing.script)
                .ok_or_else(|| PipelineError::NotFound(key.clone()))?
        };

        apply_transition(
            self.videos.as_ref(),
            self.events.as_ref(),
            &key,
            VideoStatus::Processing,
            Some("production started".to_string()),
        )?;

        // Step 4: kickoff
        let status = self.start_generation(&key, &script_for_kickoff).await?;
        Ok((key, status))
    }

    /// Kick off visual generation for a `Processing` video.
    ///
    /// Returns `Processing` when a job was started, `Failed` otherwise.
    async fn start_generation(&self, key: &str, script: &str) -> Result<VideoStatus, PipelineError> {
        let request = KickoffRequest {
            script: script.to_string(),
            title: key.to_string(),
            prompt: first_sentence(script),
            duration_secs: self.config.clip_duration_secs,
            aspect_ratio: self.config.aspect_ratio.clone(),
        };

        let failure = match self.collaborators.kickoff.kickoff(&request).await {
            Ok(Some(reference)) => {
                if !self.operations.store(key, reference)? {
                    warn!(key = %key, "Video vanished before its operation could be tracked");
                }
                info!(key = %key, "Video generation started");
                return Ok(VideoStatus::Processing);
            }
            Ok(None) => "kickoff returned no operation".to_string(),
            Err(e) => format!("kickoff failed: {}", e),
        };

        error!(key = %key, reason = %failure, "Video generation failed to start");
        apply_transition(
            self.videos.as_ref(),
            self.events.as_ref(),
            key,
            VideoStatus::Failed,
            Some(failure),
        )?;
        Ok(VideoStatus::Failed)
    }

    /// Restart generation for a failed, timed out or lost video.
    ///
    /// Reuses the stored script; script generation and metadata optimization
    /// are not repeated. Returns the status after the new kickoff.
    pub async fn retry(&self, key: &str) -> Result<VideoStatus, PipelineError> {
        let record = self
            .videos
            .get(key)?
            .ok_or_else(|| PipelineError::NotFound(key.to_string()))?;
        let status = self.videos.status(key)?.unwrap_or(VideoStatus::Draft);
        if !status.is_retryable() {
            return Err(PipelineError::InvalidState {
                key: key.to_string(),
                status,
                operation: "retry",
            });
        }
        if record.script.trim().is_empty() {
            return Err(PipelineError::MissingScript(key.to_string()));
        }

        info!(key = %key, from = %status, "Retrying video generation");
        RETRIES.with_label_values(&[status.as_str()]).inc();

        self.operations.remove(key)?;
        apply_transition(
            self.videos.as_ref(),
            self.events.as_ref(),
            key,
            VideoStatus::Processing,
            Some("retry".to_string()),
        )?;
        self.start_generation(key, &record.script).await
    }

    /// Upload a generated or scheduled video and mark it published.
    ///
    /// The video is claimed before its status is checked, so concurrent
    /// publishes of one video upload it once; the others get
    /// `PublishInProgress` or, once it is published, `InvalidState`.
    pub async fn publish(&self, key: &str) -> Result<(), PipelineError> {
        let credentials = self
            .upload_credentials
            .clone()
            .ok_or(PipelineError::UploadNotConfigured)?;
        let _claim = self.claim_publish(key)?;
        let record = self
            .videos
            .get(key)?
            .ok_or_else(|| PipelineError::NotFound(key.to_string()))?;
        let status = self.videos.status(key)?.unwrap_or(VideoStatus::Draft);
        if !status.is_publishable() {
            return Err(PipelineError::InvalidState {
                key: key.to_string(),
                status,
                operation: "publish",
            });
        }
        let artifact = self
            .videos
            .artifact(key)?
            .ok_or_else(|| PipelineError::MissingArtifact(key.to_string()))?;

        let description = if record.optimized_description.trim().is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            record.optimized_description
        };
        let category = if record.optimized_category.trim().is_empty() {
            self.config.upload_fallback_category.clone()
        } else {
            record.optimized_category
        };
        let request = UploadRequest {
            credentials,
            video_url: artifact.video_url,
            title: record.optimized_title,
            description,
            tags: record.optimized_tags,
            category,
        };

        info!(key = %key, "Uploading video");
        if let Err(e) = self.collaborators.uploader.upload(&request).await {
            UPLOADS.with_label_values(&["failure"]).inc();
            warn!(key = %key, error = %e, "Upload failed");
            return Err(PipelineError::Upload(e));
        }
        UPLOADS.with_label_values(&["success"]).inc();

        apply_transition(
            self.videos.as_ref(),
            self.events.as_ref(),
            key,
            VideoStatus::Published,
            Some("uploaded".to_string()),
        )?;
        Ok(())
    }

    /// Hold `key` for the duration of one publish. A second publish of the
    /// same video is rejected while the first one uploads.
    fn claim_publish(&self, key: &str) -> Result<PublishClaim<'_>, PipelineError> {
        let mut publishing = self
            .publishing
            .lock()
            .map_err(|_| StoreError::Backend("publish claims lock poisoned".to_string()))?;
        if !publishing.insert(key.to_string()) {
            return Err(PipelineError::PublishInProgress(key.to_string()));
        }
        Ok(PublishClaim {
            publishing: &self.publishing,
            key: key.to_string(),
        })
    }

    /// Generate a thumbnail now and store it on the record.
    pub async fn regenerate_thumbnail(&self, key: &str) -> Result<String, PipelineError> {
        let record = self
            .videos
            .get(key)?
            .ok_or_else(|| PipelineError::NotFound(key.to_string()))?;

        let url = self
            .collaborators
            .thumbnails
            .generate_thumbnail(&thumbnail_request(&record))
            .await
            .map_err(PipelineError::Thumbnail)?;

        self.videos
            .update(key, &VideoUpdate::new().with_thumbnail(url.clone()))?;
        info!(key = %key, "Thumbnail regenerated");
        Ok(url)
    }
}
