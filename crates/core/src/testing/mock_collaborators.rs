//! Mock collaborators for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::collaborators::{
    CollaboratorError, Collaborators, GeneratedScript, GenerationKickoff, KickoffRequest,
    MetadataOptimizer, OperationStatus, OperationStatusCheck, OptimizationRequest,
    OptimizedMetadata, ScriptGenerator, ScriptRequest, SeriesStrategist, SeriesSuggestion,
    SpeechSynthesizer, ThumbnailGenerator, ThumbnailRequest, UploadRequest, Uploader,
};

/// Collaborator contract, used to inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Script,
    Optimize,
    Kickoff,
    StatusCheck,
    Speech,
    Thumbnail,
    Series,
    Upload,
}

#[derive(Default)]
struct Recorded {
    scripts: Vec<ScriptRequest>,
    optimizations: Vec<OptimizationRequest>,
    kickoffs: Vec<KickoffRequest>,
    status_checks: Vec<String>,
    speech: Vec<String>,
    thumbnails: Vec<ThumbnailRequest>,
    series: Vec<Vec<String>>,
    uploads: Vec<UploadRequest>,
}

struct Behavior {
    failures: HashMap<MockCall, String>,
    delays: HashMap<MockCall, Duration>,
    optimized_title: Option<String>,
    suggested_upload_time: Option<String>,
    kickoff_without_operation: bool,
    statuses: HashMap<String, OperationStatus>,
    default_status: OperationStatus,
    series: SeriesSuggestion,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            failures: HashMap::new(),
            delays: HashMap::new(),
            optimized_title: None,
            suggested_upload_time: None,
            kickoff_without_operation: false,
            statuses: HashMap::new(),
            default_status: OperationStatus::pending(),
            series: SeriesSuggestion {
                topic: "Deep Sea Creatures".to_string(),
                playlist: "Deep Sea".to_string(),
                is_new_series: true,
            },
        }
    }
}

/// Mock implementation of every collaborator contract.
///
/// Provides controllable behavior for testing:
/// - Deterministic default responses (numbered titles, operation references
///   and media URLs)
/// - Recorded requests per contract for assertions
/// - Injected failures and delays per contract
/// - Per-operation job status
///
/// By default jobs never finish; use [`set_default_status`] or
/// [`set_operation_status`] to complete or fail them.
///
/// [`set_default_status`]: MockCollaborators::set_default_status
/// [`set_operation_status`]: MockCollaborators::set_operation_status
#[derive(Clone, Default)]
pub struct MockCollaborators {
    recorded: Arc<RwLock<Recorded>>,
    behavior: Arc<RwLock<Behavior>>,
    counter: Arc<std::sync::atomic::AtomicU32>,
}

impl std::fmt::Debug for MockCollaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCollaborators").finish_non_exhaustive()
    }
}

impl MockCollaborators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this mock as every collaborator.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_single(Arc::new(self.clone()))
    }

    fn next_id(&self) -> u32 {
        self.counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst)
            + 1
    }

    async fn check_failure(&self, call: MockCall) -> Result<(), CollaboratorError> {
        let delay = self.behavior.read().await.delays.get(&call).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.behavior.read().await.failures.get(&call) {
            Some(message) => Err(CollaboratorError::Request(message.clone())),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Behavior
    // =========================================================================

    /// Make every call to `call` fail until [`recover`](Self::recover).
    pub async fn fail(&self, call: MockCall, message: &str) {
        self.behavior
            .write()
            .await
            .failures
            .insert(call, message.to_string());
    }

    pub async fn recover(&self, call: MockCall) {
        self.behavior.write().await.failures.remove(&call);
    }

    /// Make every call to `call` take `delay` before answering.
    pub async fn set_delay(&self, call: MockCall, delay: Duration) {
        self.behavior.write().await.delays.insert(call, delay);
    }

    /// Force the optimized title (the record key) of every optimization.
    pub async fn set_optimized_title(&self, title: Option<&str>) {
        self.behavior.write().await.optimized_title = title.map(str::to_string);
    }

    pub async fn set_suggested_upload_time(&self, slot: Option<&str>) {
        self.behavior.write().await.suggested_upload_time = slot.map(str::to_string);
    }

    /// Make kickoff succeed without returning an operation.
    pub async fn set_kickoff_without_operation(&self, enabled: bool) {
        self.behavior.write().await.kickoff_without_operation = enabled;
    }

    /// Status reported for operations without a specific status.
    pub async fn set_default_status(&self, status: OperationStatus) {
        self.behavior.write().await.default_status = status;
    }

    pub async fn set_operation_status(&self, reference: &str, status: OperationStatus) {
        self.behavior
            .write()
            .await
            .statuses
            .insert(reference.to_string(), status);
    }

    pub async fn set_series(&self, suggestion: SeriesSuggestion) {
        self.behavior.write().await.series = suggestion;
    }

    // =========================================================================
    // Recorded calls
    // =========================================================================

    pub async fn script_requests(&self) -> Vec<ScriptRequest> {
        self.recorded.read().await.scripts.clone()
    }

    pub async fn optimization_requests(&self) -> Vec<OptimizationRequest> {
        self.recorded.read().await.optimizations.clone()
    }

    pub async fn kickoff_requests(&self) -> Vec<KickoffRequest> {
        self.recorded.read().await.kickoffs.clone()
    }

    pub async fn status_checks(&self) -> Vec<String> {
        self.recorded.read().await.status_checks.clone()
    }

    pub async fn speech_requests(&self) -> Vec<String> {
        self.recorded.read().await.speech.clone()
    }

    pub async fn thumbnail_requests(&self) -> Vec<ThumbnailRequest> {
        self.recorded.read().await.thumbnails.clone()
    }

    pub async fn series_requests(&self) -> Vec<Vec<String>> {
        self.recorded.read().await.series.clone()
    }

    pub async fn uploads(&self) -> Vec<UploadRequest> {
        self.recorded.read().await.uploads.clone()
    }
}

#[async_trait]
impl ScriptGenerator for MockCollaborators {
    async fn generate_script(
        &self,
        request: &ScriptRequest,
    ) -> Result<GeneratedScript, CollaboratorError> {
        self.recorded.write().await.scripts.push(request.clone());
        self.check_failure(MockCall::Script).await?;

        let topic = request
            .topic
            .clone()
            .unwrap_or_else(|| "Something Interesting".to_string());
        let title = request
            .title
            .clone()
            .unwrap_or_else(|| format!("{} #{}", topic, self.next_id()));
        Ok(GeneratedScript {
            script: format!("{} in one minute. Here is what you need to know!", topic),
            title,
            topic,
        })
    }
}

#[async_trait]
impl MetadataOptimizer for MockCollaborators {
    async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizedMetadata, CollaboratorError> {
        self.recorded
            .write()
            .await
            .optimizations
            .push(request.clone());
        self.check_failure(MockCall::Optimize).await?;

        let behavior = self.behavior.read().await;
        Ok(OptimizedMetadata {
            optimized_title: behavior
                .optimized_title
                .clone()
                .unwrap_or_else(|| request.title.clone()),
            optimized_description: format!("Watch: {}", request.title),
            optimized_tags: vec!["shorts".to_string(), "explained".to_string()],
            optimized_category: "27".to_string(),
            suggested_upload_time: behavior.suggested_upload_time.clone(),
        })
    }
}

#[async_trait]
impl GenerationKickoff for MockCollaborators {
    async fn kickoff(&self, request: &KickoffRequest) -> Result<Option<String>, CollaboratorError> {
        self.recorded.write().await.kickoffs.push(request.clone());
        self.check_failure(MockCall::Kickoff).await?;

        if self.behavior.read().await.kickoff_without_operation {
            return Ok(None);
        }
        Ok(Some(format!("operations/{}", self.next_id())))
    }
}

#[async_trait]
impl OperationStatusCheck for MockCollaborators {
    async fn check(&self, reference: &str) -> Result<OperationStatus, CollaboratorError> {
        self.recorded
            .write()
            .await
            .status_checks
            .push(reference.to_string());
        self.check_failure(MockCall::StatusCheck).await?;

        let behavior = self.behavior.read().await;
        Ok(behavior
            .statuses
            .get(reference)
            .cloned()
            .unwrap_or_else(|| behavior.default_status.clone()))
    }
}

#[async_trait]
impl SpeechSynthesizer for MockCollaborators {
    async fn synthesize(&self, script: &str) -> Result<String, CollaboratorError> {
        self.recorded.write().await.speech.push(script.to_string());
        self.check_failure(MockCall::Speech).await?;
        Ok(format!("https://media.test/audio/{}.mp3", self.next_id()))
    }
}

#[async_trait]
impl ThumbnailGenerator for MockCollaborators {
    async fn generate_thumbnail(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<String, CollaboratorError> {
        self.recorded
            .write()
            .await
            .thumbnails
            .push(request.clone());
        self.check_failure(MockCall::Thumbnail).await?;
        Ok(format!("https://media.test/thumbs/{}.png", self.next_id()))
    }
}

#[async_trait]
impl SeriesStrategist for MockCollaborators {
    async fn suggest_series(
        &self,
        existing_playlists: &[String],
    ) -> Result<SeriesSuggestion, CollaboratorError> {
        self.recorded
            .write()
            .await
            .series
            .push(existing_playlists.to_vec());
        self.check_failure(MockCall::Series).await?;
        Ok(self.behavior.read().await.series.clone())
    }
}

#[async_trait]
impl Uploader for MockCollaborators {
    async fn upload(&self, request: &UploadRequest) -> Result<(), CollaboratorError> {
        self.recorded.write().await.uploads.push(request.clone());
        self.check_failure(MockCall::Upload).await
    }
}
