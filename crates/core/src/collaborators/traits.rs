//! Contracts for the external services the pipeline consumes.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{
    GeneratedScript, KickoffRequest, OperationStatus, OptimizationRequest, OptimizedMetadata,
    ScriptRequest, SeriesSuggestion, ThumbnailRequest, UploadRequest,
};

/// Errors returned by collaborators.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The answer could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The collaborator is not available in this deployment.
    #[error("collaborator not configured: {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate_script(
        &self,
        request: &ScriptRequest,
    ) -> Result<GeneratedScript, CollaboratorError>;
}

#[async_trait]
pub trait MetadataOptimizer: Send + Sync {
    async fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizedMetadata, CollaboratorError>;
}

/// Starts a visual generation job.
#[async_trait]
pub trait GenerationKickoff: Send + Sync {
    /// Returns the job reference, or `None` if the service accepted the call
    /// but did not start a job.
    async fn kickoff(&self, request: &KickoffRequest) -> Result<Option<String>, CollaboratorError>;
}

#[async_trait]
pub trait OperationStatusCheck: Send + Sync {
    async fn check(&self, reference: &str) -> Result<OperationStatus, CollaboratorError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns a reference to the synthesized narration.
    async fn synthesize(&self, script: &str) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Returns a reference to the generated image.
    async fn generate_thumbnail(
        &self,
        request: &ThumbnailRequest,
    ) -> Result<String, CollaboratorError>;
}

#[async_trait]
pub trait SeriesStrategist: Send + Sync {
    async fn suggest_series(
        &self,
        existing_playlists: &[String],
    ) -> Result<SeriesSuggestion, CollaboratorError>;
}

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, request: &UploadRequest) -> Result<(), CollaboratorError>;
}

/// One handle per collaborator contract.
#[derive(Clone)]
pub struct Collaborators {
    pub scripts: Arc<dyn ScriptGenerator>,
    pub optimizer: Arc<dyn MetadataOptimizer>,
    pub kickoff: Arc<dyn GenerationKickoff>,
    pub status_check: Arc<dyn OperationStatusCheck>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub thumbnails: Arc<dyn ThumbnailGenerator>,
    pub strategist: Arc<dyn SeriesStrategist>,
    pub uploader: Arc<dyn Uploader>,
}

impl Collaborators {
    /// Use one value implementing every contract for all of them.
    pub fn from_single<T>(backend: Arc<T>) -> Self
    where
        T: ScriptGenerator
            + MetadataOptimizer
            + GenerationKickoff
            + OperationStatusCheck
            + SpeechSynthesizer
            + ThumbnailGenerator
            + SeriesStrategist
            + Uploader
            + 'static,
    {
        Self {
            scripts: backend.clone(),
            optimizer: backend.clone(),
            kickoff: backend.clone(),
            status_check: backend.clone(),
            speech: backend.clone(),
            thumbnails: backend.clone(),
            strategist: backend.clone(),
            uploader: backend,
        }
    }
}
