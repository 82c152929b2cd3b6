//! External collaborators consumed by the pipeline.
//!
//! Each service is a trait so deployments and tests can plug in their own
//! implementation; [`HttpCollaborators`] implements all of them against a
//! JSON gateway.

mod http;
mod traits;
mod types;

pub use http::HttpCollaborators;
pub use traits::{
    CollaboratorError, Collaborators, GenerationKickoff, MetadataOptimizer, OperationStatusCheck,
    ScriptGenerator, SeriesStrategist, SpeechSynthesizer, ThumbnailGenerator, Uploader,
};
pub use types::{
    GeneratedScript, KickoffRequest, OperationStatus, OptimizationRequest, OptimizedMetadata,
    ScriptRequest, SeriesSuggestion, ThumbnailRequest, UploadCredentials, UploadRequest,
};
