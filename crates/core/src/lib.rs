pub mod clock;
pub mod collaborators;
pub mod config;
pub mod events;
pub mod metrics;
pub mod operation;
pub mod pipeline;
pub mod poller;
pub mod scheduler;
pub mod testing;
pub mod video;

pub use clock::{Clock, SystemClock};
pub use collaborators::{CollaboratorError, Collaborators, HttpCollaborators};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use events::{EventHandle, PipelineEvent, PipelineEventEnvelope};
pub use operation::{MemoryOperationTracker, OperationLookup, OperationTracker};
pub use pipeline::{PipelineError, ProduceRequest, VideoPipeline};
pub use poller::{PollOutcome, StatusPoller, TickSummary};
pub use scheduler::{AutopilotReport, AutopilotScheduler, AutopilotStatus};
pub use video::{MemoryVideoStore, VideoLength, VideoRecord, VideoStatus, VideoStore};
