//! Production pipeline: one run takes a topic (or a ready script) to a
//! registered video with a generation job in flight.

mod config;
mod orchestrator;
mod prompt;
mod types;

pub use config::PipelineConfig;
pub use orchestrator::VideoPipeline;
pub use prompt::{first_sentence, thumbnail_request};
pub use types::{PipelineError, ProduceRequest};

pub(crate) use orchestrator::apply_transition;
