//! Video records: metadata, lifecycle status and generated artifacts.

mod memory_store;
mod store;
mod types;

pub use memory_store::MemoryVideoStore;
pub use store::{StoreError, VideoFilter, VideoStore};
pub use types::{GeneratedArtifact, VideoLength, VideoRecord, VideoStatus, VideoUpdate};
