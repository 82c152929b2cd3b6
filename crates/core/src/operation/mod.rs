//! Operation tracker for long-running external generation jobs.

mod tracker;

pub use tracker::{
    MemoryOperationTracker, OperationHandle, OperationLookup, OperationTracker,
    DEFAULT_OPERATION_TTL_HOURS,
};
