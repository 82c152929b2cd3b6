//! Status poller: the state machine that moves `Processing` videos to their
//! outcome once the external generation job reports back.

mod backoff;
mod config;
mod runner;

pub use backoff::{attempt_budget, backoff_delay, PollSchedule};
pub use config::PollerConfig;
pub use runner::{PollOutcome, StatusPoller, TickSummary};
