//! Status poller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the status poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Run the background poll loop.
    /// When disabled, `Processing` videos only advance through explicit ticks.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often the poll loop wakes up (milliseconds).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Delay after the first unfinished poll of a video (milliseconds).
    /// Doubles with every further unfinished poll.
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Upper bound for the per-video poll delay (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,

    /// Unfinished polls after which a video is marked timed out.
    /// With the default backoff, 300 polls span about 24.5 hours, so a job
    /// that never finishes loses its operation handle first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Maximum status checks in flight during one tick.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_polls: usize,
}

fn default_enabled() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    5000 // 5 seconds
}

fn default_initial_backoff() -> u64 {
    5000
}

fn default_max_backoff() -> u64 {
    300_000 // 5 minutes
}

fn default_max_attempts() -> u32 {
    300
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            tick_interval_ms: default_tick_interval(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            max_attempts: default_max_attempts(),
            max_concurrent_polls: default_max_concurrent(),
        }
    }
}
