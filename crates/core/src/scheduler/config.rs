//! Autopilot configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the autopilot scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutopilotConfig {
    /// Run the background autopilot loop.
    /// When disabled, autopilot runs only happen through the API.
    #[serde(default)]
    pub enabled: bool,

    /// Short videos wanted per calendar day (UTC).
    #[serde(default = "default_daily_short_goal")]
    pub daily_short_goal: usize,

    /// Long videos wanted per week (Sunday to Saturday, UTC).
    #[serde(default = "default_weekly_long_goal")]
    pub weekly_long_goal: usize,

    /// Topic prompt handed to the script generator for short videos.
    #[serde(default = "default_short_topic")]
    pub short_topic: String,

    /// Seconds between background autopilot runs.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_daily_short_goal() -> usize {
    3
}

fn default_weekly_long_goal() -> usize {
    2
}

fn default_short_topic() -> String {
    "a trending topic".to_string()
}

fn default_interval() -> u64 {
    3600 // 1 hour
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            daily_short_goal: default_daily_short_goal(),
            weekly_long_goal: default_weekly_long_goal(),
            short_topic: default_short_topic(),
            interval_secs: default_interval(),
        }
    }
}
