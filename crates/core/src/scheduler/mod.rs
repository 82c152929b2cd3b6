//! Autopilot: keeps the daily short and weekly long quotas filled.

mod config;
mod quota;
mod runner;

pub use config::AutopilotConfig;
pub use quota::{deficit, series_title, start_of_week};
pub use runner::{AutopilotReport, AutopilotScheduler, AutopilotStatus};
