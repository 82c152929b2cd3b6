use std::sync::Arc;

use reelpilot_core::{
    AutopilotScheduler, Config, SanitizedConfig, StatusPoller, VideoPipeline, VideoStore,
};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<VideoPipeline>,
    poller: StatusPoller,
    autopilot: AutopilotScheduler,
}

impl AppState {
    pub fn new(
        config: Config,
        pipeline: Arc<VideoPipeline>,
        poller: StatusPoller,
        autopilot: AutopilotScheduler,
    ) -> Self {
        Self {
            config,
            pipeline,
            poller,
            autopilot,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &VideoPipeline {
        self.pipeline.as_ref()
    }

    pub fn videos(&self) -> &dyn VideoStore {
        self.pipeline.videos().as_ref()
    }

    pub fn poller(&self) -> &StatusPoller {
        &self.poller
    }

    pub fn autopilot(&self) -> &AutopilotScheduler {
        &self.autopilot
    }
}
