//! Common test utilities for API testing with mocks.
//!
//! Builds an in-process server whose collaborators, clock and stores are all
//! in-memory test doubles, so every endpoint can be driven without external
//! services.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use reelpilot_core::{
    collaborators::UploadCredentials,
    config::{ServerConfig, UploaderConfig},
    poller::PollerConfig,
    scheduler::AutopilotConfig,
    testing::{ManualClock, MockCollaborators},
    AutopilotScheduler, Clock, Config, EventHandle, MemoryOperationTracker, MemoryVideoStore,
    OperationTracker, StatusPoller, VideoPipeline, VideoStore,
};

/// Re-export fixtures for test convenience
pub use reelpilot_core::testing::fixtures;

/// Test fixture with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock collaborators - configure responses and failures
    pub mock: MockCollaborators,
    /// Clock shared by the pipeline, poller and autopilot
    pub clock: Arc<ManualClock>,
    /// Video store behind the API
    pub videos: Arc<dyn VideoStore>,
    /// Poller handle for driving ticks manually
    pub poller: StatusPoller,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Configure upload credentials
    pub enable_uploads: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enable_uploads: true,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let mock = MockCollaborators::new();
        let collaborators = mock.collaborators();
        let clock = Arc::new(ManualClock::new(fixtures::friday_noon()));
        let shared_clock: Arc<dyn Clock> = clock.clone();

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            poller: PollerConfig {
                enabled: false,
                ..Default::default()
            },
            autopilot: AutopilotConfig {
                enabled: false,
                daily_short_goal: 2,
                weekly_long_goal: 1,
                ..Default::default()
            },
            uploader: test_config.enable_uploads.then(|| UploaderConfig {
                api_key: "upload-secret".to_string(),
                channel_id: "UC-test".to_string(),
            }),
            ..Default::default()
        };

        let videos: Arc<dyn VideoStore> = Arc::new(MemoryVideoStore::new());
        let operations: Arc<dyn OperationTracker> = Arc::new(MemoryOperationTracker::new(
            Arc::clone(&videos),
            Arc::clone(&shared_clock),
        ));
        let events = EventHandle::new(100);

        let mut pipeline = VideoPipeline::new(
            config.pipeline.clone(),
            Arc::clone(&videos),
            Arc::clone(&operations),
            collaborators.clone(),
            Arc::clone(&shared_clock),
        )
        .with_events(events.clone());
        if let Some(uploader) = &config.uploader {
            pipeline = pipeline.with_upload_credentials(UploadCredentials {
                api_key: uploader.api_key.clone(),
                channel_id: uploader.channel_id.clone(),
            });
        }
        let pipeline = Arc::new(pipeline);

        let poller = StatusPoller::new(
            config.poller.clone(),
            Arc::clone(&videos),
            operations,
            collaborators.clone(),
            Arc::clone(&shared_clock),
        )
        .with_events(events.clone());

        let autopilot = AutopilotScheduler::new(
            config.autopilot.clone(),
            Arc::clone(&pipeline),
            shared_clock,
        )
        .with_events(events.clone());

        let state = Arc::new(reelpilot_server::state::AppState::new(
            config,
            pipeline,
            poller.clone(),
            autopilot,
        ));

        let router = reelpilot_server::api::create_router(state);

        Self {
            router,
            mock,
            clock,
            videos,
            poller,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}
