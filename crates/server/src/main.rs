use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelpilot_core::{
    collaborators::UploadCredentials, load_config, validate_config, AutopilotScheduler, Clock,
    Collaborators, EventHandle, HttpCollaborators, MemoryOperationTracker, MemoryVideoStore,
    OperationTracker, StatusPoller, SystemClock, VideoPipeline, VideoStore,
};

use reelpilot_server::{api::create_router, state::AppState};

/// Buffer size for the pipeline event channel
const EVENT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("REELPILOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Collaborator backend: {:?}", config.collaborators.backend);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Create collaborators
    let backend = HttpCollaborators::new(&config.collaborators)
        .context("Failed to create collaborator client")?;
    let collaborators = Collaborators::from_single(Arc::new(backend));
    info!(
        "Collaborator gateway at {}",
        config.collaborators.base_url.as_deref().unwrap_or_default()
    );

    // Create stores
    let videos: Arc<dyn VideoStore> = Arc::new(MemoryVideoStore::new());
    let operations: Arc<dyn OperationTracker> = Arc::new(MemoryOperationTracker::with_ttl(
        Arc::clone(&videos),
        Arc::clone(&clock),
        chrono::Duration::hours(config.pipeline.operation_ttl_hours),
    ));
    info!("Video store initialized");

    // Create event channel and log every event
    let events = EventHandle::new(EVENT_BUFFER_SIZE);
    let mut event_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => debug!(event = %json, "Pipeline event"),
                    Err(e) => warn!("Failed to serialize pipeline event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Create pipeline
    let mut pipeline = VideoPipeline::new(
        config.pipeline.clone(),
        Arc::clone(&videos),
        Arc::clone(&operations),
        collaborators.clone(),
        Arc::clone(&clock),
    )
    .with_events(events.clone());
    match &config.uploader {
        Some(uploader) => {
            pipeline = pipeline.with_upload_credentials(UploadCredentials {
                api_key: uploader.api_key.clone(),
                channel_id: uploader.channel_id.clone(),
            });
            info!("Uploads enabled for channel {}", uploader.channel_id);
        }
        None => info!("Uploader not configured, publishing disabled"),
    }
    let pipeline = Arc::new(pipeline);

    // Create status poller
    let poller = StatusPoller::new(
        config.poller.clone(),
        Arc::clone(&videos),
        Arc::clone(&operations),
        collaborators.clone(),
        Arc::clone(&clock),
    )
    .with_events(events.clone());
    if config.poller.enabled {
        poller.start().await;
        info!("Status poller started");
    } else {
        info!("Status poller disabled in config");
    }

    // Create autopilot
    let autopilot = AutopilotScheduler::new(
        config.autopilot.clone(),
        Arc::clone(&pipeline),
        Arc::clone(&clock),
    )
    .with_events(events.clone());
    if config.autopilot.enabled {
        autopilot.start().await;
        info!("Autopilot started");
    } else {
        info!("Autopilot disabled in config");
    }

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        pipeline,
        poller.clone(),
        autopilot.clone(),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if autopilot.is_running() {
        autopilot.stop().await;
    }
    if poller.is_running() {
        poller.stop().await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
