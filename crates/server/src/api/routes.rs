use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{autopilot, handlers, middleware::metrics_middleware, videos};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Videos
        .route("/videos", get(videos::list_videos).post(videos::create_video))
        .route("/videos/{key}", get(videos::get_video))
        .route("/videos/{key}/retry", post(videos::retry_video))
        .route("/videos/{key}/publish", post(videos::publish_video))
        .route("/videos/{key}/thumbnail", post(videos::regenerate_thumbnail))
        // Autopilot
        .route("/autopilot", get(autopilot::get_status))
        .route("/autopilot/{length}", post(autopilot::run))
        .layer(middleware::from_fn(metrics_middleware));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
