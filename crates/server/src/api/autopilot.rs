//! Autopilot API handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use reelpilot_core::{AutopilotReport, AutopilotStatus, VideoLength};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

/// Current quota counts, goals and the next action
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AutopilotStatus>, ApiError> {
    Ok(Json(state.autopilot().status()?))
}

/// Fill the quota for one length class
///
/// Waits for any autopilot run already in progress.
pub async fn run(
    State(state): State<Arc<AppState>>,
    Path(length): Path<String>,
) -> Result<Json<AutopilotReport>, ApiError> {
    let length: VideoLength = length.parse().map_err(ApiError::bad_request)?;

    info!(length = %length, "Autopilot run requested via API");
    let report = state.autopilot().run(length).await?;
    Ok(Json(report))
}
