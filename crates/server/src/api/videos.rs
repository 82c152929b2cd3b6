//! Video API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use reelpilot_core::{
    video::{GeneratedArtifact, VideoFilter},
    ProduceRequest, VideoLength, VideoRecord, VideoStatus, VideoStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing videos
#[derive(Debug, Deserialize)]
pub struct ListVideosParams {
    /// Filter by length class ("short" or "long")
    pub length: Option<VideoLength>,
    /// Filter by playlist name
    pub playlist: Option<String>,
    /// Filter by current status
    pub status: Option<VideoStatus>,
    /// Filter by scheduled date (YYYY-MM-DD)
    pub date: Option<NaiveDate>,
}

/// Video with its current status and, once generated, its media
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub key: String,
    pub status: VideoStatus,
    #[serde(flatten)]
    pub record: VideoRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<GeneratedArtifact>,
}

/// Response for listing videos
#[derive(Debug, Serialize)]
pub struct ListVideosResponse {
    pub videos: Vec<VideoResponse>,
    pub total: usize,
}

/// Response for thumbnail regeneration
#[derive(Debug, Serialize)]
pub struct ThumbnailResponse {
    pub key: String,
    pub thumbnail_url: String,
}

fn load_video(videos: &dyn VideoStore, key: &str) -> Result<VideoResponse, ApiError> {
    let record = videos
        .get(key)?
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("video not found: {}", key)))?;
    let status = videos.status(key)?.unwrap_or(VideoStatus::Draft);
    let artifact = videos.artifact(key)?;
    Ok(VideoResponse {
        key: key.to_string(),
        status,
        record,
        artifact,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// List videos in registration order
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListVideosParams>,
) -> Result<Json<ListVideosResponse>, ApiError> {
    let mut filter = VideoFilter::new();
    if let Some(length) = params.length {
        filter = filter.with_length(length);
    }
    if let Some(playlist) = params.playlist {
        filter = filter.with_playlist(playlist);
    }
    if let Some(date) = params.date {
        filter = filter.on(date);
    }

    let videos = state.videos();
    let mut items = Vec::new();
    for record in videos.scan(&filter)? {
        let key = record.key().to_string();
        let status = videos.status(&key)?.unwrap_or(VideoStatus::Draft);
        if params.status.is_some_and(|wanted| wanted != status) {
            continue;
        }
        let artifact = videos.artifact(&key)?;
        items.push(VideoResponse {
            key,
            status,
            record,
            artifact,
        });
    }

    Ok(Json(ListVideosResponse {
        total: items.len(),
        videos: items,
    }))
}

/// Run a production and return the registered video
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProduceRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), ApiError> {
    if request.script.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ApiError::bad_request("script cannot be empty"));
    }

    info!(length = %request.length, "Production requested via API");
    let key = state.pipeline().produce(request).await?;
    let video = load_video(state.videos(), &key)?;
    Ok((StatusCode::CREATED, Json(video)))
}

/// Get a single video
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    load_video(state.videos(), &key).map(Json)
}

/// Restart generation of a failed, timed out or lost video
pub async fn retry_video(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    state.pipeline().retry(&key).await?;
    load_video(state.videos(), &key).map(Json)
}

/// Upload a generated video
pub async fn publish_video(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<VideoResponse>, ApiError> {
    state.pipeline().publish(&key).await?;
    load_video(state.videos(), &key).map(Json)
}

/// Generate a new thumbnail
pub async fn regenerate_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ThumbnailResponse>, ApiError> {
    let thumbnail_url = state.pipeline().regenerate_thumbnail(&key).await?;
    Ok(Json(ThumbnailResponse { key, thumbnail_url }))
}
