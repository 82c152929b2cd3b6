//! Mapping of pipeline errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reelpilot_core::{video::StoreError, PipelineError};
use serde::Serialize;
use tracing::error;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error with the status code it is reported under.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = match &err {
            PipelineError::NotFound(_) | PipelineError::Store(StoreError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            PipelineError::InvalidState { .. }
            | PipelineError::MissingScript(_)
            | PipelineError::MissingArtifact(_)
            | PipelineError::PublishInProgress(_)
            | PipelineError::Store(StoreError::InvalidTransition { .. }) => StatusCode::CONFLICT,
            PipelineError::ScriptGeneration(_)
            | PipelineError::Optimization(_)
            | PipelineError::SeriesStrategy(_)
            | PipelineError::Upload(_)
            | PipelineError::Thumbnail(_) => StatusCode::BAD_GATEWAY,
            PipelineError::UploadNotConfigured => StatusCode::BAD_REQUEST,
            PipelineError::Store(StoreError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(status = %status, "Request failed: {}", err);
        }
        Self::new(status, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        PipelineError::Store(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelpilot_core::{CollaboratorError, VideoStatus};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PipelineError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (
                PipelineError::InvalidState {
                    key: "k".into(),
                    status: VideoStatus::Processing,
                    operation: "retry",
                },
                StatusCode::CONFLICT,
            ),
            (
                PipelineError::ScriptGeneration(CollaboratorError::Request("down".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (PipelineError::PublishInProgress("k".into()), StatusCode::CONFLICT),
            (PipelineError::UploadNotConfigured, StatusCode::BAD_REQUEST),
            (
                PipelineError::Store(StoreError::Backend("poisoned".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }
}
